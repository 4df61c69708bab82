//! Text renderings of planned environments

use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::inventory::Inventory;
use crate::manifest::Release;

const TABLE_HEADER: [&str; 6] = ["ENVIRONMENT", "NAMESPACE", "RELEASE", "VERSION", "CHART", "FILE"];
const COLUMN_GAP: &str = "  ";

/// Renders plan results for the terminal
pub struct Printer;

impl Printer {
    /// Environment, namespace, release file and release name as a tree
    ///
    /// Namespaces and files are sorted. Only the latest planning run of an environment
    /// is shown.
    pub fn tree(results: &IndexMap<String, Vec<Inventory>>) -> String {
        let mut lines = Vec::new();

        for (environment, inventory) in latest(results) {
            let mut namespaces: BTreeMap<&str, Vec<&Release>> = BTreeMap::new();
            for (namespace, releases) in inventory.releases() {
                namespaces.entry(namespace).or_default().extend(releases);
            }

            let children = namespaces
                .into_iter()
                .map(|(namespace, mut releases)| {
                    releases.sort_by(|a, b| a.file.cmp(&b.file));
                    Node {
                        label: namespace.to_string(),
                        children: releases.into_iter().map(release_node).collect(),
                    }
                })
                .collect();

            Node {
                label: environment.clone(),
                children,
            }
            .render(&mut lines);
        }

        lines.join("\n")
    }

    /// One aligned row per release of the latest run, header first and rows sorted
    pub fn table(results: &IndexMap<String, Vec<Inventory>>) -> String {
        let mut rows: Vec<[String; 6]> = Vec::new();
        for (environment, inventory) in latest(results) {
            for (namespace, releases) in inventory.releases() {
                for release in releases {
                    rows.push([
                        environment.clone(),
                        namespace.clone(),
                        release.name().to_string(),
                        release.component.release.version.clone(),
                        release.component.release.chart.clone(),
                        release.file.display().to_string(),
                    ]);
                }
            }
        }
        rows.sort();

        let header = TABLE_HEADER.map(String::from);
        let mut widths = [0usize; 6];
        for row in std::iter::once(&header).chain(&rows) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        std::iter::once(&header)
            .chain(&rows)
            .map(|row| format_row(row, &widths))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Files per namespace of one environment
    pub fn files(environment: &str, inventory: &Inventory) -> String {
        let mut lines = vec![format!("# Environment: {}", environment)];
        for (namespace, files) in inventory.namespace_files_map() {
            lines.push(format!("  Namespace: {}", namespace));
            for file in files {
                lines.push(format!("    - {}", file.display()));
            }
        }
        lines.join("\n")
    }
}

/// Latest planning run of every environment planned at least once
fn latest(
    results: &IndexMap<String, Vec<Inventory>>,
) -> impl Iterator<Item = (&String, &Inventory)> {
    results
        .iter()
        .filter_map(|(environment, runs)| runs.last().map(|inventory| (environment, inventory)))
}

fn format_row(row: &[String; 6], widths: &[usize; 6]) -> String {
    let last = row.len() - 1;
    row.iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            if i == last {
                cell.clone()
            } else {
                format!("{:<width$}", cell, width = width)
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
}

fn release_node(release: &Release) -> Node {
    Node {
        label: format!(
            "{} ({})",
            release.file.display(),
            release.component.release.chart
        ),
        children: vec![Node {
            label: format!("{} (v{})", release.name(), release.component.release.version),
            children: Vec::new(),
        }],
    }
}

struct Node {
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn render(&self, lines: &mut Vec<String>) {
        lines.push(self.label.clone());
        render_children(&self.children, lines, "");
    }
}

fn render_children(children: &[Node], lines: &mut Vec<String>, prefix: &str) {
    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, child.label));

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        render_children(&child.children, lines, &child_prefix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ChartRelease, Component, Manifest, SecretManifest};
    use std::path::PathBuf;

    fn release(namespace: &str, file: &str, name: &str, chart: &str, version: &str) -> Release {
        Release {
            namespace: namespace.to_string(),
            file: PathBuf::from(format!("namespaces/{}/{}", namespace, file)),
            component: Component {
                name: name.to_string(),
                release: ChartRelease {
                    chart: chart.to_string(),
                    version: version.to_string(),
                },
                configuration: Default::default(),
                secrets: vec![],
            },
        }
    }

    fn results() -> IndexMap<String, Vec<Inventory>> {
        let mut dev = Inventory::default();
        dev.push_release_to("ns1-d", release("ns1", "app1.yaml", "ns1-app1", "stable/app1", "0.1.0"));
        dev.push_release_to("ns1-d", release("ns1", "app2-d.yaml", "ns1-app2", "stable/app2", "0.2.0"));
        dev.push_secret_to(
            "ns1-d",
            SecretManifest {
                namespace: "ns1".to_string(),
                file: PathBuf::from("namespaces/ns1/ingress-secret.yaml"),
                manifest: Manifest {
                    secrets: Default::default(),
                },
            },
        );
        dev.push_release_to("ns2-d", release("ns2", "app3.yaml", "ns2-app3", "stable/app3", "1.0.0"));

        let mut tst = Inventory::default();
        tst.push_release_to("ns2", release("ns2", "app3.yaml", "app3", "stable/app3", "1.0.0"));
        tst.push_release_to("ns2", release("ns2", "app3-t.yaml", "app3", "stable/app3", "1.1.0"));

        let mut results = IndexMap::new();
        results.insert("dev".to_string(), vec![dev]);
        results.insert("tst".to_string(), vec![tst]);
        results
    }

    #[test]
    fn test_tree() {
        insta::assert_snapshot!(Printer::tree(&results()), @r"
        dev
        ├── ns1-d
        │   ├── namespaces/ns1/app1.yaml (stable/app1)
        │   │   └── ns1-app1 (v0.1.0)
        │   └── namespaces/ns1/app2-d.yaml (stable/app2)
        │       └── ns1-app2 (v0.2.0)
        └── ns2-d
            └── namespaces/ns2/app3.yaml (stable/app3)
                └── ns2-app3 (v1.0.0)
        tst
        └── ns2
            ├── namespaces/ns2/app3-t.yaml (stable/app3)
            │   └── app3 (v1.1.0)
            └── namespaces/ns2/app3.yaml (stable/app3)
                └── app3 (v1.0.0)
        ");
    }

    #[test]
    fn test_table() {
        insta::assert_snapshot!(Printer::table(&results()), @r"
        ENVIRONMENT  NAMESPACE  RELEASE   VERSION  CHART        FILE
        dev          ns1-d      ns1-app1  0.1.0    stable/app1  namespaces/ns1/app1.yaml
        dev          ns1-d      ns1-app2  0.2.0    stable/app2  namespaces/ns1/app2-d.yaml
        dev          ns2-d      ns2-app3  1.0.0    stable/app3  namespaces/ns2/app3.yaml
        tst          ns2        app3      1.0.0    stable/app3  namespaces/ns2/app3.yaml
        tst          ns2        app3      1.1.0    stable/app3  namespaces/ns2/app3-t.yaml
        ");
    }

    #[test]
    fn test_files() {
        let results = results();
        insta::assert_snapshot!(Printer::files("dev", &results["dev"][0]), @r"
        # Environment: dev
          Namespace: ns1-d
            - namespaces/ns1/app1.yaml
            - namespaces/ns1/app2-d.yaml
            - namespaces/ns1/ingress-secret.yaml
          Namespace: ns2-d
            - namespaces/ns2/app3.yaml
        ");
    }

    #[test]
    fn test_replanned_environment_shows_latest_run() {
        let mut replanned = results();
        for runs in replanned.values_mut() {
            let stale = runs[0].clone();
            runs.insert(0, stale);
        }
        let mut stale_tst = Inventory::default();
        stale_tst.push_release_to("ns2", release("ns2", "app9.yaml", "app9", "stable/app9", "9.0.0"));
        replanned["tst"].insert(0, stale_tst);

        assert_eq!(Printer::table(&replanned), Printer::table(&results()));
        assert_eq!(Printer::tree(&replanned), Printer::tree(&results()));
        assert!(!Printer::table(&replanned).contains("app9"));
    }

    #[test]
    fn test_empty_results() {
        let results = IndexMap::new();
        assert_eq!(Printer::tree(&results), "");
        assert_eq!(Printer::table(&results).trim_end(), "ENVIRONMENT  NAMESPACE  RELEASE  VERSION  CHART  FILE");
    }
}
