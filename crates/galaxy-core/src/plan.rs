//! Planning engine, deriving the inventory of one environment
//!
//! A plan narrows an inventory down to what an environment should receive and renames it:
//!
//! 1. namespaces are admitted by the environment's `onlyOnNamespaces` or, when that list
//!    is empty, by `skipOnNamespaces`
//! 2. files are admitted by the suffix their name carries, see [`SuffixParser`]
//! 3. release names get the environment's release prefix and suffix, both interpolated
//! 4. namespaces get the environment's namespace prefix and suffix, joined with `-`
//!
//! The input inventory is left untouched, a plan can run any number of times.

use tracing::Span;

use crate::config::{Environment, Transform};
use crate::error::Result;
use crate::interpolate::Variables;
use crate::inventory::{Inventory, NamespaceRenamer, ReleaseRenamer};
use crate::suffix::SuffixParser;

/// Binds an environment to the inventory it is planned from
pub struct Plan<'a> {
    span: Span,
    environment: &'a Environment,
    inventory: &'a Inventory,
    parser: SuffixParser,
}

impl<'a> Plan<'a> {
    pub fn new(
        environment: &'a Environment,
        inventory: &'a Inventory,
        parser: SuffixParser,
        span: Span,
    ) -> Self {
        Self {
            span,
            environment,
            inventory,
            parser,
        }
    }

    /// Build the environment inventory
    ///
    /// Any suffix parsing or interpolation error aborts the whole plan.
    pub fn run(&self) -> Result<Inventory> {
        let env = self.environment;
        tracing::info!(
            parent: &self.span,
            environment = %env.name,
            convention = %self.parser.convention(),
            "planning environment"
        );

        let mut planned = Inventory::new(self.span.clone());

        for namespace in self.inventory.namespaces() {
            if !self.admits_namespace(namespace) {
                tracing::info!(parent: &self.span, namespace, "skipping namespace");
                continue;
            }

            let mut admitted = false;
            for release in self.inventory.namespace_releases(namespace) {
                if self.admits_file(namespace, &release.file)? {
                    planned.push_release_to(namespace, release.clone());
                    admitted = true;
                }
            }
            for secret in self.inventory.namespace_secrets(namespace) {
                if self.admits_file(namespace, &secret.file)? {
                    planned.push_secret_to(namespace, secret.clone());
                    admitted = true;
                }
            }

            // the reverse map only covers namespaces left in the plan
            if !admitted {
                continue;
            }
            if let Some(original) = self.inventory.original_namespace(namespace) {
                planned.set_origin(namespace, original);
            }
        }

        let releases = ReleaseAffixes { environment: env };
        if releases.is_active() {
            planned.rename_releases(&releases)?;
        }

        let namespaces = NamespaceAffixes::from(&env.transform);
        if namespaces.is_active() {
            planned = planned.rename_namespaces(&namespaces);
        }

        tracing::debug!(
            parent: &self.span,
            environment = %env.name,
            namespaces = planned.namespaces().len(),
            "plan done"
        );
        Ok(planned)
    }

    fn admits_namespace(&self, namespace: &str) -> bool {
        let env = self.environment;
        if !env.only_on_namespaces.is_empty() {
            return env.only_on_namespace(namespace);
        }
        !env.skips_namespace(namespace)
    }

    fn admits_file(&self, namespace: &str, file: &std::path::Path) -> Result<bool> {
        let admitted = self.parser.admits(file, &self.environment.file_suffixes)?;
        tracing::debug!(
            parent: &self.span,
            namespace,
            file = %file.display(),
            admitted,
            "file admission"
        );
        Ok(admitted)
    }
}

/// Release renaming with the environment's interpolated prefix and suffix
struct ReleaseAffixes<'a> {
    environment: &'a Environment,
}

impl ReleaseAffixes<'_> {
    fn is_active(&self) -> bool {
        let transform = &self.environment.transform;
        !transform.release_prefix.is_empty() || !transform.release_suffix.is_empty()
    }
}

impl ReleaseRenamer for ReleaseAffixes<'_> {
    fn rename(&self, namespace: &str, name: &str) -> Result<String> {
        let transform = &self.environment.transform;
        let vars = Variables::new()
            .with("NAMESPACE", namespace)
            .with("RELEASE_NAME", name);

        let prefix = self.environment.interpolate(&transform.release_prefix, &vars)?;
        let suffix = self.environment.interpolate(&transform.release_suffix, &vars)?;
        Ok(format!("{}{}{}", prefix, name, suffix))
    }
}

/// Namespace renaming to `prefix-name-suffix`, skipping empty affixes
struct NamespaceAffixes {
    prefix: String,
    suffix: String,
}

impl From<&Transform> for NamespaceAffixes {
    fn from(transform: &Transform) -> Self {
        Self {
            prefix: transform.namespace_prefix.clone(),
            suffix: transform.namespace_suffix.clone(),
        }
    }
}

impl NamespaceAffixes {
    fn is_active(&self) -> bool {
        !self.prefix.is_empty() || !self.suffix.is_empty()
    }
}

impl NamespaceRenamer for NamespaceAffixes {
    fn rename(&self, namespace: &str) -> String {
        [self.prefix.as_str(), namespace, self.suffix.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}
