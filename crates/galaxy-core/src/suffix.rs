//! File name conventions marking which environments a file belongs to
//!
//! Two conventions exist and exactly one is active, chosen by
//! `namespaces.suffixConvention` in the configuration:
//!
//! - `dash`: the last `-<word>` before the extension, `app-d.yaml` carries `d`
//! - `marker`: any `@<word>` in the name, `app@d@t.yaml` carries `d` and `t`
//!
//! A file without any suffix carries `""`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};

static DASH_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*?-(\w+)$").unwrap());
static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").unwrap());

/// Which file name convention carries environment suffixes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuffixConvention {
    /// `name-<suffix>.<ext>`
    #[default]
    Dash,
    /// `name@<suffix>[@<suffix>...].<ext>`
    Marker,
}

impl std::fmt::Display for SuffixConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dash => write!(f, "dash"),
            Self::Marker => write!(f, "marker"),
        }
    }
}

/// Compiled file name grammar for a set of extensions
#[derive(Debug, Clone)]
pub struct SuffixParser {
    convention: SuffixConvention,
    extensions: Vec<String>,
    file_re: Regex,
}

impl SuffixParser {
    pub fn new(convention: SuffixConvention, extensions: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = extensions.iter().map(|e| regex::escape(e)).collect();
        let pattern = format!(r"^(.*?)\.({})$", alternatives.join("|"));
        let file_re = Regex::new(&pattern).map_err(|e| CoreError::FileSuffixParse {
            file: pattern.clone(),
            extensions: format!("{}: {}", extensions.join(", "), e),
        })?;

        Ok(Self {
            convention,
            extensions: extensions.to_vec(),
            file_re,
        })
    }

    pub fn convention(&self) -> SuffixConvention {
        self.convention
    }

    /// Suffixes carried by a file, `[""]` when it has none
    ///
    /// Only the file name is considered, not its directory.
    pub fn suffixes(&self, file: &Path) -> Result<Vec<String>> {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| self.parse_error(file))?;

        let stem = self
            .file_re
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| self.parse_error(file))?;

        let suffixes = match self.convention {
            SuffixConvention::Dash => vec![self.dash_suffix(stem)],
            SuffixConvention::Marker => {
                let markers: Vec<String> = MARKER
                    .captures_iter(name)
                    .map(|caps| caps[1].to_string())
                    .collect();
                if markers.is_empty() {
                    vec![String::new()]
                } else {
                    markers
                }
            }
        };

        Ok(suffixes)
    }

    /// Whether any suffix carried by `file` is in `allowed`
    pub fn admits(&self, file: &Path, allowed: &[String]) -> Result<bool> {
        let suffixes = self.suffixes(file)?;
        Ok(suffixes.iter().any(|s| allowed.contains(s)))
    }

    fn dash_suffix(&self, stem: &str) -> String {
        match DASH_SUFFIX.captures(stem) {
            // `ingress-secret.yaml` names its kind when `secret` is a scanned extension
            Some(caps) if self.extensions.iter().any(|e| e == &caps[1]) => String::new(),
            Some(caps) => caps[1].to_string(),
            None => String::new(),
        }
    }

    fn parse_error(&self, file: &Path) -> CoreError {
        CoreError::FileSuffixParse {
            file: file.display().to_string(),
            extensions: self.extensions.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_parser(convention: SuffixConvention) -> SuffixParser {
        SuffixParser::new(convention, &["secret".to_string(), "yaml".to_string()]).unwrap()
    }

    fn suffix(parser: &SuffixParser, file: &str) -> String {
        let suffixes = parser.suffixes(Path::new(file)).unwrap();
        assert_eq!(suffixes.len(), 1, "single suffix expected for {file}");
        suffixes.into_iter().next().unwrap()
    }

    #[test]
    fn test_dash_suffix_extraction() {
        let parser = new_parser(SuffixConvention::Dash);
        for (file, expected) in [
            ("file-d.yaml", "d"),
            ("file-x.yaml", "x"),
            ("file.yaml", ""),
            ("/slash/dir/file.yaml", ""),
            ("file-a-b-c-d-d.yaml", "d"),
            ("file-a-b-c-d-x.yaml", "x"),
            ("/slash/dir/file-a-b-c-d-d.yaml", "d"),
            ("/slash/dir/file-a-b-c-x-x.yaml", "x"),
            ("file.a.b-c.d.d.yaml", ""),
            ("/slash/dir/file.a.b.c.d.d.yaml", ""),
            ("/slash-dir/file.yaml", ""),
            ("file-d.secret", "d"),
        ] {
            assert_eq!(suffix(&parser, file), expected, "file: {file}");
        }
    }

    #[test]
    fn test_dash_suffix_naming_an_extension() {
        let parser = new_parser(SuffixConvention::Dash);
        assert_eq!(suffix(&parser, "ingress-secret.yaml"), "");
        assert_eq!(suffix(&parser, "ingress-secret-d.yaml"), "d");
    }

    #[test]
    fn test_extension_is_literal_and_case_sensitive() {
        let parser = SuffixParser::new(SuffixConvention::Dash, &["y.ml".to_string()]).unwrap();
        assert!(parser.suffixes(Path::new("file.yxml")).is_err());
        assert_eq!(suffix(&parser, "file-d.y.ml"), "d");

        let parser = SuffixParser::new(SuffixConvention::Dash, &["yaml".to_string()]).unwrap();
        assert!(parser.suffixes(Path::new("file.YAML")).is_err());
    }

    #[test]
    fn test_unparseable_file_name() {
        let parser = new_parser(SuffixConvention::Dash);
        for file in ["file.txt", "file", "yaml", "/dir/"] {
            let err = parser.suffixes(Path::new(file)).unwrap_err();
            assert!(
                matches!(err, CoreError::FileSuffixParse { .. }),
                "expected parse error for {file}"
            );
        }

        let parser = new_parser(SuffixConvention::Marker);
        assert!(parser.suffixes(Path::new("file@d.txt")).is_err());
    }

    #[test]
    fn test_marker_admission() {
        let parser = new_parser(SuffixConvention::Marker);
        let allowed = vec!["d".to_string()];

        assert!(parser.admits(Path::new("file-name@d.yaml"), &allowed).unwrap());
        assert!(!parser.admits(Path::new("file-name@a.yaml"), &allowed).unwrap());
        assert!(parser.admits(Path::new("file-name@d@t.yaml"), &allowed).unwrap());
        assert!(parser.admits(Path::new("file-name@t@d.yaml"), &allowed).unwrap());
        assert!(!parser.admits(Path::new("file-name.yaml"), &allowed).unwrap());

        let allowed = vec![String::new(), "d".to_string()];
        assert!(parser.admits(Path::new("file-name.yaml"), &allowed).unwrap());
        assert!(!parser.admits(Path::new("file-name@a.yaml"), &allowed).unwrap());
    }

    #[test]
    fn test_marker_ignores_dash_suffix() {
        let parser = new_parser(SuffixConvention::Marker);
        assert_eq!(
            parser.suffixes(Path::new("app2-d.yaml")).unwrap(),
            vec![String::new()]
        );
        assert_eq!(
            parser.suffixes(Path::new("app@d@t.yaml")).unwrap(),
            vec!["d".to_string(), "t".to_string()]
        );
    }

    #[test]
    fn test_dash_admission_requires_empty_suffix() {
        let parser = new_parser(SuffixConvention::Dash);
        let only_d = vec!["d".to_string()];
        assert!(!parser.admits(Path::new("file.yaml"), &only_d).unwrap());
        assert!(parser.admits(Path::new("file-d.yaml"), &only_d).unwrap());

        let with_empty = vec![String::new(), "d".to_string()];
        assert!(parser.admits(Path::new("file.yaml"), &with_empty).unwrap());
        assert!(!parser.admits(Path::new("file-x.yaml"), &with_empty).unwrap());
    }
}
