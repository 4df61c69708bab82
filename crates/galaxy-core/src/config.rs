//! The `.galaxy.yaml` configuration document
//!
//! Describes the environments, their namespace admission rules and name transforms, and
//! where to find the namespace directories holding release and secret files.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::interpolate::Variables;
use crate::suffix::SuffixConvention;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".galaxy.yaml";

/// Loaded configuration document
#[derive(Debug, Clone)]
pub struct DotGalaxy {
    /// Environments and namespaces
    pub spec: Spec,

    /// Directory the document was loaded from, used to resolve a relative `baseDir`
    root: Option<PathBuf>,
}

/// Configuration core, linking environments and namespaces together
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    pub environments: Vec<Environment>,
    pub namespaces: Namespaces,
}

/// Key the document may nest its environments and namespaces under
const WRAPPER_KEY: &str = "galaxy";

#[derive(Deserialize)]
struct Wrapped {
    galaxy: Spec,
}

/// A deployment target, with its admission rules and name transformation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,

    /// Namespaces never planned for this environment
    #[serde(default)]
    pub skip_on_namespaces: Vec<String>,

    /// When not empty, the only namespaces planned for this environment
    #[serde(default)]
    pub only_on_namespaces: Vec<String>,

    /// Allowed file suffixes, `""` admits files without a suffix
    #[serde(default)]
    pub file_suffixes: Vec<String>,

    #[serde(default)]
    pub transform: Transform,
}

/// How namespaces and releases are renamed for an environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default)]
    pub namespace_prefix: String,
    #[serde(default)]
    pub namespace_suffix: String,
    #[serde(default)]
    pub release_prefix: String,
    #[serde(default)]
    pub release_suffix: String,
}

/// Where to find namespace directories and which files to consider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespaces {
    pub base_dir: PathBuf,

    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub names: Vec<String>,

    /// File name convention carrying the environment suffix
    #[serde(default)]
    pub suffix_convention: SuffixConvention,
}

impl Environment {
    /// Interpolate `template` with the transform values plus `placeholders`
    ///
    /// The transform is exposed as `RELEASE_PREFIX`, `RELEASE_SUFFIX`, `NAMESPACE_PREFIX`
    /// and `NAMESPACE_SUFFIX`; placeholders with the same name take precedence.
    pub fn interpolate(&self, template: &str, placeholders: &Variables) -> Result<String> {
        let mut vars = placeholders.clone();
        vars.set_default("RELEASE_PREFIX", self.transform.release_prefix.as_str());
        vars.set_default("RELEASE_SUFFIX", self.transform.release_suffix.as_str());
        vars.set_default("NAMESPACE_PREFIX", self.transform.namespace_prefix.as_str());
        vars.set_default("NAMESPACE_SUFFIX", self.transform.namespace_suffix.as_str());
        vars.interpolate(template)
    }

    pub fn skips_namespace(&self, namespace: &str) -> bool {
        self.skip_on_namespaces.iter().any(|ns| ns == namespace)
    }

    pub fn only_on_namespace(&self, namespace: &str) -> bool {
        self.only_on_namespaces.iter().any(|ns| ns == namespace)
    }
}

impl DotGalaxy {
    /// Load the configuration from a file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;

        let mut dot_galaxy = Self::parse(&content, &path.display().to_string())?;
        dot_galaxy.root = path.parent().map(Path::to_path_buf);
        Ok(dot_galaxy)
    }

    /// Parse the configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::parse(yaml, "<string>")
    }

    fn parse(yaml: &str, origin: &str) -> Result<Self> {
        let parse_error = |e: serde_yaml::Error| CoreError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        };

        // the shape is picked first so serde reports which field is wrong, and where
        let document: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(parse_error)?;
        let wrapped = document
            .as_mapping()
            .is_some_and(|m| m.contains_key(WRAPPER_KEY));

        let spec = if wrapped {
            serde_yaml::from_str::<Wrapped>(yaml).map_err(parse_error)?.galaxy
        } else {
            serde_yaml::from_str::<Spec>(yaml).map_err(parse_error)?
        };

        let mut seen = HashSet::new();
        for env in &spec.environments {
            if !seen.insert(env.name.as_str()) {
                return Err(CoreError::ConfigParse {
                    path: origin.to_string(),
                    message: format!("duplicated environment name '{}'", env.name),
                });
            }
        }

        Ok(Self { spec, root: None })
    }

    /// Namespace names, as declared
    pub fn list_namespaces(&self) -> Vec<String> {
        self.spec.namespaces.names.clone()
    }

    /// Environment names, in declaration order
    pub fn list_environments(&self) -> Vec<String> {
        self.spec.environments.iter().map(|e| e.name.clone()).collect()
    }

    pub fn get_environment(&self, name: &str) -> Result<&Environment> {
        self.spec
            .environments
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CoreError::EnvironmentNotFound {
                name: name.to_string(),
            })
    }

    /// Base directory, resolved against the configuration file location when relative
    pub fn base_dir(&self) -> PathBuf {
        let base_dir = &self.spec.namespaces.base_dir;
        match &self.root {
            Some(root) if base_dir.is_relative() => root.join(base_dir),
            _ => base_dir.clone(),
        }
    }

    /// Path to a namespace directory
    ///
    /// The joined path itself is not checked, scanning it reports a missing directory.
    pub fn get_namespace_dir(&self, name: &str) -> Result<PathBuf> {
        if !self.spec.namespaces.names.iter().any(|n| n == name) {
            return Err(CoreError::InvalidNamespace {
                name: name.to_string(),
            });
        }

        let base_dir = self.base_dir();
        if !base_dir.is_dir() {
            return Err(CoreError::InvalidBaseDir {
                path: base_dir.display().to_string(),
            });
        }

        Ok(base_dir.join(name))
    }

    pub fn extensions(&self) -> &[String] {
        &self.spec.namespaces.extensions
    }

    pub fn suffix_convention(&self) -> SuffixConvention {
        self.spec.namespaces.suffix_convention
    }
}
