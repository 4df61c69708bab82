//! Release and secret manifest file formats
//!
//! Both shapes are parsed strictly: an unknown field rejects the document. This is what
//! tells a release file apart from a secret manifest when a namespace directory is
//! scanned, so a near-miss of one shape never passes as the other.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A deployable component, pointing to a chart and its configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Component {
    /// Release name, rewritten per environment
    pub name: String,

    pub release: ChartRelease,

    /// Chart values
    #[serde(default)]
    pub configuration: serde_json::Map<String, JsonValue>,

    /// Names of secrets the component expects in its namespace
    #[serde(default)]
    pub secrets: Vec<String>,
}

/// Chart reference and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartRelease {
    /// Chart reference, as in `repo/chart:version`
    pub chart: String,

    /// Component version, unquoted numbers like `1.0` are accepted
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
}

/// Secret groups to be copied from the secret store into a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    pub secrets: BTreeMap<String, SecretGroup>,
}

/// A single Kubernetes secret and where its data comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecretGroup {
    /// Path in the secret store
    pub path: String,

    /// Kubernetes secret type
    #[serde(rename = "type", default = "default_secret_type")]
    pub secret_type: String,

    pub data: Vec<SecretItem>,
}

/// One data entry of a secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecretItem {
    pub name: String,

    #[serde(default)]
    pub extension: Option<String>,

    #[serde(default)]
    pub name_as_sub_path: bool,

    #[serde(default)]
    pub zip: bool,

    /// Keys to pick from the stored secret, all of them when empty
    #[serde(default)]
    pub keys: Vec<String>,
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a version string, found {:?}",
            other
        ))),
    }
}

fn default_secret_type() -> String {
    "Opaque".to_string()
}

/// A release file found in a namespace directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Namespace directory the file was found under
    ///
    /// Renaming namespaces does not touch it, so in a planned inventory it is the
    /// source namespace, not the namespace the release is deployed to.
    pub namespace: String,
    pub file: PathBuf,
    pub component: Component,
}

impl Release {
    pub fn name(&self) -> &str {
        &self.component.name
    }
}

/// A secret manifest file found in a namespace directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretManifest {
    /// Namespace directory the file was found under, kept across renames
    pub namespace: String,
    pub file: PathBuf,
    pub manifest: Manifest,
}

impl SecretManifest {
    /// Names of the secrets this manifest creates
    pub fn secret_names(&self) -> impl Iterator<Item = &str> {
        self.manifest.secrets.keys().map(String::as_str)
    }
}
