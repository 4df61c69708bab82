//! Galaxy Core - Per-environment planning of namespace release and secret files
//!
//! This crate provides the building blocks behind the `galaxy` command:
//! - `DotGalaxy`: The `.galaxy.yaml` configuration, environments and namespaces
//! - `Inventory`: Releases and secret manifests found per namespace directory
//! - `Plan`: Narrows and renames an inventory for one environment
//! - `Galaxy`: Runs inspection and planning over every environment
//! - `NamespaceHandoff`: What is handed to release and secret collaborators
//! - `Printer`: Tree and table renderings of planned environments

pub mod config;
pub mod error;
pub mod galaxy;
pub mod handoff;
pub mod interpolate;
pub mod inventory;
pub mod manifest;
pub mod plan;
pub mod printer;
pub mod suffix;

pub use config::{DotGalaxy, Environment, Namespaces, Spec, Transform, DEFAULT_CONFIG_FILE};
pub use error::{CoreError, Result};
pub use galaxy::{Galaxy, Options};
pub use handoff::{Call, CollaboratorError, NamespaceHandoff, Recorder, ReleaseApplier, SecretCopier};
pub use interpolate::Variables;
pub use inventory::{Inventory, NamespaceRenamer, ReleaseRenamer};
pub use manifest::{ChartRelease, Component, Manifest, Release, SecretGroup, SecretItem, SecretManifest};
pub use plan::Plan;
pub use printer::Printer;
pub use suffix::{SuffixConvention, SuffixParser};
