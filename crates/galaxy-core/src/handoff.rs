//! Handing planned namespaces over to whatever applies them
//!
//! Galaxy does not deploy anything itself. Once environments are planned, each
//! namespace is bundled with its releases and secret manifests and given to a
//! [`SecretCopier`] and a [`ReleaseApplier`], secrets first.

use indexmap::IndexMap;
use serde::Serialize;
use std::cell::RefCell;

use crate::error::{CoreError, Result};
use crate::galaxy::Galaxy;
use crate::inventory::Inventory;
use crate::manifest::{Release, SecretManifest};

/// Error type collaborators report
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Everything planned for one namespace of an environment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceHandoff {
    /// Namespace name in the environment
    pub namespace: String,
    /// Namespace directory the files come from
    pub original_namespace: String,
    pub releases: Vec<Release>,
    pub secrets: Vec<SecretManifest>,
}

impl NamespaceHandoff {
    /// One handoff per namespace of the inventory, sorted by namespace
    pub fn from_inventory(inventory: &Inventory) -> Vec<Self> {
        let mut namespaces = inventory.namespaces();
        namespaces.sort_unstable();

        namespaces
            .into_iter()
            .map(|ns| Self {
                namespace: ns.to_string(),
                original_namespace: inventory.original_namespace(ns).unwrap_or(ns).to_string(),
                releases: inventory.namespace_releases(ns).to_vec(),
                secrets: inventory.namespace_secrets(ns).to_vec(),
            })
            .collect()
    }
}

/// Deploys the releases of a namespace
pub trait ReleaseApplier {
    fn apply(
        &self,
        environment: &str,
        handoff: &NamespaceHandoff,
    ) -> std::result::Result<(), CollaboratorError>;
}

/// Copies the secrets of a namespace from the secret store
pub trait SecretCopier {
    fn copy(
        &self,
        environment: &str,
        handoff: &NamespaceHandoff,
    ) -> std::result::Result<(), CollaboratorError>;
}

/// A call received by a [`Recorder`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Secrets {
        environment: String,
        namespace: String,
        files: Vec<String>,
    },
    Releases {
        environment: String,
        namespace: String,
        names: Vec<String>,
    },
}

/// Collaborator keeping track of what it was handed, without doing anything
#[derive(Debug, Default)]
pub struct Recorder {
    calls: RefCell<Vec<Call>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl ReleaseApplier for Recorder {
    fn apply(
        &self,
        environment: &str,
        handoff: &NamespaceHandoff,
    ) -> std::result::Result<(), CollaboratorError> {
        self.calls.borrow_mut().push(Call::Releases {
            environment: environment.to_string(),
            namespace: handoff.namespace.clone(),
            names: handoff.releases.iter().map(|r| r.name().to_string()).collect(),
        });
        Ok(())
    }
}

impl SecretCopier for Recorder {
    fn copy(
        &self,
        environment: &str,
        handoff: &NamespaceHandoff,
    ) -> std::result::Result<(), CollaboratorError> {
        self.calls.borrow_mut().push(Call::Secrets {
            environment: environment.to_string(),
            namespace: handoff.namespace.clone(),
            files: handoff
                .secrets
                .iter()
                .map(|s| s.file.display().to_string())
                .collect(),
        });
        Ok(())
    }
}

impl Galaxy {
    /// Handoffs of the latest plan of an environment
    ///
    /// Empty when the environment was not planned yet.
    pub fn handoff(&self, environment: &str) -> Result<Vec<NamespaceHandoff>> {
        self.dot_galaxy().get_environment(environment)?;

        Ok(self
            .results()
            .get(environment)
            .and_then(|runs| runs.last())
            .map(NamespaceHandoff::from_inventory)
            .unwrap_or_default())
    }

    /// Handoffs of every planned environment, in planning order
    pub fn handoffs(&self) -> Result<IndexMap<String, Vec<NamespaceHandoff>>> {
        self.results()
            .keys()
            .map(|env| Ok((env.clone(), self.handoff(env)?)))
            .collect()
    }

    /// Hand every planned namespace to the collaborators
    ///
    /// Secrets of a namespace are copied before its releases are applied. The first
    /// collaborator failure stops the walk.
    pub fn apply(&self, applier: &dyn ReleaseApplier, copier: &dyn SecretCopier) -> Result<()> {
        for (environment, handoffs) in self.handoffs()? {
            for handoff in &handoffs {
                tracing::info!(
                    parent: self.span(),
                    environment = %environment,
                    namespace = %handoff.namespace,
                    releases = handoff.releases.len(),
                    secrets = handoff.secrets.len(),
                    "handing over namespace"
                );

                if !handoff.secrets.is_empty() {
                    copier
                        .copy(&environment, handoff)
                        .map_err(|e| apply_error(&environment, handoff, e))?;
                }
                if !handoff.releases.is_empty() {
                    applier
                        .apply(&environment, handoff)
                        .map_err(|e| apply_error(&environment, handoff, e))?;
                }
            }
        }
        Ok(())
    }
}

fn apply_error(environment: &str, handoff: &NamespaceHandoff, error: CollaboratorError) -> CoreError {
    CoreError::Apply {
        namespace: handoff.namespace.clone(),
        message: error.to_string(),
    }
    .in_environment(environment)
}
