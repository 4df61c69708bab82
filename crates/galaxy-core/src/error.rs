//! Core error types

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    #[error("Failed to read configuration {path}: {source}")]
    #[diagnostic(code(galaxy::config::read))]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration {path}: {message}")]
    #[diagnostic(
        code(galaxy::config::parse),
        help("expected `environments` and `namespaces` at the top level, optionally under `galaxy:`")
    )]
    ConfigParse { path: String, message: String },

    #[error("Namespace '{name}' is not declared in configuration")]
    #[diagnostic(code(galaxy::config::namespace))]
    InvalidNamespace { name: String },

    #[error("Base directory is not a directory: {path}")]
    #[diagnostic(code(galaxy::config::base_dir))]
    InvalidBaseDir { path: String },

    #[error("Environment '{name}' is not found in configuration")]
    #[diagnostic(code(galaxy::config::environment))]
    EnvironmentNotFound { name: String },

    #[error("Directory for namespace '{namespace}' is not found at: {path}")]
    #[diagnostic(code(galaxy::inventory::directory))]
    DirectoryNotFound { namespace: String, path: String },

    #[error(
        "Unrecognized file format in namespace '{namespace}': {path} \
         (as release: {release_error}; as secret manifest: {secret_error})"
    )]
    #[diagnostic(
        code(galaxy::inventory::format),
        help("a file must be either a release component or a secret manifest, without extra fields")
    )]
    UnrecognizedFileFormat {
        namespace: String,
        path: String,
        release_error: String,
        secret_error: String,
    },

    #[error("Unable to parse file name '{file}' with extensions [{extensions}]")]
    #[diagnostic(code(galaxy::plan::suffix))]
    FileSuffixParse { file: String, extensions: String },

    #[error("Interpolation error in '{template}': {message}")]
    #[diagnostic(code(galaxy::interpolate))]
    Interpolation { template: String, message: String },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    #[diagnostic(code(galaxy::inventory::glob))]
    Glob { pattern: String, message: String },

    #[error("IO error on {path}: {source}")]
    #[diagnostic(code(galaxy::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment '{environment}': {source}")]
    #[diagnostic(code(galaxy::environment))]
    Environment {
        environment: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Apply failed for namespace '{namespace}': {message}")]
    #[diagnostic(code(galaxy::apply))]
    Apply { namespace: String, message: String },
}

impl CoreError {
    /// Attach the environment being processed
    pub fn in_environment(self, environment: &str) -> Self {
        Self::Environment {
            environment: environment.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping environment context
    pub fn root(&self) -> &CoreError {
        match self {
            Self::Environment { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
