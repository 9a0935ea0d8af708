use crate::{DuplicateNameError, InstantiationError, PropertyError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`ScriptEvaluator`](crate::ScriptEvaluator).
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script resource '{resource}' not found at {}", .path.display())]
    ResourceNotFound { resource: String, path: PathBuf },

    #[error("script resource name '{resource}' must be a relative path inside the script root")]
    InvalidResourceName { resource: String },

    #[error("failed to read script resource '{resource}'")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("script '{resource}' failed: {message}")]
    Evaluation { resource: String, message: String },

    #[error("script '{resource}' produced an invalid definition: {message}")]
    InvalidDefinition { resource: String, message: String },
}

/// Everything that can abort a build, with the original cause attached.
#[derive(Debug, Error)]
pub enum EntityBuildingError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),

    #[error("entity '{referenced_from}' references '{name}', which has not been built")]
    UnresolvedReference {
        name: String,
        referenced_from: String,
    },

    #[error("cannot instantiate entity '{entity}'")]
    Instantiation {
        entity: String,
        #[source]
        source: InstantiationError,
    },

    #[error("cannot assign property '{property}' of entity '{entity}'")]
    PropertyAssignment {
        entity: String,
        property: String,
        #[source]
        source: PropertyError,
    },

    #[error("entity created listener failed for '{entity}'")]
    Listener {
        entity: String,
        #[source]
        source: anyhow::Error,
    },
}
