//! Error types for schema construction

use thiserror::Error;

use crate::kind::TypeKind;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema errors
///
/// Everything up to `UnresolvedReference` is a validation failure raised by a
/// builder's `build()`. No partial value is ever produced alongside one.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Entry name is missing or empty")]
    MissingName,

    #[error("Entry name '{name}' is not sanitized (expected '{expected}')")]
    UnsanitizedName { name: String, expected: String },

    #[error("Type is missing{}", context(.entry))]
    MissingType { entry: Option<String> },

    #[error("Record schema requires at least one entry")]
    MissingEntries,

    #[error("{kind} schema must not declare entries")]
    UnexpectedEntries { kind: TypeKind },

    #[error("{kind} requires an element schema{}", context(.entry))]
    MissingElementSchema { kind: TypeKind, entry: Option<String> },

    #[error("{kind} must not declare an element schema{}", context(.entry))]
    UnexpectedElementSchema { kind: TypeKind, entry: Option<String> },

    #[error("Entry '{entry}' element schema must be {expected}, got {actual}")]
    ElementSchemaKind { entry: String, expected: TypeKind, actual: TypeKind },

    #[error("Duplicate entry name: {name}")]
    DuplicateEntry { name: String },

    #[error("Default value {value} of entry '{entry}' is not compatible with {kind}")]
    IncompatibleDefault { entry: String, kind: TypeKind, value: String },

    #[error("Schema reference cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Unresolved schema reference: {name}")]
    UnresolvedReference { name: String },

    #[error("Schema '{name}': {source}")]
    Declaration {
        name: String,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("Schema already declared: {name}")]
    DuplicateSchema { name: String },

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Whether this error reports a violated descriptor invariant
    pub fn is_validation(&self) -> bool {
        !matches!(
            self.root(),
            SchemaError::DuplicateSchema { .. }
                | SchemaError::InvalidDefinition(_)
                | SchemaError::Io(_)
                | SchemaError::Json(_)
        )
    }

    /// The underlying error, past any catalog declaration context
    pub fn root(&self) -> &SchemaError {
        match self {
            SchemaError::Declaration { source, .. } => source.root(),
            other => other,
        }
    }
}

fn context(entry: &Option<String>) -> String {
    match entry {
        Some(name) => format!(" (entry '{}')", name),
        None => String::new(),
    }
}
