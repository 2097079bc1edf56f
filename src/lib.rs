//! Record Schema
//!
//! Immutable descriptors for the shape of records exchanged between
//! data-integration components: scalar fields, arrays, and nested records,
//! with per-field nullability, defaults, and free-form props.
//!
//! ## Features
//!
//! - **Validating Builders**: attributes set in any order, checked together at `build()`
//! - **Shared Nesting**: nested schemas are `Arc` handles, safe to share and read concurrently
//! - **Compatibility Predicate**: one logical kind accepts several native value shapes
//! - **Name Sanitization**: deterministic, idempotent identifier cleanup
//! - **Catalogs**: named schemas referring to each other, with cycle detection
//!
//! ## Example
//!
//! ```
//! use record_schema::{Entry, Schema, TypeKind};
//!
//! let users = Schema::builder()
//!     .with_type(TypeKind::Record)
//!     .with_entry(Entry::builder().with_name("user_id").with_type(TypeKind::Int).with_nullable(false))
//!     .with_entry(Entry::builder().with_name("created_at").with_type(TypeKind::DateTime))
//!     .build()?;
//!
//! assert_eq!(users.entry("created_at").map(Entry::kind), Some(TypeKind::DateTime));
//! assert!(users.entry("created-at").is_none());
//! # Ok::<(), record_schema::SchemaError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod definition;
pub mod entry;
pub mod error;
pub mod fingerprint;
pub mod kind;
pub mod sanitize;
pub mod schema;
pub mod value;

pub use catalog::{CatalogBuilder, SchemaCatalog};
pub use config::ToolConfig;
pub use definition::DefinitionDocument;
pub use entry::{Entry, EntryBuilder};
pub use error::{Result, SchemaError};
pub use fingerprint::Fingerprint;
pub use kind::{Representation, TypeKind};
pub use sanitize::{is_sanitized, sanitize, sanitize_connection_name};
pub use schema::{Schema, SchemaBuilder, SchemaRef};
pub use value::Value;
