//! JSON definition documents
//!
//! A definition document declares a catalog of named schemas:
//!
//! ```json
//! {
//!   "schemas": {
//!     "user": {
//!       "type": "record",
//!       "entries": [
//!         { "name": "user_id", "type": "int", "nullable": false, "default": 0 },
//!         { "name": "created-at", "type": "datetime" },
//!         { "name": "address", "type": "record", "element": "address" }
//!       ]
//!     },
//!     "address": {
//!       "type": "record",
//!       "entries": [{ "name": "city", "type": "string" }]
//!     },
//!     "users": { "type": "array", "element": "user" }
//!   }
//! }
//! ```
//!
//! `element` always names another schema of the same document. Defaults are
//! converted to a [`Value`] guided by the entry's declared type; a JSON value
//! that has no matching representation is kept in its natural shape and left
//! for the entry builder to reject.
//!
//! Schemas are declared in document order. A name that appears twice in
//! `schemas` is kept twice and rejected when the catalog is built.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::catalog::{CatalogBuilder, SchemaCatalog};
use crate::config::DefinitionsConfig;
use crate::entry::EntryBuilder;
use crate::error::{Result, SchemaError};
use crate::kind::TypeKind;
use crate::sanitize::sanitize;
use crate::schema::{SchemaBuilder, SchemaRef};
use crate::value::Value;

/// A document of named schema definitions
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionDocument {
    #[serde(deserialize_with = "declarations_in_order")]
    pub schemas: Vec<(String, SchemaDefinition)>,
}

/// Reads the `schemas` object as a list, keeping document order and repeated keys
fn declarations_in_order<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, SchemaDefinition)>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{MapAccess, Visitor};

    struct DeclarationsVisitor;

    impl<'de> Visitor<'de> for DeclarationsVisitor {
        type Value = Vec<(String, SchemaDefinition)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map of schema names to definitions")
        }

        fn visit_map<M>(self, mut access: M) -> std::result::Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut declarations = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, SchemaDefinition>()? {
                declarations.push(entry);
            }
            Ok(declarations)
        }
    }

    deserializer.deserialize_map(DeclarationsVisitor)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    #[serde(rename = "type")]
    pub kind: TypeKind,
    #[serde(default)]
    pub entries: Vec<EntryDefinition>,
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TypeKind,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

fn default_nullable() -> bool {
    true
}

impl DefinitionDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading definitions");
        Self::from_json(&content)
    }

    /// Turn every definition into a declaration of one catalog
    pub fn to_catalog_builder(&self, options: &DefinitionsConfig) -> CatalogBuilder {
        self.schemas
            .iter()
            .fold(CatalogBuilder::new(), |catalog, (name, definition)| {
                catalog.declare(name.clone(), definition.to_builder(options))
            })
    }

    /// Build and validate the whole document
    pub fn build(&self, options: &DefinitionsConfig) -> Result<SchemaCatalog> {
        if self.schemas.is_empty() {
            return Err(SchemaError::InvalidDefinition("no schemas declared".to_string()));
        }
        self.to_catalog_builder(options).build()
    }
}

impl SchemaDefinition {
    pub fn to_builder(&self, options: &DefinitionsConfig) -> SchemaBuilder {
        let mut builder = SchemaBuilder::new()
            .with_type(self.kind)
            .with_props(self.props.clone());
        if let Some(element) = &self.element {
            builder = builder.with_element_schema(SchemaRef::named(element.clone()));
        }
        self.entries
            .iter()
            .fold(builder, |builder, entry| builder.with_entry(entry.to_builder(options)))
    }
}

impl EntryDefinition {
    pub fn to_builder(&self, options: &DefinitionsConfig) -> EntryBuilder {
        let mut builder = EntryBuilder::new()
            .with_type(self.kind)
            .with_nullable(self.nullable)
            .with_props(self.props.clone());

        let sanitized = sanitize(&self.name);
        builder = if options.sanitize_names && sanitized != self.name {
            builder.with_name(sanitized).with_raw_name(self.name.clone())
        } else {
            builder.with_name(self.name.clone())
        };

        if let Some(default) = &self.default {
            builder = builder.with_default_value(coerce(self.kind, default));
        }
        if let Some(element) = &self.element {
            builder = builder.with_element_schema(SchemaRef::named(element.clone()));
        }
        if let Some(comment) = &self.comment {
            builder = builder.with_comment(comment.clone());
        }
        builder
    }
}

/// Convert a JSON default into the representation `kind` expects, when possible
pub fn coerce(kind: TypeKind, json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match (kind, json) {
        (TypeKind::Int, Json::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int)
            .unwrap_or_else(|| natural(json)),
        (TypeKind::Long | TypeKind::DateTime, Json::Number(n)) => {
            n.as_i64().map(Value::Long).unwrap_or_else(|| natural(json))
        }
        // out of f32 range stays a double and is rejected by the builder
        (TypeKind::Float, Json::Number(n)) => n
            .as_f64()
            .map(|v| v as f32)
            .filter(|v| v.is_finite())
            .map(Value::Float)
            .unwrap_or_else(|| natural(json)),
        (TypeKind::Double, Json::Number(n)) => {
            n.as_f64().map(Value::Double).unwrap_or_else(|| natural(json))
        }
        (TypeKind::DateTime, Json::String(s)) => parse_temporal(s).unwrap_or_else(|| natural(json)),
        (TypeKind::Bytes, Json::Array(items)) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Bytes)
            .unwrap_or_else(|| natural(json)),
        _ => natural(json),
    }
}

fn parse_temporal(s: &str) -> Option<Value> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(Value::Timestamp(instant.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(Value::Date)
}

/// The representation a JSON value has without any declared type
fn natural(json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(v) => Value::Long(v),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(natural).collect()),
        Json::Object(fields) => Value::Record(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), natural(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOCUMENT: &str = r#"{
        "schemas": {
            "user": {
                "type": "record",
                "props": { "namespace": "crm" },
                "entries": [
                    { "name": "user_id", "type": "int", "nullable": false, "default": 0 },
                    { "name": "created-at", "type": "datetime", "default": "2024-01-02T03:04:05Z" },
                    { "name": "address", "type": "record", "element": "address", "comment": "home" }
                ]
            },
            "address": {
                "type": "record",
                "entries": [{ "name": "city", "type": "string" }]
            },
            "users": { "type": "array", "element": "user" }
        }
    }"#;

    #[test]
    fn test_document_builds_catalog() {
        let doc = DefinitionDocument::from_json(DOCUMENT).unwrap();
        let catalog = doc.build(&DefinitionsConfig::default()).unwrap();
        assert_eq!(catalog.len(), 3);

        let user = catalog.get("user").unwrap();
        assert_eq!(user.prop("namespace"), Some("crm"));
        assert_eq!(user.entries().len(), 3);

        let created = user.entry("created_at").unwrap();
        assert_eq!(created.raw_name(), Some("created-at"));
        assert!(matches!(created.default_value(), Some(Value::Timestamp(_))));

        let id = user.entry("user_id").unwrap();
        assert!(!id.is_nullable());
        assert_eq!(id.default_value(), Some(&Value::Int(0)));

        let users = catalog.get("users").unwrap();
        assert_eq!(users.element_schema().unwrap().kind(), TypeKind::Record);
    }

    #[test]
    fn test_unsanitized_names_rejected_without_sanitizing() {
        let doc = DefinitionDocument::from_json(DOCUMENT).unwrap();
        let options = DefinitionsConfig { sanitize_names: false };
        let err = doc.build(&options).unwrap_err();
        assert!(matches!(err.root(), SchemaError::UnsanitizedName { .. }));
    }

    #[test]
    fn test_empty_document() {
        let doc = DefinitionDocument::from_json(r#"{ "schemas": {} }"#).unwrap();
        let err = doc.build(&DefinitionsConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefinition(_)));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = DefinitionDocument::from_json(r#"{ "schemas": {}, "extra": 1 }"#).unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[test]
    fn test_coerce_by_kind() {
        assert_eq!(coerce(TypeKind::Int, &json!(7)), Value::Int(7));
        assert_eq!(coerce(TypeKind::Int, &json!(5_000_000_000i64)), Value::Long(5_000_000_000));
        assert_eq!(coerce(TypeKind::Long, &json!(7)), Value::Long(7));
        assert_eq!(coerce(TypeKind::Float, &json!(1.5)), Value::Float(1.5));
        assert_eq!(coerce(TypeKind::Float, &json!(1e300)), Value::Double(1e300));
        assert_eq!(coerce(TypeKind::Double, &json!(2)), Value::Double(2.0));
        assert_eq!(coerce(TypeKind::Bytes, &json!([1, 2, 255])), Value::Bytes(vec![1, 2, 255]));
        assert_eq!(coerce(TypeKind::String, &json!(42)), Value::Long(42));
        assert_eq!(coerce(TypeKind::Boolean, &json!(null)), Value::Null);
    }

    #[test]
    fn test_coerce_temporal() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(coerce(TypeKind::DateTime, &json!("2024-01-02")), Value::Date(date));
        assert_eq!(coerce(TypeKind::DateTime, &json!(1_700_000_000_000i64)), Value::Long(1_700_000_000_000));
        assert_eq!(
            coerce(TypeKind::DateTime, &json!("yesterday")),
            Value::String("yesterday".to_string())
        );
    }

    #[test]
    fn test_incompatible_default_in_document() {
        let doc = DefinitionDocument::from_json(
            r#"{ "schemas": { "t": { "type": "record", "entries": [
                { "name": "flag", "type": "boolean", "default": "yes" }
            ] } } }"#,
        )
        .unwrap();
        let err = doc.build(&DefinitionsConfig::default()).unwrap_err();
        match err {
            SchemaError::Declaration { name, source } => {
                assert_eq!(name, "t");
                assert!(matches!(*source, SchemaError::IncompatibleDefault { kind: TypeKind::Boolean, .. }));
            }
            other => panic!("Expected Declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemas.json");
        std::fs::write(&path, DOCUMENT).unwrap();
        let doc = DefinitionDocument::from_path(&path).unwrap();
        assert_eq!(doc.schemas.len(), 3);
        assert!(DefinitionDocument::from_path(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_float_default_out_of_range_is_rejected() {
        let doc = DefinitionDocument::from_json(
            r#"{ "schemas": { "t": { "type": "record", "entries": [
                { "name": "ratio", "type": "float", "default": 1e300 }
            ] } } }"#,
        )
        .unwrap();
        let err = doc.build(&DefinitionsConfig::default()).unwrap_err();
        assert!(matches!(err.root(), SchemaError::IncompatibleDefault { kind: TypeKind::Float, .. }));
    }

    #[test]
    fn test_schemas_keep_document_order() {
        let doc = DefinitionDocument::from_json(DOCUMENT).unwrap();
        let names: Vec<&str> = doc.schemas.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["user", "address", "users"]);

        let catalog = doc.build(&DefinitionsConfig::default()).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["user", "address", "users"]);
    }

    #[test]
    fn test_repeated_schema_name_in_document() {
        let doc = DefinitionDocument::from_json(
            r#"{ "schemas": {
                "id": { "type": "long" },
                "id": { "type": "string" }
            } }"#,
        )
        .unwrap();
        assert_eq!(doc.schemas.len(), 2);
        let err = doc.build(&DefinitionsConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSchema { ref name } if name == "id"));
    }
}
