//! Record field descriptors

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::error::{Result, SchemaError};
use crate::kind::TypeKind;
use crate::sanitize::sanitize;
use crate::schema::{Resolver, Schema, SchemaRef};
use crate::value::Value;

/// One field of a record schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_name: Option<String>,
    #[serde(rename = "type")]
    kind: TypeKind,
    nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_schema: Option<Arc<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    props: BTreeMap<String, String>,
}

impl Entry {
    pub fn builder() -> EntryBuilder {
        EntryBuilder::default()
    }

    /// Sanitized name, unique within the owning schema
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name before sanitization, if one was recorded
    pub fn raw_name(&self) -> Option<&str> {
        self.raw_name.as_deref()
    }

    /// The raw name if recorded, else the name
    pub fn original_field_name(&self) -> &str {
        self.raw_name.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Default value, validated against the kind when the entry was built
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Nested record schema, present only for record entries
    pub fn element_schema(&self) -> Option<&Arc<Schema>> {
        self.element_schema.as_ref()
    }

    /// Documentation only
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn props(&self) -> &BTreeMap<String, String> {
        &self.props
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    /// Builder seeded with this entry's attributes
    pub fn to_builder(&self) -> EntryBuilder {
        EntryBuilder {
            name: Some(self.name.clone()),
            raw_name: self.raw_name.clone(),
            kind: Some(self.kind),
            nullable: self.nullable,
            default_value: self.default_value.clone(),
            element_schema: self.element_schema.clone().map(SchemaRef::Schema),
            comment: self.comment.clone(),
            props: self.props.clone(),
        }
    }
}

/// Order-independent accumulator for an [`Entry`]
///
/// Nothing is checked until [`EntryBuilder::build`].
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    name: Option<String>,
    raw_name: Option<String>,
    kind: Option<TypeKind>,
    nullable: bool,
    default_value: Option<Value>,
    element_schema: Option<SchemaRef>,
    comment: Option<String>,
    props: BTreeMap<String, String>,
}

impl Default for EntryBuilder {
    fn default() -> Self {
        Self {
            name: None,
            raw_name: None,
            kind: None,
            nullable: true,
            default_value: None,
            element_schema: None,
            comment: None,
            props: BTreeMap::new(),
        }
    }
}

impl EntryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_raw_name(mut self, raw_name: impl Into<String>) -> Self {
        self.raw_name = Some(raw_name.into());
        self
    }

    pub fn with_type(mut self, kind: TypeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// `Value::Null` clears any previously set default
    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default_value = (!value.is_null()).then_some(value);
        self
    }

    pub fn with_element_schema(mut self, schema: impl Into<SchemaRef>) -> Self {
        self.element_schema = Some(schema.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Merge `props` into the accumulated props, later keys win
    pub fn with_props<K, V>(mut self, props: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.props
            .extend(props.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn element_ref(&self) -> Option<&SchemaRef> {
        self.element_schema.as_ref()
    }

    /// Validate and produce the entry.
    ///
    /// Checks, in order: the name is present and sanitized, the type is
    /// present, the element schema matches the type, the default is
    /// compatible with the type.
    pub fn build(self) -> Result<Entry> {
        self.build_with(&|_: &str| None)
    }

    /// Name, type and element-schema presence; everything that does not
    /// need the element schema resolved
    pub(crate) fn check_shape(&self) -> Result<TypeKind> {
        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(SchemaError::MissingName),
        };
        let expected = sanitize(name);
        if expected != name {
            return Err(SchemaError::UnsanitizedName {
                name: name.to_string(),
                expected,
            });
        }

        let Some(kind) = self.kind else {
            return Err(SchemaError::MissingType { entry: Some(name.to_string()) });
        };

        match (kind, &self.element_schema) {
            (TypeKind::Record, None) => Err(SchemaError::MissingElementSchema {
                kind,
                entry: Some(name.to_string()),
            }),
            (TypeKind::Record, Some(_)) | (_, None) => Ok(kind),
            (_, Some(_)) => Err(SchemaError::UnexpectedElementSchema {
                kind,
                entry: Some(name.to_string()),
            }),
        }
    }

    pub(crate) fn build_with(self, resolve: Resolver<'_>) -> Result<Entry> {
        let kind = self.check_shape()?;
        let name = self.name.unwrap_or_default();

        // only record entries reach here with an element schema
        let element_schema = match self.element_schema {
            Some(reference) => {
                let schema = reference.resolve(resolve)?;
                if schema.kind() != TypeKind::Record {
                    return Err(SchemaError::ElementSchemaKind {
                        entry: name,
                        expected: TypeKind::Record,
                        actual: schema.kind(),
                    });
                }
                Some(schema)
            }
            None => None,
        };

        if let Some(value) = &self.default_value {
            if !kind.is_compatible(Some(value)) {
                return Err(SchemaError::IncompatibleDefault {
                    entry: name,
                    kind,
                    value: value.to_string(),
                });
            }
        }

        trace!(entry = %name, %kind, "entry validated");
        Ok(Entry {
            name,
            raw_name: self.raw_name,
            kind,
            nullable: self.nullable,
            default_value: self.default_value,
            element_schema,
            comment: self.comment,
            props: self.props,
        })
    }
}

impl From<Entry> for EntryBuilder {
    fn from(entry: Entry) -> Self {
        entry.to_builder()
    }
}
