//! Schema descriptors and their builder

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::entry::{Entry, EntryBuilder};
use crate::error::{Result, SchemaError};
use crate::fingerprint::Fingerprint;
use crate::kind::TypeKind;

/// Looks up an already built schema by catalog name
pub(crate) type Resolver<'a> = &'a dyn Fn(&str) -> Option<Arc<Schema>>;

/// Handle to a nested schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    /// A built, shareable schema
    Schema(Arc<Schema>),
    /// Another schema declared in the same catalog, resolved at catalog build time
    Named(String),
}

impl SchemaRef {
    pub fn named(name: impl Into<String>) -> Self {
        SchemaRef::Named(name.into())
    }

    /// Catalog name, for by-name references
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaRef::Named(name) => Some(name),
            SchemaRef::Schema(_) => None,
        }
    }

    pub(crate) fn resolve(self, resolve: Resolver<'_>) -> Result<Arc<Schema>> {
        match self {
            SchemaRef::Schema(schema) => Ok(schema),
            SchemaRef::Named(name) => {
                resolve(&name).ok_or(SchemaError::UnresolvedReference { name })
            }
        }
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        SchemaRef::Schema(Arc::new(schema))
    }
}

impl From<Arc<Schema>> for SchemaRef {
    fn from(schema: Arc<Schema>) -> Self {
        SchemaRef::Schema(schema)
    }
}

impl From<&Arc<Schema>> for SchemaRef {
    fn from(schema: &Arc<Schema>) -> Self {
        SchemaRef::Schema(Arc::clone(schema))
    }
}

/// Immutable descriptor of a record, array, or scalar shape
///
/// - `Record`: at least one entry, names distinct, no element schema
/// - `Array`: an element schema, no entries
/// - scalars: neither
///
/// Nested schemas are shared through `Arc` and never point back to a parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    kind: TypeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entries: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_schema: Option<Arc<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    props: BTreeMap<String, String>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Entries in declaration order, empty unless this is a record
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Element schema of an array
    pub fn element_schema(&self) -> Option<&Arc<Schema>> {
        self.element_schema.as_ref()
    }

    /// First entry whose name matches exactly
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn props(&self) -> &BTreeMap<String, String> {
        &self.props
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    /// Builder seeded with this schema's attributes
    pub fn to_builder(&self) -> SchemaBuilder {
        SchemaBuilder {
            kind: Some(self.kind),
            entries: self.entries.iter().map(Entry::to_builder).collect(),
            element_schema: self.element_schema.clone().map(SchemaRef::Schema),
            props: self.props.clone(),
        }
    }

    /// Descriptor as JSON, for display
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Structural fingerprint; equal descriptors share it
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_json(&self.to_json())
    }
}

/// Order-independent accumulator for a [`Schema`]
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    kind: Option<TypeKind>,
    entries: Vec<EntryBuilder>,
    element_schema: Option<SchemaRef>,
    props: BTreeMap<String, String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, kind: TypeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Append an entry; accepts a built [`Entry`] or an [`EntryBuilder`]
    /// whose validation is deferred to [`SchemaBuilder::build`]
    pub fn with_entry(mut self, entry: impl Into<EntryBuilder>) -> Self {
        self.entries.push(entry.into());
        self
    }

    pub fn with_element_schema(mut self, schema: impl Into<SchemaRef>) -> Self {
        self.element_schema = Some(schema.into());
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

    /// Catalog names this builder refers to, directly or through its entries
    pub(crate) fn references(&self) -> impl Iterator<Item = &str> {
        self.element_schema
            .iter()
            .chain(self.entries.iter().filter_map(EntryBuilder::element_ref))
            .filter_map(SchemaRef::name)
    }

    /// Validate and produce the schema.
    ///
    /// Checks, in order: the type is present, entries and element schema
    /// match the type, entry names are distinct, nested references resolve,
    /// then each entry is built in declaration order.
    pub fn build(self) -> Result<Schema> {
        self.build_with(&|_: &str| None)
    }

    /// Type, population and duplicate-name checks, in that order
    pub(crate) fn check_shape(&self) -> Result<TypeKind> {
        let Some(kind) = self.kind else {
            return Err(SchemaError::MissingType { entry: None });
        };

        match kind {
            TypeKind::Record => {
                if self.entries.is_empty() {
                    return Err(SchemaError::MissingEntries);
                }
                if self.element_schema.is_some() {
                    return Err(SchemaError::UnexpectedElementSchema { kind, entry: None });
                }
            }
            TypeKind::Array => {
                if self.element_schema.is_none() {
                    return Err(SchemaError::MissingElementSchema { kind, entry: None });
                }
                if !self.entries.is_empty() {
                    return Err(SchemaError::UnexpectedEntries { kind });
                }
            }
            _ => {
                if !self.entries.is_empty() {
                    return Err(SchemaError::UnexpectedEntries { kind });
                }
                if self.element_schema.is_some() {
                    return Err(SchemaError::UnexpectedElementSchema { kind, entry: None });
                }
            }
        }
        trace!(%kind, "schema shape validated");

        let mut seen = HashSet::new();
        for name in self.entries.iter().filter_map(EntryBuilder::name) {
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateEntry { name: name.to_string() });
            }
        }
        Ok(kind)
    }

    /// [`check_shape`](Self::check_shape) followed by the shape of every
    /// entry; a catalog runs this before walking references
    pub(crate) fn check_declaration(&self) -> Result<()> {
        self.check_shape()?;
        self.entries.iter().try_for_each(|entry| entry.check_shape().map(|_| ()))
    }

    pub(crate) fn build_with(self, resolve: Resolver<'_>) -> Result<Schema> {
        let kind = self.check_shape()?;

        // Built schemas are acyclic already; only by-name references can
        // close a loop, and those are resolved against finished schemas.
        let element_schema = self
            .element_schema
            .map(|reference| reference.resolve(resolve))
            .transpose()?;

        let entries = self
            .entries
            .into_iter()
            .map(|entry| entry.build_with(resolve))
            .collect::<Result<Vec<_>>>()?;

        debug!(%kind, entries = entries.len(), "schema built");
        Ok(Schema {
            kind,
            entries,
            element_schema,
            props: self.props,
        })
    }
}
