//! Logical type kinds and the compatibility predicate

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Native shape a value arrives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Record,
    Array,
    String,
    Bytes,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    Timestamp,
}

/// Logical type of a schema or entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Record,
    Array,
    String,
    Bytes,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    #[serde(rename = "datetime")]
    DateTime,
}

impl TypeKind {
    /// Every kind, in declaration order
    pub const ALL: [TypeKind; 10] = [
        TypeKind::Record,
        TypeKind::Array,
        TypeKind::String,
        TypeKind::Bytes,
        TypeKind::Int,
        TypeKind::Long,
        TypeKind::Float,
        TypeKind::Double,
        TypeKind::Boolean,
        TypeKind::DateTime,
    ];

    /// Representations a value of this kind may arrive in
    pub fn accepted(&self) -> &'static [Representation] {
        use Representation as R;
        match self {
            TypeKind::Record => &[R::Record],
            TypeKind::Array => &[R::Array],
            TypeKind::String => &[R::String],
            TypeKind::Bytes => &[R::Bytes],
            TypeKind::Int => &[R::Int],
            TypeKind::Long => &[R::Long],
            TypeKind::Float => &[R::Float],
            TypeKind::Double => &[R::Double],
            TypeKind::Boolean => &[R::Boolean],
            // epoch millis, calendar date, or instant
            TypeKind::DateTime => &[R::Long, R::Date, R::Timestamp],
        }
    }

    /// Check if `value` can be assigned to an entry of this kind.
    ///
    /// Absent values (`None` or `Value::Null`) are always compatible;
    /// nullability is enforced by the data layer, not here.
    pub fn is_compatible(&self, value: Option<&Value>) -> bool {
        match value.and_then(Value::representation) {
            None => true,
            Some(repr) => self.accepted().contains(&repr),
        }
    }

    /// Neither a record nor an array
    pub fn is_scalar(&self) -> bool {
        !matches!(self, TypeKind::Record | TypeKind::Array)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Record => "record",
            TypeKind::Array => "array",
            TypeKind::String => "string",
            TypeKind::Bytes => "bytes",
            TypeKind::Int => "int",
            TypeKind::Long => "long",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::Boolean => "boolean",
            TypeKind::DateTime => "datetime",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
