//! Literal payloads of constant expressions
//!
//! A constant's *declared* kind comes from its result type; the payload here
//! is the runtime value. The two normally agree, but trees built by hand or
//! read from files may not, and the key generator has to cope with that.

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime};
use plankey_core::PrimitiveTypeKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A spatial value in well-known text with its coordinate system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialValue {
    /// Spatial reference system identifier
    pub srid: i32,

    /// Well-known text (e.g. `POINT (1 2)`)
    pub wkt: String,
}

impl SpatialValue {
    pub fn new(srid: i32, wkt: impl Into<String>) -> Self {
        Self {
            srid,
            wkt: wkt.into(),
        }
    }
}

/// Runtime value of a constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    Binary(Vec<u8>),
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    Guid(Uuid),
    String(String),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Time(NaiveTime),
    Geometry(SpatialValue),
    Geography(SpatialValue),
    /// Hierarchy path in its canonical `/1/2/` form
    HierarchyId(String),
}

impl ConstantValue {
    /// The primitive kind a value of this shape is naturally typed as
    pub fn natural_kind(&self) -> PrimitiveTypeKind {
        match self {
            ConstantValue::Binary(_) => PrimitiveTypeKind::Binary,
            ConstantValue::Boolean(_) => PrimitiveTypeKind::Boolean,
            ConstantValue::Byte(_) => PrimitiveTypeKind::Byte,
            ConstantValue::SByte(_) => PrimitiveTypeKind::SByte,
            ConstantValue::Int16(_) => PrimitiveTypeKind::Int16,
            ConstantValue::Int32(_) => PrimitiveTypeKind::Int32,
            ConstantValue::Int64(_) => PrimitiveTypeKind::Int64,
            ConstantValue::Single(_) => PrimitiveTypeKind::Single,
            ConstantValue::Double(_) => PrimitiveTypeKind::Double,
            ConstantValue::Decimal(_) => PrimitiveTypeKind::Decimal,
            ConstantValue::Guid(_) => PrimitiveTypeKind::Guid,
            ConstantValue::String(_) => PrimitiveTypeKind::String,
            ConstantValue::DateTime(_) => PrimitiveTypeKind::DateTime,
            ConstantValue::DateTimeOffset(_) => PrimitiveTypeKind::DateTimeOffset,
            ConstantValue::Time(_) => PrimitiveTypeKind::Time,
            ConstantValue::Geometry(_) => PrimitiveTypeKind::Geometry,
            ConstantValue::Geography(_) => PrimitiveTypeKind::Geography,
            ConstantValue::HierarchyId(_) => PrimitiveTypeKind::HierarchyId,
        }
    }

    /// Whether a value of this shape may be declared as `kind`
    ///
    /// Spatial values fit any kind of their family (a point is a geometry).
    pub fn fits(&self, kind: PrimitiveTypeKind) -> bool {
        match self {
            ConstantValue::Geometry(_) => kind.is_geometry(),
            ConstantValue::Geography(_) => kind.is_geography(),
            other => other.natural_kind() == kind,
        }
    }

    /// Short name of the payload shape, for diagnostics
    pub fn shape_name(&self) -> &'static str {
        self.natural_kind().name()
    }
}

impl From<bool> for ConstantValue {
    fn from(v: bool) -> Self {
        ConstantValue::Boolean(v)
    }
}

impl From<i32> for ConstantValue {
    fn from(v: i32) -> Self {
        ConstantValue::Int32(v)
    }
}

impl From<i64> for ConstantValue {
    fn from(v: i64) -> Self {
        ConstantValue::Int64(v)
    }
}

impl From<f64> for ConstantValue {
    fn from(v: f64) -> Self {
        ConstantValue::Double(v)
    }
}

impl From<Decimal> for ConstantValue {
    fn from(v: Decimal) -> Self {
        ConstantValue::Decimal(v)
    }
}

impl From<Uuid> for ConstantValue {
    fn from(v: Uuid) -> Self {
        ConstantValue::Guid(v)
    }
}

impl From<&str> for ConstantValue {
    fn from(v: &str) -> Self {
        ConstantValue::String(v.to_string())
    }
}

impl From<String> for ConstantValue {
    fn from(v: String) -> Self {
        ConstantValue::String(v)
    }
}

impl From<Vec<u8>> for ConstantValue {
    fn from(v: Vec<u8>) -> Self {
        ConstantValue::Binary(v)
    }
}

// ============================================================================
// Tests
// ============================================================================
