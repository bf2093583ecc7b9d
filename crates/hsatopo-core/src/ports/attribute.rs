//! Attribute values as returned by a platform runtime.

use thiserror::Error;

use crate::domain::{DeviceClass, SegmentKind};

/// Raw attribute value; the runtime decides the representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Text(String),
    Device(DeviceClass),
    Segment(SegmentKind),
}

impl AttributeValue {
    /// Name of the carried type, used in mismatch diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Device(_) => "device class",
            Self::Segment(_) => "segment kind",
        }
    }
}

/// Why an attribute could not be supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnavailableReason {
    #[error("not supported for this object")]
    NotSupported,

    #[error("not reported by the platform")]
    NotReported,

    #[error("unknown handle")]
    InvalidHandle,

    #[error("runtime is not initialized")]
    NotInitialized,

    #[error("expected {expected}, platform returned {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// A single attribute query failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attribute `{attribute}` unavailable: {reason}")]
pub struct AttributeUnavailable {
    pub attribute: &'static str,
    pub reason: UnavailableReason,
}

impl AttributeUnavailable {
    pub const fn new(attribute: &'static str, reason: UnavailableReason) -> Self {
        Self { attribute, reason }
    }
}

/// Result of a raw attribute query.
pub type AttributeResult = Result<AttributeValue, AttributeUnavailable>;

/// Conversion from a raw [`AttributeValue`] into a concrete Rust type.
///
/// Unsigned integers widen (a `u8` answer satisfies a `u32` query) but never
/// narrow.
pub trait FromAttribute: Sized {
    /// Type name reported on mismatch.
    const EXPECTED: &'static str;

    fn from_attribute(value: AttributeValue) -> Option<Self>;
}

impl FromAttribute for u8 {
    const EXPECTED: &'static str = "u8";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::U8(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttribute for u16 {
    const EXPECTED: &'static str = "u16";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::U8(v) => Some(Self::from(v)),
            AttributeValue::U16(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttribute for u32 {
    const EXPECTED: &'static str = "u32";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::U8(v) => Some(Self::from(v)),
            AttributeValue::U16(v) => Some(Self::from(v)),
            AttributeValue::U32(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttribute for u64 {
    const EXPECTED: &'static str = "u64";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::U8(v) => Some(Self::from(v)),
            AttributeValue::U16(v) => Some(Self::from(v)),
            AttributeValue::U32(v) => Some(Self::from(v)),
            AttributeValue::U64(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttribute for bool {
    const EXPECTED: &'static str = "bool";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttribute for String {
    const EXPECTED: &'static str = "text";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttribute for DeviceClass {
    const EXPECTED: &'static str = "device class";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Device(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttribute for SegmentKind {
    const EXPECTED: &'static str = "segment kind";

    fn from_attribute(value: AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Segment(v) => Some(v),
            _ => None,
        }
    }
}
