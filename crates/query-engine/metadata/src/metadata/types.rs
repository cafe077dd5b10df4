//! The host-side types and literal values a query can reference.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use enum_iterator::Sequence;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The shape of a type, without any of the data carried by enums or entities.
/// Used as the key of the conversion and cast tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence, Serialize, Deserialize,
)]
pub enum ClrTypeKind {
    Bool,
    Byte,
    SByte,
    Char,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    Guid,
    DateTime,
    DateTimeOffset,
    Enum,
    Entity,
    Null,
}

impl ClrTypeKind {
    /// Integral kinds are the only legal underlying types of an enum.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            ClrTypeKind::Byte
                | ClrTypeKind::SByte
                | ClrTypeKind::Int16
                | ClrTypeKind::UInt16
                | ClrTypeKind::Int32
                | ClrTypeKind::UInt32
                | ClrTypeKind::Int64
                | ClrTypeKind::UInt64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(
            self,
            ClrTypeKind::Single | ClrTypeKind::Double | ClrTypeKind::Decimal
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating()
    }
}

/// An enumeration declared by the client model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    pub name: String,
    pub underlying: ClrTypeKind,
    /// The declared members and their underlying values.
    pub members: Vec<(String, i64)>,
}

impl EnumType {
    /// The member declared with the given underlying value.
    pub fn member(&self, value: i64) -> Option<Value> {
        self.members
            .iter()
            .find(|(_, member_value)| *member_value == value)
            .map(|(name, member_value)| Value::Enum {
                ty: self.clone(),
                name: name.clone(),
                value: *member_value,
            })
    }
}

/// A type as seen by the query front end.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClrType {
    Bool,
    Byte,
    SByte,
    Char,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    Guid,
    DateTime,
    DateTimeOffset,
    Enum(EnumType),
    /// A model type; the value of the lambda parameter or a nested complex member.
    Entity(String),
    /// The type of the `null` literal, compatible with every other type.
    Null,
}

impl ClrType {
    pub fn kind(&self) -> ClrTypeKind {
        match self {
            ClrType::Bool => ClrTypeKind::Bool,
            ClrType::Byte => ClrTypeKind::Byte,
            ClrType::SByte => ClrTypeKind::SByte,
            ClrType::Char => ClrTypeKind::Char,
            ClrType::Int16 => ClrTypeKind::Int16,
            ClrType::UInt16 => ClrTypeKind::UInt16,
            ClrType::Int32 => ClrTypeKind::Int32,
            ClrType::UInt32 => ClrTypeKind::UInt32,
            ClrType::Int64 => ClrTypeKind::Int64,
            ClrType::UInt64 => ClrTypeKind::UInt64,
            ClrType::Single => ClrTypeKind::Single,
            ClrType::Double => ClrTypeKind::Double,
            ClrType::Decimal => ClrTypeKind::Decimal,
            ClrType::String => ClrTypeKind::String,
            ClrType::Guid => ClrTypeKind::Guid,
            ClrType::DateTime => ClrTypeKind::DateTime,
            ClrType::DateTimeOffset => ClrTypeKind::DateTimeOffset,
            ClrType::Enum(_) => ClrTypeKind::Enum,
            ClrType::Entity(_) => ClrTypeKind::Entity,
            ClrType::Null => ClrTypeKind::Null,
        }
    }

    /// The data-free type for a kind. Enums and entities need a name and have no such type.
    pub fn from_kind(kind: ClrTypeKind) -> Option<ClrType> {
        Some(match kind {
            ClrTypeKind::Bool => ClrType::Bool,
            ClrTypeKind::Byte => ClrType::Byte,
            ClrTypeKind::SByte => ClrType::SByte,
            ClrTypeKind::Char => ClrType::Char,
            ClrTypeKind::Int16 => ClrType::Int16,
            ClrTypeKind::UInt16 => ClrType::UInt16,
            ClrTypeKind::Int32 => ClrType::Int32,
            ClrTypeKind::UInt32 => ClrType::UInt32,
            ClrTypeKind::Int64 => ClrType::Int64,
            ClrTypeKind::UInt64 => ClrType::UInt64,
            ClrTypeKind::Single => ClrType::Single,
            ClrTypeKind::Double => ClrType::Double,
            ClrTypeKind::Decimal => ClrType::Decimal,
            ClrTypeKind::String => ClrType::String,
            ClrTypeKind::Guid => ClrType::Guid,
            ClrTypeKind::DateTime => ClrType::DateTime,
            ClrTypeKind::DateTimeOffset => ClrType::DateTimeOffset,
            ClrTypeKind::Null => ClrType::Null,
            ClrTypeKind::Enum | ClrTypeKind::Entity => return None,
        })
    }

    pub fn is_date(&self) -> bool {
        matches!(self, ClrType::DateTime | ClrType::DateTimeOffset)
    }
}

impl fmt::Display for ClrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClrType::Enum(enum_type) => write!(f, "{}", enum_type.name),
            ClrType::Entity(name) => write!(f, "{name}"),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// A literal value appearing in a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(u8),
    SByte(i8),
    Char(char),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
    Enum {
        ty: EnumType,
        name: String,
        value: i64,
    },
}

impl Value {
    pub fn clr_type(&self) -> ClrType {
        match self {
            Value::Null => ClrType::Null,
            Value::Bool(_) => ClrType::Bool,
            Value::Byte(_) => ClrType::Byte,
            Value::SByte(_) => ClrType::SByte,
            Value::Char(_) => ClrType::Char,
            Value::Int16(_) => ClrType::Int16,
            Value::UInt16(_) => ClrType::UInt16,
            Value::Int32(_) => ClrType::Int32,
            Value::UInt32(_) => ClrType::UInt32,
            Value::Int64(_) => ClrType::Int64,
            Value::UInt64(_) => ClrType::UInt64,
            Value::Single(_) => ClrType::Single,
            Value::Double(_) => ClrType::Double,
            Value::Decimal(_) => ClrType::Decimal,
            Value::String(_) => ClrType::String,
            Value::Guid(_) => ClrType::Guid,
            Value::DateTime(_) => ClrType::DateTime,
            Value::DateTimeOffset(_) => ClrType::DateTimeOffset,
            Value::Enum { ty, .. } => ClrType::Enum(ty.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The value as a signed 64 bit integer, if it is integral and fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::SByte(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::UInt16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::UInt32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            Value::Enum { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The value as a double, if it is numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Single(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            Value::Decimal(v) => v.to_string().parse().ok(),
            Value::UInt64(v) => Some(*v as f64),
            other => other.as_i64().map(|v| v as f64),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    u8 => Byte,
    i8 => SByte,
    char => Char,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Single,
    f64 => Double,
    Decimal => Decimal,
    String => String,
    Uuid => Guid,
    DateTime<Utc> => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
