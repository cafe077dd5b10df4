//! The implicit (widening) conversions between primitive types.

use super::types::{ClrType, ClrTypeKind};

use ClrTypeKind::*;

/// For each source kind, the kinds it widens to without an explicit cast.
/// Narrowing conversions never appear here.
pub const IMPLICIT_CONVERSIONS: &[(ClrTypeKind, &[ClrTypeKind])] = &[
    (SByte, &[Int16, Int32, Int64, Single, Double, Decimal]),
    (
        Byte,
        &[
            Int16, UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal,
        ],
    ),
    (Int16, &[Int32, Int64, Single, Double, Decimal]),
    (
        UInt16,
        &[Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
    ),
    (Int32, &[Int64, Single, Double, Decimal]),
    (UInt32, &[Int64, UInt64, Single, Double, Decimal]),
    (Int64, &[Single, Double, Decimal]),
    (UInt64, &[Single, Double, Decimal]),
    (
        Char,
        &[UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
    ),
    (Single, &[Double]),
    (DateTime, &[DateTimeOffset]),
];

fn widens_to(from: ClrTypeKind, to: ClrTypeKind) -> bool {
    IMPLICIT_CONVERSIONS
        .iter()
        .find(|(source, _)| *source == from)
        .is_some_and(|(_, targets)| targets.contains(&to))
}

/// Whether a value of type `from` can be used where `to` is expected with no explicit cast.
///
/// Identity is trivially implicit, `null` converts to anything, and an enum converts to its
/// underlying integer type (and onward along that type's widenings).
pub fn is_implicit_conversion(from: &ClrType, to: &ClrType) -> bool {
    if from == to || *from == ClrType::Null {
        return true;
    }
    match (from, to) {
        (ClrType::Enum(enum_type), _) => {
            enum_type.underlying == to.kind() || widens_to(enum_type.underlying, to.kind())
        }
        (_, ClrType::Enum(_) | ClrType::Entity(_)) | (ClrType::Entity(_), _) => false,
        _ => widens_to(from.kind(), to.kind()),
    }
}

/// The type both operands of a binary operator are promoted to, if one of them
/// widens to the other.
pub fn common_type(left: &ClrType, right: &ClrType) -> Option<ClrType> {
    if is_implicit_conversion(right, left) {
        Some(if *left == ClrType::Null {
            right.clone()
        } else {
            left.clone()
        })
    } else if is_implicit_conversion(left, right) {
        Some(right.clone())
    } else {
        None
    }
}
