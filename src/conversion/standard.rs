//! Standard conversion classification.
//!
//! This module ranks the conversions the language itself defines, between
//! fundamental types and enumerations. The split that matters for overload
//! ranking is promotion versus conversion:
//!
//! - Integral promotion: `bool`, the character types, and the `short`
//!   types go to `int`. Floating promotion: `float` goes to `double`.
//!   An unscoped enumeration promotes to its promotion target.
//! - Every other arithmetic interconversion (widening past the promotion
//!   target, narrowing, sign changes, floating-integral, boolean) is a
//!   plain conversion.
//!
//! Scoped enumerations never convert implicitly, and nothing converts into
//! an enumeration.

use overmatch_core::{ConversionRank, DataType, PrimitiveKind, TypeEntry};
use overmatch_registry::SignatureRegistry;

use super::{Conversion, ConversionKind};

/// Find the standard conversion between two distinct base types.
///
/// The caller has already handled identity and cv adjustment; `source`
/// and `target` have different bases here.
pub fn find_standard_conversion(
    source: &DataType,
    target: &DataType,
    registry: &SignatureRegistry,
) -> Option<Conversion> {
    let from = source.base;
    let to = target.base;

    let source_entry = registry.get_type(from)?;
    let target_kind = registry.primitive_kind(to)?;

    match source_entry {
        TypeEntry::Primitive(source_kind) => {
            let rank = classify_arithmetic(*source_kind, target_kind)?;
            let kind = match rank {
                ConversionRank::Promotion => ConversionKind::Promotion { from, to },
                _ => ConversionKind::Arithmetic { from, to },
            };
            Some(Conversion { kind, rank })
        }
        TypeEntry::Enum(entry) => {
            if entry.scoped || !target_kind.is_arithmetic() {
                return None;
            }
            if target_kind == enum_promotion_target(entry.underlying) {
                Some(Conversion {
                    kind: ConversionKind::Promotion { from, to },
                    rank: ConversionRank::Promotion,
                })
            } else {
                Some(Conversion {
                    kind: ConversionKind::Arithmetic { from, to },
                    rank: ConversionRank::Conversion,
                })
            }
        }
        TypeEntry::Class(_) => None,
    }
}

/// Rank an arithmetic conversion between two distinct fundamental kinds.
fn classify_arithmetic(from: PrimitiveKind, to: PrimitiveKind) -> Option<ConversionRank> {
    if from.promotes_to_int() && to == PrimitiveKind::Int {
        return Some(ConversionRank::Promotion);
    }
    if from == PrimitiveKind::Float && to == PrimitiveKind::Double {
        return Some(ConversionRank::Promotion);
    }
    if from.is_arithmetic() && to.is_arithmetic() {
        return Some(ConversionRank::Conversion);
    }
    None
}

/// Where an unscoped enumeration goes under integral promotion: `int`
/// when the underlying type fits in one, the underlying type otherwise.
fn enum_promotion_target(underlying: PrimitiveKind) -> PrimitiveKind {
    if underlying.promotes_to_int() || underlying == PrimitiveKind::Int {
        PrimitiveKind::Int
    } else {
        underlying
    }
}

/// The common arithmetic type of two operands, after promotion. This is
/// what an `auto` return over two deduced parameter types resolves to.
pub fn common_type(a: PrimitiveKind, b: PrimitiveKind) -> Option<PrimitiveKind> {
    let a = promote(a)?;
    let b = promote(b)?;
    if a.arithmetic_order()? >= b.arithmetic_order()? {
        Some(a)
    } else {
        Some(b)
    }
}

fn promote(kind: PrimitiveKind) -> Option<PrimitiveKind> {
    if !kind.is_arithmetic() {
        return None;
    }
    if kind.promotes_to_int() {
        Some(PrimitiveKind::Int)
    } else {
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overmatch_core::{EnumEntry, primitives};

    fn simple(hash: overmatch_core::TypeHash) -> DataType {
        DataType::simple(hash)
    }

    #[test]
    fn char_to_int_is_promotion() {
        let registry = SignatureRegistry::with_primitives();
        let conv = find_standard_conversion(
            &simple(primitives::CHAR),
            &simple(primitives::INT),
            &registry,
        )
        .unwrap();
        assert_eq!(conv.rank, ConversionRank::Promotion);
    }

    #[test]
    fn float_to_double_is_promotion() {
        let registry = SignatureRegistry::with_primitives();
        let conv = find_standard_conversion(
            &simple(primitives::FLOAT),
            &simple(primitives::DOUBLE),
            &registry,
        )
        .unwrap();
        assert_eq!(conv.rank, ConversionRank::Promotion);
    }

    #[test]
    fn char_to_float_is_conversion() {
        let registry = SignatureRegistry::with_primitives();
        let conv = find_standard_conversion(
            &simple(primitives::CHAR),
            &simple(primitives::FLOAT),
            &registry,
        )
        .unwrap();
        assert_eq!(conv.rank, ConversionRank::Conversion);
    }

    #[test]
    fn long_reaches_int_and_float_equally() {
        // Neither direction is a promotion, which is the source of the
        // classic long-argument ambiguity.
        let registry = SignatureRegistry::with_primitives();
        let to_int = find_standard_conversion(
            &simple(primitives::LONG),
            &simple(primitives::INT),
            &registry,
        )
        .unwrap();
        let to_float = find_standard_conversion(
            &simple(primitives::LONG),
            &simple(primitives::FLOAT),
            &registry,
        )
        .unwrap();
        assert_eq!(to_int.rank, ConversionRank::Conversion);
        assert_eq!(to_float.rank, ConversionRank::Conversion);
    }

    #[test]
    fn double_to_int_is_conversion() {
        let registry = SignatureRegistry::with_primitives();
        let conv = find_standard_conversion(
            &simple(primitives::DOUBLE),
            &simple(primitives::INT),
            &registry,
        )
        .unwrap();
        assert_eq!(conv.rank, ConversionRank::Conversion);
    }

    #[test]
    fn int_to_bool_is_conversion() {
        let registry = SignatureRegistry::with_primitives();
        let conv = find_standard_conversion(
            &simple(primitives::INT),
            &simple(primitives::BOOL),
            &registry,
        )
        .unwrap();
        assert_eq!(conv.rank, ConversionRank::Conversion);
    }

    #[test]
    fn void_and_nullptr_never_convert() {
        let registry = SignatureRegistry::with_primitives();
        assert!(
            find_standard_conversion(
                &simple(primitives::VOID),
                &simple(primitives::INT),
                &registry,
            )
            .is_none()
        );
        assert!(
            find_standard_conversion(
                &simple(primitives::NULLPTR),
                &simple(primitives::INT),
                &registry,
            )
            .is_none()
        );
    }

    #[test]
    fn unscoped_enum_promotes_to_int() {
        let mut registry = SignatureRegistry::with_primitives();
        let color = registry.register_enum(EnumEntry::new("Color")).unwrap();

        let conv =
            find_standard_conversion(&simple(color), &simple(primitives::INT), &registry).unwrap();
        assert_eq!(conv.rank, ConversionRank::Promotion);

        let conv = find_standard_conversion(&simple(color), &simple(primitives::DOUBLE), &registry)
            .unwrap();
        assert_eq!(conv.rank, ConversionRank::Conversion);
    }

    #[test]
    fn scoped_enum_is_sealed() {
        let mut registry = SignatureRegistry::with_primitives();
        let mode = registry.register_enum(EnumEntry::scoped("Mode")).unwrap();
        assert!(
            find_standard_conversion(&simple(mode), &simple(primitives::INT), &registry).is_none()
        );
    }

    #[test]
    fn nothing_converts_into_an_enum() {
        let mut registry = SignatureRegistry::with_primitives();
        let color = registry.register_enum(EnumEntry::new("Color")).unwrap();
        assert!(
            find_standard_conversion(&simple(primitives::INT), &simple(color), &registry).is_none()
        );
    }

    #[test]
    fn common_type_follows_the_ladder() {
        assert_eq!(
            common_type(PrimitiveKind::Int, PrimitiveKind::Double),
            Some(PrimitiveKind::Double)
        );
        assert_eq!(
            common_type(PrimitiveKind::Char, PrimitiveKind::Short),
            Some(PrimitiveKind::Int)
        );
        assert_eq!(
            common_type(PrimitiveKind::Int, PrimitiveKind::UnsignedInt),
            Some(PrimitiveKind::UnsignedInt)
        );
        assert_eq!(common_type(PrimitiveKind::Int, PrimitiveKind::Void), None);
    }
}
