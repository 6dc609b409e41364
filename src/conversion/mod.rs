//! Implicit conversion sequences.
//!
//! This module answers the question overload ranking keeps asking: can an
//! argument of one type bind a parameter of another, and at what rank?
//!
//! ## Conversion priority
//!
//! Conversions are checked in this order:
//! 1. Identity (exact match)
//! 2. Qualification adjustment (cv differences on a by-value binding)
//! 3. Standard conversions (promotions, then arithmetic conversions)
//! 4. User-defined (conversion operator, converting constructor)
//!
//! Ellipsis binding never reaches this module; the resolver assigns it
//! [`ConversionRank::EllipsisMatch`] directly.

use overmatch_core::{ConversionRank, DataType, TypeHash};
use overmatch_registry::SignatureRegistry;

pub mod standard;
mod user_defined;

pub use standard::common_type;
pub use user_defined::find_user_conversion;

/// An implicit conversion sequence with its rank for overload ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The kind of conversion being performed.
    pub kind: ConversionKind,
    /// The rank this binding contributes to its candidate.
    pub rank: ConversionRank,
}

/// The kind of conversion being performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionKind {
    /// No conversion needed.
    Identity,

    /// Same base type, cv-qualifiers adjusted by the by-value binding.
    Qualification,

    /// Integral, floating, or enumeration promotion.
    Promotion {
        /// Source type hash.
        from: TypeHash,
        /// Target type hash.
        to: TypeHash,
    },

    /// Any other arithmetic interconversion.
    Arithmetic {
        /// Source type hash.
        from: TypeHash,
        /// Target type hash.
        to: TypeHash,
    },

    /// Conversion operator declared on the source class.
    ConversionOperator {
        /// The class declaring the operator.
        class: TypeHash,
        /// The operator's result type.
        target: TypeHash,
    },

    /// Converting constructor declared on the target class.
    ConvertingConstructor {
        /// The class being constructed.
        class: TypeHash,
        /// The constructor's parameter type.
        source: TypeHash,
    },
}

impl Conversion {
    pub(crate) fn identity() -> Self {
        Self {
            kind: ConversionKind::Identity,
            rank: ConversionRank::ExactMatch,
        }
    }

    pub(crate) fn qualification() -> Self {
        Self {
            kind: ConversionKind::Qualification,
            rank: ConversionRank::ExactMatch,
        }
    }

    /// Check if this is an exact match (no conversion).
    pub fn is_exact(&self) -> bool {
        self.rank == ConversionRank::ExactMatch
    }
}

/// Check if an argument of type `source` can bind a parameter of type
/// `target`, and how.
///
/// Returns `None` when no implicit conversion sequence exists; the
/// candidate is then not viable for this argument.
pub fn find_conversion(
    source: &DataType,
    target: &DataType,
    registry: &SignatureRegistry,
) -> Option<Conversion> {
    // 1. Identity.
    if source == target {
        return Some(Conversion::identity());
    }

    // 2. Same base, different cv. By-value parameters take a copy, so
    // top-level qualifiers never block the binding.
    if source.base == target.base {
        return Some(Conversion::qualification());
    }

    // 3. Standard conversions.
    if let Some(conv) = standard::find_standard_conversion(source, target, registry) {
        return Some(conv);
    }

    // 4. User-defined conversions.
    if let Some(conv) = user_defined::find_user_conversion(source, target, registry) {
        return Some(conv);
    }

    None
}
