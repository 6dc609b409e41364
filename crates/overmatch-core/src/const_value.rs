//! Compile-time constant values.
//!
//! These appear in two places: as declared parameter defaults, and as
//! non-type template arguments. Floats wrap [`OrderedFloat`] so constants
//! stay `Eq`/`Hash` and can sit in deleted-specialization vectors.

use crate::type_hash::TypeHash;
use ordered_float::OrderedFloat;
use std::fmt;

/// A compile-time constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstValue {
    /// Signed integral constant.
    Int(i64),
    /// Unsigned integral constant.
    Uint(u64),
    /// Boolean constant (an integral type).
    Bool(bool),
    /// Floating-point constant.
    Float(OrderedFloat<f64>),
    /// An enumerator of a registered enumeration.
    Enumerator {
        /// The enumeration type.
        enum_type: TypeHash,
        /// The enumerator's value.
        value: i64,
    },
    /// The null pointer constant.
    NullPtr,
    /// Address of an object with static storage duration.
    ObjectAddr {
        /// The object's type.
        object_type: TypeHash,
        /// The object's name, for display.
        name: String,
    },
    /// Address of a function.
    FnAddr {
        /// The function's name, for display.
        name: String,
    },
    /// A structural literal-class value.
    Aggregate {
        /// The class type.
        class_type: TypeHash,
        /// Field values in declaration order.
        fields: Vec<ConstValue>,
    },
}

impl ConstValue {
    /// Floating constant without spelling the wrapper at call sites.
    #[inline]
    pub fn float(value: f64) -> Self {
        ConstValue::Float(OrderedFloat(value))
    }

    /// Which non-type-parameter kind this constant belongs to.
    pub fn kind(&self) -> ConstKind {
        match self {
            ConstValue::Int(_) | ConstValue::Uint(_) | ConstValue::Bool(_) => ConstKind::Integral,
            ConstValue::Float(_) => ConstKind::FloatingPoint,
            ConstValue::Enumerator { .. } => ConstKind::Enumeration,
            ConstValue::NullPtr => ConstKind::NullPointer,
            ConstValue::ObjectAddr { .. } => ConstKind::ObjectAddress,
            ConstValue::FnAddr { .. } => ConstKind::FunctionAddress,
            ConstValue::Aggregate { .. } => ConstKind::LiteralClass,
        }
    }

    /// The constant as a signed integer, when it is integral.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) => Some(*v),
            ConstValue::Uint(v) => i64::try_from(*v).ok(),
            ConstValue::Bool(v) => Some(i64::from(*v)),
            ConstValue::Enumerator { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The constant widened to a float; integral constants widen, anything
    /// else is `None`. Guards over floating parameters use this.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstValue::Float(v) => Some(v.0),
            ConstValue::Int(v) => Some(*v as f64),
            ConstValue::Uint(v) => Some(*v as f64),
            ConstValue::Bool(v) => Some(f64::from(u8::from(*v))),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Uint(v) => write!(f, "{v}"),
            ConstValue::Bool(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{}", v.0),
            ConstValue::Enumerator { value, .. } => write!(f, "enumerator({value})"),
            ConstValue::NullPtr => f.write_str("nullptr"),
            ConstValue::ObjectAddr { name, .. } => write!(f, "&{name}"),
            ConstValue::FnAddr { name } => write!(f, "&{name}"),
            ConstValue::Aggregate { fields, .. } => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// The kinds a non-type template parameter can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstKind {
    /// Integral (including `bool` and the character types).
    Integral,
    /// Enumerator of some enumeration type.
    Enumeration,
    /// `nullptr`.
    NullPointer,
    /// Pointer or reference to an object with linkage.
    ObjectAddress,
    /// Pointer or reference to a function.
    FunctionAddress,
    /// Floating point. Extended kind.
    FloatingPoint,
    /// Structural literal-class value. Extended kind.
    LiteralClass,
}

impl ConstKind {
    /// Kinds admitted only under the extended rules.
    #[inline]
    pub fn is_extended(self) -> bool {
        matches!(self, ConstKind::FloatingPoint | ConstKind::LiteralClass)
    }
}

impl fmt::Display for ConstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConstKind::Integral => "integral",
            ConstKind::Enumeration => "enumeration",
            ConstKind::NullPointer => "null pointer",
            ConstKind::ObjectAddress => "object address",
            ConstKind::FunctionAddress => "function address",
            ConstKind::FloatingPoint => "floating point",
            ConstKind::LiteralClass => "literal class",
        };
        f.write_str(text)
    }
}

/// Which constant kinds non-type template parameters may declare and bind.
///
/// The registry carries one of these; every resolution against that
/// registry answers kind questions the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingPolicy {
    /// Floating-point and literal-class parameters are admitted.
    pub extended_kinds: bool,
    /// An integral constant may bind a declared floating-point parameter.
    pub integral_to_floating: bool,
}

impl BindingPolicy {
    /// Classic rule set: integral, enumeration, null pointer, and address
    /// kinds only.
    pub const fn classic() -> Self {
        Self {
            extended_kinds: false,
            integral_to_floating: false,
        }
    }

    /// Extended rule set: floating-point and literal-class parameters are
    /// admitted as well. Cross-kind binding stays off.
    pub const fn extended() -> Self {
        Self {
            extended_kinds: true,
            integral_to_floating: false,
        }
    }

    /// Whether a parameter or argument of `kind` is admitted at all.
    #[inline]
    pub fn admits(&self, kind: ConstKind) -> bool {
        !kind.is_extended() || self.extended_kinds
    }

    /// Whether a constant of kind `supplied` may bind a parameter declared
    /// with kind `declared`.
    pub fn permits(&self, declared: ConstKind, supplied: ConstKind) -> bool {
        if !self.admits(declared) || !self.admits(supplied) {
            return false;
        }
        declared == supplied
            || (declared == ConstKind::FloatingPoint
                && supplied == ConstKind::Integral
                && self.integral_to_floating)
    }
}

impl Default for BindingPolicy {
    // The original corpus pins a C++20 baseline.
    fn default() -> Self {
        Self::extended()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_of_constants() {
        assert_eq!(ConstValue::Int(5).kind(), ConstKind::Integral);
        assert_eq!(ConstValue::Bool(true).kind(), ConstKind::Integral);
        assert_eq!(ConstValue::float(5.0).kind(), ConstKind::FloatingPoint);
        assert_eq!(ConstValue::NullPtr.kind(), ConstKind::NullPointer);
    }

    #[test]
    fn float_constants_are_comparable() {
        assert_eq!(ConstValue::float(2.5), ConstValue::float(2.5));
        assert_ne!(ConstValue::float(2.5), ConstValue::float(-2.5));
    }

    #[test]
    fn integral_widening_accessors() {
        assert_eq!(ConstValue::Int(-5).as_int(), Some(-5));
        assert_eq!(ConstValue::Int(-5).as_float(), Some(-5.0));
        assert_eq!(ConstValue::float(2.5).as_int(), None);
        assert_eq!(ConstValue::Uint(u64::MAX).as_int(), None);
    }

    #[test]
    fn classic_policy_rejects_extended_kinds() {
        let policy = BindingPolicy::classic();
        assert!(policy.permits(ConstKind::Integral, ConstKind::Integral));
        assert!(!policy.permits(ConstKind::FloatingPoint, ConstKind::FloatingPoint));
        assert!(!policy.admits(ConstKind::LiteralClass));
    }

    #[test]
    fn extended_policy_still_separates_kinds() {
        let policy = BindingPolicy::extended();
        assert!(policy.permits(ConstKind::FloatingPoint, ConstKind::FloatingPoint));
        assert!(!policy.permits(ConstKind::FloatingPoint, ConstKind::Integral));
        assert!(!policy.permits(ConstKind::Integral, ConstKind::FloatingPoint));
    }

    #[test]
    fn cross_kind_binding_is_opt_in() {
        let policy = BindingPolicy {
            integral_to_floating: true,
            ..BindingPolicy::extended()
        };
        assert!(policy.permits(ConstKind::FloatingPoint, ConstKind::Integral));
        // Never the other direction.
        assert!(!policy.permits(ConstKind::Integral, ConstKind::FloatingPoint));
    }

    #[test]
    fn display_forms() {
        assert_eq!(format!("{}", ConstValue::Int(5)), "5");
        assert_eq!(format!("{}", ConstValue::float(-5.0)), "-5");
        assert_eq!(format!("{}", ConstValue::NullPtr), "nullptr");
    }
}
