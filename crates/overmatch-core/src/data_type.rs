//! Qualified data types as they appear in signatures and at call sites.

use crate::type_hash::{TypeHash, primitives};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// A cv-qualifier set.
    ///
    /// Carried both by parameter/argument types and, for member candidates,
    /// as the receiver-qualification tag after the parameter list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Qualifiers: u8 {
        /// `const`
        const CONST = 1;
        /// `volatile`
        const VOLATILE = 1 << 1;
    }
}

impl Qualifiers {
    /// Whether a candidate tagged with these qualifiers can serve a
    /// receiver qualified with `receiver`. Binding may add qualifiers,
    /// never shed them: a const receiver binds only const candidates,
    /// while an unqualified receiver binds anything.
    #[inline]
    pub fn accepts(self, receiver: Qualifiers) -> bool {
        self.contains(receiver)
    }

    /// How many qualifiers this set adds on top of `receiver`. Used to
    /// prefer the closest-qualified candidate when several are compatible.
    #[inline]
    pub fn added_over(self, receiver: Qualifiers) -> u32 {
        self.difference(receiver).bits().count_ones()
    }
}

impl fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (text, flag) in [("const", Qualifiers::CONST), ("volatile", Qualifiers::VOLATILE)] {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(text)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A type as a signature sees it: base identity plus top-level
/// cv-qualifiers.
///
/// `Copy` on purpose; resolution passes these around freely.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// Identity of the underlying type.
    pub base: TypeHash,
    /// Top-level cv-qualifiers.
    pub quals: Qualifiers,
}

impl DataType {
    /// A type with explicit qualifiers.
    #[inline]
    pub const fn new(base: TypeHash, quals: Qualifiers) -> Self {
        Self { base, quals }
    }

    /// An unqualified type.
    #[inline]
    pub const fn simple(base: TypeHash) -> Self {
        Self {
            base,
            quals: Qualifiers::empty(),
        }
    }

    /// A const-qualified type.
    #[inline]
    pub fn with_const(base: TypeHash) -> Self {
        Self::new(base, Qualifiers::CONST)
    }

    /// This type with `const` added.
    #[inline]
    pub fn as_const(self) -> Self {
        Self::new(self.base, self.quals | Qualifiers::CONST)
    }

    /// This type with all top-level qualifiers stripped, as by-value
    /// binding and template deduction see it.
    #[inline]
    pub fn decayed(self) -> Self {
        Self::simple(self.base)
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.quals.contains(Qualifiers::CONST)
    }

    #[inline]
    pub fn is_volatile(&self) -> bool {
        self.quals.contains(Qualifiers::VOLATILE)
    }
}

impl Default for DataType {
    fn default() -> Self {
        Self::simple(primitives::VOID)
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({self})")
    }
}

// Name lookups live in the registry; on its own a DataType can only show
// its hash.
impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quals.is_empty() {
            write!(f, "{}", self.base)
        } else {
            write!(f, "{} {}", self.quals, self.base)
        }
    }
}
