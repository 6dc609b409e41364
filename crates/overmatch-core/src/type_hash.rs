//! Deterministic hash-based type and signature identity.
//!
//! This module provides [`TypeHash`], a 64-bit hash identifying types,
//! free functions, and member functions. Hashes are computed from names and
//! signatures rather than handed out sequentially, so:
//!
//! - the same declaration always has the same identity, in any
//!   registration order;
//! - a signature's identity can be computed before (or without) registering
//!   it;
//! - overloads of one name get distinct identities because parameter types
//!   participate in the hash, while return types never do.
//!
//! That last point is the whole story of why overloading on the return type
//! alone is unrepresentable here, the same way it is under C++ name
//! mangling.
//!
//! # Hash computation
//!
//! XXH64 with domain-mixing constants, so a type named `max` can never
//! collide with a function named `max` or with a template parameter of the
//! same spelling.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-mixing constants for hash computation.
///
/// Each entity domain gets its own constant so equal names in different
/// domains produce distinct hashes.
pub mod hash_constants {
    /// Fold constant applied between parameter positions.
    pub const SEP: u64 = 0x9d5c7e0a3f61b24d;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x61c8864680b583eb;

    /// Domain marker for free-function signature hashes.
    pub const FUNCTION: u64 = 0x3c79ac492ba7b653;

    /// Domain marker for member-function signature hashes.
    pub const METHOD: u64 = 0x1f83d9abfb41bd6b;

    /// Domain marker for template parameter hashes.
    pub const TPARAM: u64 = 0x452821e638d01377;

    /// Parameter position mixing constants.
    /// Each position gets its own constant so parameter order matters.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xff51afd7ed558ccd,
        0xc4ceb9fe1a85ec53,
        0xc2b2ae3d27d4eb4f,
        0x165667b19e3779f9,
        0x27d4eb2f165667c5,
        0x85ebca77c2b2ae63,
        0x2545f4914f6cdd1d,
        0xd6e8feb86659fd93,
        0xa0761d6478bd642f,
        0xe7037ed1a0b428db,
        0x8ebc6af09c88c6e3,
        0x589965cc75374cc3,
        0x1d8e4e27c47d124f,
    ];
}

/// A deterministic 64-bit hash identifying a type, signature, or template
/// parameter.
///
/// The same input always produces the same hash; different domains (types,
/// functions, methods, template parameters) never share hashes even for
/// equal spellings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a (possibly qualified) type name.
    ///
    /// `const fn`, so well-known types can be named as constants; see
    /// [`primitives`].
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxhash_rust::const_xxh64::xxh64(name.as_bytes(), 0))
    }

    /// Create a template-parameter hash, scoped to its owning declaration.
    ///
    /// The `T` of `max` and the `T` of `add` are distinct identities, and
    /// neither can collide with a registered type called `T`.
    #[inline]
    pub fn from_template_param(owner: &str, name: &str) -> Self {
        let scoped = hash_constants::TPARAM ^ xxh64(owner.as_bytes(), 0);
        TypeHash(scoped.wrapping_mul(hash_constants::SEP) ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a signature hash for a free function from its name and
    /// parameter type hashes.
    ///
    /// Parameter types and their order participate; the return type does
    /// not. `add(int, int)` and `add(float, float)` hash differently,
    /// `int add(int, int)` and `float add(int, int)` hash the same.
    #[inline]
    pub fn from_function(name: &str, param_hashes: &[TypeHash]) -> Self {
        let seed = hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0);
        TypeHash(fold_params(seed, param_hashes))
    }

    /// Create a signature hash for a member function.
    ///
    /// The owner type and the receiver qualifier bits participate, so a
    /// const and a non-const member of the same name and parameters are
    /// distinct signatures (as they are under C++ mangling).
    #[inline]
    pub fn from_method(
        owner: TypeHash,
        name: &str,
        param_hashes: &[TypeHash],
        qualifier_bits: u64,
    ) -> Self {
        let seed = hash_constants::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0) ^ qualifier_bits;
        TypeHash(fold_params(seed, param_hashes))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Fold parameter hashes into a seed so that position matters.
#[inline]
fn fold_params(seed: u64, param_hashes: &[TypeHash]) -> u64 {
    let mut hash = seed;
    for (i, param) in param_hashes.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps the fold non-commutative, unlike plain XOR
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ param.0);
    }
    hash
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Constant hashes for the C++ fundamental types.
///
/// Computed at compile time through the `const` [`TypeHash::from_name`], so
/// they can never drift from what the runtime path would produce.
pub mod primitives {
    use super::TypeHash;

    /// `void`
    pub const VOID: TypeHash = TypeHash::from_name("void");
    /// `bool`
    pub const BOOL: TypeHash = TypeHash::from_name("bool");
    /// `char` (its own type, distinct from both `signed char` and
    /// `unsigned char`)
    pub const CHAR: TypeHash = TypeHash::from_name("char");
    /// `signed char`
    pub const SCHAR: TypeHash = TypeHash::from_name("signed char");
    /// `unsigned char`
    pub const UCHAR: TypeHash = TypeHash::from_name("unsigned char");
    /// `short`
    pub const SHORT: TypeHash = TypeHash::from_name("short");
    /// `unsigned short`
    pub const USHORT: TypeHash = TypeHash::from_name("unsigned short");
    /// `int`
    pub const INT: TypeHash = TypeHash::from_name("int");
    /// `unsigned int`
    pub const UINT: TypeHash = TypeHash::from_name("unsigned int");
    /// `long`
    pub const LONG: TypeHash = TypeHash::from_name("long");
    /// `unsigned long`
    pub const ULONG: TypeHash = TypeHash::from_name("unsigned long");
    /// `long long`
    pub const LONGLONG: TypeHash = TypeHash::from_name("long long");
    /// `unsigned long long`
    pub const ULONGLONG: TypeHash = TypeHash::from_name("unsigned long long");
    /// `float`
    pub const FLOAT: TypeHash = TypeHash::from_name("float");
    /// `double`
    pub const DOUBLE: TypeHash = TypeHash::from_name("double");
    /// `long double`
    pub const LONGDOUBLE: TypeHash = TypeHash::from_name("long double");
    /// `std::nullptr_t`
    pub const NULLPTR: TypeHash = TypeHash::from_name("std::nullptr_t");
}
