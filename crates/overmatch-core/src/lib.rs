//! Core vocabulary for the overmatch resolver.
//!
//! Everything the registration surface and the resolver share lives here:
//!
//! - [`span`]: source locations inside declaration strings
//! - [`type_hash`]: deterministic hash-based type and signature identity
//! - [`data_type`]: cv-qualified types as signatures see them
//! - [`rank`]: the conversion ranking ladder
//! - [`const_value`]: compile-time constants and the non-type binding policy
//! - [`entries`]: registered type entries (fundamental, class, enum)
//! - [`candidate`]: candidate signatures, template descriptors, guards
//! - [`error`]: the parse/registration/resolution error taxonomy

pub mod candidate;
pub mod const_value;
pub mod data_type;
pub mod entries;
pub mod error;
pub mod rank;
pub mod span;
pub mod type_hash;

pub use candidate::{
    Candidate, CandidateBuilder, GuardFn, Param, ReturnSpec, TemplateArg, TemplateBindings,
    TemplateInfo, TemplateParam, TemplateParamKind, ValueParamType,
};
pub use const_value::{BindingPolicy, ConstKind, ConstValue};
pub use data_type::{DataType, Qualifiers};
pub use entries::{ClassEntry, EnumEntry, PrimitiveKind, TypeEntry};
pub use error::{DeclError, ParseError, ParseErrorKind, RegistrationError, ResolutionError};
pub use rank::ConversionRank;
pub use span::Span;
pub use type_hash::{TypeHash, hash_constants, primitives};
