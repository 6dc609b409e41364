//! Declaration registry for overload resolution.
//!
//! This crate holds [`SignatureRegistry`], the static world of types and
//! candidates a resolution run works against. Candidates enter through
//! [`SignatureRegistry::register`] and friends; everything rejectable
//! without a call site (duplicate signatures, return-type-only overloads,
//! members on non-class owners) is rejected at registration time.

pub mod registry;

pub use registry::SignatureRegistry;
