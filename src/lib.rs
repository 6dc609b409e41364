//! Overload and template resolution as a standalone decision procedure.
//!
//! Candidates are registered up front, as C++-style declaration strings or
//! through the core builders; [`resolver::resolve`] then answers, for one
//! call site at a time, which candidate C++ overload resolution would pick
//! and why a call is ill-formed when it would not compile.
//!
//! - [`conversion`]: implicit conversion sequences and their ranks
//! - [`parser`]: declaration strings into registry entries
//! - [`resolver`]: viability, deduction, ranking, selection
//! - [`scenario`]: named demonstration tables over the resolver

pub mod conversion;
pub mod parser;
pub mod resolver;
pub mod scenario;

pub mod prelude {
    pub use crate::conversion::*;
    pub use crate::parser::*;
    pub use crate::resolver::*;
    pub use crate::scenario::*;
    pub use overmatch_core::*;
    pub use overmatch_registry::*;
}
