//! Error types for declaration parsing, registration, and resolution.
//!
//! Everything here is static and terminal: a failure names what was wrong
//! with a declaration or a call site, and nothing is deferred to any
//! runtime. Resolution errors carry the call-site [`Span`] and expose it
//! through [`ResolutionError::span`].

use crate::span::Span;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of declaration parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of the declaration.
    UnexpectedEof,
    /// A type name was expected.
    ExpectedType,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A literal could not be read.
    InvalidLiteral,
    /// The declaration as a whole is malformed.
    InvalidDeclaration,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of declaration",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::InvalidDeclaration => "invalid declaration",
        };
        f.write_str(text)
    }
}

/// A declaration parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// Where in the declaration string the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unexpected_token(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("did not expect {found} here"),
        )
    }

    pub fn unexpected_eof(span: Span, expected: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            format!("expected {expected}"),
        )
    }

    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedType,
            span,
            format!("expected a type, found {found}"),
        )
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while building candidates or populating the registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A declaration referenced a type the registry does not know.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// A type with this name already exists.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A candidate with the same signature identity already exists.
    #[error("duplicate signature: '{signature}' already registered")]
    DuplicateSignature {
        /// Rendered signature of the prior registration.
        signature: String,
    },

    /// Two candidates differ only in return type; parameter types are what
    /// distinguish overloads.
    #[error("overloads of '{name}' differ only in return type: '{name}({params})'")]
    ReturnTypeOverload {
        /// The function name.
        name: String,
        /// The shared parameter list, rendered.
        params: String,
    },

    /// A defaulted parameter was followed by one without a default.
    #[error("function '{function}': parameter '{param}' must have a default (defaults are trailing)")]
    NonTrailingDefault {
        /// The function name.
        function: String,
        /// The offending parameter.
        param: String,
    },

    /// A template-only construct was applied to a non-template.
    #[error("'{0}' is not a template")]
    NotATemplate(String),

    /// A specialization named a template the registry does not know.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// A specialization's argument count does not match the template's
    /// parameter count.
    #[error("template '{template}' takes {expected} argument(s), specialization supplies {found}")]
    SpecializationArityMismatch {
        /// The template name.
        template: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },

    /// A member candidate named an owner that is not a registered class.
    #[error("'{owner}' is not a class, cannot declare member '{name}'")]
    NotAClass {
        /// The would-be owner.
        owner: String,
        /// The member name.
        name: String,
    },
}

/// Error from the combined parse-then-register path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

// ============================================================================
// Resolution Errors
// ============================================================================

/// Why a call site failed to resolve.
///
/// Each variant carries the call-site span; every failure is terminal for
/// that call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    /// No candidate survived the viability filter.
    #[error("at {span}: no viable overload for '{name}({args})'")]
    NoViableOverload {
        /// The called name.
        name: String,
        /// The argument types, rendered.
        args: String,
        /// Where the call occurred.
        span: Span,
    },

    /// Two or more candidates tied at the best conversion rank.
    #[error("at {span}: ambiguous call to '{name}': candidates are {candidates}")]
    AmbiguousCall {
        /// The called name.
        name: String,
        /// The tied candidates, rendered.
        candidates: String,
        /// Where the call occurred.
        span: Span,
    },

    /// Resolution selected a candidate that is deleted, either explicitly
    /// or because its deduced specialization was deleted.
    #[error("at {span}: call to deleted function '{signature}'")]
    SelectedCandidateDeleted {
        /// The called name.
        name: String,
        /// The selected (deleted) signature, rendered.
        signature: String,
        /// Where the call occurred.
        span: Span,
    },

    /// Template argument deduction failed for every remaining candidate.
    #[error("at {span}: template argument deduction failed for '{name}': {detail}")]
    TemplateDeductionFailure {
        /// The called name.
        name: String,
        /// What disagreed or failed to bind.
        detail: String,
        /// Where the call occurred.
        span: Span,
    },

    /// The selected template's instantiation guard rejected the bound
    /// arguments.
    #[error("at {span}: invalid instantiation of '{template}': {message}")]
    TemplateGuardFailed {
        /// The template name.
        template: String,
        /// The guard's message.
        message: String,
        /// Where the call occurred.
        span: Span,
    },
}

impl ResolutionError {
    /// The call-site span this error points at.
    pub fn span(&self) -> Span {
        match self {
            ResolutionError::NoViableOverload { span, .. } => *span,
            ResolutionError::AmbiguousCall { span, .. } => *span,
            ResolutionError::SelectedCandidateDeleted { span, .. } => *span,
            ResolutionError::TemplateDeductionFailure { span, .. } => *span,
            ResolutionError::TemplateGuardFailed { span, .. } => *span,
        }
    }
}
