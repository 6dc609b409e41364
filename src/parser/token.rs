//! Token definitions for the declaration lexer.

use overmatch_core::Span;
use std::fmt;

/// A token from a declaration string.
///
/// The `'src` lifetime is the declaration string being parsed; lexemes
/// borrow from it directly, since declarations are parsed in one shot and
/// everything the parser keeps is copied into owned registry types.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'src> {
    /// The type of token.
    pub kind: TokenKind,
    /// The source text of this token.
    pub lexeme: &'src str,
    /// Location in the declaration string.
    pub span: Span,
}

impl<'src> Token<'src> {
    /// Create a new token.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'src str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types the declaration grammar uses.
///
/// Fundamental type names are individual word tokens here; the parser
/// assembles multi-word spellings like `unsigned long long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// Integer literal: `42`, `1234`
    IntLiteral,
    /// Float literal (`f` suffix): `1.0f`, `2.5F`
    FloatLiteral,
    /// Double literal: `3.14`, `1e10`
    DoubleLiteral,

    // =========================================
    // Identifiers
    // =========================================
    /// User-defined identifier
    Identifier,

    // =========================================
    // Keywords - Type words
    // =========================================
    /// `void`
    Void,
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `signed`
    Signed,
    /// `unsigned`
    Unsigned,
    /// `float`
    Float,
    /// `double`
    Double,

    // =========================================
    // Keywords - Declarations
    // =========================================
    /// `auto`
    Auto,
    /// `const`
    Const,
    /// `volatile`
    Volatile,
    /// `template`
    Template,
    /// `typename`
    Typename,
    /// `class`
    Class,
    /// `delete`
    Delete,

    // =========================================
    // Keywords - Constants
    // =========================================
    /// `true`
    True,
    /// `false`
    False,
    /// `nullptr`
    Nullptr,

    // =========================================
    // Punctuation
    // =========================================
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `,`
    Comma,
    /// `=`
    Equal,
    /// `-`
    Minus,
    /// `...`
    Ellipsis,
    /// `::`
    ColonColon,

    // =========================================
    // Special
    // =========================================
    /// End of declaration
    Eof,
}

impl TokenKind {
    /// Whether this token can start or continue a fundamental type
    /// spelling (`unsigned`, `long`, `char`, ...).
    pub fn is_type_word(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Void | Bool | Char | Short | Int | Long | Signed | Unsigned | Float | Double
        )
    }

    /// Whether this token can start a parameter or return type.
    pub fn starts_type(self) -> bool {
        use TokenKind::*;
        self.is_type_word() || matches!(self, Const | Volatile | Identifier)
    }

    /// Whether this token is a numeric literal.
    pub fn is_number(self) -> bool {
        use TokenKind::*;
        matches!(self, IntLiteral | FloatLiteral | DoubleLiteral)
    }

    /// The string representation of this token kind for error messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            FloatLiteral => "float literal",
            DoubleLiteral => "double literal",
            Identifier => "identifier",
            Void => "'void'",
            Bool => "'bool'",
            Char => "'char'",
            Short => "'short'",
            Int => "'int'",
            Long => "'long'",
            Signed => "'signed'",
            Unsigned => "'unsigned'",
            Float => "'float'",
            Double => "'double'",
            Auto => "'auto'",
            Const => "'const'",
            Volatile => "'volatile'",
            Template => "'template'",
            Typename => "'typename'",
            Class => "'class'",
            Delete => "'delete'",
            True => "'true'",
            False => "'false'",
            Nullptr => "'nullptr'",
            LeftParen => "'('",
            RightParen => "')'",
            Less => "'<'",
            Greater => "'>'",
            Comma => "','",
            Equal => "'='",
            Minus => "'-'",
            Ellipsis => "'...'",
            ColonColon => "'::'",
            Eof => "end of declaration",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Map a keyword string to its [`TokenKind`], or `None` if not a keyword.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        // Type words
        "void" => Void,
        "bool" => Bool,
        "char" => Char,
        "short" => Short,
        "int" => Int,
        "long" => Long,
        "signed" => Signed,
        "unsigned" => Unsigned,
        "float" => Float,
        "double" => Double,

        // Declarations
        "auto" => Auto,
        "const" => Const,
        "volatile" => Volatile,
        "template" => Template,
        "typename" => Typename,
        "class" => Class,
        "delete" => Delete,

        // Constants
        "true" => True,
        "false" => False,
        "nullptr" => Nullptr,

        _ => return None,
    })
}
