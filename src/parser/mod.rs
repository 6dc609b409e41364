//! Declaration parsing.
//!
//! Candidates enter the registry as C++-style declaration strings:
//!
//! ```text
//! int add(int num1, int num2)
//! int add(int count, ...)
//! int mult(int num1, int num2 = 2)
//! void foo(char) = delete
//! int OverloadClass::get_number() const
//! template <typename T> T max(T x, T y)
//! template <typename T> void bar(T x) = delete
//! template <> std::string add(std::string a, std::string b) = delete
//! template <int N> void print()
//! ```
//!
//! [`parse_declaration`] turns one such string into a [`Declaration`];
//! [`declare`] goes on to register it. Every type a declaration names,
//! other than the template parameters it declares itself, must already be
//! registered.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};

use overmatch_core::{
    Candidate, ConstValue, DataType, DeclError, Param, ParseError, ParseErrorKind, PrimitiveKind,
    Qualifiers, ReturnSpec, Span, TemplateArg, TemplateParam, TemplateParamKind, TypeHash,
    ValueParamType, primitives,
};
use overmatch_registry::SignatureRegistry;

/// A parsed declaration.
#[derive(Debug, Clone)]
pub enum Declaration {
    /// A function or function-template declaration.
    Function(Candidate),
    /// `template <> ... = delete`: a deleted explicit specialization of a
    /// previously declared function template.
    DeletedSpecialization {
        /// The template's name.
        name: String,
        /// The specialization's template arguments, spelled or deduced.
        args: Vec<TemplateArg>,
        /// Where the specialization was declared.
        span: Span,
    },
}

/// Parse one declaration string against a registry.
pub fn parse_declaration(
    registry: &SignatureRegistry,
    declaration: &str,
) -> Result<Declaration, DeclError> {
    let tokens = Lexer::new(declaration).tokenize()?;
    Parser::new(tokens, registry).parse()
}

/// Parse a declaration and register it.
pub fn declare(registry: &mut SignatureRegistry, declaration: &str) -> Result<(), DeclError> {
    match parse_declaration(registry, declaration)? {
        Declaration::Function(candidate) => {
            registry.register(candidate)?;
        }
        Declaration::DeletedSpecialization { name, args, .. } => {
            registry.delete_specialization(&name, args)?;
        }
    }
    Ok(())
}

/// Parse a lone type spelling, e.g. `const OverloadClass` or
/// `unsigned long long`.
pub fn parse_type(registry: &SignatureRegistry, text: &str) -> Result<DataType, ParseError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser::new(tokens, registry);
    let data_type = parser.parse_type()?;
    parser.expect_eof()?;
    Ok(data_type)
}

/// Parse a lone template argument, e.g. `int`, `5`, `-5.0`, or `nullptr`.
pub fn parse_template_arg(
    registry: &SignatureRegistry,
    text: &str,
) -> Result<TemplateArg, ParseError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser::new(tokens, registry);
    let arg = parser.parse_template_arg()?;
    parser.expect_eof()?;
    Ok(arg)
}

/// A template parameter read from the prefix, before the function name
/// (which scopes its hash) is known.
struct PendingParam {
    name: String,
    kind: PendingKind,
}

enum PendingKind {
    /// `typename T` / `class T`
    Type,
    /// `auto N`
    Deduced,
    /// `int N`, `double D`, ...
    Concrete(DataType),
}

impl PendingParam {
    fn resolve(self, owner: &str) -> TemplateParam {
        match self.kind {
            PendingKind::Type => TemplateParam::type_param(owner, self.name),
            PendingKind::Deduced => {
                TemplateParam::value_param(owner, self.name, ValueParamType::Deduced)
            }
            PendingKind::Concrete(ty) => {
                TemplateParam::value_param(owner, self.name, ValueParamType::Concrete(ty))
            }
        }
    }
}

enum TemplatePrefix {
    /// No `template` keyword.
    None,
    /// `template <...>` with at least one parameter.
    Primary(Vec<PendingParam>),
    /// `template <>`.
    Specialization,
}

/// Recursive-descent parser over one declaration's token vector.
struct Parser<'src, 'reg> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    registry: &'reg SignatureRegistry,
    /// Template parameters in scope for the signature being parsed.
    scope: Vec<TemplateParam>,
}

impl<'src, 'reg> Parser<'src, 'reg> {
    fn new(tokens: Vec<Token<'src>>, registry: &'reg SignatureRegistry) -> Self {
        Self {
            tokens,
            pos: 0,
            registry,
            scope: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Declaration, DeclError> {
        match self.parse_template_prefix()? {
            TemplatePrefix::Specialization => self.parse_specialization(),
            TemplatePrefix::Primary(pending) => {
                // Template parameter identity is scoped to the declaring
                // function, whose name only appears after the return type.
                let owner = self.peek_function_name()?;
                self.scope = pending.into_iter().map(|p| p.resolve(&owner)).collect();
                self.parse_function()
            }
            TemplatePrefix::None => self.parse_function(),
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn parse_template_prefix(&mut self) -> Result<TemplatePrefix, ParseError> {
        if !self.eat(TokenKind::Template) {
            return Ok(TemplatePrefix::None);
        }
        self.expect(TokenKind::Less)?;

        if self.eat(TokenKind::Greater) {
            return Ok(TemplatePrefix::Specialization);
        }

        let mut pending = Vec::new();
        loop {
            pending.push(self.parse_template_param()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Greater)?;
        Ok(TemplatePrefix::Primary(pending))
    }

    fn parse_template_param(&mut self) -> Result<PendingParam, ParseError> {
        let kind = match self.current().kind {
            TokenKind::Typename | TokenKind::Class => {
                self.advance();
                PendingKind::Type
            }
            TokenKind::Auto => {
                self.advance();
                PendingKind::Deduced
            }
            k if k.starts_type() => PendingKind::Concrete(self.parse_type()?),
            _ => {
                return Err(ParseError::expected_token(
                    self.current().span,
                    "a template parameter",
                    self.current().kind.description(),
                ));
            }
        };
        let name = self.expect_identifier()?;
        Ok(PendingParam { name, kind })
    }

    fn parse_function(mut self) -> Result<Declaration, DeclError> {
        let ret = self.parse_return()?;
        let (owner, name) = self.parse_qualified_name()?;

        if self.check(TokenKind::Less) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                self.current().span,
                "explicit template arguments are only valid on specializations",
            )
            .into());
        }

        let (params, is_variadic) = self.parse_params()?;
        let receiver = self.parse_cv();
        let is_deleted = self.parse_delete()?;
        self.expect_eof()?;

        let mut builder = Candidate::builder(&name);
        builder = match ret {
            ReturnSpec::Type(ty) => builder.returns(ty),
            ReturnSpec::Auto => builder.returns_auto(),
        };
        for param in params {
            builder = builder.param(param);
        }
        if is_variadic {
            builder = builder.variadic();
        }
        if is_deleted {
            builder = builder.deleted();
        }
        match owner {
            Some(owner_name) => {
                let owner_hash = self.registry.lookup_type(&owner_name).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::ExpectedType,
                        self.tokens[0].span,
                        format!("unknown type '{owner_name}'"),
                    )
                })?;
                builder = builder.member_of(owner_hash, receiver);
            }
            None if !receiver.is_empty() => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidDeclaration,
                    self.previous().span,
                    "receiver qualifiers are only valid on member declarations",
                )
                .into());
            }
            None => {}
        }
        for param in std::mem::take(&mut self.scope) {
            builder = builder.template_param(param);
        }
        builder = builder.span(self.declaration_span());

        Ok(Declaration::Function(builder.build()?))
    }

    /// `template <>` body: a concrete signature ending in `= delete`,
    /// optionally carrying an explicit argument list after the name.
    fn parse_specialization(mut self) -> Result<Declaration, DeclError> {
        // The instantiated return type is fixed by the primary template;
        // the spelled one is validated and otherwise ignored.
        let _ret = self.parse_return()?;
        let (owner, name) = self.parse_qualified_name()?;
        if owner.is_some() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                self.tokens[0].span,
                "member specializations are not supported",
            )
            .into());
        }

        let explicit = if self.check(TokenKind::Less) {
            self.parse_template_args()?
        } else {
            Vec::new()
        };

        let (params, _) = self.parse_params()?;
        if !self.parse_delete()? {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                self.current().span,
                "expected '= delete' on an explicit specialization",
            )
            .into());
        }
        self.expect_eof()?;

        let span = self.declaration_span();
        let args = if explicit.is_empty() {
            self.deduce_specialization_args(&name, &params, span)?
        } else {
            explicit
        };

        Ok(Declaration::DeletedSpecialization { name, args, span })
    }

    /// Recover the specialization's template arguments by matching its
    /// parameter types against the primary template's.
    fn deduce_specialization_args(
        &self,
        name: &str,
        params: &[Param],
        span: Span,
    ) -> Result<Vec<TemplateArg>, ParseError> {
        let Some((primary, template)) = self
            .registry
            .overloads(name)
            .into_iter()
            .flatten()
            .find_map(|c| c.template.as_ref().map(|t| (c, t)))
        else {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                span,
                format!("no primary template '{name}' to specialize"),
            ));
        };

        if primary.params.len() != params.len() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                span,
                format!(
                    "specialization of '{name}' supplies {} parameter(s), the primary template declares {}",
                    params.len(),
                    primary.params.len()
                ),
            ));
        }

        let mut args = Vec::new();
        for tp in &template.params {
            match tp.kind {
                TemplateParamKind::Type => {
                    let mut deduced: Option<DataType> = None;
                    for (declared, spelled) in primary.params.iter().zip(params) {
                        if declared.data_type.base != tp.hash {
                            continue;
                        }
                        let ty = spelled.data_type.decayed();
                        match deduced {
                            None => deduced = Some(ty),
                            Some(previous) if previous != ty => {
                                return Err(ParseError::new(
                                    ParseErrorKind::InvalidDeclaration,
                                    span,
                                    format!(
                                        "specialization of '{name}' deduces conflicting types for parameter '{}'",
                                        tp.name
                                    ),
                                ));
                            }
                            Some(_) => {}
                        }
                    }
                    let ty = deduced.ok_or_else(|| {
                        ParseError::new(
                            ParseErrorKind::InvalidDeclaration,
                            span,
                            format!("cannot deduce template parameter '{}' from the specialization", tp.name),
                        )
                    })?;
                    args.push(TemplateArg::Type(ty));
                }
                TemplateParamKind::Value(_) => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidDeclaration,
                        span,
                        format!(
                            "non-type parameter '{}' must be spelled in the specialization's argument list",
                            tp.name
                        ),
                    ));
                }
            }
        }
        Ok(args)
    }

    /// The bare function name, found by scanning ahead to the parameter
    /// list without consuming anything.
    fn peek_function_name(&self) -> Result<String, ParseError> {
        for (i, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match token.kind {
                TokenKind::LeftParen | TokenKind::Less => {
                    if i > self.pos && self.tokens[i - 1].kind == TokenKind::Identifier {
                        return Ok(self.tokens[i - 1].lexeme.to_owned());
                    }
                    break;
                }
                TokenKind::Eof => break,
                _ => {}
            }
        }
        Err(ParseError::new(
            ParseErrorKind::InvalidDeclaration,
            self.current().span,
            "cannot find the function name",
        ))
    }

    // ==========================================================================
    // Signature pieces
    // ==========================================================================

    fn parse_return(&mut self) -> Result<ReturnSpec, ParseError> {
        if self.eat(TokenKind::Auto) {
            Ok(ReturnSpec::Auto)
        } else {
            Ok(ReturnSpec::Type(self.parse_type()?))
        }
    }

    fn parse_qualified_name(&mut self) -> Result<(Option<String>, String), ParseError> {
        let mut segments = vec![self.expect_identifier()?];
        while self.eat(TokenKind::ColonColon) {
            segments.push(self.expect_identifier()?);
        }
        let name = segments.pop().unwrap_or_default();
        let owner = if segments.is_empty() {
            None
        } else {
            Some(segments.join("::"))
        };
        Ok((owner, name))
    }

    fn parse_params(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        self.expect(TokenKind::LeftParen)?;

        let mut params = Vec::new();
        let mut void_span = None;
        let mut is_variadic = false;
        if !self.check(TokenKind::RightParen) {
            loop {
                if self.eat(TokenKind::Ellipsis) {
                    // The ellipsis tail closes the list.
                    is_variadic = true;
                    break;
                }
                let span = self.current().span;
                let param = self.parse_param()?;
                if param.data_type.base == primitives::VOID && void_span.is_none() {
                    void_span = Some(span);
                }
                params.push(param);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        // C++ also spells an empty parameter list as `(void)`; every other
        // use of a void parameter is ill-formed.
        if let [only] = params.as_slice()
            && !is_variadic
            && only.name.is_none()
            && only.default.is_none()
            && only.data_type == DataType::simple(primitives::VOID)
        {
            params.clear();
        } else if let Some(span) = void_span {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                span,
                "'void' is only valid as a lone unnamed parameter",
            ));
        }

        Ok((params, is_variadic))
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let data_type = self.parse_type()?;
        let mut param = if self.check(TokenKind::Identifier) {
            let name = self.current().lexeme.to_owned();
            self.advance();
            Param::named(name, data_type)
        } else {
            Param::new(data_type)
        };
        if self.eat(TokenKind::Equal) {
            param = param.with_default(self.parse_const_value()?);
        }
        Ok(param)
    }

    fn parse_template_args(&mut self) -> Result<Vec<TemplateArg>, ParseError> {
        self.expect(TokenKind::Less)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::Greater) {
            loop {
                args.push(self.parse_template_arg()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Greater)?;
        Ok(args)
    }

    fn parse_template_arg(&mut self) -> Result<TemplateArg, ParseError> {
        if self.current().kind.starts_type() {
            Ok(TemplateArg::Type(self.parse_type()?))
        } else {
            Ok(TemplateArg::Value(self.parse_const_value()?))
        }
    }

    /// `= delete`, or nothing.
    fn parse_delete(&mut self) -> Result<bool, ParseError> {
        if self.eat(TokenKind::Equal) {
            self.expect(TokenKind::Delete)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    fn parse_type(&mut self) -> Result<DataType, ParseError> {
        let mut quals = self.parse_cv();

        let base = if self.current().kind.is_type_word() {
            self.parse_fundamental()?
        } else if self.check(TokenKind::Identifier) {
            self.parse_type_name()?
        } else {
            return Err(ParseError::expected_type(
                self.current().span,
                self.current().kind.description(),
            ));
        };

        // C++ also places cv-qualifiers after the type (`int const`).
        quals |= self.parse_cv();

        Ok(DataType::new(base, quals))
    }

    fn parse_cv(&mut self) -> Qualifiers {
        let mut quals = Qualifiers::empty();
        loop {
            if self.eat(TokenKind::Const) {
                quals |= Qualifiers::CONST;
            } else if self.eat(TokenKind::Volatile) {
                quals |= Qualifiers::VOLATILE;
            } else {
                return quals;
            }
        }
    }

    /// Assemble a fundamental type from its word tokens, validating the
    /// spelling (`unsigned long long` is one type, `signed float` is not).
    fn parse_fundamental(&mut self) -> Result<TypeHash, ParseError> {
        let start = self.current().span;
        let mut signed: Option<bool> = None;
        let mut short = false;
        let mut longs = 0u8;
        let mut base: Option<TokenKind> = None;

        while self.current().kind.is_type_word() {
            let token = *self.current();
            let clash = match token.kind {
                TokenKind::Signed | TokenKind::Unsigned => {
                    let seen = signed.is_some();
                    signed = Some(token.kind == TokenKind::Signed);
                    seen
                }
                TokenKind::Short => {
                    let seen = short || longs > 0;
                    short = true;
                    seen
                }
                TokenKind::Long => {
                    let seen = short || longs >= 2;
                    longs += 1;
                    seen
                }
                _ => {
                    let seen = base.is_some();
                    base = Some(token.kind);
                    seen
                }
            };
            if clash {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidDeclaration,
                    token.span,
                    format!("cannot combine '{}' with the preceding type words", token.lexeme),
                ));
            }
            self.advance();
        }

        let unsigned = signed == Some(false);
        let plain = signed.is_none() && !short && longs == 0;
        let kind = match base {
            Some(TokenKind::Void) if plain => PrimitiveKind::Void,
            Some(TokenKind::Bool) if plain => PrimitiveKind::Bool,
            Some(TokenKind::Float) if plain => PrimitiveKind::Float,
            Some(TokenKind::Double) if plain => PrimitiveKind::Double,
            Some(TokenKind::Double) if signed.is_none() && !short && longs == 1 => {
                PrimitiveKind::LongDouble
            }
            Some(TokenKind::Char) if !short && longs == 0 => match signed {
                None => PrimitiveKind::Char,
                Some(true) => PrimitiveKind::SignedChar,
                Some(false) => PrimitiveKind::UnsignedChar,
            },
            Some(TokenKind::Int) | None if short => {
                if unsigned {
                    PrimitiveKind::UnsignedShort
                } else {
                    PrimitiveKind::Short
                }
            }
            Some(TokenKind::Int) | None if longs == 1 => {
                if unsigned {
                    PrimitiveKind::UnsignedLong
                } else {
                    PrimitiveKind::Long
                }
            }
            Some(TokenKind::Int) | None if longs == 2 => {
                if unsigned {
                    PrimitiveKind::UnsignedLongLong
                } else {
                    PrimitiveKind::LongLong
                }
            }
            Some(TokenKind::Int) => {
                if unsigned {
                    PrimitiveKind::UnsignedInt
                } else {
                    PrimitiveKind::Int
                }
            }
            None if signed.is_some() => {
                if unsigned {
                    PrimitiveKind::UnsignedInt
                } else {
                    PrimitiveKind::Int
                }
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidDeclaration,
                    start.merge(self.previous().span),
                    "invalid fundamental type spelling",
                ));
            }
        };
        Ok(kind.type_hash())
    }

    /// A named type: a template parameter in scope, or a registered type.
    fn parse_type_name(&mut self) -> Result<TypeHash, ParseError> {
        let start = self.current().span;
        let first = self.expect_identifier()?;

        if !self.check(TokenKind::ColonColon)
            && let Some(param) = self.scope.iter().find(|p| p.name == first)
        {
            return Ok(param.hash);
        }

        let mut full = first;
        while self.eat(TokenKind::ColonColon) {
            full.push_str("::");
            full.push_str(&self.expect_identifier()?);
        }

        self.registry.lookup_type(&full).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::ExpectedType,
                start.merge(self.previous().span),
                format!("unknown type '{full}'"),
            )
        })
    }

    fn parse_const_value(&mut self) -> Result<ConstValue, ParseError> {
        let negative = self.eat(TokenKind::Minus);
        let token = *self.current();
        let value = match token.kind {
            TokenKind::IntLiteral => {
                let v: i64 = token.lexeme.parse().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("integer '{}' is out of range", token.lexeme),
                    )
                })?;
                ConstValue::Int(if negative { -v } else { v })
            }
            TokenKind::FloatLiteral | TokenKind::DoubleLiteral => {
                let text = token.lexeme.trim_end_matches(['f', 'F']);
                let v: f64 = text.parse().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("cannot read '{}' as a floating constant", token.lexeme),
                    )
                })?;
                ConstValue::float(if negative { -v } else { v })
            }
            TokenKind::True | TokenKind::False if !negative => {
                ConstValue::Bool(token.kind == TokenKind::True)
            }
            TokenKind::Nullptr if !negative => ConstValue::NullPtr,
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidLiteral,
                    token.span,
                    format!("expected a constant, found {}", token.kind),
                ));
            }
        };
        self.advance();
        Ok(value)
    }

    // ==========================================================================
    // Token access
    // ==========================================================================

    fn current(&self) -> &Token<'src> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> &Token<'src> {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            return Ok(());
        }
        let found = self.current();
        if found.kind == TokenKind::Eof {
            Err(ParseError::unexpected_eof(found.span, kind.description()))
        } else {
            Err(ParseError::expected_token(
                found.span,
                kind.description(),
                found.kind.description(),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.check(TokenKind::Identifier) {
            let name = self.current().lexeme.to_owned();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::new(
                ParseErrorKind::ExpectedIdentifier,
                self.current().span,
                format!("expected an identifier, found {}", self.current().kind),
            ))
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.check(TokenKind::Eof) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.current().span,
                self.current().kind.description(),
            ))
        }
    }

    /// The whole declaration's span, from the first token through the last
    /// one consumed.
    fn declaration_span(&self) -> Span {
        self.tokens[0].span.merge(self.previous().span)
    }
}
