//! Candidate signatures: parameters, templates, guards.
//!
//! A [`Candidate`] is one declared signature in an overload set. Candidates
//! are built once (usually by the declaration parser), validated as they
//! are built, and never mutated after registration; resolution only reads
//! them.

use crate::const_value::ConstValue;
use crate::data_type::{DataType, Qualifiers};
use crate::error::RegistrationError;
use crate::span::Span;
use crate::type_hash::TypeHash;

/// A formal parameter: type, optional name, optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name, when the declaration spelled one.
    pub name: Option<String>,
    /// Declared type.
    pub data_type: DataType,
    /// Default value. Only trailing parameters may carry one; the
    /// candidate builder enforces that.
    pub default: Option<ConstValue>,
}

impl Param {
    pub fn new(data_type: DataType) -> Self {
        Self {
            name: None,
            data_type,
            default: None,
        }
    }

    pub fn named(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: Some(name.into()),
            data_type,
            default: None,
        }
    }

    pub fn with_default(mut self, value: ConstValue) -> Self {
        self.default = Some(value);
        self
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// A candidate's return specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnSpec {
    /// A declared type (possibly mentioning template parameters).
    /// `void` is just the void type here.
    Type(DataType),
    /// `auto`: the instantiated return type is the common arithmetic type
    /// of the instantiated parameter types.
    Auto,
}

impl ReturnSpec {
    #[inline]
    pub fn is_auto(&self) -> bool {
        matches!(self, ReturnSpec::Auto)
    }
}

impl Default for ReturnSpec {
    fn default() -> Self {
        ReturnSpec::Type(DataType::default())
    }
}

/// The declared type of a non-type template parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueParamType {
    /// `auto`: adopts the kind of whatever constant is supplied.
    Deduced,
    /// A concrete declared type, e.g. `int N` or `Color C`.
    Concrete(DataType),
}

/// What a template parameter is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateParamKind {
    /// `typename T` / `class T`.
    Type,
    /// A non-type parameter binding a compile-time constant.
    Value(ValueParamType),
}

/// One declared template parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParam {
    /// Parameter name as declared (`T`, `N`, ...).
    pub name: String,
    /// Scoped identity; this hash is what the parameter's occurrences in
    /// the signature carry as their [`DataType::base`].
    pub hash: TypeHash,
    pub kind: TemplateParamKind,
}

impl TemplateParam {
    /// A type parameter, scoped to its owning declaration.
    pub fn type_param(owner: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_template_param(owner, &name),
            name,
            kind: TemplateParamKind::Type,
        }
    }

    /// A non-type parameter, scoped to its owning declaration.
    pub fn value_param(owner: &str, name: impl Into<String>, ty: ValueParamType) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_template_param(owner, &name),
            name,
            kind: TemplateParamKind::Value(ty),
        }
    }

    #[inline]
    pub fn is_type(&self) -> bool {
        matches!(self.kind, TemplateParamKind::Type)
    }
}

/// A template argument: a type for type parameters, a constant for
/// non-type parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    Type(DataType),
    Value(ConstValue),
}

/// Template arguments bound for one candidate at one call site, whether
/// supplied explicitly or deduced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateBindings {
    entries: Vec<(String, TypeHash, TemplateArg)>,
}

impl TemplateBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_type(&mut self, name: &str, hash: TypeHash, ty: DataType) {
        self.entries
            .push((name.to_owned(), hash, TemplateArg::Type(ty)));
    }

    pub fn bind_value(&mut self, name: &str, hash: TypeHash, value: ConstValue) {
        self.entries
            .push((name.to_owned(), hash, TemplateArg::Value(value)));
    }

    /// The argument bound for a template parameter hash, if any.
    pub fn arg_for(&self, hash: TypeHash) -> Option<&TemplateArg> {
        self.entries
            .iter()
            .find(|(_, h, _)| *h == hash)
            .map(|(_, _, arg)| arg)
    }

    /// The type bound for a type parameter hash, if any.
    pub fn type_for(&self, hash: TypeHash) -> Option<DataType> {
        match self.arg_for(hash) {
            Some(TemplateArg::Type(ty)) => Some(*ty),
            _ => None,
        }
    }

    /// The type bound for a parameter name. Guards use the name forms.
    pub fn type_of(&self, name: &str) -> Option<DataType> {
        self.entries.iter().find(|(n, _, _)| n == name).and_then(
            |(_, _, arg)| match arg {
                TemplateArg::Type(ty) => Some(*ty),
                TemplateArg::Value(_) => None,
            },
        )
    }

    /// The constant bound for a parameter name.
    pub fn value_of(&self, name: &str) -> Option<&ConstValue> {
        self.entries
            .iter()
            .find(|(n, _, _)| n == name)
            .and_then(|(_, _, arg)| match arg {
                TemplateArg::Value(value) => Some(value),
                TemplateArg::Type(_) => None,
            })
    }

    #[inline]
    pub fn is_bound(&self, hash: TypeHash) -> bool {
        self.entries.iter().any(|(_, h, _)| *h == hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An instantiation guard over bound template arguments.
///
/// Runs after the candidate is selected and its arguments are bound; a
/// returned message fails the call the way a `static_assert` inside the
/// template would.
pub type GuardFn = fn(&TemplateBindings) -> Result<(), String>;

/// Template descriptor attached to a template candidate.
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    /// Declared parameters, in order.
    pub params: Vec<TemplateParam>,
    /// Argument vectors whose explicit specializations are deleted.
    pub deleted_specializations: Vec<Vec<TemplateArg>>,
    /// Optional instantiation guard.
    pub guard: Option<GuardFn>,
}

impl TemplateInfo {
    pub fn new(params: Vec<TemplateParam>) -> Self {
        Self {
            params,
            deleted_specializations: Vec::new(),
            guard: None,
        }
    }
}

/// A declared candidate signature.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Signature identity: name + parameter types (+ owner and receiver
    /// qualifiers for members). Return types never participate.
    pub sig_hash: TypeHash,
    /// Bare function name (`add`, `get_number`).
    pub name: String,
    /// Owning class for member candidates.
    pub owner: Option<TypeHash>,
    /// Receiver-qualification tag for member candidates.
    pub receiver_quals: Option<Qualifiers>,
    pub ret: ReturnSpec,
    pub params: Vec<Param>,
    /// Accepts excess trailing arguments through an ellipsis tail.
    pub is_variadic: bool,
    /// Selecting this candidate is an error.
    pub is_deleted: bool,
    /// Present iff this is a function template.
    pub template: Option<TemplateInfo>,
    /// Where the candidate was declared.
    pub span: Span,
}

impl Candidate {
    pub fn builder(name: impl Into<String>) -> CandidateBuilder {
        CandidateBuilder::new(name)
    }

    #[inline]
    pub fn is_template(&self) -> bool {
        self.template.is_some()
    }

    #[inline]
    pub fn is_member(&self) -> bool {
        self.owner.is_some()
    }

    /// How many parameters a call must supply. Defaults are trailing, so
    /// this is the index of the first defaulted parameter.
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .position(Param::has_default)
            .unwrap_or(self.params.len())
    }

    /// Whether `supplied` arguments can bind this candidate's arity:
    /// missing trailing arguments need defaults, excess ones need the
    /// ellipsis tail.
    pub fn accepts_arity(&self, supplied: usize) -> bool {
        supplied >= self.required_params() && (supplied <= self.params.len() || self.is_variadic)
    }

    /// The name of the template parameter behind `hash`, if this
    /// candidate declares one.
    pub fn template_param_name(&self, hash: TypeHash) -> Option<&str> {
        self.template
            .as_ref()?
            .params
            .iter()
            .find(|p| p.hash == hash)
            .map(|p| p.name.as_str())
    }
}

/// Builds and validates a [`Candidate`].
#[derive(Debug)]
pub struct CandidateBuilder {
    name: String,
    owner: Option<TypeHash>,
    receiver_quals: Option<Qualifiers>,
    ret: ReturnSpec,
    params: Vec<Param>,
    is_variadic: bool,
    is_deleted: bool,
    template_params: Vec<TemplateParam>,
    guard: Option<GuardFn>,
    span: Span,
}

impl CandidateBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            receiver_quals: None,
            ret: ReturnSpec::default(),
            params: Vec::new(),
            is_variadic: false,
            is_deleted: false,
            template_params: Vec::new(),
            guard: None,
            span: Span::default(),
        }
    }

    pub fn returns(mut self, data_type: DataType) -> Self {
        self.ret = ReturnSpec::Type(data_type);
        self
    }

    pub fn returns_auto(mut self) -> Self {
        self.ret = ReturnSpec::Auto;
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Add an ellipsis tail after the declared parameters.
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Make this a member candidate of `owner` with the given
    /// receiver-qualification tag.
    pub fn member_of(mut self, owner: TypeHash, receiver: Qualifiers) -> Self {
        self.owner = Some(owner);
        self.receiver_quals = Some(receiver);
        self
    }

    pub fn template_param(mut self, param: TemplateParam) -> Self {
        self.template_params.push(param);
        self
    }

    pub fn guard(mut self, guard: GuardFn) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Validate and produce the candidate.
    ///
    /// Enforces the trailing-defaults rule here, at construction time, so
    /// no registered candidate can ever violate it.
    pub fn build(self) -> Result<Candidate, RegistrationError> {
        let mut defaults_started = false;
        for (index, param) in self.params.iter().enumerate() {
            if param.has_default() {
                defaults_started = true;
            } else if defaults_started {
                let shown = param
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", index + 1));
                return Err(RegistrationError::NonTrailingDefault {
                    function: self.name,
                    param: shown,
                });
            }
        }

        if self.guard.is_some() && self.template_params.is_empty() {
            return Err(RegistrationError::NotATemplate(self.name));
        }

        // Top-level cv-qualifiers of by-value parameters do not distinguish
        // signatures, exactly as under C++ mangling.
        let param_hashes: Vec<TypeHash> =
            self.params.iter().map(|p| p.data_type.base).collect();
        let sig_hash = match self.owner {
            Some(owner) => TypeHash::from_method(
                owner,
                &self.name,
                &param_hashes,
                u64::from(self.receiver_quals.unwrap_or_default().bits()),
            ),
            None => TypeHash::from_function(&self.name, &param_hashes),
        };

        let template = if self.template_params.is_empty() {
            None
        } else {
            let mut info = TemplateInfo::new(self.template_params);
            info.guard = self.guard;
            Some(info)
        };

        Ok(Candidate {
            sig_hash,
            name: self.name,
            owner: self.owner,
            receiver_quals: self.receiver_quals,
            ret: self.ret,
            params: self.params,
            is_variadic: self.is_variadic,
            is_deleted: self.is_deleted,
            template,
            span: self.span,
        })
    }
}
