//! Overload and template resolution for call sites.
//!
//! This module implements the resolution procedure that selects the best
//! matching candidate from an overload set given a call site's argument
//! types.
//!
//! ## Algorithm
//!
//! 1. Filter candidates by argument count (considering trailing defaults
//!    and the ellipsis tail)
//! 2. Instantiate template candidates: bind explicit template arguments,
//!    deduce the rest, substitute
//! 3. Rank each argument binding; a candidate's overall rank is its worst
//!    per-argument rank
//! 4. Select the best overall rank; a lone non-template wins ties against
//!    template instantiations, any other tie is ambiguous
//! 5. Reject the selection when it is deleted (directly or through a
//!    deleted specialization) or its instantiation guard fails

mod deduction;
mod ranking;

use overmatch_core::{
    Candidate, ConstValue, ConversionRank, DataType, Param, ResolutionError, ReturnSpec, Span,
    TemplateArg, TemplateBindings,
};
use overmatch_registry::SignatureRegistry;

use crate::conversion::{Conversion, find_conversion};

/// A call site awaiting resolution: a name, the static argument types,
/// and any explicit template arguments.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// The called name.
    pub name: String,
    /// Explicit template arguments, in declaration order.
    pub template_args: Vec<TemplateArg>,
    /// Static types of the supplied arguments, in order.
    pub args: Vec<DataType>,
    /// Where the call occurs, for error reporting.
    pub span: Span,
}

impl CallSite {
    pub fn new(name: impl Into<String>, args: Vec<DataType>) -> Self {
        Self {
            name: name.into(),
            template_args: Vec::new(),
            args,
            span: Span::default(),
        }
    }

    /// Fix leading template parameters explicitly, as in `max<int>(3, 2.3)`.
    pub fn with_template_args(mut self, template_args: Vec<TemplateArg>) -> Self {
        self.template_args = template_args;
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// How one supplied or omitted argument binds its formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgBinding {
    /// A supplied argument converting to the parameter type.
    Convert(Conversion),
    /// An omitted trailing argument bound to its declared default.
    Defaulted(ConstValue),
    /// An excess argument riding the ellipsis tail.
    Ellipsis,
}

impl ArgBinding {
    /// The rank this binding contributes to its candidate's overall rank.
    /// Defaulted parameters contribute none.
    pub fn rank(&self) -> Option<ConversionRank> {
        match self {
            ArgBinding::Convert(conv) => Some(conv.rank),
            ArgBinding::Defaulted(_) => None,
            ArgBinding::Ellipsis => Some(ConversionRank::EllipsisMatch),
        }
    }
}

/// Result of successful overload resolution.
#[derive(Debug, Clone)]
pub struct OverloadMatch {
    /// The selected candidate's signature hash.
    pub sig_hash: overmatch_core::TypeHash,
    /// The selected candidate, rendered the way a diagnostic would.
    pub signature: String,
    /// One binding per formal parameter, plus one per excess ellipsis
    /// argument.
    pub bindings: Vec<ArgBinding>,
    /// The candidate's overall (worst per-argument) rank.
    pub overall: ConversionRank,
    /// Bound template arguments, for template candidates.
    pub template_bindings: Option<TemplateBindings>,
    /// The instantiated return type.
    pub return_type: DataType,
}

/// A candidate that survived viability, before selection.
pub(crate) struct ViableMatch<'a> {
    pub candidate: &'a Candidate,
    pub bindings: Vec<ArgBinding>,
    pub overall: ConversionRank,
    pub template_bindings: Option<TemplateBindings>,
    pub deleted_specialization: bool,
    pub return_type: DataType,
}

/// Why a candidate dropped out of the viable set.
enum Rejection {
    /// Arity or conversion failure; ordinary non-viability.
    NotViable,
    /// Template deduction failed, with the detail.
    Deduction(String),
}

/// Resolve a free-function call against the registry.
///
/// # Returns
///
/// * `Ok(OverloadMatch)` - The selected candidate with binding info
/// * `Err(ResolutionError)` - Why the call is ill-formed
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve(
    call: &CallSite,
    registry: &SignatureRegistry,
) -> Result<OverloadMatch, ResolutionError> {
    let Some(set) = registry.overloads(&call.name) else {
        return Err(no_viable(call, registry));
    };
    resolve_candidates(set.iter(), call, registry)
}

/// Resolve a member call through a receiver.
///
/// The receiver's cv-qualifiers select which member candidates may bind
/// at all: a candidate is compatible when its declared receiver
/// qualifiers cover the receiver's. Among compatible candidates, the
/// ones adding the fewest qualifiers over the receiver are preferred, so
/// an unqualified receiver picks the unqualified overload when both
/// exist.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_method(
    receiver: &DataType,
    call: &CallSite,
    registry: &SignatureRegistry,
) -> Result<OverloadMatch, ResolutionError> {
    let Some(set) = registry.methods(receiver.base, &call.name) else {
        return Err(no_viable(call, registry));
    };

    let receiver_quals = |c: &Candidate| c.receiver_quals.unwrap_or_default();
    let compatible: Vec<&Candidate> = set
        .iter()
        .filter(|c| receiver_quals(c).accepts(receiver.quals))
        .collect();
    if compatible.is_empty() {
        return Err(no_viable(call, registry));
    }

    let min_added = compatible
        .iter()
        .map(|c| receiver_quals(c).added_over(receiver.quals))
        .min()
        .unwrap_or(0);
    let preferred = compatible
        .into_iter()
        .filter(|c| receiver_quals(c).added_over(receiver.quals) == min_added);

    resolve_candidates(preferred, call, registry)
}

/// Resolution core shared by the free-function and member paths.
fn resolve_candidates<'a>(
    candidates: impl Iterator<Item = &'a Candidate>,
    call: &CallSite,
    registry: &SignatureRegistry,
) -> Result<OverloadMatch, ResolutionError> {
    let mut viable = Vec::new();
    let mut deduction_failures = Vec::new();

    for candidate in candidates {
        if !candidate.accepts_arity(call.args.len()) {
            continue;
        }
        match try_bind(candidate, call, registry) {
            Ok(found) => viable.push(found),
            Err(Rejection::Deduction(detail)) => deduction_failures.push(detail),
            Err(Rejection::NotViable) => {}
        }
    }

    if viable.is_empty() {
        // An empty viable set with at least one deduction casualty reports
        // as a deduction failure; otherwise there was simply no overload.
        return Err(match deduction_failures.into_iter().next() {
            Some(detail) => ResolutionError::TemplateDeductionFailure {
                name: call.name.clone(),
                detail,
                span: call.span,
            },
            None => no_viable(call, registry),
        });
    }

    let selected = ranking::select_best(viable, registry, &call.name, call.span)?;

    // Deleted candidates participate in selection and only fail once
    // chosen; they never fall through to a lesser-ranked candidate.
    if selected.candidate.is_deleted || selected.deleted_specialization {
        return Err(ResolutionError::SelectedCandidateDeleted {
            name: call.name.clone(),
            signature: registry.display_candidate(selected.candidate),
            span: call.span,
        });
    }

    if let Some(template) = &selected.candidate.template
        && let Some(guard) = template.guard
        && let Some(bindings) = &selected.template_bindings
        && let Err(message) = guard(bindings)
    {
        return Err(ResolutionError::TemplateGuardFailed {
            template: call.name.clone(),
            message,
            span: call.span,
        });
    }

    Ok(OverloadMatch {
        sig_hash: selected.candidate.sig_hash,
        signature: registry.display_candidate(selected.candidate),
        bindings: selected.bindings,
        overall: selected.overall,
        template_bindings: selected.template_bindings,
        return_type: selected.return_type,
    })
}

/// Try to bind a call's arguments against one candidate.
fn try_bind<'a>(
    candidate: &'a Candidate,
    call: &CallSite,
    registry: &SignatureRegistry,
) -> Result<ViableMatch<'a>, Rejection> {
    if candidate.is_template() {
        let inst =
            deduction::instantiate(candidate, &call.template_args, &call.args, registry)
                .map_err(Rejection::Deduction)?;
        let (bindings, overall) =
            bind_args(&inst.params, candidate.is_variadic, &call.args, registry)
                .ok_or(Rejection::NotViable)?;
        return Ok(ViableMatch {
            candidate,
            bindings,
            overall,
            template_bindings: Some(inst.bindings),
            deleted_specialization: inst.deleted_specialization,
            return_type: inst.ret,
        });
    }

    // Explicit template arguments exclude non-template candidates.
    if !call.template_args.is_empty() {
        return Err(Rejection::NotViable);
    }

    let (bindings, overall) =
        bind_args(&candidate.params, candidate.is_variadic, &call.args, registry)
            .ok_or(Rejection::NotViable)?;
    let return_type = match candidate.ret {
        ReturnSpec::Type(dt) => dt,
        ReturnSpec::Auto => DataType::default(),
    };
    Ok(ViableMatch {
        candidate,
        bindings,
        overall,
        template_bindings: None,
        deleted_specialization: false,
        return_type,
    })
}

/// Bind each argument to its parameter; `None` when any argument has no
/// conversion to its parameter type.
fn bind_args(
    params: &[Param],
    is_variadic: bool,
    args: &[DataType],
    registry: &SignatureRegistry,
) -> Option<(Vec<ArgBinding>, ConversionRank)> {
    let mut bindings = Vec::with_capacity(params.len().max(args.len()));
    let mut overall = ConversionRank::ExactMatch;

    for (arg, param) in args.iter().zip(params.iter()) {
        let conv = find_conversion(arg, &param.data_type, registry)?;
        overall = overall.worst(conv.rank);
        bindings.push(ArgBinding::Convert(conv));
    }

    // Excess arguments ride the ellipsis tail.
    if args.len() > params.len() {
        if !is_variadic {
            return None;
        }
        for _ in params.len()..args.len() {
            overall = overall.worst(ConversionRank::EllipsisMatch);
            bindings.push(ArgBinding::Ellipsis);
        }
    }

    // Missing trailing arguments bind their declared defaults, which
    // contribute no rank.
    for param in params.iter().skip(args.len()) {
        bindings.push(ArgBinding::Defaulted(param.default.clone()?));
    }

    Some((bindings, overall))
}

fn no_viable(call: &CallSite, registry: &SignatureRegistry) -> ResolutionError {
    ResolutionError::NoViableOverload {
        name: call.name.clone(),
        args: registry.display_args(&call.args),
        span: call.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overmatch_core::{Qualifiers, primitives};

    fn int() -> DataType {
        DataType::simple(primitives::INT)
    }

    fn float() -> DataType {
        DataType::simple(primitives::FLOAT)
    }

    fn registry_with(candidates: Vec<Candidate>) -> SignatureRegistry {
        let mut registry = SignatureRegistry::with_primitives();
        for candidate in candidates {
            registry.register(candidate).unwrap();
        }
        registry
    }

    fn add(params: &[DataType]) -> Candidate {
        let mut builder = Candidate::builder("add").returns(int());
        for &p in params {
            builder = builder.param(Param::new(p));
        }
        builder.build().unwrap()
    }

    #[test]
    fn exact_match_wins_over_convertible_overloads() {
        let registry = registry_with(vec![
            add(&[int(), int()]),
            add(&[int(), int(), int()]),
            add(&[float(), float()]),
        ]);

        let result = resolve(&CallSite::new("add", vec![int(), int()]), &registry).unwrap();
        assert_eq!(result.signature, "int add(int, int)");
        assert_eq!(result.overall, ConversionRank::ExactMatch);
        assert_eq!(result.return_type, int());
    }

    #[test]
    fn exact_arity_outranks_the_variadic_tail() {
        let variadic = Candidate::builder("add")
            .returns(int())
            .param(Param::new(int()))
            .variadic()
            .build()
            .unwrap();
        let registry = registry_with(vec![add(&[int(), int(), int()]), variadic]);

        let result = resolve(&CallSite::new("add", vec![int(), int(), int()]), &registry).unwrap();
        assert_eq!(result.signature, "int add(int, int, int)");
    }

    #[test]
    fn variadic_binds_when_nothing_better_exists() {
        let variadic = Candidate::builder("add")
            .returns(int())
            .param(Param::new(int()))
            .variadic()
            .build()
            .unwrap();
        let registry = registry_with(vec![variadic]);

        let result = resolve(
            &CallSite::new("add", vec![int(), int(), int(), int()]),
            &registry,
        )
        .unwrap();
        assert_eq!(result.overall, ConversionRank::EllipsisMatch);
        assert_eq!(result.bindings.len(), 4);
        assert_eq!(result.bindings[3], ArgBinding::Ellipsis);
    }

    #[test]
    fn equal_rank_promotions_are_ambiguous() {
        // char,char against (int,int) and (float,float) is NOT ambiguous:
        // promotion beats conversion.
        let registry = registry_with(vec![add(&[int(), int()]), add(&[float(), float()])]);
        let ch = DataType::simple(primitives::CHAR);
        let result = resolve(&CallSite::new("add", vec![ch, ch]), &registry).unwrap();
        assert_eq!(result.signature, "int add(int, int)");

        // long,long reaches both through conversions of equal rank.
        let lg = DataType::simple(primitives::LONG);
        let err = resolve(&CallSite::new("add", vec![lg, lg]), &registry).unwrap_err();
        assert!(matches!(err, ResolutionError::AmbiguousCall { .. }));
    }

    #[test]
    fn unknown_name_has_no_viable_overload() {
        let registry = SignatureRegistry::with_primitives();
        let err = resolve(&CallSite::new("missing", vec![int()]), &registry).unwrap_err();
        assert!(matches!(err, ResolutionError::NoViableOverload { .. }));
    }

    #[test]
    fn deleted_candidate_fails_after_selection() {
        let deleted = Candidate::builder("foo")
            .param(Param::new(DataType::simple(primitives::CHAR)))
            .deleted()
            .build()
            .unwrap();
        let keep = Candidate::builder("foo")
            .param(Param::new(int()))
            .build()
            .unwrap();
        let registry = registry_with(vec![deleted, keep]);

        // char selects the deleted overload and fails; it never falls
        // through to foo(int).
        let ch = DataType::simple(primitives::CHAR);
        let err = resolve(&CallSite::new("foo", vec![ch]), &registry).unwrap_err();
        match err {
            ResolutionError::SelectedCandidateDeleted { signature, .. } => {
                assert_eq!(signature, "void foo(char) = delete");
            }
            other => panic!("expected deleted-candidate error, got {other:?}"),
        }

        let ok = resolve(&CallSite::new("foo", vec![int()]), &registry).unwrap();
        assert_eq!(ok.signature, "void foo(int)");
    }

    #[test]
    fn defaults_bind_missing_trailing_arguments() {
        let mult = Candidate::builder("mult")
            .returns(int())
            .param(Param::named("num1", int()))
            .param(Param::named("num2", int()).with_default(ConstValue::Int(2)))
            .build()
            .unwrap();
        let registry = registry_with(vec![mult]);

        let result = resolve(&CallSite::new("mult", vec![int()]), &registry).unwrap();
        assert_eq!(result.overall, ConversionRank::ExactMatch);
        assert_eq!(result.bindings.len(), 2);
        assert_eq!(result.bindings[1], ArgBinding::Defaulted(ConstValue::Int(2)));
    }

    #[test]
    fn defaulted_arity_overlap_is_ambiguous() {
        let one = Candidate::builder("print")
            .param(Param::new(int()))
            .build()
            .unwrap();
        let two = Candidate::builder("print")
            .param(Param::new(int()))
            .param(Param::new(int()).with_default(ConstValue::Int(10)))
            .build()
            .unwrap();
        let registry = registry_with(vec![one, two]);

        let err = resolve(&CallSite::new("print", vec![int()]), &registry).unwrap_err();
        assert!(matches!(err, ResolutionError::AmbiguousCall { .. }));
    }

    #[test]
    fn receiver_qualifiers_pick_the_member() {
        let mut registry = SignatureRegistry::with_primitives();
        let owner = registry
            .register_class(overmatch_core::ClassEntry::new("OverloadClass"))
            .unwrap();
        registry
            .register(
                Candidate::builder("get_number")
                    .returns(int())
                    .member_of(owner, Qualifiers::empty())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                Candidate::builder("get_number")
                    .returns(int())
                    .member_of(owner, Qualifiers::CONST)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let call = CallSite::new("get_number", vec![]);

        let plain_receiver = DataType::simple(owner);
        let result = resolve_method(&plain_receiver, &call, &registry).unwrap();
        assert_eq!(result.signature, "int OverloadClass::get_number()");

        let const_receiver = DataType::simple(owner).as_const();
        let result = resolve_method(&const_receiver, &call, &registry).unwrap();
        assert_eq!(result.signature, "int OverloadClass::get_number() const");
    }

    #[test]
    fn const_receiver_cannot_reach_mutable_members() {
        let mut registry = SignatureRegistry::with_primitives();
        let owner = registry
            .register_class(overmatch_core::ClassEntry::new("OverloadClass"))
            .unwrap();
        registry
            .register(
                Candidate::builder("set_number")
                    .param(Param::new(int()))
                    .member_of(owner, Qualifiers::empty())
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let const_receiver = DataType::simple(owner).as_const();
        let err = resolve_method(
            &const_receiver,
            &CallSite::new("set_number", vec![int()]),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, ResolutionError::NoViableOverload { .. }));
    }

    #[test]
    fn shared_type_parameter_must_agree() {
        let t = overmatch_core::TemplateParam::type_param("max", "T");
        let t_ty = DataType::simple(t.hash);
        let max = Candidate::builder("max")
            .returns(t_ty)
            .param(Param::new(t_ty))
            .param(Param::new(t_ty))
            .template_param(t)
            .build()
            .unwrap();
        let registry = registry_with(vec![max]);

        let ok = resolve(&CallSite::new("max", vec![int(), int()]), &registry).unwrap();
        assert_eq!(ok.signature, "T max<T>(T, T)");
        assert_eq!(ok.return_type, int());
        assert_eq!(
            ok.template_bindings.as_ref().and_then(|b| b.type_of("T")),
            Some(int())
        );

        let double = DataType::simple(primitives::DOUBLE);
        let err = resolve(&CallSite::new("max", vec![int(), double]), &registry).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::TemplateDeductionFailure { .. }
        ));
    }

    #[test]
    fn explicit_template_arguments_enable_mixed_calls() {
        let t = overmatch_core::TemplateParam::type_param("max", "T");
        let t_ty = DataType::simple(t.hash);
        let max = Candidate::builder("max")
            .returns(t_ty)
            .param(Param::new(t_ty))
            .param(Param::new(t_ty))
            .template_param(t)
            .build()
            .unwrap();
        let registry = registry_with(vec![max]);

        let double = DataType::simple(primitives::DOUBLE);
        let call = CallSite::new("max", vec![int(), double])
            .with_template_args(vec![TemplateArg::Type(int())]);
        let result = resolve(&call, &registry).unwrap();
        // The double argument converts to the explicitly fixed int.
        assert_eq!(result.overall, ConversionRank::Conversion);
        assert_eq!(result.return_type, int());
    }

    #[test]
    fn guard_runs_after_selection() {
        fn non_negative(bindings: &TemplateBindings) -> Result<(), String> {
            match bindings.value_of("D").and_then(ConstValue::as_float) {
                Some(d) if d < 0.0 => Err("D must be non-negative".into()),
                _ => Ok(()),
            }
        }

        let double = DataType::simple(primitives::DOUBLE);
        let d = overmatch_core::TemplateParam::value_param(
            "getSqrt",
            "D",
            overmatch_core::ValueParamType::Concrete(double),
        );
        let get_sqrt = Candidate::builder("getSqrt")
            .returns(double)
            .template_param(d)
            .guard(non_negative)
            .build()
            .unwrap();
        let registry = registry_with(vec![get_sqrt]);

        let ok = resolve(
            &CallSite::new("getSqrt", vec![])
                .with_template_args(vec![TemplateArg::Value(ConstValue::float(16.0))]),
            &registry,
        );
        assert!(ok.is_ok());

        let err = resolve(
            &CallSite::new("getSqrt", vec![])
                .with_template_args(vec![TemplateArg::Value(ConstValue::float(-16.0))]),
            &registry,
        )
        .unwrap_err();
        match err {
            ResolutionError::TemplateGuardFailed { template, message, .. } => {
                assert_eq!(template, "getSqrt");
                assert_eq!(message, "D must be non-negative");
            }
            other => panic!("expected guard failure, got {other:?}"),
        }
    }

    #[test]
    fn non_template_beats_deleted_template_on_exact_match() {
        let t = overmatch_core::TemplateParam::type_param("bar", "T");
        let t_ty = DataType::simple(t.hash);
        let template = Candidate::builder("bar")
            .param(Param::new(t_ty))
            .template_param(t)
            .deleted()
            .build()
            .unwrap();
        let concrete = Candidate::builder("bar")
            .param(Param::new(int()))
            .build()
            .unwrap();
        let registry = registry_with(vec![template, concrete]);

        // int argument: both tie at ExactMatch, the non-template wins and
        // the deleted template is never touched.
        let ok = resolve(&CallSite::new("bar", vec![int()]), &registry).unwrap();
        assert_eq!(ok.signature, "void bar(int)");

        // double argument: only the deleted template binds exactly.
        let double = DataType::simple(primitives::DOUBLE);
        let err = resolve(&CallSite::new("bar", vec![double]), &registry).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::SelectedCandidateDeleted { .. }
        ));
    }
}
