//! End-to-end resolution tests driving the public API: declarations go in
//! as strings, calls come back as selections or structured errors.

use overmatch::parser::{declare, parse_type};
use overmatch::resolver::{ArgBinding, CallSite, resolve, resolve_method};
use overmatch_core::{
    ClassEntry, ConstValue, ConversionRank, DeclError, RegistrationError, ResolutionError, Span,
    TemplateArg, TemplateBindings,
};
use overmatch_registry::SignatureRegistry;

fn registry_with(declarations: &[&str]) -> SignatureRegistry {
    let mut registry = SignatureRegistry::with_primitives();
    for declaration in declarations {
        declare(&mut registry, declaration).unwrap();
    }
    registry
}

fn call(registry: &SignatureRegistry, name: &str, args: &[&str]) -> CallSite {
    let args = args
        .iter()
        .map(|text| parse_type(registry, text).unwrap())
        .collect();
    CallSite::new(name, args)
}

#[test]
fn test_exact_match_wins() {
    let registry = registry_with(&[
        "int add(int num1, int num2)",
        "int add(int num1, int num2, int num3)",
        "float add(float num1, float num2)",
        "int add(int count, ...)",
    ]);

    let selected = resolve(&call(&registry, "add", &["int", "int"]), &registry).unwrap();
    assert_eq!(selected.signature, "int add(int, int)");
    assert_eq!(selected.overall, ConversionRank::ExactMatch);

    let selected = resolve(&call(&registry, "add", &["float", "float"]), &registry).unwrap();
    assert_eq!(selected.signature, "float add(float, float)");
}

#[test]
fn test_promotion_beats_conversion() {
    let registry = registry_with(&["void take(int x)", "void take(float x)"]);

    // char promotes to int but merely converts to float.
    let selected = resolve(&call(&registry, "take", &["char"]), &registry).unwrap();
    assert_eq!(selected.signature, "void take(int)");
    assert_eq!(selected.overall, ConversionRank::Promotion);

    let selected = resolve(&call(&registry, "take", &["short"]), &registry).unwrap();
    assert_eq!(selected.signature, "void take(int)");
}

#[test]
fn test_conversion_tie_is_ambiguous() {
    let registry = registry_with(&["void take(int x)", "void take(float x)"]);

    // long narrows to int and converts to float, both at conversion rank.
    let err = resolve(&call(&registry, "take", &["long"]), &registry).unwrap_err();
    match err {
        ResolutionError::AmbiguousCall { name, candidates, .. } => {
            assert_eq!(name, "take");
            assert_eq!(candidates, "'void take(int)' and 'void take(float)'");
        }
        other => panic!("expected an ambiguity, got {other:?}"),
    }
}

#[test]
fn test_unknown_name_is_not_viable() {
    let registry = registry_with(&["int add(int num1, int num2)"]);

    let site = call(&registry, "sub", &["int", "int"]).at(Span::new(4, 9, 16));
    let err = resolve(&site, &registry).unwrap_err();
    assert_eq!(err.span(), Span::new(4, 9, 16));
    assert_eq!(err.to_string(), "at 4:9: no viable overload for 'sub(int, int)'");
}

#[test]
fn test_arity_mismatch_is_not_viable() {
    let registry = registry_with(&["int add(int num1, int num2)"]);

    let err = resolve(&call(&registry, "add", &["int"]), &registry).unwrap_err();
    assert!(matches!(err, ResolutionError::NoViableOverload { .. }));
}

#[test]
fn test_defaults_fill_missing_arguments() {
    let registry = registry_with(&["int mult(int num1, int num2 = 2)"]);

    let selected = resolve(&call(&registry, "mult", &["int"]), &registry).unwrap();
    assert_eq!(selected.signature, "int mult(int, int = 2)");
    assert_eq!(selected.bindings.len(), 2);
    assert_eq!(selected.bindings[1], ArgBinding::Defaulted(ConstValue::Int(2)));
    // A defaulted parameter contributes no rank.
    assert_eq!(selected.overall, ConversionRank::ExactMatch);
}

#[test]
fn test_defaulted_arity_overlap_is_ambiguous() {
    let registry = registry_with(&["int mult(int num1, int num2 = 2)", "int mult(int num)"]);

    let err = resolve(&call(&registry, "mult", &["int"]), &registry).unwrap_err();
    assert!(matches!(err, ResolutionError::AmbiguousCall { .. }));

    // Two arguments reach only the two-parameter overload.
    let selected = resolve(&call(&registry, "mult", &["int", "int"]), &registry).unwrap();
    assert_eq!(selected.signature, "int mult(int, int = 2)");
}

#[test]
fn test_variadic_is_a_last_resort() {
    let registry = registry_with(&[
        "int add(int num1, int num2)",
        "int add(int num1, int num2, int num3)",
        "int add(int count, ...)",
    ]);

    // Fixed-arity candidates win while one fits.
    let selected = resolve(&call(&registry, "add", &["int", "int", "int"]), &registry).unwrap();
    assert_eq!(selected.signature, "int add(int, int, int)");

    let selected = resolve(
        &call(&registry, "add", &["int", "int", "int", "int", "int", "int"]),
        &registry,
    )
    .unwrap();
    assert_eq!(selected.signature, "int add(int, ...)");
    assert_eq!(selected.overall, ConversionRank::EllipsisMatch);
    assert_eq!(selected.bindings[5], ArgBinding::Ellipsis);
}

#[test]
fn test_receiver_qualifiers_pick_the_member() {
    let mut registry = SignatureRegistry::with_primitives();
    registry.register_class(ClassEntry::new("OverloadClass")).unwrap();
    declare(&mut registry, "int OverloadClass::get_number()").unwrap();
    declare(&mut registry, "int OverloadClass::get_number() const").unwrap();
    let owner = registry.lookup_type("OverloadClass").unwrap();

    let site = CallSite::new("get_number", vec![]);

    // A plain receiver prefers the overload that adds no qualifiers.
    let receiver = parse_type(&registry, "OverloadClass").unwrap();
    let selected = resolve_method(&receiver, &site, &registry).unwrap();
    assert_eq!(selected.signature, "int OverloadClass::get_number()");

    let receiver = parse_type(&registry, "const OverloadClass").unwrap();
    let selected = resolve_method(&receiver, &site, &registry).unwrap();
    assert_eq!(selected.signature, "int OverloadClass::get_number() const");

    assert_eq!(registry.type_name(owner), Some("OverloadClass"));
}

#[test]
fn test_const_receiver_rejects_mutating_members() {
    let mut registry = SignatureRegistry::with_primitives();
    registry.register_class(ClassEntry::new("Counter")).unwrap();
    declare(&mut registry, "void Counter::bump()").unwrap();

    let receiver = parse_type(&registry, "const Counter").unwrap();
    let err = resolve_method(&receiver, &CallSite::new("bump", vec![]), &registry).unwrap_err();
    assert!(matches!(err, ResolutionError::NoViableOverload { .. }));
}

#[test]
fn test_bool_argument_promotes_past_a_deleted_overload() {
    let registry = registry_with(&["void foo(int x)", "void foo(char x) = delete"]);

    // bool promotes to int; the deleted char overload never enters the race.
    let selected = resolve(&call(&registry, "foo", &["bool"]), &registry).unwrap();
    assert_eq!(selected.signature, "void foo(int)");
}

#[test]
fn test_deleted_overload_fails_only_when_selected() {
    let registry = registry_with(&["void foo(int x)", "void foo(char x) = delete"]);

    let err = resolve(&call(&registry, "foo", &["char"]), &registry).unwrap_err();
    match err {
        ResolutionError::SelectedCandidateDeleted { signature, .. } => {
            assert_eq!(signature, "void foo(char) = delete");
        }
        other => panic!("expected a deleted selection, got {other:?}"),
    }
}

#[test]
fn test_non_template_wins_a_rank_tie() {
    let registry = registry_with(&[
        "void bar(int x)",
        "template <typename T> void bar(T x) = delete",
    ]);

    // Both bind int exactly; the tie breaks toward the non-template.
    let selected = resolve(&call(&registry, "bar", &["int"]), &registry).unwrap();
    assert_eq!(selected.signature, "void bar(int)");
    assert!(selected.template_bindings.is_none());

    // Everything else lands on the deleted template.
    for arg in ["char", "bool", "float"] {
        let err = resolve(&call(&registry, "bar", &[arg]), &registry).unwrap_err();
        assert!(matches!(err, ResolutionError::SelectedCandidateDeleted { .. }));
    }
}

#[test]
fn test_template_deduction_binds_parameters() {
    let registry = registry_with(&["template <typename T> T max(T x, T y)"]);

    let selected = resolve(&call(&registry, "max", &["int", "int"]), &registry).unwrap();
    assert_eq!(selected.signature, "T max<T>(T, T)");
    assert_eq!(selected.return_type, parse_type(&registry, "int").unwrap());

    let bindings = selected.template_bindings.unwrap();
    assert_eq!(bindings.type_of("T"), Some(parse_type(&registry, "int").unwrap()));

    let selected = resolve(&call(&registry, "max", &["double", "double"]), &registry).unwrap();
    assert_eq!(selected.return_type, parse_type(&registry, "double").unwrap());
}

#[test]
fn test_deduction_conflict_is_reported() {
    let registry = registry_with(&["template <typename T> T max(T x, T y)"]);

    let err = resolve(&call(&registry, "max", &["int", "double"]), &registry).unwrap_err();
    match err {
        ResolutionError::TemplateDeductionFailure { name, detail, .. } => {
            assert_eq!(name, "max");
            assert_eq!(
                detail,
                "deduced conflicting types for parameter 'T' ('int' vs 'double')"
            );
        }
        other => panic!("expected a deduction failure, got {other:?}"),
    }
}

#[test]
fn test_deduction_casualty_yields_to_a_viable_candidate() {
    let registry = registry_with(&[
        "template <typename T> T max(T x, T y)",
        "double max(double x, double y)",
    ]);

    // The template drops out on conflicting deduction, but the plain
    // overload still binds, so no deduction failure surfaces.
    let selected = resolve(&call(&registry, "max", &["int", "double"]), &registry).unwrap();
    assert_eq!(selected.signature, "double max(double, double)");
}

#[test]
fn test_explicit_arguments_override_deduction() {
    let registry = registry_with(&["template <typename T> T max(T x, T y)"]);

    let site = call(&registry, "max", &["int", "double"])
        .with_template_args(vec![TemplateArg::Type(parse_type(&registry, "int").unwrap())]);
    let selected = resolve(&site, &registry).unwrap();

    assert_eq!(selected.return_type, parse_type(&registry, "int").unwrap());
    // The double argument converts down to the bound int parameter.
    assert_eq!(selected.overall, ConversionRank::Conversion);
}

#[test]
fn test_explicit_arguments_exclude_non_templates() {
    let registry = registry_with(&["void f(int x)", "template <typename T> void f(T x)"]);

    let site = call(&registry, "f", &["int"])
        .with_template_args(vec![TemplateArg::Type(parse_type(&registry, "int").unwrap())]);
    let selected = resolve(&site, &registry).unwrap();
    assert_eq!(selected.signature, "void f<T>(T)");
}

#[test]
fn test_auto_return_takes_the_common_type() {
    let registry = registry_with(&["template <typename T, typename U> auto pick(T x, U y)"]);

    let selected = resolve(&call(&registry, "pick", &["int", "double"]), &registry).unwrap();
    assert_eq!(selected.return_type, parse_type(&registry, "double").unwrap());

    // Both sides promote to int before the common type is taken.
    let selected = resolve(&call(&registry, "pick", &["char", "short"]), &registry).unwrap();
    assert_eq!(selected.return_type, parse_type(&registry, "int").unwrap());
}

#[test]
fn test_deleted_specialization_blocks_only_its_arguments() {
    let mut registry = SignatureRegistry::with_primitives();
    registry.register_class(ClassEntry::new("std::string")).unwrap();
    declare(&mut registry, "template <typename T> T add(const T a, const T b)").unwrap();
    declare(
        &mut registry,
        "template <> std::string add(const std::string a, const std::string b) = delete",
    )
    .unwrap();

    let selected = resolve(&call(&registry, "add", &["int", "int"]), &registry).unwrap();
    assert_eq!(selected.return_type, parse_type(&registry, "int").unwrap());

    let site = call(&registry, "add", &["std::string", "std::string"]);
    let err = resolve(&site, &registry).unwrap_err();
    assert!(matches!(err, ResolutionError::SelectedCandidateDeleted { .. }));
}

fn non_negative(bindings: &TemplateBindings) -> Result<(), String> {
    match bindings.value_of("D").and_then(ConstValue::as_float) {
        Some(d) if d < 0.0 => Err("D must be non-negative".to_owned()),
        _ => Ok(()),
    }
}

#[test]
fn test_guard_runs_after_selection() {
    let mut registry = registry_with(&["template <double D> double getSqrt()"]);
    registry.attach_guard("getSqrt", non_negative).unwrap();

    let site = CallSite::new("getSqrt", vec![])
        .with_template_args(vec![TemplateArg::Value(ConstValue::float(5.0))]);
    let selected = resolve(&site, &registry).unwrap();
    assert_eq!(selected.return_type, parse_type(&registry, "double").unwrap());

    let site = CallSite::new("getSqrt", vec![])
        .with_template_args(vec![TemplateArg::Value(ConstValue::float(-5.0))]);
    let err = resolve(&site, &registry).unwrap_err();
    match err {
        ResolutionError::TemplateGuardFailed { template, message, .. } => {
            assert_eq!(template, "getSqrt");
            assert_eq!(message, "D must be non-negative");
        }
        other => panic!("expected a guard failure, got {other:?}"),
    }
}

#[test]
fn test_value_parameters_bind_spelled_constants() {
    let registry = registry_with(&["template <int N> void print()"]);

    let site = CallSite::new("print", vec![])
        .with_template_args(vec![TemplateArg::Value(ConstValue::Int(5))]);
    let selected = resolve(&site, &registry).unwrap();
    assert_eq!(selected.signature, "void print<int N>()");

    let bindings = selected.template_bindings.unwrap();
    assert_eq!(bindings.value_of("N").and_then(ConstValue::as_int), Some(5));
}

#[test]
fn test_return_type_overloads_are_rejected_at_registration() {
    let mut registry = SignatureRegistry::with_primitives();
    declare(&mut registry, "int add(int num1, int num2)").unwrap();

    let err = declare(&mut registry, "float add(int num1, int num2)").unwrap_err();
    match err {
        DeclError::Registration(RegistrationError::ReturnTypeOverload { name, params }) => {
            assert_eq!(name, "add");
            assert_eq!(params, "int, int");
        }
        other => panic!("expected a return-type overload error, got {other:?}"),
    }
}

#[test]
fn test_duplicate_signatures_ignore_parameter_cv() {
    let mut registry = SignatureRegistry::with_primitives();
    declare(&mut registry, "int add(int num1, int num2)").unwrap();

    // Top-level parameter cv does not distinguish signatures.
    let err = declare(&mut registry, "int add(const int num1, int num2)").unwrap_err();
    assert!(matches!(
        err,
        DeclError::Registration(RegistrationError::DuplicateSignature { .. })
    ));
}

#[test]
fn test_non_trailing_defaults_are_rejected() {
    let mut registry = SignatureRegistry::with_primitives();
    let err = declare(&mut registry, "int mult(int num1 = 2, int num2)").unwrap_err();
    match err {
        DeclError::Registration(RegistrationError::NonTrailingDefault { function, param }) => {
            assert_eq!(function, "mult");
            assert_eq!(param, "num2");
        }
        other => panic!("expected a non-trailing default error, got {other:?}"),
    }
}
