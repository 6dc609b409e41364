//! Every builtin scenario must build its registry and satisfy all of its
//! probes. One test per scenario keeps failures addressed by name.

use overmatch::scenario::{builtin_scenario, builtin_scenarios};

fn run(name: &str) {
    let scenario = builtin_scenario(name)
        .unwrap_or_else(|| panic!("no builtin scenario named '{name}'"));
    if let Err(err) = scenario.run() {
        panic!("scenario '{name}' failed: {err}");
    }
}

#[test]
fn test_overload_differentiation() {
    run("overload-differentiation");
}

#[test]
fn test_overload_differentiation_return_type() {
    run("overload-differentiation/return-type");
}

#[test]
fn test_const_members() {
    run("const-members");
}

#[test]
fn test_deleted_overload() {
    run("deleted-overload");
}

#[test]
fn test_deleted_overload_char_call() {
    run("deleted-overload/char-call");
}

#[test]
fn test_exact_match_idiom() {
    run("exact-match-idiom");
}

#[test]
fn test_exact_match_idiom_other_types() {
    run("exact-match-idiom/other-types");
}

#[test]
fn test_default_arguments() {
    run("default-arguments");
}

#[test]
fn test_default_arguments_ambiguous_arity() {
    run("default-arguments/ambiguous-arity");
}

#[test]
fn test_deleted_specialization() {
    run("deleted-specialization");
}

#[test]
fn test_template_deduction() {
    run("template-deduction");
}

#[test]
fn test_template_deduction_mixed_types() {
    run("template-deduction/mixed-types");
}

#[test]
fn test_common_type_max() {
    run("common-type-max");
}

#[test]
fn test_non_type_parameters() {
    run("non-type-parameters");
}

#[test]
fn test_non_type_parameters_negative_constant() {
    run("non-type-parameters/negative-constant");
}

#[test]
fn test_every_builtin_is_covered_here() {
    // Keep this file honest when scenarios are added.
    assert_eq!(builtin_scenarios().len(), 15);
}
