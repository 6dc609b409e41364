//! Named demonstration scenarios over the resolver.
//!
//! Each scenario bundles one self-contained overload set (declaration
//! strings, extra type registrations, guard attachments) with probe calls
//! and their expected outcomes. Variants that change the outcome, such as
//! adding a conflicting declaration or probing a deleted overload, get
//! their own entries under a `base-name/variant` name.
//!
//! [`builtin_scenarios`] returns the full table; [`Scenario::run`] drives
//! every probe of one entry through [`resolve`]/[`resolve_method`].

use std::fmt;

use thiserror::Error;

use overmatch_core::{
    ClassEntry, ConstValue, DeclError, GuardFn, RegistrationError, ResolutionError,
    TemplateBindings,
};
use overmatch_registry::SignatureRegistry;

use crate::parser::{declare, parse_template_arg, parse_type};
use crate::resolver::{CallSite, resolve, resolve_method};

/// What a probe expects resolution to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Resolution selects this candidate (its display form).
    Selects(&'static str),
    /// Resolution selects this candidate and instantiates this return
    /// type.
    SelectsReturning(&'static str, &'static str),
    /// Resolution fails with this kind of error.
    Fails(FailureKind),
}

/// The kind of resolution failure a probe expects, mirroring
/// [`ResolutionError`]'s variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoViableOverload,
    AmbiguousCall,
    SelectedCandidateDeleted,
    TemplateDeductionFailure,
    TemplateGuardFailed,
}

impl FailureKind {
    fn of(error: &ResolutionError) -> FailureKind {
        match error {
            ResolutionError::NoViableOverload { .. } => FailureKind::NoViableOverload,
            ResolutionError::AmbiguousCall { .. } => FailureKind::AmbiguousCall,
            ResolutionError::SelectedCandidateDeleted { .. } => {
                FailureKind::SelectedCandidateDeleted
            }
            ResolutionError::TemplateDeductionFailure { .. } => {
                FailureKind::TemplateDeductionFailure
            }
            ResolutionError::TemplateGuardFailed { .. } => FailureKind::TemplateGuardFailed,
        }
    }
}

/// One call driven against a scenario's registered set.
///
/// Types are spelled by name and parsed against the scenario's registry,
/// so probes read the way the calls would in source.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    /// The called name.
    pub call: &'static str,
    /// Explicit template arguments, e.g. `&["int"]` for `max<int>`.
    pub template_args: &'static [&'static str],
    /// Argument types by name.
    pub args: &'static [&'static str],
    /// Receiver type for member calls.
    pub receiver: Option<&'static str>,
    /// What resolution must produce.
    pub expect: Expect,
}

impl Probe {
    /// A free call probe.
    pub const fn call(name: &'static str, args: &'static [&'static str], expect: Expect) -> Self {
        Self {
            call: name,
            template_args: &[],
            args,
            receiver: None,
            expect,
        }
    }

    /// Fix leading template parameters explicitly, as in `max<int>(3, 2.3)`.
    pub const fn with_template_args(mut self, template_args: &'static [&'static str]) -> Self {
        self.template_args = template_args;
        self
    }

    /// Make this a member call through `receiver`.
    pub const fn on(mut self, receiver: &'static str) -> Self {
        self.receiver = Some(receiver);
        self
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(receiver) = self.receiver {
            write!(f, "({receiver})::")?;
        }
        f.write_str(self.call)?;
        if !self.template_args.is_empty() {
            write!(f, "<{}>", self.template_args.join(", "))?;
        }
        write!(f, "({})", self.args.join(", "))
    }
}

/// One named overload-set demonstration.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Identifier, `base-name` or `base-name/variant`.
    pub name: &'static str,
    /// One line on what the scenario demonstrates.
    pub summary: &'static str,
    /// Class types the declarations refer to.
    pub classes: &'static [&'static str],
    /// Declarations registered in order.
    pub declarations: &'static [&'static str],
    /// Guards attached after registration, by template name.
    pub guards: &'static [(&'static str, GuardFn)],
    /// Declarations that must fail to register.
    pub rejected: &'static [&'static str],
    /// Calls driven against the registered set.
    pub probes: &'static [Probe],
}

/// Why a scenario run failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("cannot register type '{name}': {source}")]
    Type {
        name: String,
        source: RegistrationError,
    },
    #[error("declaration '{declaration}' failed: {source}")]
    Declaration {
        declaration: String,
        source: DeclError,
    },
    #[error("cannot attach a guard to '{name}': {source}")]
    Guard {
        name: String,
        source: RegistrationError,
    },
    #[error("declaration '{declaration}' registered, a rejection was expected")]
    MissingRejection { declaration: String },
    #[error("probe {probe}: {detail}")]
    Probe { probe: String, detail: String },
}

impl Scenario {
    /// Register the scenario's types and declarations, verifying that the
    /// rejected ones are indeed rejected.
    pub fn build_registry(&self) -> Result<SignatureRegistry, ScenarioError> {
        let mut registry = SignatureRegistry::with_primitives();

        for class in self.classes {
            registry
                .register_class(ClassEntry::new(*class))
                .map_err(|source| ScenarioError::Type {
                    name: (*class).to_owned(),
                    source,
                })?;
        }
        for declaration in self.declarations {
            declare(&mut registry, declaration).map_err(|source| {
                ScenarioError::Declaration {
                    declaration: (*declaration).to_owned(),
                    source,
                }
            })?;
        }
        for (name, guard) in self.guards {
            registry
                .attach_guard(name, *guard)
                .map_err(|source| ScenarioError::Guard {
                    name: (*name).to_owned(),
                    source,
                })?;
        }
        for declaration in self.rejected {
            if declare(&mut registry, declaration).is_ok() {
                return Err(ScenarioError::MissingRejection {
                    declaration: (*declaration).to_owned(),
                });
            }
        }

        Ok(registry)
    }

    /// Build the registry and drive every probe, stopping at the first
    /// mismatch.
    pub fn run(&self) -> Result<(), ScenarioError> {
        let registry = self.build_registry()?;
        for probe in self.probes {
            check_probe(&registry, probe)?;
        }
        Ok(())
    }
}

fn check_probe(registry: &SignatureRegistry, probe: &Probe) -> Result<(), ScenarioError> {
    let fail = |detail: String| ScenarioError::Probe {
        probe: probe.to_string(),
        detail,
    };

    let mut args = Vec::with_capacity(probe.args.len());
    for name in probe.args {
        args.push(parse_type(registry, name).map_err(|e| fail(format!("bad argument type: {e}")))?);
    }
    let mut template_args = Vec::with_capacity(probe.template_args.len());
    for text in probe.template_args {
        template_args.push(
            parse_template_arg(registry, text)
                .map_err(|e| fail(format!("bad template argument: {e}")))?,
        );
    }
    let call = CallSite::new(probe.call, args).with_template_args(template_args);

    let outcome = match probe.receiver {
        Some(text) => {
            let receiver =
                parse_type(registry, text).map_err(|e| fail(format!("bad receiver type: {e}")))?;
            resolve_method(&receiver, &call, registry)
        }
        None => resolve(&call, registry),
    };

    match (probe.expect, outcome) {
        (Expect::Selects(want), Ok(found)) => {
            if found.signature == want {
                Ok(())
            } else {
                Err(fail(format!(
                    "selected '{}', expected '{want}'",
                    found.signature
                )))
            }
        }
        (Expect::SelectsReturning(want, ret), Ok(found)) => {
            if found.signature != want {
                return Err(fail(format!(
                    "selected '{}', expected '{want}'",
                    found.signature
                )));
            }
            let shown = registry.display_type(&found.return_type);
            if shown == ret {
                Ok(())
            } else {
                Err(fail(format!("returns '{shown}', expected '{ret}'")))
            }
        }
        (Expect::Fails(kind), Ok(found)) => Err(fail(format!(
            "selected '{}', a {kind:?} failure was expected",
            found.signature
        ))),
        (Expect::Fails(kind), Err(error)) => {
            if FailureKind::of(&error) == kind {
                Ok(())
            } else {
                Err(fail(format!(
                    "failed with '{error}', a {kind:?} failure was expected"
                )))
            }
        }
        (Expect::Selects(_) | Expect::SelectsReturning(..), Err(error)) => {
            Err(fail(format!("failed: {error}")))
        }
    }
}

/// `static_assert(D >= 0)` of the square-root template.
fn sqrt_non_negative(bindings: &TemplateBindings) -> Result<(), String> {
    match bindings.value_of("D").and_then(ConstValue::as_float) {
        Some(d) if d < 0.0 => Err("D must be non-negative".to_owned()),
        _ => Ok(()),
    }
}

/// The builtin scenario table.
pub fn builtin_scenarios() -> &'static [Scenario] {
    BUILTIN
}

/// Look up one builtin scenario by name.
pub fn builtin_scenario(name: &str) -> Option<&'static Scenario> {
    BUILTIN.iter().find(|s| s.name == name)
}

const BUILTIN: &[Scenario] = &[
    Scenario {
        name: "overload-differentiation",
        summary: "Overloads differentiated by parameter types, arity, and an ellipsis tail",
        classes: &[],
        declarations: &[
            "int add(int num1, int num2)",
            "int add(int num1, int num2, int num3)",
            "float add(float num1, float num2)",
            "int add(int count, ...)",
        ],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call("add", &["int", "int"], Expect::Selects("int add(int, int)")),
            Probe::call(
                "add",
                &["int", "int", "int"],
                Expect::Selects("int add(int, int, int)"),
            ),
            Probe::call(
                "add",
                &["float", "float"],
                Expect::Selects("float add(float, float)"),
            ),
            Probe::call(
                "add",
                &["int", "int", "int", "int", "int", "int"],
                Expect::Selects("int add(int, ...)"),
            ),
        ],
    },
    Scenario {
        name: "overload-differentiation/return-type",
        summary: "The return type alone never differentiates an overload",
        classes: &[],
        declarations: &[
            "int add(int num1, int num2)",
            "int add(int num1, int num2, int num3)",
            "float add(float num1, float num2)",
        ],
        guards: &[],
        rejected: &["float add(int num1, int num2)"],
        probes: &[Probe::call(
            "add",
            &["int", "int"],
            Expect::Selects("int add(int, int)"),
        )],
    },
    Scenario {
        name: "const-members",
        summary: "Receiver qualifiers select between const and non-const members",
        classes: &["OverloadClass"],
        declarations: &[
            "int OverloadClass::get_number()",
            "int OverloadClass::get_number() const",
        ],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call(
                "get_number",
                &[],
                Expect::Selects("int OverloadClass::get_number()"),
            )
            .on("OverloadClass"),
            Probe::call(
                "get_number",
                &[],
                Expect::Selects("int OverloadClass::get_number() const"),
            )
            .on("const OverloadClass"),
        ],
    },
    Scenario {
        name: "deleted-overload",
        summary: "One deleted overload removes a single argument type from a set",
        classes: &[],
        declarations: &["void foo(int x)", "void foo(char) = delete"],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call("foo", &["int"], Expect::Selects("void foo(int)")),
            // bool promotes to int; the deleted char overload would need a
            // conversion and never gets selected.
            Probe::call("foo", &["bool"], Expect::Selects("void foo(int)")),
        ],
    },
    Scenario {
        name: "deleted-overload/char-call",
        summary: "A call that selects the deleted overload fails instead of falling back",
        classes: &[],
        declarations: &["void foo(int x)", "void foo(char) = delete"],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call("foo", &["int"], Expect::Selects("void foo(int)")),
            Probe::call(
                "foo",
                &["char"],
                Expect::Fails(FailureKind::SelectedCandidateDeleted),
            ),
        ],
    },
    Scenario {
        name: "exact-match-idiom",
        summary: "A deleted catch-all template restricts a function to one argument type",
        classes: &[],
        declarations: &[
            "void bar(int x)",
            "template <typename T> void bar(T x) = delete",
        ],
        guards: &[],
        rejected: &[],
        probes: &[Probe::call("bar", &["int"], Expect::Selects("void bar(int)"))],
    },
    Scenario {
        name: "exact-match-idiom/other-types",
        summary: "Every non-int argument instantiates the deleted template exactly",
        classes: &[],
        declarations: &[
            "void bar(int x)",
            "template <typename T> void bar(T x) = delete",
        ],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call("bar", &["int"], Expect::Selects("void bar(int)")),
            Probe::call(
                "bar",
                &["char"],
                Expect::Fails(FailureKind::SelectedCandidateDeleted),
            ),
            Probe::call(
                "bar",
                &["bool"],
                Expect::Fails(FailureKind::SelectedCandidateDeleted),
            ),
            Probe::call(
                "bar",
                &["float"],
                Expect::Fails(FailureKind::SelectedCandidateDeleted),
            ),
        ],
    },
    Scenario {
        name: "default-arguments",
        summary: "A trailing default serves calls of both arities",
        classes: &[],
        declarations: &["int mult(int num1, int num2 = 2)"],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call("mult", &["int"], Expect::Selects("int mult(int, int = 2)")),
            Probe::call(
                "mult",
                &["int", "int"],
                Expect::Selects("int mult(int, int = 2)"),
            ),
        ],
    },
    Scenario {
        name: "default-arguments/ambiguous-arity",
        summary: "A one-parameter overload collides with the defaulted call",
        classes: &[],
        declarations: &["int mult(int num1, int num2 = 2)", "int mult(int num)"],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call("mult", &["int"], Expect::Fails(FailureKind::AmbiguousCall)),
            Probe::call(
                "mult",
                &["int", "int"],
                Expect::Selects("int mult(int, int = 2)"),
            ),
        ],
    },
    Scenario {
        name: "deleted-specialization",
        summary: "A deleted explicit specialization blocks one deduced argument vector",
        classes: &["std::string"],
        declarations: &[
            "template <typename T> T add(const T a, const T b)",
            "template <> std::string add(std::string a, std::string b) = delete",
        ],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call(
                "add",
                &["int", "int"],
                Expect::SelectsReturning("T add<T>(const T, const T)", "int"),
            ),
            Probe::call(
                "add",
                &["float", "float"],
                Expect::SelectsReturning("T add<T>(const T, const T)", "float"),
            ),
            Probe::call(
                "add",
                &["char", "char"],
                Expect::SelectsReturning("T add<T>(const T, const T)", "char"),
            ),
            Probe::call(
                "add",
                &["std::string", "std::string"],
                Expect::Fails(FailureKind::SelectedCandidateDeleted),
            ),
        ],
    },
    Scenario {
        name: "template-deduction",
        summary: "A shared type parameter deduces from same-typed arguments",
        classes: &[],
        declarations: &["template <typename T> T max(T x, T y)"],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call(
                "max",
                &["int", "int"],
                Expect::SelectsReturning("T max<T>(T, T)", "int"),
            ),
            Probe::call(
                "max",
                &["double", "double"],
                Expect::SelectsReturning("T max<T>(T, T)", "double"),
            ),
        ],
    },
    Scenario {
        name: "template-deduction/mixed-types",
        summary: "Conflicting deductions fail; explicit arguments fix the parameter instead",
        classes: &[],
        declarations: &["template <typename T> T max(T x, T y)"],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call(
                "max",
                &["int", "double"],
                Expect::Fails(FailureKind::TemplateDeductionFailure),
            ),
            Probe::call(
                "max",
                &["int", "double"],
                Expect::SelectsReturning("T max<T>(T, T)", "int"),
            )
            .with_template_args(&["int"]),
        ],
    },
    Scenario {
        name: "common-type-max",
        summary: "Two type parameters and an auto return accept mixed argument types",
        classes: &[],
        declarations: &["template <typename T, typename U> auto max(T x, U y)"],
        guards: &[],
        rejected: &[],
        probes: &[
            Probe::call(
                "max",
                &["int", "double"],
                Expect::SelectsReturning("auto max<T, U>(T, U)", "double"),
            ),
            Probe::call(
                "max",
                &["int", "int"],
                Expect::SelectsReturning("auto max<T, U>(T, U)", "int"),
            ),
            Probe::call(
                "max",
                &["float", "double"],
                Expect::SelectsReturning("auto max<T, U>(T, U)", "double"),
            ),
        ],
    },
    Scenario {
        name: "non-type-parameters",
        summary: "Non-type parameters bind explicit constants",
        classes: &[],
        declarations: &[
            "template <int N> void print()",
            "template <double D> double getSqrt()",
        ],
        guards: &[("getSqrt", sqrt_non_negative)],
        rejected: &[],
        probes: &[
            Probe::call("print", &[], Expect::Selects("void print<int N>()"))
                .with_template_args(&["5"]),
            Probe::call(
                "getSqrt",
                &[],
                Expect::SelectsReturning("double getSqrt<double D>()", "double"),
            )
            .with_template_args(&["5.0"]),
        ],
    },
    Scenario {
        name: "non-type-parameters/negative-constant",
        summary: "The guard rejects a constant the declaration's static_assert would",
        classes: &[],
        declarations: &["template <double D> double getSqrt()"],
        guards: &[("getSqrt", sqrt_non_negative)],
        rejected: &[],
        probes: &[
            Probe::call(
                "getSqrt",
                &[],
                Expect::SelectsReturning("double getSqrt<double D>()", "double"),
            )
            .with_template_args(&["5.0"]),
            Probe::call(
                "getSqrt",
                &[],
                Expect::Fails(FailureKind::TemplateGuardFailed),
            )
            .with_template_args(&["-5.0"]),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_unique() {
        let scenarios = builtin_scenarios();
        for (i, a) in scenarios.iter().enumerate() {
            for b in &scenarios[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
        assert!(builtin_scenario("template-deduction").is_some());
        assert!(builtin_scenario("missing").is_none());
    }

    #[test]
    fn probe_display_reads_like_a_call() {
        let plain = Probe::call("add", &["int", "int"], Expect::Selects(""));
        assert_eq!(plain.to_string(), "add(int, int)");

        let explicit = Probe::call("max", &["int", "double"], Expect::Selects(""))
            .with_template_args(&["int"]);
        assert_eq!(explicit.to_string(), "max<int>(int, double)");

        let member = Probe::call("get_number", &[], Expect::Selects("")).on("const OverloadClass");
        assert_eq!(member.to_string(), "(const OverloadClass)::get_number()");
    }

    #[test]
    fn probe_mismatch_is_reported() {
        const PROBES: &[Probe] = &[Probe::call(
            "add",
            &["int", "int"],
            Expect::Selects("float add(float, float)"),
        )];
        let scenario = Scenario {
            name: "mismatch",
            summary: "",
            classes: &[],
            declarations: &["int add(int a, int b)"],
            guards: &[],
            rejected: &[],
            probes: PROBES,
        };
        let err = scenario.run().unwrap_err();
        assert!(matches!(err, ScenarioError::Probe { .. }));
        assert!(err.to_string().contains("selected 'int add(int, int)'"));
    }

    #[test]
    fn missing_rejection_is_reported() {
        let scenario = Scenario {
            name: "not-rejected",
            summary: "",
            classes: &[],
            declarations: &[],
            guards: &[],
            rejected: &["int add(int a, int b)"],
            probes: &[],
        };
        let err = scenario.run().unwrap_err();
        assert_eq!(
            err,
            ScenarioError::MissingRejection {
                declaration: "int add(int a, int b)".to_owned(),
            }
        );
    }

    #[test]
    fn bad_declaration_is_reported() {
        let scenario = Scenario {
            name: "bad-declaration",
            summary: "",
            classes: &[],
            declarations: &["int add(Ghost g)"],
            guards: &[],
            rejected: &[],
            probes: &[],
        };
        let err = scenario.run().unwrap_err();
        assert!(matches!(err, ScenarioError::Declaration { .. }));
    }

    #[test]
    fn unexpected_failure_kind_is_reported() {
        const PROBES: &[Probe] = &[Probe::call(
            "add",
            &["int"],
            Expect::Fails(FailureKind::AmbiguousCall),
        )];
        let scenario = Scenario {
            name: "wrong-kind",
            summary: "",
            classes: &[],
            declarations: &["int add(int a, int b)"],
            guards: &[],
            rejected: &[],
            probes: PROBES,
        };
        let err = scenario.run().unwrap_err();
        assert!(err.to_string().contains("AmbiguousCall"));
    }
}
