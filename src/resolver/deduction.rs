//! Template argument deduction and substitution.
//!
//! Turns a template candidate plus a call site into a concrete signature:
//! explicit template arguments bind parameters left to right, type
//! parameters deduce from the argument types position by position, and
//! the bound arguments substitute into the parameter list and return
//! specification. Every failure is a deduction detail string; the
//! resolver decides whether it surfaces as an error.

use overmatch_core::{
    Candidate, ConstKind, ConstValue, DataType, Param, PrimitiveKind, ReturnSpec, TemplateArg,
    TemplateBindings, TemplateParam, TemplateParamKind, TypeEntry, TypeHash, ValueParamType,
};
use overmatch_registry::SignatureRegistry;
use rustc_hash::FxHashMap;

use crate::conversion::common_type;

/// A template candidate made concrete for one call site.
#[derive(Debug, Clone)]
pub(crate) struct Instantiation {
    /// Parameters with template parameters substituted out.
    pub params: Vec<Param>,
    /// What each template parameter ended up bound to.
    pub bindings: TemplateBindings,
    /// The bound argument vector matches a deleted explicit
    /// specialization.
    pub deleted_specialization: bool,
    /// Instantiated return type, with `auto` resolved.
    pub ret: DataType,
}

/// Instantiate a template candidate against explicit template arguments
/// and call argument types.
///
/// `Err` carries the deduction detail in diagnostic form.
pub(crate) fn instantiate(
    candidate: &Candidate,
    explicit_args: &[TemplateArg],
    args: &[DataType],
    registry: &SignatureRegistry,
) -> Result<Instantiation, String> {
    let Some(template) = candidate.template.as_ref() else {
        return Err(format!("'{}' is not a template", candidate.name));
    };

    if explicit_args.len() > template.params.len() {
        return Err(format!(
            "{} template arguments supplied for {} parameters",
            explicit_args.len(),
            template.params.len(),
        ));
    }

    let param_index: FxHashMap<TypeHash, usize> = template
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| (p.hash, i))
        .collect();

    // Explicit arguments bind left to right, before any deduction.
    let mut bindings = TemplateBindings::new();
    for (tp, arg) in template.params.iter().zip(explicit_args) {
        bind_explicit(tp, arg, registry, &mut bindings)?;
    }
    let explicit_count = explicit_args.len();

    // Deduce the rest from the argument types. A parameter fixed
    // explicitly is concrete already; arguments against it go through
    // ordinary conversion ranking instead of deduction.
    for (param, arg) in candidate.params.iter().zip(args) {
        let Some(&index) = param_index.get(&param.data_type.base) else {
            continue;
        };
        if index < explicit_count {
            continue;
        }
        let tp = &template.params[index];
        match tp.kind {
            TemplateParamKind::Type => {
                // By-value deduction strips top-level cv from the argument.
                let deduced = arg.decayed();
                match bindings.type_for(tp.hash) {
                    Some(existing) if existing.base != deduced.base => {
                        return Err(format!(
                            "deduced conflicting types for parameter '{}' ('{}' vs '{}')",
                            tp.name,
                            type_name(registry, existing.base),
                            type_name(registry, deduced.base),
                        ));
                    }
                    Some(_) => {}
                    None => bindings.bind_type(&tp.name, tp.hash, deduced),
                }
            }
            TemplateParamKind::Value(_) => {
                return Err(format!(
                    "non-type parameter '{}' cannot be deduced from an argument type",
                    tp.name
                ));
            }
        }
    }

    for tp in &template.params {
        if !bindings.is_bound(tp.hash) {
            return Err(match tp.kind {
                TemplateParamKind::Type => {
                    format!("could not deduce template parameter '{}'", tp.name)
                }
                TemplateParamKind::Value(_) => {
                    format!("no constant supplied for non-type parameter '{}'", tp.name)
                }
            });
        }
    }

    let deleted_specialization = template.deleted_specializations.iter().any(|spec| {
        spec.len() == template.params.len()
            && template
                .params
                .iter()
                .zip(spec)
                .all(|(tp, want)| bindings.arg_for(tp.hash) == Some(want))
    });

    let params: Vec<Param> = candidate
        .params
        .iter()
        .map(|p| substitute_param(p, &bindings))
        .collect();
    let ret = resolve_return(candidate, &params, &bindings, registry)?;

    Ok(Instantiation {
        params,
        bindings,
        deleted_specialization,
        ret,
    })
}

fn bind_explicit(
    tp: &TemplateParam,
    arg: &TemplateArg,
    registry: &SignatureRegistry,
    bindings: &mut TemplateBindings,
) -> Result<(), String> {
    match (&tp.kind, arg) {
        (TemplateParamKind::Type, TemplateArg::Type(ty)) => {
            bindings.bind_type(&tp.name, tp.hash, ty.decayed());
            Ok(())
        }
        (TemplateParamKind::Type, TemplateArg::Value(_)) => {
            Err(format!("parameter '{}' expects a type argument", tp.name))
        }
        (TemplateParamKind::Value(declared), TemplateArg::Value(value)) => {
            check_value_binding(&tp.name, declared, value, registry)?;
            bindings.bind_value(&tp.name, tp.hash, value.clone());
            Ok(())
        }
        (TemplateParamKind::Value(_), TemplateArg::Type(_)) => Err(format!(
            "parameter '{}' expects a constant argument",
            tp.name
        )),
    }
}

/// Check a constant against a non-type parameter's declared type under
/// the registry's binding policy.
fn check_value_binding(
    name: &str,
    declared: &ValueParamType,
    value: &ConstValue,
    registry: &SignatureRegistry,
) -> Result<(), String> {
    let policy = registry.policy();
    let supplied = value.kind();
    if !policy.admits(supplied) {
        return Err(format!(
            "{supplied} constants are not admitted as template arguments"
        ));
    }

    let ValueParamType::Concrete(declared_type) = declared else {
        // `auto` adopts the supplied constant's own kind.
        return Ok(());
    };

    let Some(declared_kind) = declared_const_kind(declared_type, registry) else {
        return Err(format!(
            "parameter '{name}' has a type that cannot carry a constant"
        ));
    };
    if !policy.permits(declared_kind, supplied) {
        return Err(format!(
            "a {supplied} constant cannot bind parameter '{name}' of {declared_kind} kind"
        ));
    }

    // Enumerators and literals must also come from the declared type.
    match value {
        ConstValue::Enumerator { enum_type, .. } if *enum_type != declared_type.base => Err(
            format!("enumerator of the wrong enumeration for parameter '{name}'"),
        ),
        ConstValue::Aggregate { class_type, .. } if *class_type != declared_type.base => Err(
            format!("literal of the wrong class type for parameter '{name}'"),
        ),
        _ => Ok(()),
    }
}

/// The constant kind a declared non-type parameter type corresponds to.
fn declared_const_kind(dt: &DataType, registry: &SignatureRegistry) -> Option<ConstKind> {
    match registry.get_type(dt.base)? {
        TypeEntry::Primitive(kind) if kind.is_integral() => Some(ConstKind::Integral),
        TypeEntry::Primitive(kind) if kind.is_floating() => Some(ConstKind::FloatingPoint),
        TypeEntry::Primitive(PrimitiveKind::NullPtr) => Some(ConstKind::NullPointer),
        TypeEntry::Primitive(_) => None,
        TypeEntry::Enum(_) => Some(ConstKind::Enumeration),
        TypeEntry::Class(_) => Some(ConstKind::LiteralClass),
    }
}

fn substitute_param(param: &Param, bindings: &TemplateBindings) -> Param {
    match bindings.type_for(param.data_type.base) {
        Some(bound) => Param {
            name: param.name.clone(),
            data_type: DataType {
                base: bound.base,
                quals: param.data_type.quals,
            },
            default: param.default.clone(),
        },
        None => param.clone(),
    }
}

/// The instantiated return type. `auto` resolves to the common
/// arithmetic type of the instantiated parameter types.
fn resolve_return(
    candidate: &Candidate,
    params: &[Param],
    bindings: &TemplateBindings,
    registry: &SignatureRegistry,
) -> Result<DataType, String> {
    match &candidate.ret {
        ReturnSpec::Type(dt) => Ok(match bindings.type_for(dt.base) {
            Some(bound) => DataType {
                base: bound.base,
                quals: dt.quals,
            },
            None => *dt,
        }),
        ReturnSpec::Auto => {
            let mut kinds = params
                .iter()
                .map(|p| registry.primitive_kind(p.data_type.base));
            let Some(Some(first)) = kinds.next() else {
                return Err(format!(
                    "cannot resolve 'auto' return type of '{}'",
                    candidate.name
                ));
            };
            let mut common = first;
            for kind in kinds {
                common = kind
                    .and_then(|k| common_type(common, k))
                    .ok_or_else(|| {
                        format!("no common type for the parameters of '{}'", candidate.name)
                    })?;
            }
            Ok(DataType::simple(common.type_hash()))
        }
    }
}

fn type_name(registry: &SignatureRegistry, hash: TypeHash) -> String {
    registry
        .type_name(hash)
        .map(str::to_owned)
        .unwrap_or_else(|| hash.to_string())
}
