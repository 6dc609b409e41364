//! SignatureRegistry - the static declaration surface.
//!
//! This module provides [`SignatureRegistry`], central storage for every
//! type and candidate a program declares before any call site is checked.
//!
//! # Storage Model
//!
//! - **Types**: all type entries (`TypeEntry`) in a single map by
//!   `TypeHash`, with a name index for declaration parsing and display.
//! - **Candidates**: overload sets in a single map keyed by qualified name
//!   (`add`, `OverloadClass::get_number`); each `Vec` holds the overloads
//!   of one name.
//!
//! # Phase Model
//!
//! The registry is not thread-safe and does not need to be: it is
//! populated single-threaded during the registration phase and is
//! effectively read-only once call sites start resolving against it.
//!
//! # Registration invariants
//!
//! Everything that can be rejected statically is rejected here, before any
//! call site exists:
//!
//! - a candidate whose signature identity collides with a prior one is a
//!   duplicate; if the two differ only in return type, the error spells
//!   out that return types do not differentiate overloads;
//! - trailing-defaults violations never get this far (the candidate
//!   builder rejects them);
//! - specializations can only be deleted on a known template with a
//!   matching argument count.

use rustc_hash::FxHashMap;

use overmatch_core::{
    BindingPolicy, Candidate, ClassEntry, DataType, EnumEntry, GuardFn, Param, PrimitiveKind,
    RegistrationError, ReturnSpec, TemplateArg, TemplateParamKind, TypeEntry, TypeHash,
    ValueParamType,
};

/// Unified type and candidate registry.
///
/// Holds the declared world one resolution run works against: type
/// entries by hash plus overload sets by qualified name.
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    /// Types by hash (primary storage).
    types: FxHashMap<TypeHash, TypeEntry>,

    /// Name index: qualified type name -> hash.
    type_names: FxHashMap<String, TypeHash>,

    /// Overload sets by qualified name.
    candidates: FxHashMap<String, Vec<Candidate>>,

    /// Non-type template parameter binding rules for this registry.
    policy: BindingPolicy,
}

impl SignatureRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every C++ fundamental type pre-registered.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        for kind in PrimitiveKind::ALL {
            registry
                .types
                .insert(kind.type_hash(), TypeEntry::Primitive(kind));
            registry
                .type_names
                .insert(kind.name().to_owned(), kind.type_hash());
        }
        registry
    }

    /// Replace the non-type binding policy.
    pub fn with_policy(mut self, policy: BindingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BindingPolicy {
        self.policy
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// Register a class type.
    pub fn register_class(&mut self, class: ClassEntry) -> Result<TypeHash, RegistrationError> {
        let hash = class.type_hash();
        if self.types.contains_key(&hash) {
            return Err(RegistrationError::DuplicateType(class.name));
        }
        self.type_names.insert(class.name.clone(), hash);
        self.types.insert(hash, TypeEntry::Class(class));
        Ok(hash)
    }

    /// Register an enumeration type.
    pub fn register_enum(&mut self, entry: EnumEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash();
        if self.types.contains_key(&hash) {
            return Err(RegistrationError::DuplicateType(entry.name));
        }
        self.type_names.insert(entry.name.clone(), hash);
        self.types.insert(hash, TypeEntry::Enum(entry));
        Ok(hash)
    }

    /// Look up a type entry by hash.
    pub fn get_type(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    /// Look up a type hash by its qualified name.
    pub fn lookup_type(&self, name: &str) -> Option<TypeHash> {
        self.type_names.get(name).copied()
    }

    /// The fundamental kind behind a hash, when it is one.
    pub fn primitive_kind(&self, hash: TypeHash) -> Option<PrimitiveKind> {
        self.types.get(&hash).and_then(TypeEntry::as_primitive)
    }

    /// A type's display name, when the hash is registered.
    pub fn type_name(&self, hash: TypeHash) -> Option<&str> {
        self.types.get(&hash).map(TypeEntry::name)
    }

    // ==========================================================================
    // Candidates
    // ==========================================================================

    /// Register a candidate into its overload set.
    ///
    /// Rejects signature collisions. Two candidates collide when name,
    /// parameter types, owner, and receiver qualifiers all agree; if their
    /// return types differ the error is [`RegistrationError::ReturnTypeOverload`],
    /// because a return type alone can never differentiate overloads.
    pub fn register(&mut self, candidate: Candidate) -> Result<TypeHash, RegistrationError> {
        self.check_signature_types(&candidate)?;
        let key = self.qualified_key(&candidate)?;

        if let Some(set) = self.candidates.get(&key)
            && let Some(existing) = set.iter().find(|c| c.sig_hash == candidate.sig_hash)
        {
            if existing.ret != candidate.ret {
                return Err(RegistrationError::ReturnTypeOverload {
                    name: candidate.name.clone(),
                    params: self.display_params(&candidate),
                });
            }
            return Err(RegistrationError::DuplicateSignature {
                signature: self.display_candidate(existing),
            });
        }

        let hash = candidate.sig_hash;
        self.candidates.entry(key).or_default().push(candidate);
        Ok(hash)
    }

    /// The overload set registered under a free-function name.
    pub fn overloads(&self, name: &str) -> Option<&[Candidate]> {
        self.candidates.get(name).map(Vec::as_slice)
    }

    /// The overload set registered under `Owner::name`.
    pub fn methods(&self, owner: TypeHash, name: &str) -> Option<&[Candidate]> {
        let owner_name = self.type_name(owner)?;
        self.candidates
            .get(&format!("{owner_name}::{name}"))
            .map(Vec::as_slice)
    }

    /// Mark the specialization of template `name` for `args` as deleted.
    pub fn delete_specialization(
        &mut self,
        name: &str,
        args: Vec<TemplateArg>,
    ) -> Result<(), RegistrationError> {
        let set = self
            .candidates
            .get_mut(name)
            .ok_or_else(|| RegistrationError::UnknownTemplate(name.to_owned()))?;

        let mut saw_non_template = false;
        for candidate in set.iter_mut() {
            let Some(template) = candidate.template.as_mut() else {
                saw_non_template = true;
                continue;
            };
            if template.params.len() != args.len() {
                return Err(RegistrationError::SpecializationArityMismatch {
                    template: name.to_owned(),
                    expected: template.params.len(),
                    found: args.len(),
                });
            }
            template.deleted_specializations.push(args);
            return Ok(());
        }

        if saw_non_template {
            Err(RegistrationError::NotATemplate(name.to_owned()))
        } else {
            Err(RegistrationError::UnknownTemplate(name.to_owned()))
        }
    }

    /// Attach an instantiation guard to template `name`.
    pub fn attach_guard(&mut self, name: &str, guard: GuardFn) -> Result<(), RegistrationError> {
        let set = self
            .candidates
            .get_mut(name)
            .ok_or_else(|| RegistrationError::UnknownTemplate(name.to_owned()))?;

        let mut attached = false;
        for candidate in set.iter_mut() {
            if let Some(template) = candidate.template.as_mut() {
                template.guard = Some(guard);
                attached = true;
            }
        }
        if attached {
            Ok(())
        } else {
            Err(RegistrationError::NotATemplate(name.to_owned()))
        }
    }

    fn qualified_key(&self, candidate: &Candidate) -> Result<String, RegistrationError> {
        match candidate.owner {
            None => Ok(candidate.name.clone()),
            Some(owner) => {
                let entry = self.types.get(&owner).ok_or_else(|| {
                    RegistrationError::TypeNotFound(owner.to_string())
                })?;
                if !entry.is_class() {
                    return Err(RegistrationError::NotAClass {
                        owner: entry.name().to_owned(),
                        name: candidate.name.clone(),
                    });
                }
                Ok(format!("{}::{}", entry.name(), candidate.name))
            }
        }
    }

    /// Every type a signature mentions must be registered, unless it is
    /// one of the candidate's own template parameters.
    fn check_signature_types(&self, candidate: &Candidate) -> Result<(), RegistrationError> {
        let is_template_param = |hash: TypeHash| {
            candidate
                .template
                .as_ref()
                .is_some_and(|t| t.params.iter().any(|p| p.hash == hash))
        };

        let check = |hash: TypeHash| -> Result<(), RegistrationError> {
            if self.types.contains_key(&hash) || is_template_param(hash) {
                Ok(())
            } else {
                Err(RegistrationError::TypeNotFound(hash.to_string()))
            }
        };

        for param in &candidate.params {
            check(param.data_type.base)?;
        }
        if let ReturnSpec::Type(ret) = candidate.ret {
            check(ret.base)?;
        }
        if let Some(template) = &candidate.template {
            for tp in &template.params {
                if let TemplateParamKind::Value(ValueParamType::Concrete(dt)) = tp.kind {
                    check(dt.base)?;
                }
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Display
    // ==========================================================================

    /// Render a data type with registered names, e.g. `const int`.
    pub fn display_type(&self, data_type: &DataType) -> String {
        self.display_type_in(data_type, None)
    }

    /// Render a comma-separated argument type list.
    pub fn display_args(&self, args: &[DataType]) -> String {
        args.iter()
            .map(|a| self.display_type(a))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render a candidate the way a compiler diagnostic would, e.g.
    /// `int add(int, int)`, `T max<T>(T, T)`, or
    /// `int OverloadClass::get_number() const`.
    pub fn display_candidate(&self, candidate: &Candidate) -> String {
        let mut out = String::new();

        match candidate.ret {
            ReturnSpec::Type(ret) => out.push_str(&self.display_type_in(&ret, Some(candidate))),
            ReturnSpec::Auto => out.push_str("auto"),
        }
        out.push(' ');

        if let Some(owner) = candidate.owner
            && let Some(owner_name) = self.type_name(owner)
        {
            out.push_str(owner_name);
            out.push_str("::");
        }
        out.push_str(&candidate.name);

        if let Some(template) = &candidate.template {
            out.push('<');
            for (i, tp) in template.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match tp.kind {
                    TemplateParamKind::Type => out.push_str(&tp.name),
                    TemplateParamKind::Value(ValueParamType::Deduced) => {
                        out.push_str("auto ");
                        out.push_str(&tp.name);
                    }
                    TemplateParamKind::Value(ValueParamType::Concrete(dt)) => {
                        out.push_str(&self.display_type_in(&dt, Some(candidate)));
                        out.push(' ');
                        out.push_str(&tp.name);
                    }
                }
            }
            out.push('>');
        }

        out.push('(');
        out.push_str(&self.display_params(candidate));
        out.push(')');

        if let Some(quals) = candidate.receiver_quals
            && !quals.is_empty()
        {
            out.push(' ');
            out.push_str(&quals.to_string());
        }
        if candidate.is_deleted {
            out.push_str(" = delete");
        }
        out
    }

    /// Render the tied candidates of an ambiguity, separated the way the
    /// error message expects.
    pub fn display_candidate_list(&self, candidates: &[&Candidate]) -> String {
        candidates
            .iter()
            .map(|c| format!("'{}'", self.display_candidate(c)))
            .collect::<Vec<_>>()
            .join(" and ")
    }

    fn display_params(&self, candidate: &Candidate) -> String {
        let mut parts: Vec<String> = candidate
            .params
            .iter()
            .map(|p| self.display_param(p, candidate))
            .collect();
        if candidate.is_variadic {
            parts.push("...".to_owned());
        }
        parts.join(", ")
    }

    fn display_param(&self, param: &Param, candidate: &Candidate) -> String {
        let mut out = self.display_type_in(&param.data_type, Some(candidate));
        if let Some(default) = &param.default {
            out.push_str(" = ");
            out.push_str(&default.to_string());
        }
        out
    }

    /// Type display that also knows the candidate's template parameter
    /// names, so `T` renders as `T` and not as a bare hash.
    fn display_type_in(&self, data_type: &DataType, candidate: Option<&Candidate>) -> String {
        let base = candidate
            .and_then(|c| c.template_param_name(data_type.base))
            .map(str::to_owned)
            .or_else(|| self.type_name(data_type.base).map(str::to_owned))
            .unwrap_or_else(|| data_type.base.to_string());
        if data_type.quals.is_empty() {
            base
        } else {
            format!("{} {}", data_type.quals, base)
        }
    }
}
