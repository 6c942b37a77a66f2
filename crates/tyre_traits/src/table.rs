//! In-memory trait and member table.
//!
//! The table is built once, then shared read-only (usually behind an `Arc`)
//! by every solver checking units of the same program.

use crate::context::{Candidate, TypeContext};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tyre_core::{DeclId, Name, NameTable};
use tyre_types::{LiteralKind, Type};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("trait '{0}' is declared twice")]
    DuplicateTrait(String),

    #[error("type '{0}' is declared twice")]
    DuplicateType(String),

    #[error("unknown trait '{0}'")]
    UnknownTrait(String),

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("declaration {0} is registered twice")]
    DuplicateDecl(DeclId),

    #[error("supertype of '{ty}' must be a declared nominal type")]
    InvalidSupertype { ty: String },

    #[error("making '{supertype}' a supertype of '{ty}' would create a cycle")]
    CyclicSupertype { ty: String, supertype: String },
}

#[derive(Debug, Default)]
struct TraitDecl {
    refines: Vec<Name>,
    requirements: Vec<(Name, Candidate)>,
}

#[derive(Debug, Default)]
struct TypeDecl {
    params: Vec<Name>,
    conformances: Vec<Name>,
    supertypes: Vec<Type>,
    members: Vec<(Name, Candidate)>,
}

/// Trait, type and member declarations of one program.
#[derive(Debug)]
pub struct TraitTable {
    names: NameTable,
    self_name: Name,
    traits: IndexMap<Name, TraitDecl>,
    types: IndexMap<Name, TypeDecl>,
    decls: FxHashSet<DeclId>,
    literal_defaults: FxHashMap<LiteralKind, Type>,
}

impl TraitTable {
    pub fn new(names: NameTable) -> Self {
        let self_name = names.intern_static("Self");
        Self {
            names,
            self_name,
            traits: IndexMap::new(),
            types: IndexMap::new(),
            decls: FxHashSet::default(),
            literal_defaults: FxHashMap::default(),
        }
    }

    /// The name standing for the conforming type inside trait requirements.
    pub fn self_name(&self) -> Name {
        self.self_name
    }

    pub fn has_trait(&self, name: Name) -> bool {
        self.traits.contains_key(&name)
    }

    pub fn has_type(&self, name: Name) -> bool {
        self.types.contains_key(&name)
    }

    /// Generic parameters of a declared type.
    pub fn type_params(&self, name: Name) -> Option<&[Name]> {
        self.types.get(&name).map(|decl| decl.params.as_slice())
    }

    fn text(&self, name: Name) -> String {
        self.names.resolve(name).to_string()
    }

    fn claim_decl(&mut self, decl: DeclId) -> Result<(), TableError> {
        if !self.decls.insert(decl) {
            return Err(TableError::DuplicateDecl(decl));
        }
        Ok(())
    }

    fn type_decl_mut(&mut self, name: Name) -> Result<&mut TypeDecl, TableError> {
        let text = self.text(name);
        self.types.get_mut(&name).ok_or(TableError::UnknownType(text))
    }

    fn check_trait(&self, name: Name) -> Result<(), TableError> {
        if self.traits.contains_key(&name) {
            Ok(())
        } else {
            Err(TableError::UnknownTrait(self.text(name)))
        }
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Declare a trait refining the already-declared traits `refines`.
    pub fn declare_trait(&mut self, name: Name, refines: &[Name]) -> Result<(), TableError> {
        if self.traits.contains_key(&name) {
            return Err(TableError::DuplicateTrait(self.text(name)));
        }
        for &parent in refines {
            self.check_trait(parent)?;
        }
        self.traits.insert(
            name,
            TraitDecl {
                refines: refines.to_vec(),
                requirements: Vec::new(),
            },
        );
        Ok(())
    }

    /// Declare a nominal type with generic parameters `params`.
    pub fn declare_type(&mut self, name: Name, params: &[Name]) -> Result<(), TableError> {
        if self.types.contains_key(&name) {
            return Err(TableError::DuplicateType(self.text(name)));
        }
        self.types.insert(
            name,
            TypeDecl {
                params: params.to_vec(),
                ..TypeDecl::default()
            },
        );
        Ok(())
    }

    pub fn add_conformance(&mut self, ty: Name, trait_name: Name) -> Result<(), TableError> {
        self.check_trait(trait_name)?;
        let decl = self.type_decl_mut(ty)?;
        if !decl.conformances.contains(&trait_name) {
            decl.conformances.push(trait_name);
        }
        Ok(())
    }

    /// Declare `supertype` as a direct supertype of `ty`. The supertype may
    /// mention `ty`'s generic parameters.
    pub fn add_supertype(&mut self, ty: Name, supertype: Type) -> Result<(), TableError> {
        let Type::Nominal { name: super_name, .. } = &supertype else {
            return Err(TableError::InvalidSupertype { ty: self.text(ty) });
        };
        let super_name = *super_name;
        if !self.types.contains_key(&super_name) {
            return Err(TableError::InvalidSupertype { ty: self.text(ty) });
        }
        if super_name == ty || self.inherits_from(super_name, ty) {
            return Err(TableError::CyclicSupertype {
                ty: self.text(ty),
                supertype: self.text(super_name),
            });
        }
        self.type_decl_mut(ty)?.supertypes.push(supertype);
        Ok(())
    }

    /// Add a non-generic member. `sig` may mention the type's parameters.
    pub fn add_member(&mut self, ty: Name, member: Name, decl: DeclId, sig: Type) -> Result<(), TableError> {
        self.add_generic_member(ty, member, Candidate::new(decl, sig))
    }

    /// Add a member with full control over its generic parameters and
    /// preference penalty.
    pub fn add_generic_member(&mut self, ty: Name, member: Name, candidate: Candidate) -> Result<(), TableError> {
        self.type_decl_mut(ty)?;
        for param in &candidate.generic_params {
            for &bound in &param.bounds {
                self.check_trait(bound)?;
            }
        }
        self.claim_decl(candidate.decl)?;
        self.type_decl_mut(ty)?.members.push((member, candidate));
        Ok(())
    }

    /// Add a requirement to a trait. `Self` in `sig` stands for the
    /// conforming type.
    pub fn add_requirement(&mut self, trait_name: Name, member: Name, decl: DeclId, sig: Type) -> Result<(), TableError> {
        self.check_trait(trait_name)?;
        self.claim_decl(decl)?;
        if let Some(t) = self.traits.get_mut(&trait_name) {
            t.requirements.push((member, Candidate::new(decl, sig)));
        }
        Ok(())
    }

    pub fn set_literal_default(&mut self, kind: LiteralKind, ty: Type) {
        self.literal_defaults.insert(kind, ty);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether `name` is declared as a (transitive) supertype of `ty`.
    fn inherits_from(&self, ty: Name, ancestor: Name) -> bool {
        let mut stack = vec![ty];
        let mut seen = FxHashSet::default();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(decl) = self.types.get(&current) else {
                continue;
            };
            for sup in &decl.supertypes {
                if let Type::Nominal { name, .. } = sup {
                    if *name == ancestor {
                        return true;
                    }
                    stack.push(*name);
                }
            }
        }
        false
    }

    /// `roots` and every trait they refine, in first-reached order.
    fn trait_closure(&self, roots: impl IntoIterator<Item = Name>) -> Vec<Name> {
        let mut out = Vec::new();
        let mut stack: Vec<Name> = roots.into_iter().collect();
        stack.reverse();
        while let Some(name) = stack.pop() {
            if out.contains(&name) {
                continue;
            }
            out.push(name);
            if let Some(decl) = self.traits.get(&name) {
                stack.extend(decl.refines.iter().rev().copied());
            }
        }
        out
    }

    /// Mapping from a nominal type's parameters to the arguments it was
    /// applied to. Empty when the arity does not match the declaration.
    fn argument_map(&self, decl: &TypeDecl, args: &[Type]) -> FxHashMap<Name, Type> {
        if decl.params.len() != args.len() {
            return FxHashMap::default();
        }
        decl.params.iter().copied().zip(args.iter().cloned()).collect()
    }

    /// Every trait a type satisfies, directly, by refinement, or through a
    /// supertype.
    fn conformances_of(&self, ty: &Type) -> Vec<Name> {
        match ty {
            Type::Nominal { name, .. } => {
                let Some(decl) = self.types.get(name) else {
                    return Vec::new();
                };
                let mut direct = decl.conformances.clone();
                for sup in self.supertypes(ty) {
                    for t in self.conformances_of(&sup) {
                        if !direct.contains(&t) {
                            direct.push(t);
                        }
                    }
                }
                self.trait_closure(direct)
            }
            Type::Existential(set) => self.trait_closure(set.iter()),
            _ => Vec::new(),
        }
    }

    /// Members declared on a nominal type or the nearest supertype that
    /// declares any.
    fn declared_members(&self, ty: &Type, name: Name) -> Vec<Candidate> {
        let Type::Nominal { name: type_name, args } = ty else {
            return Vec::new();
        };
        let Some(decl) = self.types.get(type_name) else {
            return Vec::new();
        };
        let map = self.argument_map(decl, args);
        let own: Vec<Candidate> = decl
            .members
            .iter()
            .filter(|(member, _)| *member == name)
            .map(|(_, candidate)| Candidate {
                ty: candidate.ty.substitute_params(&map),
                ..candidate.clone()
            })
            .collect();
        if !own.is_empty() {
            return own;
        }
        for sup in self.supertypes(ty) {
            let inherited = self.declared_members(&sup, name);
            if !inherited.is_empty() {
                return inherited;
            }
        }
        Vec::new()
    }

    fn requirements_for(&self, receiver: &Type, traits: &[Name], member: Name) -> Vec<Candidate> {
        let mut map = FxHashMap::default();
        map.insert(self.self_name, receiver.clone());
        let mut out: Vec<Candidate> = Vec::new();
        for trait_name in traits {
            let Some(decl) = self.traits.get(trait_name) else {
                continue;
            };
            for (name, candidate) in &decl.requirements {
                if *name == member && !out.iter().any(|c| c.decl == candidate.decl) {
                    out.push(Candidate {
                        ty: candidate.ty.substitute_params(&map),
                        ..candidate.clone()
                    });
                }
            }
        }
        out
    }
}

impl TypeContext for TraitTable {
    fn names(&self) -> &NameTable {
        &self.names
    }

    fn conforms(&self, ty: &Type, trait_name: Name) -> bool {
        match ty {
            Type::Error => true,
            Type::Literal(kind) => self.names.get(kind.expressible_by_trait()) == Some(trait_name),
            _ => self.conformances_of(ty).contains(&trait_name),
        }
    }

    /// Own members shadow supertype members, which shadow trait requirements.
    fn members(&self, ty: &Type, name: Name) -> Vec<Candidate> {
        let declared = self.declared_members(ty, name);
        if !declared.is_empty() {
            return declared;
        }
        match ty {
            Type::Nominal { .. } | Type::Existential(_) => {
                self.requirements_for(ty, &self.conformances_of(ty), name)
            }
            _ => Vec::new(),
        }
    }

    fn supertypes(&self, ty: &Type) -> Vec<Type> {
        let Type::Nominal { name, args } = ty else {
            return Vec::new();
        };
        let Some(decl) = self.types.get(name) else {
            return Vec::new();
        };
        let map = self.argument_map(decl, args);
        decl.supertypes
            .iter()
            .map(|sup| sup.substitute_params(&map))
            .collect()
    }

    fn default_literal_type(&self, kind: LiteralKind) -> Option<Type> {
        self.literal_defaults.get(&kind).cloned()
    }
}
