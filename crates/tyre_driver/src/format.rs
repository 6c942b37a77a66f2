//! JSON workspace format.
//!
//! ```json
//! {
//!   "config": { "solver": { "maxSteps": 1000 } },
//!   "environment": {
//!     "traits": [{ "name": "Equatable" }, { "name": "Comparable", "refines": ["Equatable"] }],
//!     "types": [{ "name": "Int", "conforms": ["Comparable"] },
//!               { "name": "Array", "params": ["T"],
//!                 "members": [{ "name": "len", "decl": 1, "type": "Int" }] }],
//!     "literalDefaults": { "integer": "Int" }
//!   },
//!   "units": [{
//!     "name": "main",
//!     "variables": 2,
//!     "constraints": [
//!       { "kind": "equality", "left": "?0", "right": "Array<Int>", "at": 1 },
//!       { "kind": "valueMember", "base": "?0", "member": "len", "type": "?1", "site": 2 }
//!     ]
//!   }]
//! }
//! ```
//!
//! Types are written in the notation of `tyre_syntax`. Traits must be
//! listed after the traits they refine; types may refer to each other in
//! any order.

use crate::error::DriverError;
use crate::workspace::{Unit, Workspace};
use serde::Deserialize;
use std::collections::BTreeMap;
use tyre_core::{DeclId, Locator, Name, NameTable, NodeId};
use tyre_options::CheckerConfig;
use tyre_solver::{Constraint, ConstraintKind, ConstraintSystem, Minterm, SizePredicate};
use tyre_syntax::parse_type_with_params;
use tyre_traits::{Candidate, GenericParam, TraitTable};
use tyre_types::{LiteralKind, Type};

/// Largest `variables` count a unit may declare. The solver allocates a
/// slot per variable up front.
pub const MAX_UNIT_VARIABLES: u32 = 1 << 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceFile {
    #[serde(default)]
    pub config: Option<CheckerConfig>,
    #[serde(default)]
    pub environment: EnvironmentFile,
    #[serde(default)]
    pub units: Vec<UnitFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvironmentFile {
    #[serde(default)]
    pub traits: Vec<TraitFile>,
    #[serde(default)]
    pub types: Vec<TypeFile>,
    /// Literal kind keyword to type.
    #[serde(default)]
    pub literal_defaults: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TraitFile {
    pub name: String,
    #[serde(default)]
    pub refines: Vec<String>,
    /// Signatures may use `Self` for the conforming type.
    #[serde(default)]
    pub requirements: Vec<DeclFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypeFile {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub conforms: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub members: Vec<DeclFile>,
}

/// A member, requirement or overload candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeclFile {
    #[serde(default)]
    pub name: Option<String>,
    pub decl: u32,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub generics: Vec<GenericFile>,
    #[serde(default)]
    pub penalty: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenericFile {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnitFile {
    pub name: String,
    /// Number of free variables; the unit may use `?0 .. ?(variables-1)`.
    #[serde(default)]
    pub variables: u32,
    #[serde(default)]
    pub constraints: Vec<ConstraintFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintFile {
    #[serde(flatten)]
    pub kind: KindFile,
    /// Anchor node of the constraint's locator.
    #[serde(default)]
    pub at: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KindFile {
    Equality {
        left: String,
        right: String,
    },
    Subtyping {
        sub: String,
        sup: String,
    },
    Conformance {
        #[serde(rename = "type")]
        ty: String,
        traits: Vec<String>,
    },
    Conversion {
        #[serde(rename = "type")]
        ty: String,
        literal: String,
    },
    ReturnBinding {
        value: String,
        declared: String,
    },
    ValueMember {
        base: String,
        member: String,
        #[serde(rename = "type")]
        ty: String,
        site: u32,
    },
    Overload {
        #[serde(rename = "type")]
        ty: String,
        name: String,
        site: u32,
        candidates: Vec<DeclFile>,
    },
    Size {
        id: u32,
        #[serde(default)]
        description: String,
    },
    Disjunction {
        minterms: Vec<MintermFile>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MintermFile {
    pub constraints: Vec<ConstraintFile>,
    #[serde(default)]
    pub penalty: u32,
}

// ============================================================================
// Lowering
// ============================================================================

fn parse(names: &NameTable, text: &str, params: &[Name]) -> Result<Type, DriverError> {
    parse_type_with_params(text, names, params).map_err(|e| DriverError::syntax(text, e))
}

fn literal_kind(keyword: &str) -> Result<LiteralKind, DriverError> {
    LiteralKind::from_keyword(keyword).ok_or_else(|| DriverError::UnknownLiteral(keyword.to_string()))
}

/// Build a candidate whose signature may use `scope` and its own generics.
fn candidate(names: &NameTable, decl: &DeclFile, scope: &[Name]) -> Result<Candidate, DriverError> {
    let generics: Vec<GenericParam> = decl
        .generics
        .iter()
        .map(|g| GenericParam::bounded(names.intern(&g.name), g.bounds.iter().map(|b| names.intern(b)).collect()))
        .collect();
    let mut params = scope.to_vec();
    params.extend(generics.iter().map(|g| g.name));
    let ty = parse(names, &decl.ty, &params)?;
    Ok(Candidate::new(DeclId(decl.decl), ty)
        .with_penalty(decl.penalty)
        .with_generic_params(generics))
}

fn member_name(names: &NameTable, decl: &DeclFile) -> Name {
    names.intern(decl.name.as_deref().unwrap_or_default())
}

fn build_table(names: &NameTable, env: &EnvironmentFile) -> Result<TraitTable, DriverError> {
    let mut table = TraitTable::new(names.clone());

    for t in &env.traits {
        let refines: Vec<Name> = t.refines.iter().map(|r| names.intern(r)).collect();
        table.declare_trait(names.intern(&t.name), &refines)?;
    }
    for t in &env.types {
        let params: Vec<Name> = t.params.iter().map(|p| names.intern(p)).collect();
        table.declare_type(names.intern(&t.name), &params)?;
    }

    for t in &env.types {
        let name = names.intern(&t.name);
        let params: Vec<Name> = t.params.iter().map(|p| names.intern(p)).collect();
        for c in &t.conforms {
            table.add_conformance(name, names.intern(c))?;
        }
        for s in &t.supertypes {
            table.add_supertype(name, parse(names, s, &params)?)?;
        }
        for m in &t.members {
            table.add_generic_member(name, member_name(names, m), candidate(names, m, &params)?)?;
        }
    }

    let self_scope = [table.self_name()];
    for t in &env.traits {
        let name = names.intern(&t.name);
        for r in &t.requirements {
            let c = candidate(names, r, &self_scope)?;
            table.add_requirement(name, member_name(names, r), c.decl, c.ty)?;
        }
    }

    for (keyword, ty) in &env.literal_defaults {
        table.set_literal_default(literal_kind(keyword)?, parse(names, ty, &[])?);
    }
    Ok(table)
}

struct UnitLowering<'a> {
    names: &'a NameTable,
    unit: &'a UnitFile,
}

impl UnitLowering<'_> {
    fn ty(&self, text: &str) -> Result<Type, DriverError> {
        let ty = parse(self.names, text, &[])?;
        self.check_vars(&ty)?;
        Ok(ty)
    }

    fn check_vars(&self, ty: &Type) -> Result<(), DriverError> {
        let mut vars = Vec::new();
        ty.free_vars(&mut vars);
        match vars.into_iter().find(|v| v.0 >= self.unit.variables) {
            Some(var) => Err(DriverError::UnknownVariable {
                unit: self.unit.name.clone(),
                var: var.to_string(),
                declared: self.unit.variables,
            }),
            None => Ok(()),
        }
    }

    fn constraint(&self, file: &ConstraintFile) -> Result<Constraint, DriverError> {
        let kind = match &file.kind {
            KindFile::Equality { left, right } => ConstraintKind::Equality(self.ty(left)?, self.ty(right)?),
            KindFile::Subtyping { sub, sup } => ConstraintKind::Subtyping(self.ty(sub)?, self.ty(sup)?),
            KindFile::Conformance { ty, traits } => ConstraintKind::Conformance(
                self.ty(ty)?,
                tyre_types::TraitSet::new(traits.iter().map(|t| self.names.intern(t))),
            ),
            KindFile::Conversion { ty, literal } => ConstraintKind::Conversion(self.ty(ty)?, literal_kind(literal)?),
            KindFile::ReturnBinding { value, declared } => {
                ConstraintKind::ReturnBinding(self.ty(value)?, self.ty(declared)?)
            }
            KindFile::ValueMember { base, member, ty, site } => ConstraintKind::ValueMember {
                base: self.ty(base)?,
                member: self.names.intern(member),
                ty: self.ty(ty)?,
                site: NodeId(*site),
            },
            KindFile::Overload {
                ty,
                name,
                site,
                candidates,
            } => {
                let candidates = candidates
                    .iter()
                    .map(|c| {
                        let c = candidate(self.names, c, &[])?;
                        self.check_vars(&c.ty)?;
                        Ok(c)
                    })
                    .collect::<Result<Vec<_>, DriverError>>()?;
                ConstraintKind::Overload {
                    ty: self.ty(ty)?,
                    name: self.names.intern(name),
                    site: NodeId(*site),
                    candidates,
                }
            }
            KindFile::Size { id, description } => ConstraintKind::Size(SizePredicate {
                id: *id,
                description: description.clone(),
            }),
            KindFile::Disjunction { minterms } => ConstraintKind::Disjunction(
                minterms
                    .iter()
                    .map(|m| {
                        let constraints = m
                            .constraints
                            .iter()
                            .map(|c| self.constraint(c))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(Minterm::new(constraints, m.penalty))
                    })
                    .collect::<Result<Vec<_>, DriverError>>()?,
            ),
        };
        Ok(Constraint {
            kind,
            locator: file.at.map(|at| Locator::new(NodeId(at))),
        })
    }

    fn system(&self) -> Result<ConstraintSystem, DriverError> {
        if self.unit.variables > MAX_UNIT_VARIABLES {
            return Err(DriverError::TooManyVariables {
                unit: self.unit.name.clone(),
                declared: self.unit.variables,
                max: MAX_UNIT_VARIABLES,
            });
        }
        let mut system = ConstraintSystem::with_vars(self.unit.variables);
        for c in &self.unit.constraints {
            system.insert(self.constraint(c)?);
        }
        Ok(system)
    }
}

impl WorkspaceFile {
    /// Resolve names, parse types and build the trait table.
    pub fn lower(&self) -> Result<Workspace, DriverError> {
        let config = self.config.clone().unwrap_or_default();
        config.validate()?;
        let names = NameTable::new();
        let table = build_table(&names, &self.environment)?;
        let mut workspace = Workspace::new(table, config);
        for unit in &self.units {
            let lowering = UnitLowering { names: &names, unit };
            workspace.add_unit(Unit {
                name: unit.name.clone(),
                system: lowering.system()?,
            });
        }
        Ok(workspace)
    }
}
