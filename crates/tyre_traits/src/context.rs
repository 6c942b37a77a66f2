use tyre_core::{DeclId, Name, NameTable};
use tyre_types::{LiteralKind, Type};

/// A generic parameter of a declaration, with the traits it must conform to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericParam {
    pub name: Name,
    pub bounds: Vec<Name>,
}

impl GenericParam {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            bounds: Vec::new(),
        }
    }

    pub fn bounded(name: Name, bounds: Vec<Name>) -> Self {
        Self { name, bounds }
    }
}

/// A declaration a name may refer to.
///
/// `ty` is the declaration's signature. Generic parameters appear in it as
/// [`Type::Param`]; the solver replaces them with fresh variables each time
/// the candidate is tried.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub decl: DeclId,
    pub ty: Type,
    pub generic_params: Vec<GenericParam>,
    /// Preference rank; lower is preferred.
    pub penalty: u32,
}

impl Candidate {
    pub fn new(decl: DeclId, ty: Type) -> Self {
        Self {
            decl,
            ty,
            generic_params: Vec::new(),
            penalty: 0,
        }
    }

    pub fn with_penalty(mut self, penalty: u32) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn with_generic_params(mut self, generic_params: Vec<GenericParam>) -> Self {
        self.generic_params = generic_params;
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

/// Read-only queries the solver makes about declarations.
///
/// Implementations must be safe to share between solver instances running on
/// different threads, and must answer the same query the same way for the
/// whole checking run.
pub trait TypeContext: Send + Sync {
    /// The interner every name handed to or returned by this context lives in.
    fn names(&self) -> &NameTable;

    /// Whether `ty` satisfies `trait_name`.
    fn conforms(&self, ty: &Type, trait_name: Name) -> bool;

    /// Declarations named `name` reachable from a value of type `ty`.
    fn members(&self, ty: &Type, name: Name) -> Vec<Candidate>;

    /// The direct supertypes of `ty`, with generic arguments substituted.
    fn supertypes(&self, ty: &Type) -> Vec<Type>;

    /// The type a literal of `kind` takes when nothing else constrains it.
    fn default_literal_type(&self, kind: LiteralKind) -> Option<Type>;

    /// Whether a literal of `kind` can be used where `ty` is expected.
    fn is_literal_expressible(&self, ty: &Type, kind: LiteralKind) -> bool {
        if *ty == Type::Literal(kind) {
            return true;
        }
        match self.names().get(kind.expressible_by_trait()) {
            Some(trait_name) => self.conforms(ty, trait_name),
            None => false,
        }
    }
}
