//! The search engine.
//!
//! Constraints are simplified in precedence order until only branch points
//! (overloads and disjunctions) remain. The engine then picks the branch
//! point with the fewest alternatives and tries them in preference order.
//! Backtracking is an explicit stack of frames; each frame owns a snapshot
//! of the substitution store and a copy of the work set as it was when the
//! branch was taken.
//!
//! Every complete solution is recorded. Alternatives whose penalty exceeds
//! the best complete solution are pruned, so the search only continues past
//! the first solution to find ties.

use crate::constraint::{Constraint, ConstraintKind, Precedence, SizePredicate};
use crate::error::{AbortReason, RejectedCandidate, Relation, SolveError, SolveFailure};
use crate::simplify::{unify_failure, Step};
use crate::solution::Solution;
use crate::system::ConstraintSystem;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::{debug, trace};
use tyre_core::{DeclId, Locator, Name, NodeId, PathElement};
use tyre_diagnostics::{messages, Diagnostic};
use tyre_options::SolverOptions;
use tyre_traits::{Candidate, TypeContext};
use tyre_types::{Substitution, TraitSet, Type, TypeVar};

// ============================================================================
// Work Set
// ============================================================================

/// A constraint waiting to be processed. The ordinal is the order in which
/// the constraint entered the system; it breaks precedence ties.
#[derive(Debug, Clone)]
pub(crate) struct Goal {
    pub(crate) ordinal: u64,
    pub(crate) constraint: Constraint,
}

impl Goal {
    fn key(&self) -> (Precedence, u64) {
        (self.constraint.kind.precedence(), self.ordinal)
    }
}

impl PartialEq for Goal {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Goal {}

impl PartialOrd for Goal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Goal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A goal that could not make progress, with the variables it waits on.
#[derive(Debug, Clone)]
struct Deferred {
    goal: Goal,
    watch: Vec<TypeVar>,
}

/// The declaration chosen for a reference site.
#[derive(Debug, Clone)]
pub(crate) struct Choice {
    pub(crate) decl: DeclId,
    pub(crate) name: Name,
    pub(crate) signature: Type,
    pub(crate) locator: Option<Locator>,
}

/// Everything a search path has accumulated besides the substitution.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkSet {
    fresh: BinaryHeap<Reverse<Goal>>,
    stale: Vec<Deferred>,
    branches: Vec<Goal>,
    next_ordinal: u64,
    pub(crate) penalty: u32,
    pub(crate) generic_choices: u32,
    pub(crate) conversions: u32,
    pub(crate) choices: IndexMap<NodeId, Choice>,
    pub(crate) predicates: Vec<SizePredicate>,
    pub(crate) warnings: Vec<Diagnostic>,
    /// Number of constraints discharged on this path.
    pub(crate) progress: u32,
}

impl WorkSet {
    pub(crate) fn push(&mut self, constraint: Constraint) {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.fresh.push(Reverse(Goal { ordinal, constraint }));
    }

    fn pop(&mut self) -> Option<Goal> {
        self.fresh.pop().map(|Reverse(goal)| goal)
    }

    fn defer(&mut self, goal: Goal, watch: Vec<TypeVar>) {
        self.stale.push(Deferred { goal, watch });
    }

    /// Requeue every deferred goal one of whose watched variables has been
    /// bound or merged into another class.
    fn wake(&mut self, subst: &Substitution) {
        let (woken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.stale)
            .into_iter()
            .partition(|d| d.watch.iter().any(|&w| subst.probe(w) != Type::Var(w)));
        self.stale = kept;
        for deferred in woken {
            self.fresh.push(Reverse(deferred.goal));
        }
    }

    /// Remove the branch point with the fewest alternatives, earliest first.
    fn take_branch(&mut self) -> Option<Goal> {
        let index = self
            .branches
            .iter()
            .enumerate()
            .min_by_key(|(_, g)| (g.constraint.kind.alternative_count(), g.ordinal))
            .map(|(i, _)| i)?;
        Some(self.branches.remove(index))
    }

    /// Turn the earliest deferred subtyping constraint into an equality. A
    /// literal on the subtype side becomes a conversion instead, so the
    /// literal pseudo-type never escapes as a binding.
    fn weaken(&mut self, subst: &Substitution) -> bool {
        let Some(index) = self
            .stale
            .iter()
            .enumerate()
            .filter(|(_, d)| {
                matches!(
                    d.goal.constraint.kind,
                    ConstraintKind::Subtyping(..) | ConstraintKind::ReturnBinding(..)
                )
            })
            .min_by_key(|(_, d)| d.goal.ordinal)
            .map(|(i, _)| i)
        else {
            return false;
        };
        let Constraint { kind, locator } = self.stale.remove(index).goal.constraint;
        let kind = match kind {
            ConstraintKind::Subtyping(l, r) | ConstraintKind::ReturnBinding(l, r) => {
                let resolved = match &l {
                    Type::Var(v) => subst.probe(*v),
                    other => other.clone(),
                };
                match resolved {
                    Type::Literal(literal) => {
                        trace!(literal = literal.keyword(), "weaken literal subtyping to conversion");
                        ConstraintKind::Conversion(r, literal)
                    }
                    _ => {
                        trace!("weaken subtyping to equality");
                        ConstraintKind::Equality(l, r)
                    }
                }
            }
            other => other,
        };
        self.push(Constraint { kind, locator });
        true
    }

    fn stale_in_order(&self) -> Vec<&Deferred> {
        let mut stale: Vec<&Deferred> = self.stale.iter().collect();
        stale.sort_by_key(|d| d.goal.ordinal);
        stale
    }
}

// ============================================================================
// Search State
// ============================================================================

#[derive(Debug, Clone)]
struct Failure {
    error: SolveError,
    progress: u32,
}

#[derive(Debug)]
struct Attempt {
    alternative: usize,
    failure: Failure,
}

struct Frame {
    snapshot: tyre_types::Snapshot,
    base: WorkSet,
    branch: Goal,
    /// Alternative indices in the order they are tried.
    order: Vec<usize>,
    next: usize,
    current: usize,
    attempts: Vec<Attempt>,
    /// Some alternative below this frame reached a complete solution.
    solved: bool,
}

struct Found {
    penalty: u32,
    generic_choices: u32,
    conversions: u32,
    bindings: Vec<Type>,
    choices: IndexMap<NodeId, Choice>,
    predicates: Vec<SizePredicate>,
    warnings: Vec<Diagnostic>,
}

impl Found {
    fn rank(&self) -> (u32, u32, u32) {
        (self.penalty, self.generic_choices, self.conversions)
    }

    fn same_assignment(&self, other: &Found) -> bool {
        self.bindings == other.bindings
            && self.choices.len() == other.choices.len()
            && self
                .choices
                .iter()
                .all(|(site, c)| other.choices.get(site).map(|o| o.decl) == Some(c.decl))
    }
}

#[derive(Default)]
struct Search {
    frames: Vec<Frame>,
    found: Vec<Found>,
    root_failure: Option<Failure>,
    penalty_pruned: bool,
    partial: Option<Vec<Type>>,
}

impl Search {
    fn best_penalty(&self) -> Option<u32> {
        self.found.iter().map(|f| f.penalty).min()
    }

    /// Attribute a failed path to the innermost open frame.
    fn fail(&mut self, failure: Failure) {
        debug!(error = %failure.error, progress = failure.progress, "path failed");
        match self.frames.last_mut() {
            Some(frame) => frame.attempts.push(Attempt {
                alternative: frame.current,
                failure,
            }),
            None => {
                if self.root_failure.is_none() {
                    self.root_failure = Some(failure);
                }
            }
        }
    }
}

enum Outcome {
    Solved,
    Failed(SolveError),
    Branch(Goal),
}

// ============================================================================
// Solver
// ============================================================================

/// Solves the constraint system of one unit.
///
/// A solver is used once: [`Solver::solve`] consumes it.
pub struct Solver<'a> {
    pub(crate) ctx: &'a dyn TypeContext,
    options: SolverOptions,
    pub(crate) subst: Substitution,
    var_count: u32,
    steps: u64,
}

impl<'a> Solver<'a> {
    pub fn new(ctx: &'a dyn TypeContext, options: SolverOptions) -> Self {
        Self {
            ctx,
            options,
            subst: Substitution::new(),
            var_count: 0,
            steps: 0,
        }
    }

    pub fn solve(mut self, system: &ConstraintSystem) -> Result<Solution, SolveFailure> {
        self.var_count = system.var_count();
        self.subst = Substitution::with_vars(self.var_count);
        debug!(
            constraints = system.len(),
            vars = self.var_count,
            max_steps = self.options.max_steps,
            "solve"
        );

        let errors = self.validate(system);
        if !errors.is_empty() {
            return Err(SolveFailure {
                errors,
                partial: self.current_bindings(),
            });
        }
        for (var, ty) in system.seeds() {
            if let Err(error) = self.subst.bind(*var, ty.clone()) {
                return Err(SolveFailure {
                    errors: vec![unify_failure(error, Relation::Equal, None)],
                    partial: self.current_bindings(),
                });
            }
        }

        let mut work = WorkSet::default();
        for constraint in system.constraints() {
            work.push(constraint.clone());
        }

        let mut search = Search::default();
        loop {
            let outcome = match self.run(&mut work) {
                Ok(outcome) => outcome,
                Err(abort) => return Err(self.abort(search, abort)),
            };
            match outcome {
                Outcome::Solved => self.record(&mut search, &work),
                Outcome::Failed(error) => search.fail(Failure {
                    error,
                    progress: work.progress,
                }),
                Outcome::Branch(goal) => {
                    if search.partial.is_none() {
                        search.partial = Some(self.current_bindings());
                    }
                    self.push_frame(&mut search, work, goal);
                }
            }
            match self.next_alternative(&mut search) {
                Ok(Some(next)) => work = next,
                Ok(None) => break,
                Err(abort) => return Err(self.abort(search, abort)),
            }
        }
        self.finish(search)
    }

    pub(crate) fn tick(&mut self) -> Result<(), SolveError> {
        self.steps += 1;
        if self.steps > self.options.max_steps {
            debug!(steps = self.options.max_steps, "step limit reached");
            return Err(SolveError::SearchAborted {
                reason: AbortReason::StepLimit(self.options.max_steps),
                locator: None,
            });
        }
        Ok(())
    }

    fn current_bindings(&self) -> Vec<Type> {
        (0..self.var_count)
            .map(|i| self.subst.apply(&Type::Var(TypeVar(i))))
            .collect()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn operand_problem(&self, ty: &Type, allow_params: bool) -> Option<String> {
        if ty.has_placeholder() {
            return Some("unresolved placeholder type as operand".to_string());
        }
        if !allow_params && ty.has_params() {
            return Some("generic parameter outside a declaration".to_string());
        }
        let mut vars = Vec::new();
        ty.free_vars(&mut vars);
        vars.into_iter()
            .find(|v| v.0 >= self.var_count)
            .map(|v| format!("unknown type variable {}", v))
    }

    fn validate_constraint(&self, constraint: &Constraint, errors: &mut Vec<SolveError>) {
        let mut report = |description: String| {
            errors.push(SolveError::Malformed {
                description,
                locator: constraint.locator.clone(),
            })
        };
        match &constraint.kind {
            ConstraintKind::Disjunction(minterms) => {
                if minterms.len() < 2 {
                    report("a disjunction needs at least two alternatives".to_string());
                }
                for minterm in minterms {
                    for inner in &minterm.constraints {
                        self.validate_constraint(inner, errors);
                    }
                }
            }
            ConstraintKind::Overload { ty, candidates, .. } => {
                if let Some(problem) = self.operand_problem(ty, false) {
                    report(problem);
                }
                for candidate in candidates {
                    if let Some(problem) = self.operand_problem(&candidate.ty, true) {
                        report(format!("candidate {}: {}", candidate.decl, problem));
                    }
                }
            }
            _ => {
                let mut problems = Vec::new();
                constraint.for_each_type(&mut |t| {
                    if let Some(problem) = self.operand_problem(t, false) {
                        problems.push(problem);
                    }
                });
                for problem in problems {
                    report(problem);
                }
            }
        }
    }

    fn validate(&self, system: &ConstraintSystem) -> Vec<SolveError> {
        let mut errors = Vec::new();
        for constraint in system.constraints() {
            self.validate_constraint(constraint, &mut errors);
        }
        for (var, ty) in system.seeds() {
            let problem = if var.0 >= self.var_count {
                Some(format!("seed for unknown type variable {}", var))
            } else {
                self.operand_problem(ty, false)
            };
            if let Some(description) = problem {
                errors.push(SolveError::Malformed {
                    description,
                    locator: None,
                });
            }
        }
        errors
    }

    // ========================================================================
    // Propagation
    // ========================================================================

    /// Simplify until the path is solved, fails, or has to branch.
    fn run(&mut self, work: &mut WorkSet) -> Result<Outcome, SolveError> {
        loop {
            while let Some(goal) = work.pop() {
                if goal.constraint.kind.is_branch_point() {
                    work.branches.push(goal);
                    continue;
                }
                self.tick()?;
                let version = self.subst.version();
                trace!(
                    ordinal = goal.ordinal,
                    precedence = ?goal.constraint.kind.precedence(),
                    "simplify"
                );
                match self.simplify(&goal.constraint, work) {
                    Step::Solved => work.progress += 1,
                    Step::Expand(children) => {
                        work.progress += 1;
                        for child in children {
                            work.push(child);
                        }
                    }
                    Step::Defer(watch) => work.defer(goal, watch),
                    Step::Fail(error) => return Ok(Outcome::Failed(error)),
                }
                if self.subst.version() != version {
                    work.wake(&self.subst);
                }
            }

            if let Some(goal) = work.take_branch() {
                if let ConstraintKind::Overload { name, candidates, .. } = &goal.constraint.kind {
                    if candidates.is_empty() {
                        return Ok(Outcome::Failed(SolveError::NoViableOverload {
                            name: *name,
                            rejected: Vec::new(),
                            locator: goal.constraint.locator.clone(),
                        }));
                    }
                }
                return Ok(Outcome::Branch(goal));
            }
            if work.weaken(&self.subst) {
                continue;
            }
            if self.options.literal_defaulting && self.default_literal(work) {
                continue;
            }
            if let Some(error) = self.incomplete(work) {
                return Ok(Outcome::Failed(error));
            }
            return Ok(Outcome::Solved);
        }
    }

    /// Bind the variable of the earliest deferred literal conversion to the
    /// literal's default type.
    fn default_literal(&mut self, work: &mut WorkSet) -> bool {
        let pending: Vec<(TypeVar, tyre_types::LiteralKind, Option<Locator>)> = work
            .stale_in_order()
            .into_iter()
            .filter_map(|d| match &d.goal.constraint.kind {
                ConstraintKind::Conversion(Type::Var(v), literal) => {
                    Some((self.subst.find_root(*v), *literal, d.goal.constraint.locator.clone()))
                }
                _ => None,
            })
            .collect();
        for (var, literal, locator) in pending {
            if self.subst.is_bound(var) {
                continue;
            }
            let Some(default) = self.ctx.default_literal_type(literal) else {
                continue;
            };
            debug!(var = %var, literal = literal.keyword(), "default literal");
            let rendered = default.to_string_with(self.ctx.names());
            work.warnings.push(Diagnostic::at(
                locator.as_ref(),
                &messages::LITERAL_DEFAULTED_TO_TYPE_0,
                &[rendered.as_str()],
            ));
            work.push(Constraint {
                kind: ConstraintKind::Equality(Type::Var(var), default),
                locator,
            });
            return true;
        }
        false
    }

    /// The failure of a path that has nothing left to do but still has
    /// unknowns.
    fn incomplete(&self, work: &WorkSet) -> Option<SolveError> {
        let stale = work.stale_in_order();
        let mut vars: Vec<TypeVar> = (0..self.var_count)
            .map(TypeVar)
            .filter(|&v| self.subst.apply(&Type::Var(v)).has_vars())
            .collect();
        if stale.is_empty() && vars.is_empty() {
            return None;
        }
        if vars.is_empty() {
            for d in &stale {
                for &w in &d.watch {
                    let root = self.subst.find_root(w);
                    if !vars.contains(&root) {
                        vars.push(root);
                    }
                }
            }
        }
        let locator = stale.first().and_then(|d| d.goal.constraint.locator.clone());
        Some(SolveError::SearchAborted {
            reason: AbortReason::Incomplete(vars),
            locator,
        })
    }

    // ========================================================================
    // Branching
    // ========================================================================

    fn push_frame(&mut self, search: &mut Search, base: WorkSet, branch: Goal) {
        let order = alternative_order(&branch.constraint.kind);
        debug!(
            alternatives = order.len(),
            depth = search.frames.len(),
            precedence = ?branch.constraint.kind.precedence(),
            "branch"
        );
        let snapshot = self.subst.snapshot();
        search.frames.push(Frame {
            snapshot,
            base,
            branch,
            order,
            next: 0,
            current: 0,
            attempts: Vec::new(),
            solved: false,
        });
    }

    /// Restore to the innermost frame with an untried alternative and enter
    /// it. Exhausted frames are popped and report their failure upward.
    fn next_alternative(&mut self, search: &mut Search) -> Result<Option<WorkSet>, SolveError> {
        loop {
            let best = search.best_penalty();
            if let Some(frame) = search.frames.last_mut() {
                if frame.next < frame.order.len() {
                    let alternative = frame.order[frame.next];
                    frame.next += 1;
                    let total = frame
                        .base
                        .penalty
                        .saturating_add(alternative_penalty(&frame.branch.constraint.kind, alternative));
                    if self.options.max_penalty.is_some_and(|max| total > max) {
                        search.penalty_pruned = true;
                        frame.next = frame.order.len();
                        continue;
                    }
                    if best.is_some_and(|b| total > b) {
                        frame.next = frame.order.len();
                        continue;
                    }
                    self.subst.restore(&frame.snapshot);
                    self.tick()?;
                    frame.current = alternative;
                    let mut work = frame.base.clone();
                    self.enter(&mut work, &frame.branch, alternative);
                    return Ok(Some(work));
                }
            }

            let Some(frame) = search.frames.pop() else {
                return Ok(None);
            };
            self.subst.restore(&frame.snapshot);
            self.subst.commit(frame.snapshot);
            if frame.solved {
                continue;
            }
            if let Some(failure) = frame_failure(frame.branch, frame.attempts) {
                search.fail(failure);
            }
        }
    }

    /// Push the constraints of one alternative of `branch` onto `work`.
    fn enter(&mut self, work: &mut WorkSet, branch: &Goal, alternative: usize) {
        let locator = branch.constraint.locator.as_ref();
        match &branch.constraint.kind {
            ConstraintKind::Disjunction(minterms) => {
                let minterm = &minterms[alternative];
                trace!(alternative, penalty = minterm.penalty, "enter minterm");
                work.penalty = work.penalty.saturating_add(minterm.penalty);
                let inherited = locator.map(|l| l.appending(PathElement::Minterm(alternative as u32)));
                for constraint in &minterm.constraints {
                    let mut constraint = constraint.clone();
                    if constraint.locator.is_none() {
                        constraint.locator = inherited.clone();
                    }
                    work.push(constraint);
                }
            }
            ConstraintKind::Overload {
                ty,
                name,
                site,
                candidates,
            } => {
                let candidate = &candidates[alternative];
                trace!(decl = %candidate.decl, penalty = candidate.penalty, "enter candidate");
                work.penalty = work.penalty.saturating_add(candidate.penalty);
                if candidate.is_generic() {
                    work.generic_choices += 1;
                }
                let locator = locator.map(|l| l.appending(PathElement::Candidate(candidate.decl)));
                self.open_candidate(work, ty, *name, *site, candidate, locator);
            }
            _ => {}
        }
    }

    /// Commit `site` to `candidate`: equate `ty` with the candidate's
    /// signature, with fresh variables for its generic parameters.
    pub(crate) fn open_candidate(
        &mut self,
        work: &mut WorkSet,
        ty: &Type,
        name: Name,
        site: NodeId,
        candidate: &Candidate,
        locator: Option<Locator>,
    ) {
        let mut opened = FxHashMap::default();
        for param in &candidate.generic_params {
            opened.insert(param.name, Type::Var(self.subst.fresh_var()));
        }
        // Parameters of a receiver written without its arguments stay in
        // the signature; they are opened like the candidate's own.
        let signature = self.open_params(&candidate.ty, &mut opened);
        work.push(Constraint {
            kind: ConstraintKind::Equality(ty.clone(), signature),
            locator: locator.clone(),
        });
        for param in &candidate.generic_params {
            if param.bounds.is_empty() {
                continue;
            }
            if let Some(var) = opened.get(&param.name) {
                work.push(Constraint {
                    kind: ConstraintKind::Conformance(var.clone(), TraitSet::new(param.bounds.iter().copied())),
                    locator: locator.clone(),
                });
            }
        }
        work.choices.insert(
            site,
            Choice {
                decl: candidate.decl,
                name,
                signature: candidate.ty.clone(),
                locator,
            },
        );
    }

    /// Replace every generic parameter in `ty`, reusing the variables in
    /// `opened` and allocating fresh ones for parameters not yet seen.
    pub(crate) fn open_params(&mut self, ty: &Type, opened: &mut FxHashMap<Name, Type>) -> Type {
        if !ty.has_params() {
            return ty.clone();
        }
        let subst = &mut self.subst;
        ty.transform(&mut |t| match t {
            Type::Param(name) => Some(
                opened
                    .entry(*name)
                    .or_insert_with(|| Type::Var(subst.fresh_var()))
                    .clone(),
            ),
            _ => None,
        })
    }

    // ========================================================================
    // Results
    // ========================================================================

    fn record(&mut self, search: &mut Search, work: &WorkSet) {
        if let Some(best) = search.best_penalty() {
            if work.penalty > best {
                return;
            }
            if work.penalty < best {
                search.found.clear();
            }
        }
        debug!(
            penalty = work.penalty,
            generic = work.generic_choices,
            conversions = work.conversions,
            "solution"
        );
        for frame in &mut search.frames {
            frame.solved = true;
        }
        search.found.push(Found {
            penalty: work.penalty,
            generic_choices: work.generic_choices,
            conversions: work.conversions,
            bindings: self.current_bindings(),
            choices: work.choices.clone(),
            predicates: work.predicates.clone(),
            warnings: work.warnings.clone(),
        });
    }

    fn abort(&self, search: Search, error: SolveError) -> SolveFailure {
        SolveFailure {
            errors: vec![error],
            partial: search.partial.unwrap_or_else(|| self.current_bindings()),
        }
    }

    fn finish(self, search: Search) -> Result<Solution, SolveFailure> {
        let partial = match &search.partial {
            Some(partial) => partial.clone(),
            None => self.current_bindings(),
        };
        let Some(best) = search.found.iter().map(Found::rank).min() else {
            let error = match search.root_failure {
                Some(failure) => failure.error,
                None if search.penalty_pruned => SolveError::SearchAborted {
                    reason: AbortReason::PenaltyLimit(self.options.max_penalty.unwrap_or(0)),
                    locator: None,
                },
                None => SolveError::SearchAborted {
                    reason: AbortReason::Incomplete(Vec::new()),
                    locator: None,
                },
            };
            debug!(error = %error, "no solution");
            return Err(SolveFailure {
                errors: vec![error],
                partial,
            });
        };

        let mut winners: Vec<Found> = Vec::new();
        for found in search.found {
            if found.rank() == best && !winners.iter().any(|w| w.same_assignment(&found)) {
                winners.push(found);
            }
        }
        if winners.len() > 1 {
            let error = ambiguity(&winners);
            debug!(solutions = winners.len(), "ambiguous");
            return Err(SolveFailure {
                errors: vec![error],
                partial,
            });
        }
        let Some(found) = winners.pop() else {
            return Err(SolveFailure {
                errors: Vec::new(),
                partial,
            });
        };
        Ok(Solution::new(
            found.bindings,
            found.choices.iter().map(|(site, c)| (*site, c.decl)).collect(),
            found.predicates,
            found.penalty,
            found.warnings,
        ))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn alternative_penalty(kind: &ConstraintKind, alternative: usize) -> u32 {
    match kind {
        ConstraintKind::Overload { candidates, .. } => candidates.get(alternative).map_or(0, |c| c.penalty),
        ConstraintKind::Disjunction(minterms) => minterms.get(alternative).map_or(0, |m| m.penalty),
        _ => 0,
    }
}

/// Ascending penalty; among overload candidates of equal penalty,
/// non-generic declarations first; then declaration order.
fn alternative_order(kind: &ConstraintKind) -> Vec<usize> {
    let mut order: Vec<usize> = (0..kind.alternative_count()).collect();
    match kind {
        ConstraintKind::Overload { candidates, .. } => {
            order.sort_by_key(|&i| (candidates[i].penalty, candidates[i].is_generic(), i));
        }
        ConstraintKind::Disjunction(minterms) => {
            order.sort_by_key(|&i| (minterms[i].penalty, i));
        }
        _ => {}
    }
    order
}

/// The failure an exhausted frame reports to its parent.
fn frame_failure(branch: Goal, attempts: Vec<Attempt>) -> Option<Failure> {
    let progress = attempts.iter().map(|a| a.failure.progress).max()?;
    let Constraint { kind, locator } = branch.constraint;
    match kind {
        ConstraintKind::Overload { name, candidates, .. } => {
            let rejected = attempts
                .into_iter()
                .filter_map(|a| {
                    candidates.get(a.alternative).map(|c| RejectedCandidate {
                        decl: c.decl,
                        ty: c.ty.clone(),
                        reason: Box::new(a.failure.error),
                    })
                })
                .collect();
            Some(Failure {
                error: SolveError::NoViableOverload {
                    name,
                    rejected,
                    locator,
                },
                progress,
            })
        }
        _ => {
            // The failure that got furthest, earliest on ties.
            let depth = |f: &Failure| (f.progress, f.error.locator().map_or(0, Locator::depth));
            attempts
                .into_iter()
                .map(|a| a.failure)
                .reduce(|best, next| if depth(&next) > depth(&best) { next } else { best })
        }
    }
}

/// Describe why tied solutions are ambiguous: the first reference site they
/// disagree on, or the bindings alone.
fn ambiguity(winners: &[Found]) -> SolveError {
    let Some(first) = winners.first() else {
        return SolveError::AmbiguousOverload {
            name: None,
            candidates: Vec::new(),
            locator: None,
        };
    };
    for (site, choice) in &first.choices {
        let differs = winners
            .iter()
            .any(|w| w.choices.get(site).map(|c| c.decl) != Some(choice.decl));
        if !differs {
            continue;
        }
        let mut candidates: Vec<(DeclId, Type)> = Vec::new();
        for winner in winners {
            if let Some(c) = winner.choices.get(site) {
                if !candidates.iter().any(|(d, _)| *d == c.decl) {
                    candidates.push((c.decl, c.signature.clone()));
                }
            }
        }
        let locator = choice.locator.clone().map(|mut l| {
            if matches!(l.path.last(), Some(PathElement::Candidate(_))) {
                l.path.pop();
            }
            l
        });
        return SolveError::AmbiguousOverload {
            name: Some(choice.name),
            candidates,
            locator,
        };
    }
    SolveError::AmbiguousOverload {
        name: None,
        candidates: Vec::new(),
        locator: None,
    }
}
