use fnv::FnvHashMap;
use thiserror::Error;

use crate::assignment::Assignment;
use crate::basic_types::PropagationStatus;
use crate::basic_types::SearchStatus;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::branching::Relation;
use crate::branching::SelectionContext;
use crate::engine::constraint::ConstraintStore;
use crate::engine::contexts::PostContext;
use crate::engine::contexts::PropagationContextMut;
use crate::engine::demon::DemonStore;
use crate::engine::demon_queue::DemonQueue;
use crate::engine::domain_events::DomainEvent;
use crate::engine::domains::Domains;
use crate::engine::intervals::IntervalStore;
use crate::engine::propagation_monitor::PropagationEvent;
use crate::engine::propagation_monitor::PropagationMonitor;
use crate::engine::sequences::SequenceStore;
use crate::engine::watch_list::WatchList;
use crate::engine::Constraint;
use crate::constraints::LinkExprVar;
use crate::containers::StorageKey;
use crate::peregrine_assert_simple;
use crate::search::MonitorContext;
use crate::search::SearchMonitor;
use crate::search::SymmetryBreaker;
use crate::search::SymmetryManager;
use crate::state::TrailedValues;
use crate::statistics::should_log_statistics;
use crate::statistics::SolverStatistics;
use crate::variables::expr::AffineExpr;
use crate::variables::expr::ExprStore;
use crate::variables::expr::PlusExpr;
use crate::variables::expr::SumExpr;
use crate::variables::ExprId;
use crate::variables::IntervalVar;
use crate::variables::IntVar;
use crate::variables::SequenceVar;

/// The ways building a model can fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// An earlier constraint already made the model infeasible; the solver
    /// no longer accepts changes and every solve reports infeasibility.
    #[error("the solver is broken by an earlier infeasibility")]
    Broken,
    /// Posting this constraint proved the model infeasible.
    #[error("posting the constraint proved the model infeasible")]
    Infeasible,
}

/// The outcome of [`Solver::solve`].
#[derive(Debug)]
pub struct SolveResult {
    pub status: SearchStatus,
    pub assignment: Option<Assignment>,
}

struct Frame {
    decision: Decision,
    right_tried: bool,
    /// `(breaker, literal)` pairs the symmetry breakers contributed when
    /// this decision was applied.
    symmetry_literals: Vec<(usize, Decision)>,
}

struct SearchMachine {
    builder: Box<dyn DecisionBuilder>,
    monitors: Vec<Box<dyn SearchMonitor>>,
    frames: Vec<Frame>,
    root_level: usize,
    started: bool,
    done: bool,
    status: SearchStatus,
}

enum BacktrackOutcome {
    /// The whole tree has been explored.
    Exhausted,
    /// A refutation was applied; the status is that of applying it.
    Refuted(PropagationStatus),
}

/// The finite-domain constraint solver.
///
/// The solver owns every variable, constraint and demon. Search runs
/// depth-first over decisions produced by a
/// [`DecisionBuilder`](crate::branching::DecisionBuilder): applying a
/// decision narrows domains, registered demons propagate to a fixpoint,
/// and failures unwind the trail back to the last open branch.
pub struct Solver {
    domains: Domains,
    trailed: TrailedValues,
    intervals: IntervalStore,
    sequences: SequenceStore,
    exprs: ExprStore,
    cast_cache: FnvHashMap<ExprId, IntVar>,
    constant_cache: FnvHashMap<i64, IntVar>,
    demons: DemonStore,
    queue: DemonQueue,
    watch_list: WatchList,
    constraints: ConstraintStore,
    monitor: Option<Box<dyn PropagationMonitor>>,
    symmetry: SymmetryManager,
    statistics: SolverStatistics,
    broken: bool,
    event_buffer: Vec<(DomainEvent, IntVar)>,
    interval_buffer: Vec<IntervalVar>,
    sequence_buffer: Vec<SequenceVar>,
    search: Option<SearchMachine>,
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            domains: Domains::default(),
            trailed: TrailedValues::default(),
            intervals: IntervalStore::default(),
            sequences: SequenceStore::default(),
            exprs: ExprStore::default(),
            cast_cache: FnvHashMap::default(),
            constant_cache: FnvHashMap::default(),
            demons: DemonStore::default(),
            queue: DemonQueue::default(),
            watch_list: WatchList::default(),
            constraints: ConstraintStore::default(),
            monitor: None,
            symmetry: SymmetryManager::new(),
            statistics: SolverStatistics::default(),
            broken: false,
            event_buffer: Vec::new(),
            interval_buffer: Vec::new(),
            sequence_buffer: Vec::new(),
            search: None,
        }
    }
}

// factories
impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new integer variable with domain `lower_bound..=upper_bound`.
    pub fn new_int_var(&mut self, lower_bound: i64, upper_bound: i64) -> IntVar {
        let var = self.domains.grow(lower_bound, upper_bound);
        self.watch_list.grow();
        var
    }

    /// A new 0/1 variable.
    pub fn new_bool_var(&mut self) -> IntVar {
        self.new_int_var(0, 1)
    }

    /// The variable fixed to `value`. Constants are interned.
    pub fn constant(&mut self, value: i64) -> IntVar {
        if let Some(&var) = self.constant_cache.get(&value) {
            return var;
        }
        let var = self.new_int_var(value, value);
        let _ = self.constant_cache.insert(value, var);
        var
    }

    /// A new interval variable. An `optional` interval may end up
    /// unperformed instead of failing when its ranges empty out.
    pub fn new_interval_var(
        &mut self,
        start_min: i64,
        start_max: i64,
        duration_min: i64,
        duration_max: i64,
        optional: bool,
    ) -> IntervalVar {
        self.intervals.grow(
            &mut self.trailed,
            start_min,
            start_max,
            duration_min,
            duration_max,
            optional,
        )
    }

    /// A new sequence variable ordering the given intervals.
    pub fn new_sequence_var(&mut self, intervals: Vec<IntervalVar>) -> SequenceVar {
        self.sequences.grow(&mut self.trailed, intervals)
    }

    /// The expression `a + b`.
    pub fn plus(&mut self, a: IntVar, b: IntVar) -> ExprId {
        self.exprs.alloc(Box::new(PlusExpr::new(a, b)))
    }

    /// The expression `Σ vars`.
    pub fn sum(&mut self, vars: Vec<IntVar>) -> ExprId {
        self.exprs.alloc(Box::new(SumExpr::new(vars)))
    }

    /// The expression `scale · var + offset`.
    pub fn affine(&mut self, var: IntVar, scale: i64, offset: i64) -> ExprId {
        self.exprs.alloc(Box::new(AffineExpr::new(var, scale, offset)))
    }

    /// The expression `-var`.
    pub fn opposite(&mut self, var: IntVar) -> ExprId {
        self.affine(var, -1, 0)
    }

    /// Cast an expression to a stateful variable. The shadow variable is
    /// channeled to the expression and memoized: casting the same
    /// expression twice returns the same variable.
    pub fn expr_var(&mut self, expr: ExprId) -> IntVar {
        if let Some(&var) = self.cast_cache.get(&expr) {
            return var;
        }
        let min = self.exprs.get(expr).min(&self.domains);
        let max = self.exprs.get(expr).max(&self.domains);
        let operands = self.exprs.get(expr).operands().to_vec();
        let var = self.new_int_var(min, max);
        let _ = self.cast_cache.insert(expr, var);
        let _ = self.add_constraint(LinkExprVar::new(var, expr, operands));
        var
    }
}

// inspection
impl Solver {
    pub fn lower_bound(&self, var: IntVar) -> i64 {
        self.domains.lower_bound(var)
    }

    pub fn upper_bound(&self, var: IntVar) -> i64 {
        self.domains.upper_bound(var)
    }

    pub fn contains(&self, var: IntVar, value: i64) -> bool {
        self.domains.contains(var, value)
    }

    pub fn is_bound(&self, var: IntVar) -> bool {
        self.domains.is_assigned(var)
    }

    pub fn value(&self, var: IntVar) -> i64 {
        self.domains.assigned_value(var)
    }

    pub fn domain_size(&self, var: IntVar) -> i64 {
        self.domains.size(var)
    }

    pub fn start_min(&self, interval: IntervalVar) -> i64 {
        self.intervals.start_min(&self.trailed, interval)
    }

    pub fn start_max(&self, interval: IntervalVar) -> i64 {
        self.intervals.start_max(&self.trailed, interval)
    }

    pub fn end_min(&self, interval: IntervalVar) -> i64 {
        self.intervals.end_min(&self.trailed, interval)
    }

    pub fn end_max(&self, interval: IntervalVar) -> i64 {
        self.intervals.end_max(&self.trailed, interval)
    }

    pub fn duration_min(&self, interval: IntervalVar) -> i64 {
        self.intervals.duration_min(&self.trailed, interval)
    }

    pub fn duration_max(&self, interval: IntervalVar) -> i64 {
        self.intervals.duration_max(&self.trailed, interval)
    }

    pub fn may_be_performed(&self, interval: IntervalVar) -> bool {
        self.intervals.may_be_performed(&self.trailed, interval)
    }

    pub fn must_be_performed(&self, interval: IntervalVar) -> bool {
        self.intervals.must_be_performed(&self.trailed, interval)
    }

    pub fn ranked_first(&self, sequence: SequenceVar) -> Vec<u32> {
        self.sequences.ranked_first(&self.trailed, sequence)
    }

    pub fn ranked_last(&self, sequence: SequenceVar) -> Vec<u32> {
        self.sequences.ranked_last(&self.trailed, sequence)
    }

    pub fn sequence_intervals(&self, sequence: SequenceVar) -> &[IntervalVar] {
        self.sequences.intervals(sequence)
    }

    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    /// Whether a model-construction failure has permanently broken the
    /// solver.
    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

// configuration
impl Solver {
    /// Install the observational propagation monitor.
    pub fn set_propagation_monitor(&mut self, monitor: Box<dyn PropagationMonitor>) {
        self.monitor = Some(monitor);
    }

    pub fn add_symmetry_breaker(&mut self, breaker: Box<dyn SymmetryBreaker>) {
        self.symmetry.add_breaker(&mut self.trailed, breaker);
    }
}

// direct domain mutation
impl Solver {
    /// Tighten the lower bound of `var` and propagate to a fixpoint. A
    /// failure at the root level breaks the solver permanently.
    pub fn set_min(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        self.mutate(Decision::greater_or_equal(var, value))
    }

    /// Tighten the upper bound of `var` and propagate to a fixpoint.
    pub fn set_max(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        self.mutate(Decision::less_or_equal(var, value))
    }

    /// Fix `var` to `value` and propagate to a fixpoint.
    pub fn set_value(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        self.mutate(Decision::assign(var, value))
    }

    /// Remove `value` from `var` and propagate to a fixpoint.
    pub fn remove_value(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        self.mutate(Decision {
            var,
            relation: Relation::NotEqual,
            value,
        })
    }

    /// Remove `lower..=upper` from `var` and propagate to a fixpoint.
    pub fn remove_interval(&mut self, var: IntVar, lower: i64, upper: i64) -> PropagationStatus {
        let status = {
            let mut context = self.propagation_context();
            context.remove_interval(var, lower, upper)
        };
        let status = status.and_then(|_| self.propagate_to_fixpoint());
        if status.is_err() && self.level() == 0 {
            self.broken = true;
        }
        status
    }

    fn mutate(&mut self, decision: Decision) -> PropagationStatus {
        let status = self
            .apply_decision_raw(&decision)
            .and_then(|_| self.propagate_to_fixpoint());
        if status.is_err() && self.level() == 0 {
            self.broken = true;
        }
        status
    }
}

// model building
impl Solver {
    /// Add a constraint: post its demons and run its initial propagation
    /// to a fixpoint. A failure here breaks the solver for good.
    pub fn add_constraint(&mut self, constraint: impl Constraint + 'static) -> Result<(), ModelError> {
        if self.broken {
            return Err(ModelError::Broken);
        }
        peregrine_assert_simple!(
            self.level() == 0,
            "constraints must be added at the root level"
        );

        let id = self.constraints.alloc(Box::new(constraint));
        self.statistics.num_constraints += 1;

        {
            let constraint = &mut self.constraints[id];
            let mut context = PostContext {
                constraint: id,
                demons: &mut self.demons,
                watch_list: &mut self.watch_list,
                intervals: &mut self.intervals,
                sequences: &mut self.sequences,
                domains: &self.domains,
                trailed: &self.trailed,
            };
            constraint.post(&mut context);
        }

        self.emit(PropagationEvent::BeginInitialPropagation { constraint: id });
        let status = {
            let constraint = &mut self.constraints[id];
            let mut context = PropagationContextMut {
                domains: &mut self.domains,
                trailed: &mut self.trailed,
                intervals: &mut self.intervals,
                sequences: &mut self.sequences,
                exprs: &self.exprs,
                monitor: &mut self.monitor,
            };
            constraint.initial_propagate(&mut context)
        };
        self.emit(PropagationEvent::EndInitialPropagation { constraint: id });

        let status = status.and_then(|_| self.propagate_to_fixpoint());
        if status.is_err() {
            self.broken = true;
            return Err(ModelError::Infeasible);
        }
        Ok(())
    }
}

// propagation machinery
impl Solver {
    fn emit(&mut self, event: PropagationEvent) {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.on_event(&event);
        }
    }

    pub(crate) fn level(&self) -> usize {
        self.trailed.level()
    }

    pub(crate) fn push_level(&mut self) {
        self.trailed.push_level();
        self.domains.push_level();
    }

    pub(crate) fn undo_to(&mut self, level: usize) {
        self.domains.undo_to(level);
        self.trailed.undo_to(level);
        self.queue.clear(&mut self.demons);
        self.event_buffer.clear();
        self.clear_pending_wakeups();
    }

    fn clear_pending_wakeups(&mut self) {
        self.interval_buffer.clear();
        self.intervals.drain_pending(&mut self.interval_buffer);
        self.interval_buffer.clear();
        self.sequence_buffer.clear();
        self.sequences.drain_pending(&mut self.sequence_buffer);
        self.sequence_buffer.clear();
    }

    fn propagation_context(&mut self) -> PropagationContextMut<'_> {
        PropagationContextMut {
            domains: &mut self.domains,
            trailed: &mut self.trailed,
            intervals: &mut self.intervals,
            sequences: &mut self.sequences,
            exprs: &self.exprs,
            monitor: &mut self.monitor,
        }
    }

    /// Move raised events into demon wake-ups.
    fn flush_events(&mut self) {
        self.event_buffer.clear();
        self.event_buffer.extend(self.domains.events.drain());
        for &(event, var) in &self.event_buffer {
            for &demon in self.watch_list.affected(var, event) {
                self.queue.enqueue(&mut self.demons, demon);
            }
        }
        self.event_buffer.clear();

        self.interval_buffer.clear();
        self.intervals.drain_pending(&mut self.interval_buffer);
        for &interval in &self.interval_buffer {
            for &demon in self.intervals.demons(interval) {
                self.queue.enqueue(&mut self.demons, demon);
            }
        }
        self.interval_buffer.clear();

        self.sequence_buffer.clear();
        self.sequences.drain_pending(&mut self.sequence_buffer);
        for &sequence in &self.sequence_buffer {
            for &demon in self.sequences.demons(sequence) {
                self.queue.enqueue(&mut self.demons, demon);
            }
        }
        self.sequence_buffer.clear();
    }

    /// Run demons until both queues are empty or a failure is raised.
    pub(crate) fn propagate_to_fixpoint(&mut self) -> PropagationStatus {
        loop {
            self.flush_events();
            let Some(demon) = self.queue.pop(&mut self.demons) else {
                return Ok(());
            };
            let entry = self.demons.entry(demon);
            self.statistics.num_demon_runs += 1;

            self.emit(PropagationEvent::BeginDemonRun { demon });
            let status = {
                let constraint = &mut self.constraints[entry.constraint];
                let mut context = PropagationContextMut {
                    domains: &mut self.domains,
                    trailed: &mut self.trailed,
                    intervals: &mut self.intervals,
                    sequences: &mut self.sequences,
                    exprs: &self.exprs,
                    monitor: &mut self.monitor,
                };
                constraint.run_demon(entry.payload, &mut context)
            };
            self.emit(PropagationEvent::EndDemonRun { demon });

            if let Err(failure) = status {
                self.emit(PropagationEvent::Failure);
                self.queue.clear(&mut self.demons);
                self.domains.events.clear();
                self.clear_pending_wakeups();
                return Err(failure);
            }
        }
    }

    fn apply_decision_raw(&mut self, decision: &Decision) -> PropagationStatus {
        let mut context = self.propagation_context();
        match decision.relation {
            Relation::Equal => context.set_value(decision.var, decision.value),
            Relation::NotEqual => context.remove_value(decision.var, decision.value),
            Relation::LessOrEqual => context.set_max(decision.var, decision.value),
            Relation::GreaterOrEqual => context.set_min(decision.var, decision.value),
        }
    }
}

// search
impl Solver {
    /// Start a resumable search. Use [`Solver::next_solution`] to step from
    /// solution to solution and [`Solver::end_search`] to finish.
    pub fn new_search(
        &mut self,
        builder: impl DecisionBuilder + 'static,
        monitors: Vec<Box<dyn SearchMonitor>>,
    ) {
        peregrine_assert_simple!(self.search.is_none(), "a search is already open");
        self.search = Some(SearchMachine {
            builder: Box::new(builder),
            monitors,
            frames: Vec::new(),
            root_level: self.level(),
            started: false,
            done: false,
            status: SearchStatus::Infeasible,
        });
    }

    /// Advance the open search to its next solution. On `true` the domains
    /// hold the solution; on `false` the search has concluded.
    pub fn next_solution(&mut self) -> bool {
        let Some(mut search) = self.search.take() else {
            return false;
        };
        let found = self.run_search(&mut search);
        self.search = Some(search);
        found
    }

    /// Close the open search, unwind to the root, and report how it ended.
    pub fn end_search(&mut self) -> SearchStatus {
        let Some(mut search) = self.search.take() else {
            return SearchStatus::Infeasible;
        };
        if self.level() > search.root_level {
            self.undo_to(search.root_level);
        }
        if !search.done && search.status != SearchStatus::Feasible {
            search.status = SearchStatus::LimitReached;
        }
        self.notify(&mut search, |monitor, context| monitor.exit_search(context));
        if should_log_statistics() {
            self.statistics.log();
        }
        search.status
    }

    /// Search for the first solution. A solution limit of one is implied;
    /// further solutions are reachable through the resumable interface.
    pub fn solve(
        &mut self,
        builder: impl DecisionBuilder + 'static,
        monitors: Vec<Box<dyn SearchMonitor>>,
    ) -> SolveResult {
        self.new_search(builder, monitors);
        let found = self.next_solution();
        let assignment = found.then(|| self.save_assignment());
        let status = self.end_search();
        SolveResult { status, assignment }
    }

    /// Whether the given assignment is consistent with the model. The
    /// check runs in a scratch frame and leaves no state behind.
    pub fn check_assignment(&mut self, assignment: &Assignment) -> bool {
        let level = self.level();
        self.push_level();
        let status = self
            .restore_assignment(assignment)
            .and_then(|_| self.propagate_to_fixpoint());
        self.undo_to(level);
        status.is_ok()
    }

    /// Snapshot the current values of every variable. Unbound integer
    /// variables contribute their lower bound.
    pub fn save_assignment(&self) -> Assignment {
        let mut assignment = Assignment::default();
        for var in (0..self.domains.num_domains()).map(IntVar::create_from_index) {
            assignment.set_value(var, self.domains.lower_bound(var));
        }
        for interval in (0..self.intervals.num_intervals()).map(IntervalVar::create_from_index) {
            assignment.set_interval(
                interval,
                self.intervals.start_min(&self.trailed, interval),
                self.intervals.duration_min(&self.trailed, interval),
                self.intervals.may_be_performed(&self.trailed, interval),
            );
        }
        for sequence in (0..self.sequences.num_sequences()).map(SequenceVar::create_from_index) {
            let members = self.sequences.intervals(sequence);
            let unperformed = members
                .iter()
                .enumerate()
                .filter(|&(_, &interval)| !self.intervals.may_be_performed(&self.trailed, interval))
                .map(|(index, _)| index as u32)
                .collect();
            assignment.set_sequence(
                sequence,
                self.sequences.ranked_first(&self.trailed, sequence),
                self.sequences.ranked_last(&self.trailed, sequence),
                unperformed,
            );
        }
        assignment
    }

    /// Write an assignment back into the domains through the normal
    /// monitored, trailed mutators.
    pub fn restore_assignment(&mut self, assignment: &Assignment) -> PropagationStatus {
        let mut context = self.propagation_context();
        for element in assignment.int_elements() {
            if element.activated {
                context.set_value(element.var, element.value)?;
            }
        }
        for element in assignment.interval_elements() {
            if !element.activated {
                continue;
            }
            if element.performed {
                context.set_performed(element.var, true)?;
                context.set_start_min(element.var, element.start)?;
                context.set_start_max(element.var, element.start)?;
                context.set_duration_min(element.var, element.duration)?;
                context.set_duration_max(element.var, element.duration)?;
            } else {
                context.set_performed(element.var, false)?;
            }
        }
        for element in assignment.sequence_elements() {
            if !element.activated {
                continue;
            }
            for &index in &element.unperformed {
                let interval = context.sequence_intervals(element.var)[index as usize];
                context.set_performed(interval, false)?;
            }
            for &index in &element.forward {
                context.rank_first(element.var, index)?;
            }
            for &index in &element.backward {
                context.rank_last(element.var, index)?;
            }
        }
        Ok(())
    }

    fn notify(
        &self,
        search: &mut SearchMachine,
        mut hook: impl FnMut(&mut dyn SearchMonitor, &MonitorContext<'_>),
    ) {
        let context = MonitorContext {
            domains: &self.domains,
            statistics: &self.statistics,
            depth: search.frames.len(),
        };
        for monitor in &mut search.monitors {
            hook(monitor.as_mut(), &context);
        }
    }

    fn should_stop(&self, search: &mut SearchMachine) -> bool {
        let context = MonitorContext {
            domains: &self.domains,
            statistics: &self.statistics,
            depth: search.frames.len(),
        };
        search
            .monitors
            .iter_mut()
            .any(|monitor| monitor.should_stop(&context))
    }

    fn run_search(&mut self, search: &mut SearchMachine) -> bool {
        if search.done {
            return false;
        }
        if self.broken {
            search.done = true;
            search.status = SearchStatus::Infeasible;
            return false;
        }

        let mut must_backtrack = false;
        if !search.started {
            search.started = true;
            self.notify(search, |monitor, context| monitor.enter_search(context));
            self.notify(search, |monitor, context| {
                monitor.begin_initial_propagation(context)
            });
            let status = self.propagate_to_fixpoint();
            self.notify(search, |monitor, context| {
                monitor.end_initial_propagation(context)
            });
            if status.is_err() {
                self.statistics.num_failures += 1;
                search.done = true;
                search.status = SearchStatus::Infeasible;
                self.notify(search, |monitor, context| {
                    monitor.no_more_solutions(context)
                });
                return false;
            }
        } else {
            // Resuming after a solution: the rest of the tree lies beyond
            // a backtrack.
            if search.frames.is_empty() {
                search.done = true;
                self.notify(search, |monitor, context| {
                    monitor.no_more_solutions(context)
                });
                return false;
            }
            must_backtrack = true;
        }

        loop {
            if self.should_stop(search) {
                search.done = true;
                if search.status != SearchStatus::Feasible {
                    search.status = SearchStatus::LimitReached;
                }
                return false;
            }

            if must_backtrack {
                must_backtrack = false;
                match self.backtrack_step(search) {
                    BacktrackOutcome::Exhausted => {
                        search.done = true;
                        self.notify(search, |monitor, context| {
                            monitor.no_more_solutions(context)
                        });
                        return false;
                    }
                    BacktrackOutcome::Refuted(status) => {
                        self.notify(search, |monitor, context| monitor.end_fail(context));
                        let status = status.and_then(|_| self.propagate_to_fixpoint());
                        if status.is_err() {
                            self.statistics.num_failures += 1;
                            self.notify(search, |monitor, context| monitor.begin_fail(context));
                            must_backtrack = true;
                        }
                    }
                }
                continue;
            }

            let decision = {
                let context = SelectionContext::new(&self.domains);
                search.builder.next_decision(&context)
            };
            let Some(decision) = decision else {
                self.statistics.num_solutions += 1;
                search.status = SearchStatus::Feasible;
                self.notify(search, |monitor, context| monitor.at_solution(context));
                return true;
            };

            self.statistics.num_decisions += 1;
            self.push_level();
            self.notify(search, |monitor, context| {
                monitor.apply_decision(&decision, context)
            });
            let symmetry_literals = if self.symmetry.is_empty() {
                Vec::new()
            } else {
                self.symmetry.on_apply(&mut self.trailed, &decision)
            };
            search.frames.push(Frame {
                decision,
                right_tried: false,
                symmetry_literals,
            });
            self.statistics.max_depth = self.statistics.max_depth.max(search.frames.len());

            let status = self
                .apply_decision_raw(&decision)
                .and_then(|_| self.propagate_to_fixpoint());
            if status.is_err() {
                self.statistics.num_failures += 1;
                self.notify(search, |monitor, context| monitor.begin_fail(context));
                must_backtrack = true;
            }
        }
    }

    /// Unwind to the deepest frame whose refutation is still unexplored
    /// and apply it, together with any entailed symmetric no-goods.
    fn backtrack_step(&mut self, search: &mut SearchMachine) -> BacktrackOutcome {
        loop {
            let Some(mut frame) = search.frames.pop() else {
                return BacktrackOutcome::Exhausted;
            };
            self.undo_to(search.root_level + search.frames.len());
            if frame.right_tried {
                continue;
            }
            frame.right_tried = true;

            self.push_level();
            self.notify(search, |monitor, context| {
                monitor.refute_decision(&frame.decision, context)
            });

            let mut status: PropagationStatus = Ok(());
            for &(breaker, literal) in &frame.symmetry_literals {
                if self
                    .symmetry
                    .path_entailed(&self.trailed, &self.domains, breaker)
                {
                    status = self.apply_decision_raw(&literal.negation());
                    if status.is_err() {
                        break;
                    }
                }
            }
            let status = status.and_then(|_| self.apply_decision_raw(&frame.decision.negation()));

            search.frames.push(frame);
            return BacktrackOutcome::Refuted(status);
        }
    }
}

// local-search support
impl Solver {
    /// Validate `delta` against `base` inside a scratch frame: fix every
    /// base value not touched by the delta, fix the delta's activated
    /// values, propagate, and complete relaxed variables with a nested
    /// first-solution search. Returns the completed candidate and the
    /// objective value, or `None` when the move is infeasible.
    pub(crate) fn try_delta(
        &mut self,
        base: &Assignment,
        delta: &Assignment,
        objective: Option<IntVar>,
    ) -> Option<(Assignment, i64)> {
        let level = self.level();
        self.push_level();

        let status = self.apply_delta(base, delta);
        let outcome = match status {
            Ok(()) => {
                let vars: Vec<IntVar> =
                    base.int_elements().iter().map(|element| element.var).collect();
                if self.nested_first_solution(&vars) {
                    let objective_value =
                        objective.map_or(0, |objective| self.domains.lower_bound(objective));
                    let mut candidate = Assignment::default();
                    for &var in &vars {
                        candidate.set_value(var, self.domains.lower_bound(var));
                    }
                    Some((candidate, objective_value))
                } else {
                    None
                }
            }
            Err(_) => None,
        };

        self.undo_to(level);
        outcome
    }

    fn apply_delta(&mut self, base: &Assignment, delta: &Assignment) -> PropagationStatus {
        {
            let mut context = self.propagation_context();
            for element in base.int_elements() {
                if delta.has_var(element.var) {
                    continue;
                }
                context.set_value(element.var, element.value)?;
            }
            for element in delta.int_elements() {
                if element.activated {
                    context.set_value(element.var, element.value)?;
                }
            }
        }
        self.propagate_to_fixpoint()
    }

    /// Depth-first completion of `vars` at the current level. On success
    /// the solver rests at the solution (open levels included); the caller
    /// unwinds.
    fn nested_first_solution(&mut self, vars: &[IntVar]) -> bool {
        let Some(&var) = vars.iter().find(|&&var| !self.domains.is_assigned(var)) else {
            return true;
        };
        loop {
            let value = self.domains.lower_bound(var);
            self.push_level();
            let applied = self
                .apply_decision_raw(&Decision::assign(var, value))
                .and_then(|_| self.propagate_to_fixpoint());
            if applied.is_ok() && self.nested_first_solution(vars) {
                return true;
            }
            self.undo_to(self.level() - 1);

            let refuted = self
                .apply_decision_raw(&Decision::assign(var, value).negation())
                .and_then(|_| self.propagate_to_fixpoint());
            if refuted.is_err() {
                return false;
            }
            if self.domains.is_assigned(var) {
                return self.nested_first_solution(vars);
            }
        }
    }
}
