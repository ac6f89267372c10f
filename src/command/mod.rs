//! Command trees.
//!
//! A [`Command`] is a tagged tree: leaves are [`Primitive`] actions,
//! interior nodes are combinators.  The scheduler drives the root
//! through a fixed lifecycle and each combinator forwards the calls to
//! its children by its own rule.
//!
//! ```text
//!            schedule                 is_finished()
//!   Idle ───────────────▶ Running ──────────────────▶ Finished
//!                           │  ▲ execute() every tick
//!                           │  └──┘
//!                           │ conflict / cancel / condition false
//!                           ▼
//!                       Interrupted
//! ```
//!
//! | Combinator      | Runs                              | Finished when        | Requires            |
//! |-----------------|-----------------------------------|----------------------|---------------------|
//! | Sequential      | one child at a time, in order      | last child finished  | running child's set |
//! | Parallel        | all children together              | every child finished | union, whole run    |
//! | Race            | all children together              | any child finished   | union, whole run    |
//! | ConditionalSkip | child, unless the predicate held   | skipped or child     | child's (or none)   |
//! | RunUntilFalse   | child while the condition holds    | child, or cut        | child's             |
//!
//! `end` reaches every still-running child exactly once: [`Command::end`]
//! is a no-op unless the command is `Running`.

pub mod condition;
pub mod library;
pub mod primitive;
pub mod resource;

pub use condition::Condition;
pub use primitive::{InstantAction, Primitive, RunAction};
pub use resource::{ResourceId, ResourceSet};

use crate::app::ports::RobotPort;
use crate::controls::ControllerState;

/// Everything a command may touch during one lifecycle call.
pub struct Ctx<'a, R: RobotPort + ?Sized> {
    pub robot: &'a mut R,
    pub controls: &'a ControllerState,
}

impl<'a, R: RobotPort + ?Sized> Ctx<'a, R> {
    pub fn new(robot: &'a mut R, controls: &'a ControllerState) -> Self {
        Self { robot, controls }
    }

    fn sample(&self, condition: &Condition) -> bool {
        condition.sample(self.controls, &*self.robot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Running,
    Finished,
    Interrupted,
}

impl Lifecycle {
    pub const fn has_ended(self) -> bool {
        matches!(self, Self::Finished | Self::Interrupted)
    }
}

#[derive(Debug, Clone)]
pub enum CommandKind {
    Primitive(Primitive),
    Sequential {
        children: Vec<Command>,
        index: usize,
        /// Whether `children[index]` has been initialized.
        started: bool,
    },
    Parallel(Vec<Command>),
    Race(Vec<Command>),
    ConditionalSkip {
        skip_if: Condition,
        child: Box<Command>,
        skipped: bool,
    },
    RunUntilFalse {
        condition: Condition,
        child: Box<Command>,
        cut: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Command {
    name: &'static str,
    kind: CommandKind,
    state: Lifecycle,
    interruptible: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Construction
// ═══════════════════════════════════════════════════════════════

impl Command {
    pub fn primitive(name: &'static str, primitive: Primitive) -> Self {
        Self::from_kind(name, CommandKind::Primitive(primitive), true)
    }

    /// Requires nothing and finishes on its first tick.
    pub fn none() -> Self {
        Self::primitive("none", Primitive::Instant(InstantAction::Nothing))
    }

    pub fn sequence(children: Vec<Command>) -> Self {
        let interruptible = all_interruptible(&children);
        Self::from_kind(
            "sequence",
            CommandKind::Sequential { children, index: 0, started: false },
            interruptible,
        )
    }

    pub fn parallel(children: Vec<Command>) -> Self {
        let interruptible = all_interruptible(&children);
        Self::from_kind("parallel", CommandKind::Parallel(children), interruptible)
    }

    pub fn race(children: Vec<Command>) -> Self {
        let interruptible = all_interruptible(&children);
        Self::from_kind("race", CommandKind::Race(children), interruptible)
    }

    /// Skip `self` entirely if `skip_if` holds when this command starts.
    ///
    /// The wrapper takes the child's name.  Notices are only emitted for
    /// scheduled roots, so the two never report separately.
    #[must_use]
    pub fn unless(self, skip_if: Condition) -> Self {
        let interruptible = self.interruptible;
        let name = self.name;
        Self::from_kind(
            name,
            CommandKind::ConditionalSkip { skip_if, child: Box::new(self), skipped: false },
            interruptible,
        )
    }

    /// Run `self` only while `condition` holds; end interrupted the first
    /// tick it is sampled false.  Named like [`Command::unless`].
    #[must_use]
    pub fn run_while(self, condition: Condition) -> Self {
        let interruptible = self.interruptible;
        let name = self.name;
        Self::from_kind(
            name,
            CommandKind::RunUntilFalse { condition, child: Box::new(self), cut: false },
            interruptible,
        )
    }

    /// Append `next`, flattening into an existing unstarted sequence.
    #[must_use]
    pub fn and_then(mut self, next: Command) -> Self {
        if self.state == Lifecycle::Idle {
            if let CommandKind::Sequential { children, .. } = &mut self.kind {
                self.interruptible &= next.interruptible;
                children.push(next);
                return self;
            }
        }
        Self::sequence(vec![self, next])
    }

    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Incumbents marked this way block competing claims until they end.
    #[must_use]
    pub fn non_interruptible(mut self) -> Self {
        self.interruptible = false;
        self
    }

    fn from_kind(name: &'static str, kind: CommandKind, interruptible: bool) -> Self {
        Self { name, kind, state: Lifecycle::Idle, interruptible }
    }
}

fn all_interruptible(children: &[Command]) -> bool {
    children.iter().all(|c| c.interruptible)
}

fn union_of(children: &[Command], each: fn(&Command) -> ResourceSet) -> ResourceSet {
    children.iter().fold(ResourceSet::EMPTY, |acc, c| acc.union(each(c)))
}

// ═══════════════════════════════════════════════════════════════
//  Inspection
// ═══════════════════════════════════════════════════════════════

impl Command {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == Lifecycle::Running
    }

    pub fn is_interruptible(&self) -> bool {
        self.interruptible
    }

    /// Direct children, in order.  Empty for primitives.
    pub fn children(&self) -> &[Command] {
        match &self.kind {
            CommandKind::Primitive(_) => &[],
            CommandKind::Sequential { children, .. }
            | CommandKind::Parallel(children)
            | CommandKind::Race(children) => children,
            CommandKind::ConditionalSkip { child, .. }
            | CommandKind::RunUntilFalse { child, .. } => core::slice::from_ref(&**child),
        }
    }

    fn children_mut(&mut self) -> &mut [Command] {
        match &mut self.kind {
            CommandKind::Primitive(_) => &mut [],
            CommandKind::Sequential { children, .. }
            | CommandKind::Parallel(children)
            | CommandKind::Race(children) => children,
            CommandKind::ConditionalSkip { child, .. }
            | CommandKind::RunUntilFalse { child, .. } => core::slice::from_mut(&mut **child),
        }
    }

    /// Resources this command needs right now.
    ///
    /// Sequential and skipped commands change their set as they run; the
    /// scheduler reconciles claims against it every tick.
    pub fn requirements(&self) -> ResourceSet {
        match &self.kind {
            CommandKind::Primitive(p) => p.requirements(),
            CommandKind::Sequential { children, index, .. } => {
                children.get(*index).map_or(ResourceSet::EMPTY, Command::requirements)
            }
            CommandKind::Parallel(children) | CommandKind::Race(children) => {
                union_of(children, Command::declared_requirements)
            }
            CommandKind::ConditionalSkip { child, skipped, .. } => {
                if *skipped {
                    ResourceSet::EMPTY
                } else {
                    child.requirements()
                }
            }
            CommandKind::RunUntilFalse { child, .. } => child.requirements(),
        }
    }

    /// Everything this command may need over its whole run.  A sequence
    /// declares every child; a skipped command declares nothing.
    pub fn declared_requirements(&self) -> ResourceSet {
        match &self.kind {
            CommandKind::Primitive(p) => p.requirements(),
            CommandKind::Sequential { children, .. }
            | CommandKind::Parallel(children)
            | CommandKind::Race(children) => union_of(children, Command::declared_requirements),
            CommandKind::ConditionalSkip { child, skipped, .. } => {
                if *skipped {
                    ResourceSet::EMPTY
                } else {
                    child.declared_requirements()
                }
            }
            CommandKind::RunUntilFalse { child, .. } => child.declared_requirements(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Lifecycle
// ═══════════════════════════════════════════════════════════════

impl Command {
    /// Idle → Running.  Composites start the children their rule runs
    /// immediately.
    pub fn initialize<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        self.state = Lifecycle::Running;
        match &mut self.kind {
            CommandKind::Primitive(p) => p.initialize(ctx),
            CommandKind::Sequential { children, index, started } => {
                *index = 0;
                *started = false;
                if let Some(first) = children.first_mut() {
                    first.initialize(ctx);
                    *started = true;
                }
            }
            CommandKind::Parallel(children) | CommandKind::Race(children) => {
                for child in children.iter_mut() {
                    child.initialize(ctx);
                }
            }
            CommandKind::ConditionalSkip { skip_if, child, skipped } => {
                *skipped = ctx.sample(skip_if);
                if !*skipped {
                    child.initialize(ctx);
                }
            }
            CommandKind::RunUntilFalse { child, cut, .. } => {
                *cut = false;
                child.initialize(ctx);
            }
        }
    }

    /// Start children whose turn came up on an earlier tick.  Called by
    /// the scheduler after claims for the current requirement set are
    /// settled and before any `execute`.
    pub fn start_pending<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        if !self.is_running() {
            return;
        }
        if let CommandKind::Sequential { children, index, started } = &mut self.kind {
            if let Some(child) = children.get_mut(*index) {
                if *started {
                    child.start_pending(ctx);
                } else {
                    child.initialize(ctx);
                    *started = true;
                }
            }
            return;
        }
        for child in self.children_mut() {
            child.start_pending(ctx);
        }
    }

    pub fn execute<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        if !self.is_running() {
            return;
        }
        match &mut self.kind {
            CommandKind::Primitive(p) => p.execute(ctx),
            CommandKind::Sequential { children, index, started } => {
                if !*started {
                    return;
                }
                if let Some(child) = children.get_mut(*index) {
                    step(child, ctx);
                    if child.state.has_ended() {
                        *index += 1;
                        *started = false;
                    }
                }
            }
            CommandKind::Parallel(children) => {
                for child in children.iter_mut() {
                    step(child, ctx);
                }
            }
            CommandKind::Race(children) => {
                for child in children.iter_mut() {
                    step(child, ctx);
                }
                if children.iter().any(|c| c.state.has_ended()) {
                    for child in children.iter_mut() {
                        child.end(ctx, true);
                    }
                }
            }
            CommandKind::ConditionalSkip { child, skipped, .. } => {
                if !*skipped {
                    step(child, ctx);
                }
            }
            CommandKind::RunUntilFalse { condition, child, cut } => {
                if !ctx.sample(condition) {
                    child.end(ctx, true);
                    *cut = true;
                    return;
                }
                step(child, ctx);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.kind {
            CommandKind::Primitive(p) => p.is_finished(),
            CommandKind::Sequential { children, index, .. } => *index >= children.len(),
            CommandKind::Parallel(children) => children.iter().all(|c| c.state.has_ended()),
            CommandKind::Race(children) => {
                children.is_empty() || children.iter().any(|c| c.state.has_ended())
            }
            CommandKind::ConditionalSkip { child, skipped, .. } => {
                *skipped || child.state.has_ended()
            }
            CommandKind::RunUntilFalse { child, cut, .. } => *cut || child.state.has_ended(),
        }
    }

    /// Running → Finished, or Interrupted when `interrupted` is set or the
    /// command cut itself short.  No-op in any other state.
    pub fn end<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>, interrupted: bool) {
        if !self.is_running() {
            return;
        }
        if let CommandKind::Primitive(p) = &mut self.kind {
            p.end(ctx, interrupted);
        }
        for child in self.children_mut() {
            child.end(ctx, interrupted);
        }
        let cut = matches!(self.kind, CommandKind::RunUntilFalse { cut: true, .. });
        self.state = if interrupted || cut {
            Lifecycle::Interrupted
        } else {
            Lifecycle::Finished
        };
    }
}

/// Execute a running child and end it normally once it reports finished.
fn step<R: RobotPort + ?Sized>(child: &mut Command, ctx: &mut Ctx<'_, R>) {
    if !child.is_running() {
        return;
    }
    child.execute(ctx);
    if child.is_finished() {
        child.end(ctx, false);
    }
}
