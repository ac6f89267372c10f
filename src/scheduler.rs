//! Command scheduler.
//!
//! Owns the resource-claim arena and the active command set, and
//! advances every active command once per period.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Scheduler::tick                       │
//! │                                                              │
//! │  1. reconcile   each active command's current requirements   │
//! │                 against the claim table (insertion order;    │
//! │                 interruptible incumbents lose, others block) │
//! │  2. defaults    start the default of every unclaimed slot    │
//! │  3. start       sequential children whose turn came up       │
//! │  4. execute     step, test is_finished, end + release        │
//! │                                                              │
//! │  Resource arena                  Active set (≤ 16)           │
//! │  ┌────────────┬──────────┐       ┌──────────────────────┐    │
//! │  │ drivetrain │ #12      │◀──────│ #12 drive_path       │    │
//! │  │ shooter    │ -        │       │ #14 climber_stop (d) │    │
//! │  │ intake     │ -        │       └──────────────────────┘    │
//! │  │ climber    │ #14      │                                   │
//! │  └────────────┴──────────┘                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Claims are always settled before any `execute`, so a command never
//! drives a resource it does not hold.  Conflicts resolve last writer
//! wins, except that a non-interruptible incumbent keeps its resources:
//! a newcomer is dropped, and an already-active command that wants the
//! resource skips the tick.
//!
//! Lifecycle [`Notice`]s queue in a bounded ring and are drained by the
//! caller with [`Scheduler::drain_notices`].

use core::fmt;

use heapless::{Deque, Vec};
use log::{debug, info, warn};

use crate::app::ports::RobotPort;
use crate::command::{Command, Ctx, Lifecycle, ResourceId, ResourceSet};
use crate::error::{Error, Result};

/// Maximum number of simultaneously active commands.
pub const MAX_ACTIVE: usize = 16;

/// Notice ring depth.
pub const NOTICE_CAPACITY: usize = 32;

// ═══════════════════════════════════════════════════════════════
//  Handles and notices
// ═══════════════════════════════════════════════════════════════

/// Identifies one scheduling of a command.  Never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandHandle(u32);

impl fmt::Display for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Scheduled,
    Finished,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub handle: CommandHandle,
    pub name: &'static str,
    pub kind: NoticeKind,
}

// ═══════════════════════════════════════════════════════════════
//  Internal bookkeeping
// ═══════════════════════════════════════════════════════════════

#[derive(Default)]
struct ResourceSlot {
    claimant: Option<CommandHandle>,
    /// Prototype; a fresh clone runs whenever the slot is unclaimed.
    default: Option<Command>,
}

struct ActiveCommand {
    handle: CommandHandle,
    command: Command,
    default_for: Option<ResourceId>,
    /// Resources this command holds in the claim table.
    claims: ResourceSet,
    /// Waiting on a non-interruptible incumbent this tick.
    blocked: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler {
    slots: [ResourceSlot; ResourceId::COUNT],
    active: Vec<ActiveCommand, MAX_ACTIVE>,
    notices: Deque<Notice, NOTICE_CAPACITY>,
    next_handle: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| ResourceSlot::default()),
            active: Vec::new(),
            notices: Deque::new(),
            next_handle: 1,
        }
    }

    /// Bind `default` to `resource`.  The default must require the
    /// resource it is bound to.  Replacing a default takes effect the next
    /// time the slot falls idle.
    pub fn register(&mut self, resource: ResourceId, default: Command) -> Result<()> {
        if !default.requirements().contains(resource) {
            return Err(Error::DefaultWithoutResource(default.name()));
        }
        info!("Scheduler: default for {} is '{}'", resource, default.name());
        self.slots[resource.index()].default = Some(default);
        Ok(())
    }

    /// Claim the command's resources and start it.
    ///
    /// Interruptible incumbents are interrupted.  Returns `None`, without
    /// touching any incumbent, if a required resource is held by a
    /// non-interruptible command or the active set is full.
    pub fn schedule<R: RobotPort + ?Sized>(
        &mut self,
        command: Command,
        ctx: &mut Ctx<'_, R>,
    ) -> Option<CommandHandle> {
        self.admit(command, None, ctx)
    }

    /// Advance every active command by one period.
    pub fn tick<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        self.reconcile(ctx);
        self.sweep();
        self.start_defaults(ctx);

        for entry in self.active.iter_mut() {
            if !entry.blocked {
                entry.command.start_pending(ctx);
            }
        }

        for i in 0..self.active.len() {
            let entry = &mut self.active[i];
            if entry.blocked || !entry.command.is_running() {
                continue;
            }
            entry.command.execute(ctx);
            if !entry.command.is_finished() {
                continue;
            }
            entry.command.end(ctx, false);
            let kind = match entry.command.state() {
                Lifecycle::Interrupted => NoticeKind::Interrupted,
                _ => NoticeKind::Finished,
            };
            let (handle, name) = (entry.handle, entry.command.name());
            let claims = core::mem::take(&mut entry.claims);
            debug!("Scheduler: '{}' {} ended ({:?})", name, handle, kind);
            self.release(handle, claims);
            self.notify(handle, name, kind);
        }
        self.sweep();
    }

    /// Interrupt one command.  Returns whether it was active.
    pub fn cancel<R: RobotPort + ?Sized>(
        &mut self,
        handle: CommandHandle,
        ctx: &mut Ctx<'_, R>,
    ) -> bool {
        let was_active = self.is_scheduled(handle);
        self.interrupt(handle, ctx);
        self.sweep();
        was_active
    }

    /// Interrupt every active command, defaults included.  Defaults come
    /// back on the next tick.
    pub fn cancel_all<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        let count = self.active_count();
        for i in 0..self.active.len() {
            let handle = self.active[i].handle;
            self.interrupt(handle, ctx);
        }
        self.sweep();
        info!("Scheduler: cancelled {} command(s)", count);
    }

    pub fn is_scheduled(&self, handle: CommandHandle) -> bool {
        self.entry(handle).is_some_and(|e| e.command.is_running())
    }

    /// The command currently holding `resource`.
    pub fn claimant(&self, resource: ResourceId) -> Option<CommandHandle> {
        self.slots[resource.index()].claimant
    }

    pub fn claimant_name(&self, resource: ResourceId) -> Option<&'static str> {
        self.claimant(resource)
            .and_then(|h| self.entry(h))
            .map(|e| e.command.name())
    }

    /// Whether `resource` is held by its own default command.
    pub fn default_holds(&self, resource: ResourceId) -> bool {
        self.claimant(resource)
            .and_then(|h| self.entry(h))
            .is_some_and(|e| e.default_for == Some(resource))
    }

    /// Claim sets of every active command, in insertion order.
    pub fn claims(&self) -> impl Iterator<Item = (CommandHandle, ResourceSet)> + '_ {
        self.active.iter().map(|e| (e.handle, e.claims))
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|e| e.command.is_running()).count()
    }

    /// Hand every queued notice to `handler`, oldest first.
    pub fn drain_notices(&mut self, mut handler: impl FnMut(Notice)) {
        while let Some(notice) = self.notices.pop_front() {
            handler(notice);
        }
    }

    // ── internals ────────────────────────────────────────────────

    fn admit<R: RobotPort + ?Sized>(
        &mut self,
        command: Command,
        default_for: Option<ResourceId>,
        ctx: &mut Ctx<'_, R>,
    ) -> Option<CommandHandle> {
        if command.state() != Lifecycle::Idle {
            warn!("Scheduler: '{}' is not idle, ignored", command.name());
            return None;
        }
        let want = command.requirements();
        let incumbents = match self.incumbents(want) {
            Ok(incumbents) => incumbents,
            Err(blocker) => {
                debug!(
                    "Scheduler: '{}' dropped, {} is not interruptible",
                    command.name(),
                    blocker
                );
                return None;
            }
        };
        if self.active_count() - incumbents.len() >= MAX_ACTIVE {
            warn!("Scheduler: active set full, '{}' dropped", command.name());
            return None;
        }

        for incumbent in incumbents {
            self.interrupt(incumbent, ctx);
        }
        self.sweep();

        let handle = self.allocate_handle();
        let name = command.name();
        let entry = ActiveCommand {
            handle,
            command,
            default_for,
            claims: want,
            blocked: false,
        };
        if self.active.push(entry).is_err() {
            warn!("Scheduler: active set full, '{}' dropped", name);
            return None;
        }
        for id in want.iter() {
            self.slots[id.index()].claimant = Some(handle);
        }
        if let Some(entry) = self.active.last_mut() {
            entry.command.initialize(ctx);
        }
        debug!("Scheduler: '{}' scheduled as {} holding {}", name, handle, want);
        self.notify(handle, name, NoticeKind::Scheduled);
        Some(handle)
    }

    /// Settle claims against each command's current requirement set.
    fn reconcile<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        for i in 0..self.active.len() {
            let entry = &mut self.active[i];
            entry.blocked = false;
            if !entry.command.is_running() {
                continue;
            }
            let (handle, held, want) = (entry.handle, entry.claims, entry.command.requirements());
            if held == want {
                continue;
            }

            self.release(handle, held.difference(want));
            let need = want.difference(held);
            match self.incumbents(need) {
                Ok(incumbents) => {
                    for incumbent in incumbents {
                        self.interrupt(incumbent, ctx);
                    }
                    for id in need.iter() {
                        self.slots[id.index()].claimant = Some(handle);
                    }
                    self.active[i].claims = want;
                }
                Err(blocker) => {
                    let entry = &mut self.active[i];
                    entry.claims = held.intersection(want);
                    entry.blocked = true;
                    debug!(
                        "Scheduler: '{}' waiting on {}",
                        entry.command.name(),
                        blocker
                    );
                }
            }
        }
    }

    fn start_defaults<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        for id in ResourceId::ALL {
            let slot = &self.slots[id.index()];
            if slot.claimant.is_some() {
                continue;
            }
            let Some(default) = slot.default.clone() else {
                continue;
            };
            // Defaults only ever take idle resources.
            let idle = default
                .requirements()
                .iter()
                .all(|r| self.slots[r.index()].claimant.is_none());
            if idle {
                self.admit(default, Some(id), ctx);
            }
        }
    }

    /// Distinct holders of `wanted`, or the first non-interruptible one.
    fn incumbents(
        &self,
        wanted: ResourceSet,
    ) -> core::result::Result<Vec<CommandHandle, { ResourceId::COUNT }>, CommandHandle> {
        let mut out = Vec::new();
        for id in wanted.iter() {
            let Some(holder) = self.claimant(id) else {
                continue;
            };
            let Some(entry) = self.entry(holder) else {
                continue;
            };
            if !entry.command.is_interruptible() {
                return Err(holder);
            }
            if !out.contains(&holder) {
                // At most one holder per resource, so this cannot overflow.
                let _ = out.push(holder);
            }
        }
        Ok(out)
    }

    /// End a running command as interrupted and free its claims.  The
    /// entry stays in the active set until the next sweep.
    fn interrupt<R: RobotPort + ?Sized>(&mut self, handle: CommandHandle, ctx: &mut Ctx<'_, R>) {
        let Some(entry) = self.active.iter_mut().find(|e| e.handle == handle) else {
            return;
        };
        if !entry.command.is_running() {
            return;
        }
        entry.command.end(ctx, true);
        let name = entry.command.name();
        let claims = core::mem::take(&mut entry.claims);
        debug!("Scheduler: '{}' {} interrupted", name, handle);
        self.release(handle, claims);
        self.notify(handle, name, NoticeKind::Interrupted);
    }

    fn release(&mut self, handle: CommandHandle, claims: ResourceSet) {
        for id in claims.iter() {
            let slot = &mut self.slots[id.index()];
            if slot.claimant == Some(handle) {
                slot.claimant = None;
            }
        }
    }

    fn sweep(&mut self) {
        self.active.retain(|e| e.command.is_running());
    }

    fn entry(&self, handle: CommandHandle) -> Option<&ActiveCommand> {
        self.active.iter().find(|e| e.handle == handle)
    }

    fn allocate_handle(&mut self) -> CommandHandle {
        let handle = CommandHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        handle
    }

    fn notify(&mut self, handle: CommandHandle, name: &'static str, kind: NoticeKind) {
        if self.notices.push_back(Notice { handle, name, kind }).is_err() {
            warn!("Scheduler: notice queue full, dropped {:?} for '{}'", kind, name);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
