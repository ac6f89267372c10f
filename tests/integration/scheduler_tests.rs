//! Scheduler integration tests.
//!
//! Drives the scheduler tick by tick against [`MockRobot`] and checks
//! claims, lifecycle notices, and the exact subsystem calls made.

use notebot::command::{library, Command, Condition, Ctx, Primitive, ResourceId, RunAction};
use notebot::config::RobotConfig;
use notebot::controls::ControllerState;
use notebot::scheduler::{CommandHandle, Notice, NoticeKind, Scheduler};

use crate::mock_hw::{MockRobot, RobotCall};

struct Rig {
    sched: Scheduler,
    robot: MockRobot,
    controls: ControllerState,
    notices: Vec<Notice>,
}

impl Rig {
    fn new() -> Self {
        Self {
            sched: Scheduler::new(),
            robot: MockRobot::new(),
            controls: ControllerState::neutral(),
            notices: Vec::new(),
        }
    }

    fn schedule(&mut self, command: Command) -> Option<CommandHandle> {
        let mut ctx = Ctx::new(&mut self.robot, &self.controls);
        let handle = self.sched.schedule(command, &mut ctx);
        self.drain();
        handle
    }

    fn tick(&mut self) {
        let mut ctx = Ctx::new(&mut self.robot, &self.controls);
        self.sched.tick(&mut ctx);
        self.drain();
    }

    fn ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    fn cancel(&mut self, handle: CommandHandle) -> bool {
        let mut ctx = Ctx::new(&mut self.robot, &self.controls);
        let was = self.sched.cancel(handle, &mut ctx);
        self.drain();
        was
    }

    fn drain(&mut self) {
        let notices = &mut self.notices;
        self.sched.drain_notices(|n| notices.push(n));
    }

    fn kinds_for(&self, handle: CommandHandle) -> Vec<NoticeKind> {
        self.notices
            .iter()
            .filter(|n| n.handle == handle)
            .map(|n| n.kind)
            .collect()
    }
}

fn wait(name: &'static str, ticks: u32) -> Command {
    Command::primitive(name, Primitive::wait_ticks(ticks))
}

// ── Race ──────────────────────────────────────────────────────

#[test]
fn race_finishes_with_its_fastest_child() {
    let cfg = RobotConfig::default();
    let mut rig = Rig::new();
    // The shot takes far longer than three ticks.
    let race = Command::race(vec![wait("c1", 3), library::shoot_note(&cfg)]);
    let h = rig.schedule(race).unwrap();

    rig.ticks(2);
    assert!(rig.sched.is_scheduled(h));
    assert_eq!(rig.robot.count(&RobotCall::StopShooter), 0);

    rig.tick();
    assert!(!rig.sched.is_scheduled(h));
    assert_eq!(rig.kinds_for(h), vec![NoticeKind::Scheduled, NoticeKind::Finished]);
    assert_eq!(rig.robot.count_where(|c| matches!(c, RobotCall::Shoot(_))), 3);
    // The losing shot was ended exactly once.
    assert_eq!(rig.robot.count(&RobotCall::StopShooter), 1);
    assert_eq!(rig.sched.claimant(ResourceId::Shooter), None);
    assert_eq!(rig.sched.claimant(ResourceId::Intake), None);
}

// ── Sequential ────────────────────────────────────────────────

#[test]
fn interrupted_sequence_ends_running_child_once_and_never_starts_the_rest() {
    let cfg = RobotConfig::default();
    let mut rig = Rig::new();
    let seq = Command::sequence(vec![
        wait("a", 1),
        library::note_intake(&cfg),
        library::shoot_note(&cfg),
    ]);
    let h = rig.schedule(seq).unwrap();

    // Tick 1 finishes the wait; tick 2 starts and runs the rollers.
    rig.ticks(2);
    assert_eq!(rig.sched.claimant(ResourceId::Intake), Some(h));
    assert_eq!(rig.robot.count_where(|c| matches!(c, RobotCall::IntakeNote(_))), 1);

    assert!(rig.cancel(h));
    assert_eq!(rig.kinds_for(h), vec![NoticeKind::Scheduled, NoticeKind::Interrupted]);
    assert_eq!(rig.robot.count(&RobotCall::HoldNote), 1);
    assert_eq!(rig.robot.count_where(|c| matches!(c, RobotCall::Shoot(_))), 0);
    assert_eq!(rig.robot.count(&RobotCall::StopShooter), 0);

    // A second cancel is a no-op.
    assert!(!rig.cancel(h));
    assert_eq!(rig.robot.count(&RobotCall::HoldNote), 1);
}

#[test]
fn sequence_claims_follow_the_running_child() {
    let cfg = RobotConfig::default();
    let mut rig = Rig::new();
    let h = rig
        .schedule(library::deploy_intake().and_then(library::shoot_note(&cfg)))
        .unwrap();
    assert_eq!(rig.sched.claimant(ResourceId::Intake), Some(h));
    assert_eq!(rig.sched.claimant(ResourceId::Shooter), None);

    // Mock arm deploys in one call.
    rig.tick();
    assert!(rig.robot.out);
    assert_eq!(rig.sched.claimant(ResourceId::Shooter), None);

    rig.tick();
    assert_eq!(rig.sched.claimant(ResourceId::Shooter), Some(h));
    assert_eq!(rig.sched.claimant(ResourceId::Intake), Some(h));
}

// ── Parallel ──────────────────────────────────────────────────

#[test]
fn parallel_keeps_every_branch_claimed_until_it_ends() {
    let mut rig = Rig::new();
    rig.robot.out = true;
    let par = Command::parallel(vec![
        Command::sequence(vec![library::retract_intake()]),
        library::set_x(),
    ]);
    let h = rig.schedule(par).unwrap();

    // The retract branch finishes on tick 1; set_x keeps running.
    rig.ticks(3);
    assert!(!rig.robot.out);
    assert!(rig.sched.is_scheduled(h));
    assert_eq!(rig.sched.claimant(ResourceId::Intake), Some(h));
    assert_eq!(rig.sched.claimant(ResourceId::Drivetrain), Some(h));

    assert!(rig.cancel(h));
    assert_eq!(rig.sched.claimant(ResourceId::Intake), None);
}

// ── ConditionalSkip ───────────────────────────────────────────

#[test]
fn skipped_command_never_touches_its_subsystem() {
    let mut rig = Rig::new();
    rig.robot.note_in = true;
    let h = rig.schedule(library::deploy_intake().unless(Condition::NoteLoaded)).unwrap();

    rig.tick();
    assert!(!rig.sched.is_scheduled(h));
    assert_eq!(rig.kinds_for(h), vec![NoticeKind::Scheduled, NoticeKind::Finished]);
    // The wrapper reports once, under the wrapped command's name.
    assert!(rig.notices.iter().all(|n| n.name == "deploy_intake"));
    assert_eq!(rig.robot.count(&RobotCall::Deploy), 0);
    assert_eq!(rig.sched.claimant(ResourceId::Intake), None);
}

#[test]
fn unskipped_command_runs_normally() {
    let mut rig = Rig::new();
    let h = rig.schedule(library::deploy_intake().unless(Condition::NoteLoaded)).unwrap();

    rig.tick();
    assert!(!rig.sched.is_scheduled(h));
    assert_eq!(rig.robot.count(&RobotCall::Deploy), 1);
}

#[test]
fn collect_note_with_a_note_seated_only_retracts() {
    let cfg = RobotConfig::default();
    let mut rig = Rig::new();
    rig.robot.note_in = true;
    rig.robot.out = true;
    let h = rig.schedule(library::collect_note(&cfg)).unwrap();

    rig.ticks(5);
    assert!(!rig.sched.is_scheduled(h));
    assert_eq!(rig.robot.calls, vec![RobotCall::Retract]);
}

// ── Non-interruptible ─────────────────────────────────────────

#[test]
fn non_interruptible_holder_rejects_newcomers() {
    let mut rig = Rig::new();
    let holder = rig.schedule(library::climb(0.5).non_interruptible()).unwrap();

    assert_eq!(rig.schedule(library::climber_stop()), None);
    assert_eq!(rig.sched.claimant(ResourceId::Climber), Some(holder));

    rig.tick();
    assert_eq!(rig.robot.last_call(), Some(&RobotCall::Climb(0.5)));
    assert_eq!(rig.robot.count(&RobotCall::StopClimber), 0);
}

#[test]
fn active_command_waits_for_non_interruptible_holder() {
    let mut rig = Rig::new();
    let holder = rig.schedule(library::climb(0.5).non_interruptible()).unwrap();
    let waiter = rig.schedule(wait("w", 1).and_then(library::arm_independent(-0.2))).unwrap();

    // The wait needs nothing and finishes; the arm step is then blocked.
    rig.ticks(3);
    assert!(rig.sched.is_scheduled(waiter));
    assert_eq!(rig.sched.claimant(ResourceId::Climber), Some(holder));
    assert_eq!(rig.robot.count(&RobotCall::ArmIndependent(-0.2)), 0);

    rig.cancel(holder);
    rig.tick();
    assert_eq!(rig.sched.claimant(ResourceId::Climber), Some(waiter));
    assert_eq!(rig.robot.last_call(), Some(&RobotCall::ArmIndependent(-0.2)));
}

// ── Defaults and last writer wins ─────────────────────────────

#[test]
fn default_yields_and_returns() {
    let mut rig = Rig::new();
    rig.sched.register(ResourceId::Climber, library::climber_stop()).unwrap();

    rig.tick();
    assert!(rig.sched.default_holds(ResourceId::Climber));
    assert_eq!(rig.robot.last_call(), Some(&RobotCall::StopClimber));

    let climb = rig.schedule(library::climb(0.4)).unwrap();
    assert!(rig.notices.iter().any(|n| n.name == "climber_stop" && n.kind == NoticeKind::Interrupted));
    rig.tick();
    assert_eq!(rig.robot.last_call(), Some(&RobotCall::Climb(0.4)));

    rig.cancel(climb);
    rig.tick();
    assert!(rig.sched.default_holds(ResourceId::Climber));
    assert_eq!(rig.robot.last_call(), Some(&RobotCall::StopClimber));
}

#[test]
fn default_must_require_its_resource() {
    let mut sched = Scheduler::new();
    assert!(sched.register(ResourceId::Drivetrain, library::climber_stop()).is_err());
}

#[test]
fn newest_claim_wins_and_releases_whole_incumbent() {
    let cfg = RobotConfig::default();
    let mut rig = Rig::new();
    let shot = rig.schedule(library::shoot_note(&cfg)).unwrap();
    rig.tick();

    let hold = rig.schedule(library::hold_note()).unwrap();
    assert!(!rig.sched.is_scheduled(shot));
    assert_eq!(rig.sched.claimant(ResourceId::Intake), Some(hold));
    // The shooter was freed along with the contested intake.
    assert_eq!(rig.sched.claimant(ResourceId::Shooter), None);
    assert_eq!(rig.robot.count(&RobotCall::StopShooter), 1);
}

#[test]
fn two_drive_commands_never_execute_in_the_same_tick() {
    let mut rig = Rig::new();
    rig.schedule(Command::primitive("spin", Primitive::Run(RunAction::SetX))).unwrap();
    rig.schedule(library::set_x()).unwrap();
    rig.robot.clear();

    rig.tick();
    assert_eq!(rig.robot.calls, vec![RobotCall::SetX]);
    assert_eq!(rig.sched.active_count(), 1);
}
