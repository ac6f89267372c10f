//! Mock robot adapter for integration tests.
//!
//! Records every subsystem call so tests can assert on the full command
//! history without a simulation model in the way.  Sensors are plain
//! flags the test sets directly.

use notebot::app::events::RobotEvent;
use notebot::app::ports::{
    ClimberPort, ConsolePort, DrivePort, EventSink, IntakePort, ShooterPort,
};
use notebot::motion::geometry::Pose2d;
use notebot::motion::kinematics::{MODULE_COUNT, SwerveModuleState};
use notebot::scheduler::{Notice, NoticeKind};

// ── Robot call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RobotCall {
    Drive { forward: f64, strafe: f64, rotation: f64, brake_on_zero: bool },
    ResetOdometry(Pose2d),
    ModuleStates,
    SetX,
    Shoot(f64),
    StopShooter,
    Deploy,
    Retract,
    IntakeNote(f64),
    HoldNote,
    DropNote,
    SpitNote,
    Climb(f64),
    ArmIndependent(f64),
    StopClimber,
}

// ── MockRobot ─────────────────────────────────────────────────

pub struct MockRobot {
    pub calls: Vec<RobotCall>,
    pub pose: Pose2d,
    pub note_in: bool,
    pub out: bool,
}

#[allow(dead_code)]
impl MockRobot {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            pose: Pose2d::default(),
            note_in: false,
            out: false,
        }
    }

    pub fn last_call(&self) -> Option<&RobotCall> {
        self.calls.last()
    }

    pub fn count(&self, call: &RobotCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn count_where(&self, pred: impl Fn(&RobotCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl DrivePort for MockRobot {
    fn drive(
        &mut self,
        forward: f64,
        strafe: f64,
        rotation: f64,
        _field_relative: bool,
        _rate_limited: bool,
        brake_on_zero: bool,
    ) {
        self.calls.push(RobotCall::Drive { forward, strafe, rotation, brake_on_zero });
    }

    fn pose(&self) -> Pose2d {
        self.pose
    }

    fn reset_odometry(&mut self, pose: Pose2d) {
        self.pose = pose;
        self.calls.push(RobotCall::ResetOdometry(pose));
    }

    fn set_module_states(&mut self, _states: [SwerveModuleState; MODULE_COUNT]) {
        self.calls.push(RobotCall::ModuleStates);
    }

    fn set_x(&mut self) {
        self.calls.push(RobotCall::SetX);
    }
}

impl ShooterPort for MockRobot {
    fn shoot(&mut self, speed: f64) {
        self.calls.push(RobotCall::Shoot(speed));
    }

    fn stop_shooter(&mut self) {
        self.calls.push(RobotCall::StopShooter);
    }
}

impl IntakePort for MockRobot {
    fn deploy(&mut self) {
        self.out = true;
        self.calls.push(RobotCall::Deploy);
    }

    fn retract(&mut self) {
        self.out = false;
        self.calls.push(RobotCall::Retract);
    }

    fn intake_note(&mut self, speed: f64) {
        self.calls.push(RobotCall::IntakeNote(speed));
    }

    fn hold_note(&mut self) {
        self.calls.push(RobotCall::HoldNote);
    }

    fn drop_note(&mut self) {
        self.calls.push(RobotCall::DropNote);
    }

    fn spit_note(&mut self) {
        self.note_in = false;
        self.calls.push(RobotCall::SpitNote);
    }

    fn is_note_in(&self) -> bool {
        self.note_in
    }

    fn is_out(&self) -> bool {
        self.out
    }
}

impl ClimberPort for MockRobot {
    fn climb(&mut self, speed: f64) {
        self.calls.push(RobotCall::Climb(speed));
    }

    fn arm_independent(&mut self, speed: f64) {
        self.calls.push(RobotCall::ArmIndependent(speed));
    }

    fn stop_climber(&mut self) {
        self.calls.push(RobotCall::StopClimber);
    }
}

// ── Console ───────────────────────────────────────────────────

pub struct MockConsole {
    pub switch: i32,
    pub delay_secs: f64,
}

impl ConsolePort for MockConsole {
    fn rot_sw_0(&self) -> i32 {
        self.switch
    }

    fn rot_sw_1(&self) -> f64 {
        self.delay_secs
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<RobotEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command notices, in emission order.
    pub fn notices(&self) -> Vec<Notice> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RobotEvent::Command(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn saw(&self, name: &str, kind: NoticeKind) -> bool {
        self.notices().iter().any(|n| n.name == name && n.kind == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &RobotEvent) {
        self.events.push(event.clone());
    }
}
