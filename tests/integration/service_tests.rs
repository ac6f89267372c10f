//! Robot service integration tests.
//!
//! Full mode sequences (disabled, autonomous, teleop) against the mock
//! robot, checking the events emitted and the subsystem calls made.

use notebot::app::events::{Mode, RobotEvent};
use notebot::app::service::RobotService;
use notebot::auto::Routine;
use notebot::command::ResourceId;
use notebot::config::RobotConfig;
use notebot::controls::{Button, ControllerState};
use notebot::error::Error;
use notebot::scheduler::NoticeKind;

use crate::mock_hw::{MockConsole, MockRobot, RecordingSink, RobotCall};

struct Match {
    service: RobotService,
    robot: MockRobot,
    sink: RecordingSink,
    console: MockConsole,
}

impl Match {
    fn new(switch: i32, delay_secs: f64) -> Self {
        let mut sink = RecordingSink::new();
        let mut service = RobotService::new(RobotConfig::default()).unwrap();
        service.start(&mut sink);
        Self {
            service,
            robot: MockRobot::new(),
            sink,
            console: MockConsole { switch, delay_secs },
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        self.service.set_mode(mode, &mut self.robot, &self.console, &mut self.sink);
    }

    fn tick(&mut self, controls: &ControllerState) {
        self.service.tick(&mut self.robot, controls, &mut self.sink);
    }

    fn idle(&mut self, n: u32) {
        let neutral = ControllerState::neutral();
        for _ in 0..n {
            self.tick(&neutral);
        }
    }

    fn drivetrain(&self) -> Option<&'static str> {
        self.service.scheduler().claimant_name(ResourceId::Drivetrain)
    }
}

fn pressed(button: Button) -> ControllerState {
    ControllerState::neutral().with_button(button)
}

fn last_drive(robot: &MockRobot) -> Option<&RobotCall> {
    robot.calls.iter().rev().find(|c| matches!(c, RobotCall::Drive { .. }))
}

// ── Disabled ──────────────────────────────────────────────────

#[test]
fn disabled_robot_is_never_commanded() {
    let mut m = Match::new(1, 0.0);
    m.tick(&pressed(Button::X));
    m.idle(10);
    assert!(m.robot.calls.is_empty());
    assert_eq!(m.sink.events, vec![RobotEvent::Started(Mode::Disabled)]);
}

// ── Autonomous ────────────────────────────────────────────────

#[test]
fn shoot_routine_fires_the_preload_once() {
    let mut m = Match::new(1, 0.0);
    m.robot.note_in = true;
    m.set_mode(Mode::Autonomous);
    assert!(m.sink.events.contains(&RobotEvent::AutoSelected {
        routine: Routine::Shoot,
        delay_secs: 0.0,
    }));

    // Zero wait, then 50 ticks of spin-up and 13 of feed.
    m.idle(63);
    assert!(!m.sink.saw("auto_shoot", NoticeKind::Finished));
    m.idle(1);
    assert!(m.sink.saw("auto_shoot", NoticeKind::Finished));

    assert!(!m.robot.note_in);
    assert_eq!(m.robot.count(&RobotCall::StopShooter), 1);
    assert_eq!(m.robot.count(&RobotCall::HoldNote), 1);
}

#[test]
fn drive_routine_waits_out_the_delay_before_taking_the_drivetrain() {
    let mut m = Match::new(2, 1.0);
    m.set_mode(Mode::Autonomous);

    // The drivetrain default holds while the 50-tick wait runs.
    m.idle(50);
    assert_eq!(m.drivetrain(), Some("teleop_drive"));
    assert_eq!(m.robot.count_where(|c| matches!(c, RobotCall::ResetOdometry(_))), 0);

    m.idle(1);
    assert_eq!(m.drivetrain(), Some("auto_drive"));
    let reset = m.robot.calls.iter().find_map(|c| match c {
        RobotCall::ResetOdometry(p) => Some(*p),
        _ => None,
    });
    let reset = reset.unwrap();
    assert!(reset.x().abs() < 1e-9 && reset.y().abs() < 1e-9);
    assert!((reset.rotation.abs() - core::f64::consts::PI).abs() < 1e-9);
}

#[test]
fn autonomous_drive_default_sees_neutral_sticks() {
    let mut m = Match::new(0, 0.0);
    m.set_mode(Mode::Autonomous);
    let mut stick = ControllerState::neutral();
    stick.left_y = 1.0;
    m.tick(&stick);

    assert!(m.robot.calls.iter().any(|c| matches!(
        c,
        RobotCall::Drive { forward, strafe, rotation, brake_on_zero: true }
            if *forward == 0.0 && *strafe == 0.0 && *rotation == 0.0
    )));
}

#[test]
fn unknown_switch_falls_back_to_nothing() {
    let mut m = Match::new(42, 3.0);
    m.set_mode(Mode::Autonomous);
    assert!(m.sink.events.contains(&RobotEvent::AutoFallback {
        switch: 42,
        reason: Error::UnknownRoutine(42),
    }));

    m.idle(200);
    assert!(m.sink.saw("none", NoticeKind::Finished));
    assert_eq!(m.robot.count_where(|c| matches!(c, RobotCall::Shoot(_))), 0);
    assert_eq!(m.robot.count(&RobotCall::Deploy), 0);
    assert_eq!(m.drivetrain(), Some("teleop_drive"));
}

// ── Teleop ────────────────────────────────────────────────────

#[test]
fn held_x_locks_the_wheels_until_released() {
    let mut m = Match::new(0, 0.0);
    m.set_mode(Mode::Teleop);

    m.tick(&pressed(Button::X));
    m.tick(&pressed(Button::X));
    assert_eq!(m.drivetrain(), Some("set_x"));
    assert_eq!(m.robot.count(&RobotCall::SetX), 2);

    m.idle(1);
    assert!(m.sink.saw("set_x", NoticeKind::Interrupted));
    assert_eq!(m.drivetrain(), Some("teleop_drive"));
}

#[test]
fn teleop_drive_brakes_only_with_the_intake_stowed() {
    let mut m = Match::new(0, 0.0);
    m.set_mode(Mode::Teleop);
    let mut sticks = ControllerState::neutral();
    sticks.left_y = 0.5;
    m.tick(&sticks);
    assert!(matches!(
        last_drive(&m.robot),
        Some(RobotCall::Drive { forward, brake_on_zero: true, .. }) if *forward > 0.0
    ));

    m.robot.out = true;
    m.tick(&sticks);
    assert!(matches!(last_drive(&m.robot), Some(RobotCall::Drive { brake_on_zero: false, .. })));
}

#[test]
fn releasing_y_stops_the_hand_feed() {
    let mut m = Match::new(0, 0.0);
    m.set_mode(Mode::Teleop);

    m.tick(&pressed(Button::Y));
    m.tick(&pressed(Button::Y));
    assert_eq!(m.robot.count(&RobotCall::Shoot(-0.2)), 2);

    m.idle(2);
    assert!(m.sink.saw("hand_feed", NoticeKind::Interrupted));
    assert!(m.sink.saw("stow_note", NoticeKind::Finished));
    assert_eq!(m.robot.count(&RobotCall::StopShooter), 1);
    assert_eq!(m.robot.count(&RobotCall::Shoot(-0.2)), 2);
}

#[test]
fn left_trigger_retracts_then_shoots() {
    let mut m = Match::new(0, 0.0);
    m.set_mode(Mode::Teleop);
    m.robot.out = true;
    m.robot.note_in = true;
    let mut trigger = ControllerState::neutral();
    trigger.left_trigger = 0.9;

    // Tick 1 retracts (the mock arm stows in one call); tick 2 starts the shot.
    m.tick(&trigger);
    assert!(!m.robot.out);
    m.tick(&trigger);
    assert_eq!(m.robot.count(&RobotCall::Shoot(1.0)), 1);

    // Exactly at the threshold counts as released.
    trigger.left_trigger = 0.75;
    m.tick(&trigger);
    assert!(m.sink.saw("retract_and_shoot", NoticeKind::Interrupted));
    assert!(m.robot.note_in);
}

// ── Mode changes ──────────────────────────────────────────────

#[test]
fn mode_change_cancels_everything_and_rearms_triggers() {
    let mut m = Match::new(0, 0.0);
    m.set_mode(Mode::Teleop);
    m.tick(&pressed(Button::X));
    assert_eq!(m.drivetrain(), Some("set_x"));

    m.set_mode(Mode::Autonomous);
    assert!(m.sink.saw("set_x", NoticeKind::Interrupted));
    assert!(m.sink.events.contains(&RobotEvent::ModeChanged {
        from: Mode::Teleop,
        to: Mode::Autonomous,
    }));
    assert_eq!(m.service.scheduler().claimant(ResourceId::Drivetrain), None);

    // Back in teleop, a button still held counts as a fresh press.
    m.set_mode(Mode::Teleop);
    m.sink.clear();
    m.tick(&pressed(Button::X));
    assert!(m.sink.saw("set_x", NoticeKind::Scheduled));
}

#[test]
fn disabling_stops_all_commands() {
    let mut m = Match::new(2, 0.0);
    m.set_mode(Mode::Autonomous);
    m.idle(5);
    assert!(m.service.scheduler().active_count() > 0);

    m.set_mode(Mode::Disabled);
    assert_eq!(m.service.scheduler().active_count(), 0);
    m.robot.clear();
    m.idle(5);
    assert!(m.robot.calls.is_empty());
}
