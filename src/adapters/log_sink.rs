//! Log-based event sink adapter.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing every
//! [`RobotEvent`] as one log line.  The library never installs a logger;
//! the host binary does.

use log::{info, warn};

use crate::app::events::RobotEvent;
use crate::app::ports::EventSink;
use crate::scheduler::NoticeKind;

/// Adapter that logs every [`RobotEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RobotEvent) {
        match event {
            RobotEvent::Started(mode) => {
                info!("START | mode={:?}", mode);
            }
            RobotEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            RobotEvent::AutoSelected { routine, delay_secs } => {
                info!("AUTO  | {} delay={:.2}s", routine, delay_secs);
            }
            RobotEvent::AutoFallback { switch, reason } => {
                warn!("AUTO  | switch={} unusable: {}, doing nothing", switch, reason);
            }
            RobotEvent::Command(notice) => {
                let verb = match notice.kind {
                    NoticeKind::Scheduled => "scheduled",
                    NoticeKind::Finished => "finished",
                    NoticeKind::Interrupted => "interrupted",
                };
                info!("CMD   | {} '{}' {}", notice.handle, notice.name, verb);
            }
        }
    }
}
