//! Actuators driven by confirmed gestures
//!
//! Every sink is best-effort and fails independently. The dispatcher tries
//! each one in turn and records the outcome without letting a failure stop
//! the remaining sinks.

pub mod command;
pub mod serial;

use std::fmt;

use thiserror::Error;

pub use command::CommandSink;
pub use serial::SerialSink;

/// Which actuator a sink drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Display,
    Speech,
    Serial,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Display => "display",
            SinkKind::Speech => "speech",
            SinkKind::Serial => "serial",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a single delivery attempt
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: std::process::ExitStatus },
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for action text
pub trait Sink {
    fn kind(&self) -> SinkKind;

    /// Deliver one message; called at most once per confirmation
    fn send(&mut self, text: &str) -> Result<(), SinkError>;
}

/// Sink that accepts and discards everything, for actuators switched off in settings
pub struct NullSink {
    kind: SinkKind,
}

impl NullSink {
    pub fn boxed(kind: SinkKind) -> Box<dyn Sink> {
        Box::new(Self { kind })
    }
}

impl Sink for NullSink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    fn send(&mut self, _text: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// What happened to one sink during a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Delivered,
    Failed(String),
    /// Sink not available (serial link never opened)
    Skipped,
}

/// Per-sink results of a dispatch, in display, speech, serial order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<(SinkKind, SinkOutcome)>,
}

impl DispatchReport {
    pub fn outcome(&self, kind: SinkKind) -> Option<&SinkOutcome> {
        self.outcomes.iter().find(|(k, _)| *k == kind).map(|(_, o)| o)
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SinkOutcome::Failed(_)))
            .count()
    }

    pub fn all_delivered(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, o)| matches!(o, SinkOutcome::Delivered | SinkOutcome::Skipped))
    }
}

/// Fans a confirmed action out to the display, speech and serial sinks
///
/// Owns its sinks; dropping the dispatcher releases them (closing the serial
/// port).
pub struct ActionDispatcher {
    display: Box<dyn Sink>,
    speech: Box<dyn Sink>,
    serial: Option<Box<dyn Sink>>,
}

impl ActionDispatcher {
    /// `serial` is `None` when the link could not be opened at startup
    pub fn new(display: Box<dyn Sink>, speech: Box<dyn Sink>, serial: Option<Box<dyn Sink>>) -> Self {
        Self { display, speech, serial }
    }

    pub fn serial_enabled(&self) -> bool {
        self.serial.is_some()
    }

    /// Relay an action label to every sink
    pub fn dispatch(&mut self, action: &str) -> DispatchReport {
        let mut outcomes = Vec::with_capacity(3);
        outcomes.push((SinkKind::Display, deliver(&mut *self.display, action)));
        outcomes.push((SinkKind::Speech, deliver(&mut *self.speech, action)));
        let serial = match self.serial.as_deref_mut() {
            Some(sink) => deliver(sink, action),
            None => SinkOutcome::Skipped,
        };
        outcomes.push((SinkKind::Serial, serial));
        DispatchReport { outcomes }
    }

    /// Show a status message on the display only
    pub fn announce(&mut self, text: &str) -> SinkOutcome {
        deliver(&mut *self.display, text)
    }
}

fn deliver(sink: &mut dyn Sink, text: &str) -> SinkOutcome {
    let kind = sink.kind();
    match sink.send(text) {
        Ok(()) => {
            tracing::debug!(sink = %kind, text, "Delivered");
            SinkOutcome::Delivered
        }
        Err(e) => {
            tracing::error!(sink = %kind, "Error sending {:?}: {}", text, e);
            SinkOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory sink recording messages into a shared log
    pub(crate) struct RecordingSink {
        kind: SinkKind,
        fail: bool,
        log: Rc<RefCell<Vec<(SinkKind, String)>>>,
    }

    impl RecordingSink {
        pub(crate) fn boxed(
            kind: SinkKind,
            fail: bool,
            log: &Rc<RefCell<Vec<(SinkKind, String)>>>,
        ) -> Box<dyn Sink> {
            Box::new(Self {
                kind,
                fail,
                log: log.clone(),
            })
        }
    }

    impl Sink for RecordingSink {
        fn kind(&self) -> SinkKind {
            self.kind
        }

        fn send(&mut self, text: &str) -> Result<(), SinkError> {
            self.log.borrow_mut().push((self.kind, text.to_string()));
            if self.fail {
                Err(SinkError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged")))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_dispatch_reaches_all_sinks_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = ActionDispatcher::new(
            RecordingSink::boxed(SinkKind::Display, false, &log),
            RecordingSink::boxed(SinkKind::Speech, false, &log),
            Some(RecordingSink::boxed(SinkKind::Serial, false, &log)),
        );

        let report = dispatcher.dispatch("Thumbs Up");
        assert!(report.all_delivered());
        assert_eq!(report.failures(), 0);
        assert_eq!(
            *log.borrow(),
            vec![
                (SinkKind::Display, "Thumbs Up".to_string()),
                (SinkKind::Speech, "Thumbs Up".to_string()),
                (SinkKind::Serial, "Thumbs Up".to_string()),
            ]
        );
    }

    #[test]
    fn test_failure_does_not_stop_other_sinks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = ActionDispatcher::new(
            RecordingSink::boxed(SinkKind::Display, true, &log),
            RecordingSink::boxed(SinkKind::Speech, true, &log),
            Some(RecordingSink::boxed(SinkKind::Serial, false, &log)),
        );

        let report = dispatcher.dispatch("Pointing");
        assert_eq!(report.failures(), 2);
        assert!(!report.all_delivered());
        assert!(matches!(report.outcome(SinkKind::Display), Some(SinkOutcome::Failed(_))));
        assert_eq!(report.outcome(SinkKind::Serial), Some(&SinkOutcome::Delivered));
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_disabled_serial_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = ActionDispatcher::new(
            RecordingSink::boxed(SinkKind::Display, false, &log),
            RecordingSink::boxed(SinkKind::Speech, false, &log),
            None,
        );
        assert!(!dispatcher.serial_enabled());

        let report = dispatcher.dispatch("Open Palm");
        assert_eq!(report.outcome(SinkKind::Serial), Some(&SinkOutcome::Skipped));
        assert_eq!(report.outcome(SinkKind::Display), Some(&SinkOutcome::Delivered));
        assert_eq!(report.outcome(SinkKind::Speech), Some(&SinkOutcome::Delivered));
        assert!(report.all_delivered());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_announce_uses_display_only() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = ActionDispatcher::new(
            RecordingSink::boxed(SinkKind::Display, false, &log),
            RecordingSink::boxed(SinkKind::Speech, false, &log),
            Some(RecordingSink::boxed(SinkKind::Serial, false, &log)),
        );
        assert_eq!(dispatcher.announce("Started ."), SinkOutcome::Delivered);
        assert_eq!(*log.borrow(), vec![(SinkKind::Display, "Started .".to_string())]);
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullSink::boxed(SinkKind::Speech);
        assert_eq!(sink.kind(), SinkKind::Speech);
        assert!(sink.send("anything").is_ok());
    }

    #[test]
    fn test_sink_kind_names() {
        assert_eq!(SinkKind::Display.as_str(), "display");
        assert_eq!(SinkKind::Speech.to_string(), "speech");
        assert_eq!(SinkKind::Serial.as_str(), "serial");
    }
}
