//! Serial link to the microcontroller

use std::io::Write;
use std::time::Duration;

use super::{Sink, SinkError, SinkKind};

/// Line-oriented writer to a serial device
///
/// Each action is sent as UTF-8 text terminated by `\n`. The port is held for
/// the lifetime of the sink and closed on drop.
pub struct SerialSink {
    port_name: String,
    port: Box<dyn Write + Send>,
}

impl SerialSink {
    /// Open the port, then wait `settle` for the board to come out of reset
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        timeout: Duration,
        settle: Duration,
    ) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, baud_rate).timeout(timeout).open()?;
        tracing::info!(port = port_name, baud_rate, "Serial port opened");
        if !settle.is_zero() {
            std::thread::sleep(settle);
        }
        Ok(Self {
            port_name: port_name.to_string(),
            port: Box::new(port),
        })
    }

    /// Wrap an arbitrary writer, e.g. a pseudo terminal or an in-memory buffer
    pub fn from_writer(port_name: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            port_name: port_name.into(),
            port: Box::new(writer),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Sink for SerialSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Serial
    }

    fn send(&mut self, text: &str) -> Result<(), SinkError> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.port.write_all(line.as_bytes())?;
        self.port.flush()?;
        Ok(())
    }
}

impl Drop for SerialSink {
    fn drop(&mut self) {
        let _ = self.port.flush();
        tracing::info!(port = %self.port_name, "Serial port closed");
    }
}
