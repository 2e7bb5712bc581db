//! The serial device link.
//!
//! Commands and replies both travel as CRLF-terminated lines. Replies are
//! never awaited synchronously: a command is written, and whatever the
//! device says arrives on a later read. See the device firmware at
//! <https://github.com/BruceFletcher/SpaceTime/blob/master/sw/serial.c>.

use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use serialport::{ClearBuffer, SerialPort};

use doorbridge_app::ports::DeviceLink;
use doorbridge_domain::clock::ClockId;
use doorbridge_domain::error::BridgeError;
use doorbridge_domain::message::{DeviceMessage, CRLF, OK_TOKEN};
use doorbridge_domain::time::TimeOfDay;

use crate::config::SerialConfig;
use crate::error::SerialLinkError;

/// Probe command for the handshake; the device answers `OK`.
const PROBE_COMMAND: &str = "AT";
/// How long to let the device react to a buffer flush.
const SETTLE_DELAY: Duration = Duration::from_millis(250);

/// A [`DeviceLink`] over a physical serial port.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open the configured serial device.
    ///
    /// # Errors
    ///
    /// Returns [`SerialLinkError::Open`] when the port cannot be opened.
    pub fn open(config: &SerialConfig) -> Result<Self, SerialLinkError> {
        let port = serialport::new(&config.device, config.baud)
            .timeout(config.read_timeout())
            .open()
            .map_err(|source| SerialLinkError::Open {
                device: config.device.clone(),
                source,
            })?;
        tracing::info!(device = %config.device, baud = config.baud, "serial port open");
        Ok(Self { port })
    }

    fn send_command(&mut self, command: &str) -> Result<(), SerialLinkError> {
        tracing::debug!(%command, "sending serial command");
        self.port.write_all(command.as_bytes())?;
        self.port.write_all(CRLF.as_bytes())?;
        Ok(())
    }

    /// Read one line, bounded by the port's read timeout, with the
    /// terminator stripped. A timeout yields whatever arrived so far —
    /// usually the empty string.
    fn read_line(&mut self) -> Result<String, SerialLinkError> {
        let mut buf = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    buf.push(byte[0]);
                }
                Err(err) if err.kind() == ErrorKind::TimedOut => break,
                Err(err) => return Err(err.into()),
            }
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn pending_bytes(&mut self) -> Result<bool, SerialLinkError> {
        Ok(self.port.bytes_to_read()? > 0)
    }
}

impl DeviceLink for SerialLink {
    fn clear_buffers(&mut self) -> Result<(), BridgeError> {
        // A bare terminator makes the device discard whatever half-line is
        // sitting in its own input buffer.
        self.port
            .write_all(CRLF.as_bytes())
            .map_err(SerialLinkError::from)?;
        self.port.flush().map_err(SerialLinkError::from)?;
        thread::sleep(SETTLE_DELAY);
        self.port
            .clear(ClearBuffer::All)
            .map_err(SerialLinkError::from)?;
        Ok(())
    }

    fn has_pending_input(&mut self) -> Result<bool, BridgeError> {
        Ok(self.pending_bytes()?)
    }

    fn handshake(
        &mut self,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<bool, BridgeError> {
        let started = Instant::now();
        loop {
            self.send_command(PROBE_COMMAND)?;

            while self.pending_bytes()? {
                if self.read_line()? == OK_TOKEN {
                    self.clear_buffers()?;
                    return Ok(true);
                }
            }

            if started.elapsed() > timeout {
                return Ok(false);
            }

            // Small pause between probes in case the device is mid-boot.
            thread::sleep(retry_interval);
        }
    }

    fn read_message(&mut self) -> Result<DeviceMessage, BridgeError> {
        let line = self.read_line()?;
        Ok(DeviceMessage::classify(&line))
    }

    fn request_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError> {
        Ok(self.send_command(&query_command(clock))?)
    }

    fn set_clock_time(&mut self, clock: ClockId, time: TimeOfDay) -> Result<(), BridgeError> {
        Ok(self.send_command(&set_command(clock, time))?)
    }

    fn clear_clock_time(&mut self, clock: ClockId) -> Result<(), BridgeError> {
        Ok(self.send_command(&clear_command(clock))?)
    }
}

/// `ATST<id>?` — ask the device to report a clock.
fn query_command(clock: ClockId) -> String {
    format!("ATST{clock}?")
}

/// `ATST<id>=<HH:MM:SS>` — write a clock.
fn set_command(clock: ClockId, time: TimeOfDay) -> String {
    format!("ATST{clock}={time}")
}

/// `ATST<id>=X` — clear a clock.
fn clear_command(clock: ClockId) -> String {
    format!("ATST{clock}=X")
}
