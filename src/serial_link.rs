//! Serial (Bluetooth SPP) link to the microcontroller.
//!
//! Wire format is one level per line: ASCII decimal digits followed by `\n`.
//! No framing, no acknowledgement.

use anyhow::{Context, Result};
use serialport::SerialPort;
use std::io::Write;
use std::time::Duration;

use crate::level::Level;

/// Destination for computed levels.
pub trait LevelSink {
    fn is_open(&self) -> bool;

    /// Write one level. A failure is reported but leaves the sink usable.
    fn send(&mut self, level: Level) -> Result<()>;

    /// Release the connection. Safe to call more than once.
    fn close(&mut self);
}

/// Encode `level` as `<decimal>\n` and push it out of `writer`.
pub fn write_level<W: Write + ?Sized>(writer: &mut W, level: Level) -> std::io::Result<()> {
    writeln!(writer, "{}", level)?;
    writer.flush()
}

pub struct SerialSink {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialSink {
    pub fn open(port_name: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(timeout)
            .open()
            .with_context(|| format!("Failed to open serial port '{}'", port_name))?;

        log::info!(
            "Serial link: port={}, baud={}, timeout={:?}",
            port_name,
            baud_rate,
            timeout,
        );

        Ok(Self {
            port_name: port_name.to_string(),
            port: Some(port),
        })
    }
}

impl LevelSink for SerialSink {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn send(&mut self, level: Level) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .with_context(|| format!("Serial port '{}' is closed", self.port_name))?;
        write_level(&mut **port, level)
            .with_context(|| format!("Failed to write to serial port '{}'", self.port_name))
    }

    fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush() {
                log::warn!("Flush before closing '{}' failed: {}", self.port_name, e);
            }
            log::info!("Serial port '{}' closed", self.port_name);
        }
    }
}

impl Drop for SerialSink {
    fn drop(&mut self) {
        self.close();
    }
}
