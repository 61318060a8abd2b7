//! Serial emitter: start marker + packet bytes, fire and forget.
use std::io::Write;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::protocol::wire::START_MARKER;
use crate::transport::TransportSink;
use crate::TSResult;

/// Baud rate expected by the receiving side.
pub const BAUD_RATE: u32 = 115_200;

const WRITE_TIMEOUT: Duration = Duration::from_millis(200);

/// Writes `[marker][packet]` units to a byte-oriented device.
///
/// Generic over the underlying writer so the framing can be exercised
/// against an in-memory sink; production code opens a real device through
/// [`FramedSerialWriter::open`].
pub struct FramedSerialWriter<W> {
    device: W,
}

impl FramedSerialWriter<Box<dyn SerialPort>> {
    /// Open and configure `device` at 115200 8N1, no flow control.
    ///
    /// Open or configuration failure is fatal at startup.
    pub fn open(device: &str) -> TSResult<Self> {
        let port = serialport::new(device, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()?;
        info!(device, baud = BAUD_RATE, "serial device open");
        Ok(Self { device: port })
    }
}

impl<W: Write + Send> FramedSerialWriter<W> {
    pub fn from_writer(device: W) -> Self {
        Self { device }
    }

    fn write_frame(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.device.write_all(&START_MARKER)?;
        self.device.write_all(payload)?;
        self.device.flush()
    }
}

impl<W: Write + Send> TransportSink for FramedSerialWriter<W> {
    fn name(&self) -> &'static str {
        "serial"
    }

    /// No acknowledgment path exists on this channel: a failed write is
    /// logged and dropped, and the loop moves straight to the next tick.
    async fn send(&mut self, payload: &[u8]) -> TSResult<()> {
        if let Err(e) = self.write_frame(payload) {
            debug!(error = %e, "serial write dropped");
        }
        Ok(())
    }
}
