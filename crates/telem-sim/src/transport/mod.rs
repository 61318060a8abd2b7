//! Transport emitters consuming encoded packets.
//!
//! The streaming loop is generic over [`TransportSink`], keeping the signal
//! generation decoupled from the broker client and the serial device.
use std::future::Future;

use crate::TSResult;

pub mod broker;
pub mod serial;

pub use broker::{BrokerConfig, BrokerPublisher};
pub use serial::FramedSerialWriter;

/// Capability interface implemented by each emitter.
pub trait TransportSink {
    /// Short channel name used in log lines.
    fn name(&self) -> &'static str;

    /// Deliver one encoded packet.
    ///
    /// `Err` means the packet was not delivered and the driving loop should
    /// pause briefly before the next tick. Sinks with fire-and-forget
    /// semantics swallow their write errors and always return `Ok`.
    fn send(&mut self, payload: &[u8]) -> impl Future<Output = TSResult<()>> + Send;
}
