/// Vehicle telemetry unit simulator.
///
/// The *model* generates a deterministic stream of [`packet::TelemetryPacket`]
/// snapshots; the *protocol* module pins their wire form; *transports* deliver
/// the encoded bytes to a receiving server over an MQTT broker or a framed
/// serial stream, driven by the loop in [`stream`].
use std::sync::Once;

use thiserror::Error;

pub mod model;
pub mod packet;
pub mod protocol;
pub mod stream;
pub mod transport;

pub use packet::TelemetryPacket;

/// Result type for this library
pub type TSResult<T> = std::result::Result<T, Error>;

/// Error type for this library
#[derive(Debug, Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Frame is {got} bytes, wire packets are exactly {want}")]
    FrameLength { got: usize, want: usize },
    #[error("Trust anchor {path}: {source}")]
    TrustAnchor {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serial port: {0}")]
    Serial(#[from] serialport::Error),
    #[error("Broker publish: {0}")]
    Broker(#[from] rumqttc::ClientError),
}

impl From<nom::error::Error<&[u8]>> for Error {
    fn from(err: nom::error::Error<&[u8]>) -> Self {
        Error::ParseError(format!("{:?}", err))
    }
}

/// Test binary helper to init tracing. This is usually the responsibility of the consumer of the
/// library crate.
pub fn lazy_init_tracing() {
    {
        static INIT: Once = Once::new();
        &INIT
    }
    .call_once(|| {
        tracing_subscriber::fmt::init();
    });
}
