//! Generation/transmission loop: generate, encode, send, sleep.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::model::SyntheticVehicle;
use crate::protocol::wire;
use crate::transport::TransportSink;

/// Cadence of the streaming loop.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Sleep between ticks.
    pub interval: Duration,
    /// Extra pause after a failed send, giving the transport room to
    /// recover before the next tick.
    pub error_pause: Duration,
}

impl StreamConfig {
    /// Broker cadence: one packet every 500 ms.
    pub fn broker() -> Self {
        Self {
            interval: Duration::from_millis(500),
            error_pause: Duration::from_secs(1),
        }
    }

    /// Serial cadence: one frame every 50 ms. The serial sink never reports
    /// failures, so no recovery pause applies.
    pub fn serial() -> Self {
        Self {
            interval: Duration::from_millis(50),
            error_pause: Duration::ZERO,
        }
    }
}

/// Cooperative stop signal, checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drive `sink` until `stop` is raised.
///
/// Transport errors never end the loop: they are logged, followed by the
/// configured pause, and the next tick proceeds. Only the stop flag (or
/// process termination) ends the stream.
pub async fn run<S: TransportSink>(
    vehicle: &mut SyntheticVehicle,
    sink: &mut S,
    config: &StreamConfig,
    stop: &StopFlag,
) {
    while !stop.is_stopped() {
        let pkt = vehicle.next_packet();
        let payload = wire::encode(&pkt);
        match sink.send(&payload).await {
            Ok(()) => {
                info!(transport = sink.name(), speed_kmh = pkt.speed, soc = pkt.soc, "sent packet");
            }
            Err(e) => {
                warn!(transport = sink.name(), error = %e, "send failed");
                sleep(config.error_pause).await;
            }
        }
        sleep(config.interval).await;
    }
    info!(transport = sink.name(), "stop requested, streaming ended");
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lazy_init_tracing;
    use crate::protocol::wire::PACKET_LEN;
    use crate::{Error, TSResult};

    /// Test double: records delivered payloads, optionally failing the
    /// first few sends, and raises the stop flag once a quota is reached.
    struct CountingSink {
        frames: Vec<Vec<u8>>,
        fail_first: usize,
        attempts: usize,
        quota: usize,
        stop: StopFlag,
    }

    impl CountingSink {
        fn new(fail_first: usize, quota: usize, stop: StopFlag) -> Self {
            Self {
                frames: Vec::new(),
                fail_first,
                attempts: 0,
                quota,
                stop,
            }
        }
    }

    impl TransportSink for CountingSink {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn send(&mut self, payload: &[u8]) -> TSResult<()> {
            self.attempts += 1;
            if self.attempts <= self.fail_first {
                return Err(Error::ParseError("simulated outage".into()));
            }
            self.frames.push(payload.to_vec());
            if self.frames.len() >= self.quota {
                self.stop.stop();
            }
            Ok(())
        }
    }

    fn fast_config() -> StreamConfig {
        StreamConfig {
            interval: Duration::from_millis(1),
            error_pause: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_runs_n_ticks_then_stops() {
        lazy_init_tracing();
        let stop = StopFlag::new();
        let mut sink = CountingSink::new(0, 5, stop.clone());
        let mut vehicle = SyntheticVehicle::new();

        run(&mut vehicle, &mut sink, &fast_config(), &stop).await;

        assert_eq!(sink.frames.len(), 5);
        assert!(sink.frames.iter().all(|f| f.len() == PACKET_LEN));
    }

    #[tokio::test]
    async fn test_send_failures_do_not_end_the_loop() {
        lazy_init_tracing();
        let stop = StopFlag::new();
        let mut sink = CountingSink::new(3, 2, stop.clone());
        let mut vehicle = SyntheticVehicle::new();

        run(&mut vehicle, &mut sink, &fast_config(), &stop).await;

        // three outages, then two delivered packets, then stop
        assert_eq!(sink.attempts, 5);
        assert_eq!(sink.frames.len(), 2);
    }

    #[tokio::test]
    async fn test_stop_raised_up_front() {
        lazy_init_tracing();
        let stop = StopFlag::new();
        stop.stop();
        let mut sink = CountingSink::new(0, 1, stop.clone());
        let mut vehicle = SyntheticVehicle::new();

        run(&mut vehicle, &mut sink, &fast_config(), &stop).await;

        assert!(sink.frames.is_empty());
    }
}
