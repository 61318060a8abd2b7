/// Synthetic signal bank standing in for the vehicle's real sensors.
///
/// Every channel is a closed-form, periodic function of the tick counter, so
/// two runs produce identical packets (timestamps aside) and a receiver under
/// test sees bounded, plausible-looking motion rather than noise.
use chrono::Utc;
use tracing::trace;

use crate::packet::{Attitude, ImuAcc, ImuDps, TelemetryPacket};

/// Stateful generator owning the tick counter.
///
/// The counter starts at 0 and advances by exactly 1 per packet; everything
/// else is derived from it by [`sample`].
#[derive(Debug, Default)]
pub struct SyntheticVehicle {
    tick: u32,
}

impl SyntheticVehicle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the packet for the current tick and advance the counter.
    pub fn next_packet(&mut self) -> TelemetryPacket {
        let pkt = sample(self.tick, now_ms());
        trace!(tick = self.tick, speed = pkt.speed, "generated packet");
        self.tick = self.tick.wrapping_add(1);
        pkt
    }
}

/// Lower 32 bits of epoch milliseconds, as carried on the wire.
pub fn now_ms() -> u32 {
    Utc::now().timestamp_millis() as u32
}

/// Vehicle state at tick `t`, total over the whole tick range.
///
/// Apart from `timestamp_ms` (passed through untouched) every field is a pure
/// function of `t`. Arguments to the trig terms are radians; integer channels
/// are rounded to nearest.
pub fn sample(tick: u32, timestamp_ms: u32) -> TelemetryPacket {
    let t = f64::from(tick);
    TelemetryPacket {
        volt: (12.5 + 0.5 * (0.1 * t).sin()) as f32,
        soc: (98 - tick % 20) as u8,
        cvt: (80.0 + (5.0 * (0.2 * t).sin()).round()) as u8,
        current: (15.3 + 2.0 * (0.1 * t).cos()) as f32,
        temperature: (75.0 + (3.0 * (0.3 * t).cos()).round()) as u8,
        speed: (tick.wrapping_mul(2) % 60) as u16,
        imu_acc: ImuAcc {
            x: (100.0 * (0.5 * t).sin()).round() as i16,
            y: (100.0 * (0.5 * t).cos()).round() as i16,
            z: (980.0 + 10.0 * (0.2 * t).sin()).round() as i16,
        },
        imu_dps: ImuDps {
            x: (50.0 * (0.4 * t).cos()).round() as i16,
            y: (50.0 * (0.4 * t).sin()).round() as i16,
            z: (5.0 * (0.1 * t).cos()).round() as i16,
        },
        angle: Attitude {
            roll: (20.0 * (0.1 * t).sin()).round() as i16,
            pitch: (10.0 * (0.1 * t).cos()).round() as i16,
        },
        rpm: (3000.0 + (500.0 * (0.8 * t).sin()).round()) as u16,
        flags: (tick % 2) as u8,
        latitude: -8.05428 + 0.001 * (0.01 * t).sin(),
        longitude: -34.8813 + 0.001 * (0.01 * t).cos(),
        timestamp: timestamp_ms,
    }
}
