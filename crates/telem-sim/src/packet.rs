/// Fixed-layout telemetry record shared with the receiving server.
///
/// The struct mirrors the embedded unit's on-air record field for field; the
/// wire form (order, widths, byte order) is pinned in [`crate::protocol::wire`]
/// rather than left to the compiler's layout rules.

//  _____
// |_   _|   _ _ __   ___  ___
//   | || | | | '_ \ / _ \/ __|
//   | || |_| | |_) |  __/\__ \
//   |_| \__, | .__/ \___||___/
//       |___/|_|

/// Accelerometer axes, milli-g.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImuAcc {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Gyroscope axes, degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImuDps {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Roll and pitch, tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attitude {
    pub roll: i16,
    pub pitch: i16,
}

/// One snapshot of vehicle state.
///
/// Built fresh each tick, encoded, handed to a transport and dropped; never
/// mutated after construction and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPacket {
    /// Battery voltage, volts.
    pub volt: f32,
    /// State of charge, percent.
    pub soc: u8,
    /// CVT temperature gauge, degrees.
    pub cvt: u8,
    /// Battery current, amperes.
    pub current: f32,
    /// Degrees.
    pub temperature: u8,
    /// km/h.
    pub speed: u16,
    pub imu_acc: ImuAcc,
    pub imu_dps: ImuDps,
    pub angle: Attitude,
    /// Motor RPM.
    pub rpm: u16,
    /// Status bitfield; only bit 0 is driven today.
    pub flags: u8,
    /// Degrees, WGS 84.
    pub latitude: f64,
    /// Degrees, WGS 84.
    pub longitude: f64,
    /// Epoch milliseconds truncated to the lower 32 bits. Wraps after
    /// ~49.7 days; the receiving side accepts the wrap.
    pub timestamp: u32,
}
