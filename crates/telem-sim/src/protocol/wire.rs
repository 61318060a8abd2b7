use nom::{
    number::complete::{le_f32, le_f64, le_i16, le_u16, le_u32, u8},
    Finish, IResult,
};

use crate::packet::{Attitude, ImuAcc, ImuDps, TelemetryPacket};
use crate::{Error, TSResult};

/// Encoded size of one [`TelemetryPacket`]: the sum of the declared field
/// widths, with no padding anywhere.
pub const PACKET_LEN: usize = 52;

/// Marker prefixed to every packet on the serial channel.
///
/// A receiver finds frames as the marker followed by exactly [`PACKET_LEN`]
/// payload bytes; there is no length field, checksum or resynchronization
/// beyond scanning for the next marker.
pub const START_MARKER: [u8; 4] = [0xAA, 0xBB, 0xCC, 0xDD];

/// Serialize a packet to its wire form.
///
/// Fields are written in declaration order at their declared widths, all
/// little-endian. The byte order is part of the contract with the receiving
/// server and never depends on the producing platform.
pub fn encode(pkt: &TelemetryPacket) -> Vec<u8> {
    let mut out = Vec::with_capacity(PACKET_LEN);
    out.extend_from_slice(&pkt.volt.to_le_bytes());
    out.push(pkt.soc);
    out.push(pkt.cvt);
    out.extend_from_slice(&pkt.current.to_le_bytes());
    out.push(pkt.temperature);
    out.extend_from_slice(&pkt.speed.to_le_bytes());
    out.extend_from_slice(&pkt.imu_acc.x.to_le_bytes());
    out.extend_from_slice(&pkt.imu_acc.y.to_le_bytes());
    out.extend_from_slice(&pkt.imu_acc.z.to_le_bytes());
    out.extend_from_slice(&pkt.imu_dps.x.to_le_bytes());
    out.extend_from_slice(&pkt.imu_dps.y.to_le_bytes());
    out.extend_from_slice(&pkt.imu_dps.z.to_le_bytes());
    out.extend_from_slice(&pkt.angle.roll.to_le_bytes());
    out.extend_from_slice(&pkt.angle.pitch.to_le_bytes());
    out.extend_from_slice(&pkt.rpm.to_le_bytes());
    out.push(pkt.flags);
    out.extend_from_slice(&pkt.latitude.to_le_bytes());
    out.extend_from_slice(&pkt.longitude.to_le_bytes());
    out.extend_from_slice(&pkt.timestamp.to_le_bytes());
    debug_assert_eq!(out.len(), PACKET_LEN);
    out
}

/// Exact inverse of [`encode`].
///
/// Fails iff `bytes` is not exactly [`PACKET_LEN`] long; the length is
/// checked up front so the parser never reads out of bounds.
pub fn decode(bytes: &[u8]) -> TSResult<TelemetryPacket> {
    if bytes.len() != PACKET_LEN {
        return Err(Error::FrameLength {
            got: bytes.len(),
            want: PACKET_LEN,
        });
    }
    let nom_res = nom_packet(bytes);
    nom_res.finish().map(|(_, pkt)| pkt).map_err(|e| e.into())
}

fn nom_packet(bytes: &[u8]) -> IResult<&[u8], TelemetryPacket> {
    let (rest, volt) = le_f32(bytes)?;
    let (rest, soc) = u8(rest)?;
    let (rest, cvt) = u8(rest)?;
    let (rest, current) = le_f32(rest)?;
    let (rest, temperature) = u8(rest)?;
    let (rest, speed) = le_u16(rest)?;
    let (rest, acc_x) = le_i16(rest)?;
    let (rest, acc_y) = le_i16(rest)?;
    let (rest, acc_z) = le_i16(rest)?;
    let (rest, dps_x) = le_i16(rest)?;
    let (rest, dps_y) = le_i16(rest)?;
    let (rest, dps_z) = le_i16(rest)?;
    let (rest, roll) = le_i16(rest)?;
    let (rest, pitch) = le_i16(rest)?;
    let (rest, rpm) = le_u16(rest)?;
    let (rest, flags) = u8(rest)?;
    let (rest, latitude) = le_f64(rest)?;
    let (rest, longitude) = le_f64(rest)?;
    let (rest, timestamp) = le_u32(rest)?;
    Ok((
        rest,
        TelemetryPacket {
            volt,
            soc,
            cvt,
            current,
            temperature,
            speed,
            imu_acc: ImuAcc {
                x: acc_x,
                y: acc_y,
                z: acc_z,
            },
            imu_dps: ImuDps {
                x: dps_x,
                y: dps_y,
                z: dps_z,
            },
            angle: Attitude { roll, pitch },
            rpm,
            flags,
            latitude,
            longitude,
            timestamp,
        },
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lazy_init_tracing;
    use crate::model::sample;

    #[test]
    fn test_roundtrip_across_ticks() {
        lazy_init_tracing();
        for tick in (0..10_000).step_by(37) {
            let pkt = sample(tick, 0xDEAD_BEEF);
            let bytes = encode(&pkt);
            assert_eq!(bytes.len(), PACKET_LEN, "size must not vary with tick");
            let back = decode(&bytes).unwrap();
            assert_eq!(pkt, back, "tick {tick}");
        }
    }

    #[test]
    fn test_golden_layout() {
        lazy_init_tracing();
        let pkt = TelemetryPacket {
            volt: 12.5,
            soc: 98,
            cvt: 80,
            current: -1.5,
            temperature: 75,
            speed: 42,
            imu_acc: ImuAcc { x: 1, y: -2, z: 980 },
            imu_dps: ImuDps { x: -50, y: 0, z: 5 },
            angle: Attitude { roll: -20, pitch: 10 },
            rpm: 3500,
            flags: 1,
            latitude: -8.05428,
            longitude: -34.8813,
            timestamp: 0x0102_0304,
        };
        let expected = [
            &12.5f32.to_le_bytes()[..],
            &[98, 80],
            &(-1.5f32).to_le_bytes(),
            &[75],
            &42u16.to_le_bytes(),
            &1i16.to_le_bytes(),
            &(-2i16).to_le_bytes(),
            &980i16.to_le_bytes(),
            &(-50i16).to_le_bytes(),
            &0i16.to_le_bytes(),
            &5i16.to_le_bytes(),
            &(-20i16).to_le_bytes(),
            &10i16.to_le_bytes(),
            &3500u16.to_le_bytes(),
            &[1],
            &(-8.05428f64).to_le_bytes(),
            &(-34.8813f64).to_le_bytes(),
            &0x0102_0304u32.to_le_bytes(),
        ]
        .concat();
        assert_eq!(expected.len(), PACKET_LEN);
        assert_eq!(encode(&pkt), expected);

        // timestamp bytes on the wire are least-significant first,
        // independent of the host
        assert_eq!(&expected[48..52], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let bytes = encode(&sample(7, 7));

        let short = decode(&bytes[..PACKET_LEN - 1]);
        assert!(matches!(
            short,
            Err(Error::FrameLength { got: 51, want: PACKET_LEN })
        ));

        let mut long = bytes.clone();
        long.push(0);
        assert!(matches!(decode(&long), Err(Error::FrameLength { .. })));

        assert!(decode(&[]).is_err());
    }
}
