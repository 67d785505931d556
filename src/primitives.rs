// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Little-endian primitive encoders shared by every record type.

use byteorder::{LittleEndian, WriteBytesExt};

/// A ROS `time` value: seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RosTime {
    /// Whole seconds.
    pub sec: u32,
    /// Nanoseconds within the second.
    pub nsec: u32,
}

impl RosTime {
    /// The zero time value, used as the sentinel for "never set".
    pub const ZERO: RosTime = RosTime { sec: 0, nsec: 0 };

    /// Split a nanosecond count since the epoch into `(sec, nsec)`.
    pub fn from_nanos(ns: u64) -> Self {
        RosTime {
            sec: (ns / 1_000_000_000) as u32,
            nsec: (ns % 1_000_000_000) as u32,
        }
    }

    /// Serialize as eight little-endian bytes: `sec` then `nsec`.
    pub fn to_bytes(self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        buf[0..4].copy_from_slice(&self.sec.to_le_bytes());
        buf[4..8].copy_from_slice(&self.nsec.to_le_bytes());
        buf
    }
}

/// Append a little-endian `u32` to `buf`.
pub fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.write_u32::<LittleEndian>(value)
        .expect("writing to a Vec<u8> cannot fail");
}

/// Append a little-endian `u64` to `buf`.
pub fn write_u64(buf: &mut Vec<u8>, value: u64) {
    buf.write_u64::<LittleEndian>(value)
        .expect("writing to a Vec<u8> cannot fail");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_from_nanos_splits_correctly() {
        assert_eq!(RosTime::from_nanos(0), RosTime { sec: 0, nsec: 0 });
        assert_eq!(RosTime::from_nanos(1_000_000_000), RosTime { sec: 1, nsec: 0 });
        assert_eq!(
            RosTime::from_nanos(1_500_000_000),
            RosTime {
                sec: 1,
                nsec: 500_000_000
            }
        );
    }

    #[test]
    fn time_to_bytes_is_little_endian() {
        let t = RosTime {
            sec: 0x12345678,
            nsec: 0x01020304,
        };
        assert_eq!(
            t.to_bytes(),
            [0x78, 0x56, 0x34, 0x12, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn write_u32_is_little_endian() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0x12345678);
        assert_eq!(buf, vec![0x78, 0x56, 0x34, 0x12]);
    }
}
