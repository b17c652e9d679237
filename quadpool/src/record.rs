//! Named point records.
//!
//! The payload layout is fixed: 4-byte big-endian x, 4-byte big-endian
//! y, then the UTF-8 name. The record ceiling of the pool bounds the
//! name length.

use std::fmt;

use crate::errors::{StoreError, StoreResult};
use crate::store::MAX_PAYLOAD;

/// Bytes occupied by the two coordinates at the front of a payload.
pub const COORD_BYTES: usize = 8;

/// Longest name a record can carry inside the 255-byte payload ceiling.
pub const MAX_NAME_LEN: usize = MAX_PAYLOAD - COORD_BYTES;

/// A named record located at an integer coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRecord {
    x: i32,
    y: i32,
    name: String,
}

impl PointRecord {
    pub fn new(x: i32, y: i32, name: impl Into<String>) -> Self {
        PointRecord {
            x,
            y,
            name: name.into(),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn point(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Serialize into a pool payload.
    pub fn to_payload(&self) -> StoreResult<Vec<u8>> {
        if self.name.len() > MAX_NAME_LEN {
            return Err(StoreError::RecordTooLarge {
                len: COORD_BYTES + self.name.len(),
                max: MAX_PAYLOAD,
            });
        }
        let mut payload = Vec::with_capacity(COORD_BYTES + self.name.len());
        payload.extend_from_slice(&self.x.to_be_bytes());
        payload.extend_from_slice(&self.y.to_be_bytes());
        payload.extend_from_slice(self.name.as_bytes());
        Ok(payload)
    }

    /// Parse a pool payload written by [`to_payload`](Self::to_payload).
    pub fn from_payload(payload: &[u8]) -> StoreResult<Self> {
        let (x, y) = Self::decode_point(payload)?;
        let name = std::str::from_utf8(&payload[COORD_BYTES..])
            .map_err(|e| StoreError::Corrupt(format!("record name is not UTF-8: {e}")))?;
        Ok(PointRecord::new(x, y, name))
    }

    /// Read only the coordinate prefix of a payload.
    pub fn decode_point(payload: &[u8]) -> StoreResult<(i32, i32)> {
        if payload.len() < COORD_BYTES {
            return Err(StoreError::Corrupt(format!(
                "record payload of {} bytes is shorter than its {COORD_BYTES}-byte coordinate prefix",
                payload.len()
            )));
        }
        let x = i32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let y = i32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]);
        Ok((x, y))
    }
}

impl fmt::Display for PointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips() {
        let record = PointRecord::new(120, 16383, "ridgeview");
        let payload = record.to_payload().unwrap();
        assert_eq!(payload.len(), COORD_BYTES + 9);
        assert_eq!(PointRecord::from_payload(&payload).unwrap(), record);
    }

    #[test]
    fn coordinates_are_big_endian() {
        let payload = PointRecord::new(1, 258, "z").to_payload().unwrap();
        assert_eq!(&payload[..COORD_BYTES], &[0, 0, 0, 1, 0, 0, 1, 2]);
    }

    #[test]
    fn point_prefix_decodes_without_the_name() {
        let payload = PointRecord::new(-5, 77, "somewhere").to_payload().unwrap();
        assert_eq!(PointRecord::decode_point(&payload).unwrap(), (-5, 77));
    }

    #[test]
    fn truncated_payloads_are_corrupt() {
        assert!(matches!(
            PointRecord::decode_point(&[0; 7]),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn non_utf8_names_are_corrupt() {
        let mut payload = PointRecord::new(0, 0, "ok").to_payload().unwrap();
        payload[COORD_BYTES] = 0xFF;
        assert!(matches!(
            PointRecord::from_payload(&payload),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn names_beyond_the_record_ceiling_are_rejected() {
        let record = PointRecord::new(0, 0, "n".repeat(MAX_NAME_LEN + 1));
        assert!(matches!(
            record.to_payload(),
            Err(StoreError::RecordTooLarge { .. })
        ));
    }
}
