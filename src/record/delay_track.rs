use super::{check_finite, check_timestamps, check_track_id, expect_len, Cursor, ExtrapTrack, PutLe};
use crate::error::DecodeError;

/// `ExtrapTrack` with the A→B hop delay and the stamp stage B forwarded it
/// at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayTrack {
    pub track_id: i32,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub original_update_time: i64,
    pub update_time: i64,
    pub first_hop_sent_time: i64,
    pub first_hop_delay_time: i64,
    pub second_hop_sent_time: i64,
}

impl DelayTrack {
    pub const WIRE_SIZE: usize = 92;

    pub fn valid(&self) -> bool {
        check_finite(&[self.vx, self.vy, self.vz, self.px, self.py, self.pz]).is_ok()
            && check_track_id(self.track_id).is_ok()
            && check_timestamps(&[
                self.original_update_time,
                self.update_time,
                self.first_hop_sent_time,
                self.first_hop_delay_time,
                self.second_hop_sent_time,
            ])
            .is_ok()
    }

    pub fn as_extrap_track(&self) -> ExtrapTrack {
        ExtrapTrack {
            track_id: self.track_id,
            vx: self.vx,
            vy: self.vy,
            vz: self.vz,
            px: self.px,
            py: self.py,
            pz: self.pz,
            original_update_time: self.original_update_time,
            update_time: self.update_time,
            first_hop_sent_time: self.first_hop_sent_time,
        }
    }

    /// Builds a `DelayTrack` from its `ExtrapTrack` prefix plus the two
    /// fields this stage appends.
    pub fn from_extrap(
        extrap: &ExtrapTrack,
        first_hop_delay_time: i64,
        second_hop_sent_time: i64,
    ) -> Self {
        Self {
            track_id: extrap.track_id,
            vx: extrap.vx,
            vy: extrap.vy,
            vz: extrap.vz,
            px: extrap.px,
            py: extrap.py,
            pz: extrap.pz,
            original_update_time: extrap.original_update_time,
            update_time: extrap.update_time,
            first_hop_sent_time: extrap.first_hop_sent_time,
            first_hop_delay_time,
            second_hop_sent_time,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        buf.put_i32(self.track_id);
        buf.put_f64(self.vx);
        buf.put_f64(self.vy);
        buf.put_f64(self.vz);
        buf.put_f64(self.px);
        buf.put_f64(self.py);
        buf.put_f64(self.pz);
        buf.put_i64(self.original_update_time);
        buf.put_i64(self.update_time);
        buf.put_i64(self.first_hop_sent_time);
        buf.put_i64(self.first_hop_delay_time);
        buf.put_i64(self.second_hop_sent_time);
        debug_assert_eq!(buf.len(), Self::WIRE_SIZE);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        expect_len(bytes, Self::WIRE_SIZE)?;
        let mut c = Cursor::new(bytes);
        let record = Self {
            track_id: c.read_i32(),
            vx: c.read_f64(),
            vy: c.read_f64(),
            vz: c.read_f64(),
            px: c.read_f64(),
            py: c.read_f64(),
            pz: c.read_f64(),
            original_update_time: c.read_i64(),
            update_time: c.read_i64(),
            first_hop_sent_time: c.read_i64(),
            first_hop_delay_time: c.read_i64(),
            second_hop_sent_time: c.read_i64(),
        };
        check_finite(&[record.vx, record.vy, record.vz, record.px, record.py, record.pz])?;
        check_track_id(record.track_id)?;
        check_timestamps(&[
            record.original_update_time,
            record.update_time,
            record.first_hop_sent_time,
            record.first_hop_delay_time,
            record.second_hop_sent_time,
        ])?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DelayTrack {
        DelayTrack {
            track_id: 7,
            vx: 1.0,
            vy: 2.0,
            vz: 3.0,
            px: 10.0,
            py: 20.0,
            pz: 30.0,
            original_update_time: 1_000,
            update_time: 1_000_000,
            first_hop_sent_time: 1_000_100,
            first_hop_delay_time: 150,
            second_hop_sent_time: 1_000_300,
        }
    }

    #[test]
    fn round_trip() {
        let t = sample();
        let bytes = t.encode();
        assert_eq!(bytes.len(), DelayTrack::WIRE_SIZE);
        assert_eq!(DelayTrack::decode(&bytes).unwrap(), t);
    }

    #[test]
    fn rejects_short_buffer() {
        let bytes = vec![0u8; DelayTrack::WIRE_SIZE - 1];
        assert!(DelayTrack::decode(&bytes).is_err());
    }
}
