use super::{check_finite, check_timestamps, check_track_id, expect_len, Cursor, DelayTrack, PutLe};
use crate::error::DecodeError;

/// `DelayTrack` with the B→C hop delay, the total end-to-end delay budget,
/// and the stamp it was finalised at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalTrack {
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
    pub second_hop_delay_time: i64,
    pub total_delay_time: i64,
    pub third_hop_sent_time: i64,
}

impl FinalTrack {
    pub const WIRE_SIZE: usize = 116;

    pub fn valid(&self) -> bool {
        check_finite(&[self.vx, self.vy, self.vz, self.px, self.py, self.pz]).is_ok()
            && check_track_id(self.track_id).is_ok()
            && check_timestamps(&[
                self.original_update_time,
                self.update_time,
                self.first_hop_sent_time,
                self.first_hop_delay_time,
                self.second_hop_sent_time,
                self.second_hop_delay_time,
                self.total_delay_time,
                self.third_hop_sent_time,
            ])
            .is_ok()
    }

    pub fn from_delay(
        delay: &DelayTrack,
        second_hop_delay_time: i64,
        total_delay_time: i64,
        third_hop_sent_time: i64,
    ) -> Self {
        Self {
            track_id: delay.track_id,
            vx: delay.vx,
            vy: delay.vy,
            vz: delay.vz,
            px: delay.px,
            py: delay.py,
            pz: delay.pz,
            original_update_time: delay.original_update_time,
            update_time: delay.update_time,
            first_hop_sent_time: delay.first_hop_sent_time,
            first_hop_delay_time: delay.first_hop_delay_time,
            second_hop_sent_time: delay.second_hop_sent_time,
            second_hop_delay_time,
            total_delay_time,
            third_hop_sent_time,
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
        buf.put_i64(self.second_hop_delay_time);
        buf.put_i64(self.total_delay_time);
        buf.put_i64(self.third_hop_sent_time);
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
            second_hop_delay_time: c.read_i64(),
            total_delay_time: c.read_i64(),
            third_hop_sent_time: c.read_i64(),
        };
        check_finite(&[record.vx, record.vy, record.vz, record.px, record.py, record.pz])?;
        check_track_id(record.track_id)?;
        check_timestamps(&[
            record.original_update_time,
            record.update_time,
            record.first_hop_sent_time,
            record.first_hop_delay_time,
            record.second_hop_sent_time,
            record.second_hop_delay_time,
            record.total_delay_time,
            record.third_hop_sent_time,
        ])?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FinalTrack {
        FinalTrack {
            track_id: 42,
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
            second_hop_delay_time: 250,
            total_delay_time: 400,
            third_hop_sent_time: 1_000_600,
        }
    }

    #[test]
    fn round_trip() {
        let t = sample();
        let bytes = t.encode();
        assert_eq!(bytes.len(), FinalTrack::WIRE_SIZE);
        assert_eq!(FinalTrack::decode(&bytes).unwrap(), t);
    }

    #[test]
    fn total_delay_identity_holds_on_sample() {
        let t = sample();
        assert_eq!(
            t.total_delay_time,
            t.first_hop_delay_time + t.second_hop_delay_time
        );
    }
}
