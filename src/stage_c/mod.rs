//! Stage C: measures the B→C hop delay, the end-to-end total, and feeds
//! the moving-average analytics sink.

pub mod finalizer;
pub mod moving_average;

use std::sync::Arc;

use log::{error, warn};

use crate::config::{self, Profile};
use crate::net::{MulticastReceiver, MulticastSender};
use crate::record::DelayTrack;
use crate::rt::PRIORITY_IO;
use crate::stage::Stage;
use finalizer::Finalizer;
use moving_average::MovingAverage;

/// Wires stage C: a `DelayCalcTrackData` receiver, the finaliser domain
/// worker (with its moving-average analytics window), and a
/// `FinalCalcTrackData` sender.
pub fn build(profile: Profile, moving_average_window: usize) -> (Stage, impl FnMut(Vec<u8>, i64), Arc<MovingAverage>) {
    let input = config::delay_calc_endpoint(profile);
    let output = config::final_calc_endpoint(profile);

    let receiver = MulticastReceiver::new("stage_c_receiver", input.group, &input.socket_addr(), Some(1), Some(PRIORITY_IO));
    let sender = Arc::new(MulticastSender::new("stage_c_sender", output.group, &output.socket_addr(), Some(2), Some(PRIORITY_IO)));

    let moving_average = Arc::new(MovingAverage::new(moving_average_window));
    let stage = Stage::new("stage_c", receiver, vec![sender.clone()]);
    let process = build_process(sender, moving_average.clone());
    (stage, process, moving_average)
}

fn build_process(sender: Arc<MulticastSender>, moving_average: Arc<MovingAverage>) -> impl FnMut(Vec<u8>, i64) {
    let finalizer = Finalizer::new(moving_average);
    move |bytes: Vec<u8>, _recv_time_us: i64| match DelayTrack::decode(&bytes) {
        Ok(delay) => match finalizer.finalize(&delay) {
            Some(final_track) => sender.send(final_track.encode()),
            None => warn!("[stage_c] rejecting invalid delay track {}", delay.track_id),
        },
        Err(e) => error!("[stage_c] failed to decode datagram: {}", e),
    }
}
