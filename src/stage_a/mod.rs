//! Stage A: extrapolates accepted `Track`s to `ExtrapTrack`s.

pub mod extrapolator;

use std::sync::Arc;

use log::{error, warn};

use crate::config::{self, Profile};
use crate::net::{MulticastReceiver, MulticastSender};
use crate::record::Track;
use crate::rt::PRIORITY_IO;
use crate::stage::Stage;
use extrapolator::Extrapolator;

/// Wires stage A: a `TrackData` receiver, the extrapolator domain worker,
/// and an `ExtrapTrackData` sender, per the endpoint table resolved for
/// `profile`. Returns the `Stage` plus the per-datagram closure its worker
/// should run, already closed over the same sender the `Stage` owns.
pub fn build(profile: Profile, f_in: f64, f_out: f64) -> (Stage, impl FnMut(Vec<u8>, i64)) {
    let input = config::raw_track_endpoint(profile);
    let output = config::extrap_track_endpoint(profile);

    let receiver = MulticastReceiver::new("stage_a_receiver", input.group, &input.socket_addr(), Some(1), Some(PRIORITY_IO));
    let sender = Arc::new(MulticastSender::new("stage_a_sender", output.group, &output.socket_addr(), Some(2), Some(PRIORITY_IO)));

    let stage = Stage::new("stage_a", receiver, vec![sender.clone()]);
    let process = build_process(f_in, f_out, sender);
    (stage, process)
}

/// Decodes a `Track`, extrapolates it, and forwards each resulting
/// `ExtrapTrack` to `sender`. The receive timestamp isn't needed here —
/// stage A has no delay measurement of its own — so the closure ignores it.
fn build_process(f_in: f64, f_out: f64, sender: Arc<MulticastSender>) -> impl FnMut(Vec<u8>, i64) {
    let extrapolator = Extrapolator::new(f_in, f_out);
    move |bytes: Vec<u8>, _recv_time_us: i64| match Track::decode(&bytes) {
        Ok(track) => {
            if !track.valid() {
                warn!("[stage_a] rejecting invalid track {}", track.track_id);
                return;
            }
            extrapolator.extrapolate(&track, |extrap| sender.send(extrap.encode()));
        }
        Err(e) => error!("[stage_a] failed to decode datagram: {}", e),
    }
}
