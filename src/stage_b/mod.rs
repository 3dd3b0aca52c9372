//! Stage B: measures the A→B hop delay.

pub mod delay_calculator;

use std::sync::Arc;

use log::{error, warn};

use crate::config::{self, Profile};
use crate::net::{MulticastReceiver, MulticastSender};
use crate::record::{DelayTrack, ExtrapTrack};
use crate::rt::PRIORITY_IO;
use crate::sink::{RadioSink, Sink};
use crate::stage::Stage;

/// Wires stage B: an `ExtrapTrackData` receiver, the delay-calculator
/// domain worker, and a `DelayCalcTrackData` sender. Stage B fans out to
/// every registered sink rather than sharing one outbound port via
/// refcounting; production wiring registers exactly one [`RadioSink`]
/// wrapping the sender, with room for a caller to add a local analytics
/// sink through [`build_with_sinks`] without touching the sender itself.
pub fn build(profile: Profile) -> (Stage, impl FnMut(Vec<u8>, i64)) {
    let input = config::extrap_track_endpoint(profile);
    let output = config::delay_calc_endpoint(profile);

    let receiver = MulticastReceiver::new("stage_b_receiver", input.group, &input.socket_addr(), Some(1), Some(PRIORITY_IO));
    let sender = Arc::new(MulticastSender::new("stage_b_sender", output.group, &output.socket_addr(), Some(2), Some(PRIORITY_IO)));

    let radio_sink: Arc<dyn Sink<DelayTrack>> = Arc::new(RadioSink::new(sender.clone()));
    let stage = Stage::new("stage_b", receiver, vec![sender]);
    let process = build_process(vec![radio_sink]);
    (stage, process)
}

/// Like [`build`], but lets a caller register additional sinks (e.g. a
/// local analytics observer) alongside the production RADIO sink.
pub fn build_with_sinks(
    profile: Profile,
    mut extra_sinks: Vec<Arc<dyn Sink<DelayTrack>>>,
) -> (Stage, impl FnMut(Vec<u8>, i64)) {
    let input = config::extrap_track_endpoint(profile);
    let output = config::delay_calc_endpoint(profile);

    let receiver = MulticastReceiver::new("stage_b_receiver", input.group, &input.socket_addr(), Some(1), Some(PRIORITY_IO));
    let sender = Arc::new(MulticastSender::new("stage_b_sender", output.group, &output.socket_addr(), Some(2), Some(PRIORITY_IO)));

    let mut sinks: Vec<Arc<dyn Sink<DelayTrack>>> = vec![Arc::new(RadioSink::new(sender.clone()))];
    sinks.append(&mut extra_sinks);

    let stage = Stage::new("stage_b", receiver, vec![sender]);
    let process = build_process(sinks);
    (stage, process)
}

fn build_process(sinks: Vec<Arc<dyn Sink<DelayTrack>>>) -> impl FnMut(Vec<u8>, i64) {
    move |bytes: Vec<u8>, recv_time_us: i64| match ExtrapTrack::decode(&bytes) {
        Ok(extrap) => match delay_calculator::delay_calculate(&extrap, recv_time_us) {
            Some(delay) => {
                for sink in &sinks {
                    sink.accept(delay);
                }
            }
            None => warn!("[stage_b] rejecting invalid extrap track {}", extrap.track_id),
        },
        Err(e) => error!("[stage_b] failed to decode datagram: {}", e),
    }
}
