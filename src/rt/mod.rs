//! Real-time thread runner: spawns a named worker thread, attempts FIFO
//! scheduling priority and CPU pinning, and runs a stop-aware loop.
//!
//! Both privileges are best-effort: a failure to set either one is logged
//! at `debug!` and the thread runs on regardless, rather than aborting the
//! whole process over scheduling that most deployments won't have the
//! permissions for anyway.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;
use thread_priority::{ThreadBuilderExt, ThreadPriority, ThreadPriorityValue};

/// Suggested RT priorities: I/O roles run hotter than
/// domain workers so a full inbound queue drains before more decisions pile
/// up behind it.
pub const PRIORITY_IO: u8 = 95;
pub const PRIORITY_WORKER: u8 = 90;

/// Spawns `name`, pinned to `core` (if given) and scheduled at `priority`
/// (0-99, if given), running `body` until it returns. `body` receives the
/// stop flag it should poll. Both the priority and affinity requests are
/// best-effort: failure to obtain either is logged at `debug!` and the
/// thread proceeds with default scheduling rather than aborting startup
/// over privileges a given deployment may not grant.
pub fn spawn_rt_thread<F>(
    name: &'static str,
    core: Option<usize>,
    priority: Option<u8>,
    stop: Arc<AtomicBool>,
    body: F,
) -> JoinHandle<()>
where
    F: FnOnce(Arc<AtomicBool>) + Send + 'static,
{
    let requested = priority.map(to_thread_priority).unwrap_or(ThreadPriority::Max);

    thread::Builder::new()
        .name(name.to_string())
        .spawn_with_priority(requested, move |result| {
            if let Err(e) = result {
                debug!("[{}] failed to set RT priority: {:?}", name, e);
            }
            pin_to_core(name, core);
            body(stop);
        })
        .expect("failed to spawn thread")
}

fn to_thread_priority(priority: u8) -> ThreadPriority {
    match ThreadPriorityValue::try_from(priority) {
        Ok(value) => ThreadPriority::Crossplatform(value),
        Err(_) => ThreadPriority::Max,
    }
}

fn pin_to_core(name: &'static str, core: Option<usize>) {
    let Some(core_index) = core else { return };
    let cores = core_affinity::get_core_ids().unwrap_or_default();
    match cores.get(core_index) {
        Some(core_id) => {
            if !core_affinity::set_for_current(*core_id) {
                debug!("[{}] failed to pin to core {}", name, core_index);
            }
        }
        None => debug!("[{}] core {} not present on this system", name, core_index),
    }
}

/// Extracts a human-readable message from a caught panic payload, for
/// logging at the boundary a worker loop must not let a panic cross.
pub fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
