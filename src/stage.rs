//! Generic per-stage wiring: one receiver, one domain worker, one or more
//! senders, joined by event queues, with leaves-first startup and reverse
//! shutdown: producers start before consumers, and teardown runs in a
//! fixed order so nothing writes to a socket that's already closed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error};
use parking_lot::Mutex;

use crate::error::StartError;
use crate::net::{MulticastReceiver, MulticastSender};
use crate::queue::{EventQueue, PopOutcome};
use crate::rt;

const INBOUND_QUEUE_CAPACITY: usize = 500;
const WORKER_POP_TIMEOUT: Duration = Duration::from_millis(100);

/// Spawns the single domain-worker thread shared by every stage's wiring:
/// pop a datagram from the inbound queue (blocking up to 100 ms), hand it
/// to `process`. `process` is responsible for decoding, running the
/// stage's domain logic, and forwarding to whichever senders it holds.
struct DomainWorker {
    name: &'static str,
    stop: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DomainWorker {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            stop: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }

    fn start<F>(
        &self,
        core: Option<usize>,
        priority: Option<u8>,
        inbound: Arc<EventQueue<(Vec<u8>, i64)>>,
        mut process: F,
    ) -> Result<(), StartError>
    where
        F: FnMut(Vec<u8>, i64) + Send + 'static,
    {
        let mut guard = self.handle.lock();
        if guard.is_some() {
            return Err(StartError::AlreadyRunning(self.name));
        }

        self.stop.store(false, Ordering::SeqCst);
        let name = self.name;
        let handle = crate::rt::spawn_rt_thread(name, core, priority, self.stop.clone(), move |stop| {
            debug!("[{}] domain worker running", name);
            while !stop.load(Ordering::SeqCst) {
                match inbound.pop(WORKER_POP_TIMEOUT) {
                    PopOutcome::Item((bytes, recv_time_us)) => {
                        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            process(bytes, recv_time_us)
                        }));
                        if let Err(payload) = outcome {
                            error!("[{}] domain worker panicked: {}", name, rt::panic_message(payload));
                        }
                    }
                    PopOutcome::TimedOut => continue,
                    PopOutcome::Stopped => break,
                }
            }
            debug!("[{}] stopped", name);
        });

        *guard = Some(handle);
        Ok(())
    }

    fn stop(&self, inbound: &EventQueue<(Vec<u8>, i64)>) {
        self.stop.store(true, Ordering::SeqCst);
        inbound.close();
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

/// One pipeline stage: a DISH receiver feeding a bounded inbound queue, a
/// domain-worker thread, and one or more RADIO senders. `build_process`
/// constructs the per-datagram closure once the inbound queue and sender
/// set are ready — it owns the stage-specific decode/compute/encode/fan-out
/// logic.
pub struct Stage {
    name: &'static str,
    receiver: MulticastReceiver,
    worker: DomainWorker,
    senders: Vec<Arc<MulticastSender>>,
    inbound: Arc<EventQueue<(Vec<u8>, i64)>>,
}

impl Stage {
    pub fn new(
        name: &'static str,
        receiver: MulticastReceiver,
        senders: Vec<Arc<MulticastSender>>,
    ) -> Self {
        Self {
            name,
            receiver,
            worker: DomainWorker::new(name),
            senders,
            inbound: Arc::new(EventQueue::new(name, INBOUND_QUEUE_CAPACITY)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_running() && self.worker.is_running() && self.senders.iter().all(|s| s.is_running())
    }

    /// The sender set this stage was built with, in registration order —
    /// used by the stage-specific `build()` helpers to close over the same
    /// `Arc<MulticastSender>` instances the domain-worker closure forwards
    /// to.
    pub fn senders(&self) -> &[Arc<MulticastSender>] {
        &self.senders
    }

    /// Leaves-first startup: senders, then the domain worker, then
    /// the receiver. `process` is handed the raw datagram plus the
    /// timestamp the receiver captured at the moment it received it (not
    /// when it was dequeued), and forwards the stage's output(s) to
    /// `self.senders`.
    ///
    /// A stage that fails to bind or connect any of its sockets logs the
    /// offending endpoint at `error!` and returns `false`; the caller is
    /// expected to exit the process with a non-zero code.
    pub fn start<F>(&self, worker_core: Option<usize>, worker_priority: Option<u8>, process: F) -> bool
    where
        F: FnMut(Vec<u8>, i64) + Send + 'static,
    {
        for sender in &self.senders {
            if let Err(e) = sender.start() {
                error!("[{}] failed to start sender: {}", self.name, e);
                return false;
            }
        }

        if let Err(e) = self.worker.start(worker_core, worker_priority, self.inbound.clone(), process) {
            error!("[{}] failed to start domain worker: {}", self.name, e);
            return false;
        }

        let inbound = self.inbound.clone();
        if let Err(e) = self.receiver.start(move |datagram, receive_time_us| {
            inbound.push((datagram.to_vec(), receive_time_us));
        }) {
            error!("[{}] failed to start receiver: {}", self.name, e);
            return false;
        }

        true
    }

    /// Reverse shutdown: receiver, then domain worker (queue closed
    /// first so the pop unblocks promptly), then senders.
    pub fn stop(&self) {
        self.receiver.stop();
        self.worker.stop(&self.inbound);
        for sender in &self.senders {
            sender.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{DishSocket, RadioSocket};

    #[test]
    fn wires_receiver_through_worker_to_sender_end_to_end() {
        let receiver = MulticastReceiver::new("test_stage_in", "StageIn", "127.0.0.1:19201", None, None);
        let sender = Arc::new(MulticastSender::new("test_stage_out", "StageOut", "127.0.0.1:19202", None, None));
        let stage = Stage::new("test_stage", receiver, vec![sender.clone()]);

        let out = sender.clone();
        let started = stage.start(None, None, move |bytes, _recv_time_us| {
            let mut echoed = bytes;
            echoed.push(0xFF);
            out.send(echoed);
        });
        assert!(started);
        assert!(stage.is_running());

        let downstream = DishSocket::bind("StageOut", "127.0.0.1:19202").unwrap();
        downstream.set_read_timeout(Duration::from_millis(500)).unwrap();
        let upstream = RadioSocket::connect("StageIn", "127.0.0.1:19201").unwrap();
        upstream.send(b"track").unwrap();

        let out_bytes = downstream.recv().unwrap().expect("expected the echoed datagram");
        assert_eq!(out_bytes, vec![b't', b'r', b'a', b'c', b'k', 0xFF]);

        stage.stop();
        assert!(!stage.is_running());
    }
}
