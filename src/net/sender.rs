//! RADIO role: a non-blocking `send()` in front of a dedicated real-time
//! worker thread that drains a drop-oldest queue onto the wire.
//!
//! The queue/worker split keeps the caller (stage worker thread, already
//! doing the domain computation) off the network path entirely: it only
//! ever touches the lock-free push side of [`crate::queue::EventQueue`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::error::StartError;
use crate::net::RadioSocket;
use crate::queue::{EventQueue, PopOutcome};
use crate::rt;

const QUEUE_CAPACITY: usize = 500;
const QUEUE_WAIT: Duration = Duration::from_millis(100);

/// Non-blocking outbound port for one hop: `send` enqueues and returns
/// immediately, the worker thread owns the actual socket write.
pub struct MulticastSender {
    name: &'static str,
    group: String,
    endpoint: String,
    core: Option<usize>,
    priority: Option<u8>,
    stop: Arc<AtomicBool>,
    queue: Arc<EventQueue<Vec<u8>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MulticastSender {
    pub fn new(name: &'static str, group: &str, endpoint: &str, core: Option<usize>, priority: Option<u8>) -> Self {
        Self {
            name,
            group: group.to_string(),
            endpoint: endpoint.to_string(),
            core,
            priority,
            stop: Arc::new(AtomicBool::new(false)),
            queue: Arc::new(EventQueue::new(name, QUEUE_CAPACITY)),
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }

    pub fn start(&self) -> Result<(), StartError> {
        let mut guard = self.handle.lock();
        if guard.is_some() {
            return Err(StartError::AlreadyRunning(self.name));
        }

        let socket = RadioSocket::connect(&self.group, &self.endpoint).map_err(|source| StartError::Socket {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        self.stop.store(false, Ordering::SeqCst);
        let name = self.name;
        let queue = self.queue.clone();
        let handle = rt::spawn_rt_thread(name, self.core, self.priority, self.stop.clone(), move |stop| {
            debug!("[{}] sending to {}", name, socket.destination());
            while !stop.load(Ordering::SeqCst) {
                match queue.pop(QUEUE_WAIT) {
                    PopOutcome::Item(payload) => {
                        if let Err(e) = socket.send(&payload) {
                            warn!("[{}] send error: {}", name, e);
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

    /// Enqueues `payload` for transmission. Never blocks; under sustained
    /// overload the oldest queued datagram is dropped. Drops immediately,
    /// with a warning, if the sender hasn't been started yet or has already
    /// been stopped.
    pub fn send(&self, payload: Vec<u8>) {
        if !self.is_running() {
            warn!("[{}] dropping datagram, sender is not running", self.name);
            return;
        }
        self.queue.push(payload);
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.queue.close();
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::DishSocket;

    #[test]
    fn send_reaches_a_matching_dish_socket() {
        let dish = DishSocket::bind("SenderTest", "127.0.0.1:19101").unwrap();
        dish.set_read_timeout(Duration::from_millis(200)).unwrap();

        let sender = MulticastSender::new("test_sender", "SenderTest", "127.0.0.1:19101", None, None);
        sender.start().unwrap();
        sender.send(b"payload".to_vec());

        let received = dish.recv().unwrap().expect("expected a datagram");
        assert_eq!(received, b"payload");
        sender.stop();
    }

    #[test]
    fn send_before_start_is_dropped_silently() {
        let sender = MulticastSender::new("test_sender", "SenderTest", "127.0.0.1:19102", None, None);
        assert!(!sender.is_running());
        sender.send(b"ignored".to_vec());
        assert_eq!(sender.queue.len(), 0);
    }

    #[test]
    fn stop_makes_is_running_false_and_drops_further_sends() {
        let sender = MulticastSender::new("test_sender", "SenderTest", "127.0.0.1:19103", None, None);
        sender.start().unwrap();
        assert!(sender.is_running());
        sender.stop();
        assert!(!sender.is_running());
        sender.send(b"late".to_vec());
        assert_eq!(sender.queue.len(), 0);
    }
}
