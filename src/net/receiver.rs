//! DISH role: a dedicated thread that binds, joins its multicast group, and
//! decodes every inbound datagram into a caller-supplied sink.
//!
//! The loop timestamps and dispatches each datagram immediately, via a
//! thread spawned and stopped through [`crate::rt::spawn_rt_thread`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, trace};
use parking_lot::Mutex;

use crate::error::{SocketError, StartError};
use crate::net::DishSocket;
use crate::rt;
use crate::time::now_micros;

const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Binds a DISH socket on its own real-time thread and calls `on_datagram`
/// for every datagram whose group tag matches. Decoding is left to the
/// caller so this type stays reusable across all three hops.
pub struct MulticastReceiver {
    name: &'static str,
    group: String,
    endpoint: String,
    core: Option<usize>,
    priority: Option<u8>,
    stop: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MulticastReceiver {
    pub fn new(name: &'static str, group: &str, endpoint: &str, core: Option<usize>, priority: Option<u8>) -> Self {
        Self {
            name,
            group: group.to_string(),
            endpoint: endpoint.to_string(),
            core,
            priority,
            stop: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Binds the socket on the caller's thread (so startup failures surface
    /// synchronously) then hands the running loop off to a dedicated
    /// real-time thread. Idempotent with respect to an already-running
    /// instance: calling `start` again while running is a no-op that
    /// returns success rather than re-binding.
    ///
    /// `on_datagram` is called with the raw payload and the receive
    /// timestamp taken immediately after `recv` returns, before any
    /// decoding or queueing happens, so the timestamp reflects actual
    /// wire-receive time. A panic inside `on_datagram` is caught and
    /// logged rather than allowed to unwind the receive loop.
    pub fn start<F>(&self, on_datagram: F) -> Result<(), StartError>
    where
        F: Fn(&[u8], i64) + Send + 'static,
    {
        let mut guard = self.handle.lock();
        if guard.is_some() {
            return Ok(());
        }

        let socket = DishSocket::bind(&self.group, &self.endpoint).map_err(|source| StartError::Socket {
            endpoint: self.endpoint.clone(),
            source,
        })?;
        socket.set_read_timeout(RECV_TIMEOUT).map_err(|source| StartError::Socket {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        self.stop.store(false, Ordering::SeqCst);
        let name = self.name;
        let endpoint = self.endpoint.clone();
        let handle = rt::spawn_rt_thread(name, self.core, self.priority, self.stop.clone(), move |stop| {
            debug!("[{}] receiving on {}", name, endpoint);
            while !stop.load(Ordering::SeqCst) {
                match socket.recv() {
                    Ok(Some(datagram)) => {
                        let receive_time_us = now_micros();
                        trace!("[{}] received {} bytes", name, datagram.len());
                        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            on_datagram(&datagram, receive_time_us)
                        }));
                        if let Err(payload) = outcome {
                            error!("[{}] sink panicked: {}", name, rt::panic_message(payload));
                        }
                    }
                    Ok(None) => continue,
                    Err(SocketError::Receive(e)) => {
                        error!("[{}] receive error: {}", name, e);
                    }
                    Err(e) => {
                        error!("[{}] socket error: {}", name, e);
                        break;
                    }
                }
            }
            debug!("[{}] stopped", name);
        });

        *guard = Some(handle);
        Ok(())
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::net::RadioSocket;

    #[test]
    fn dispatches_every_matching_datagram_to_the_sink() {
        let receiver = MulticastReceiver::new("test_receiver", "ReceiverTest", "127.0.0.1:19111", None, None);
        let (tx, rx) = mpsc::channel();
        receiver.start(move |bytes, _recv_time_us| tx.send(bytes.to_vec()).unwrap()).unwrap();

        // give the receiver thread a moment to bind and start looping.
        std::thread::sleep(Duration::from_millis(50));
        let radio = RadioSocket::connect("ReceiverTest", "127.0.0.1:19111").unwrap();
        radio.send(b"hello").unwrap();

        let received = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(received, b"hello");
        receiver.stop();
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let receiver = MulticastReceiver::new("test_receiver", "ReceiverTest", "127.0.0.1:19112", None, None);
        receiver.start(|_, _| {}).unwrap();
        assert!(receiver.is_running());
        assert!(receiver.start(|_, _| {}).is_ok());
        assert!(receiver.is_running());
        receiver.stop();
        assert!(!receiver.is_running());
    }
}
