//! Fan-out destinations for a domain worker's output.
//!
//! The original `ProcessTrackUseCase` shares one outgoing port between the
//! production adapter and any extra analytics adapter via a `shared_ptr`
//! (see `ProcessTrackUseCase`'s shared-ptr constructor, intended for "ZeroMQ
//! adapter + Custom analytics adapter"). Rather than reproduce the
//! refcounted shared port, each domain worker instead holds a list of
//! independently-owned sinks and iterates it for every emission.

use std::sync::Arc;

use crate::net::MulticastSender;

/// A destination a domain worker can forward one emitted record to. Each
/// sink owns whatever resources it needs; nothing is shared between them.
pub trait Sink<T>: Send + Sync {
    fn accept(&self, record: T);
}

/// Encodes `T` to its fixed-layout wire format. Implemented once per record
/// type so [`RadioSink`] can stay generic over which hop it forwards.
pub trait WireEncode {
    fn encode_wire(&self) -> Vec<u8>;
}

impl WireEncode for crate::record::Track {
    fn encode_wire(&self) -> Vec<u8> {
        self.encode()
    }
}

impl WireEncode for crate::record::ExtrapTrack {
    fn encode_wire(&self) -> Vec<u8> {
        self.encode()
    }
}

impl WireEncode for crate::record::DelayTrack {
    fn encode_wire(&self) -> Vec<u8> {
        self.encode()
    }
}

impl WireEncode for crate::record::FinalTrack {
    fn encode_wire(&self) -> Vec<u8> {
        self.encode()
    }
}

/// Adapts a [`MulticastSender`] into a [`Sink`]: the production outbound
/// port for a hop, wrapped so a domain worker can treat it the same as any
/// other registered sink.
pub struct RadioSink<T> {
    sender: Arc<MulticastSender>,
    _record: std::marker::PhantomData<fn(T)>,
}

impl<T> RadioSink<T> {
    pub fn new(sender: Arc<MulticastSender>) -> Self {
        Self {
            sender,
            _record: std::marker::PhantomData,
        }
    }
}

impl<T: WireEncode> Sink<T> for RadioSink<T> {
    fn accept(&self, record: T) {
        self.sender.send(record.encode_wire());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::DishSocket;
    use crate::record::DelayTrack;
    use std::time::Duration;

    fn sample() -> DelayTrack {
        DelayTrack {
            track_id: 1,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            px: 0.0,
            py: 0.0,
            pz: 0.0,
            original_update_time: 0,
            update_time: 0,
            first_hop_sent_time: 0,
            first_hop_delay_time: 0,
            second_hop_sent_time: 0,
        }
    }

    struct CountingSink {
        count: std::sync::atomic::AtomicUsize,
    }

    impl<T> Sink<T> for CountingSink {
        fn accept(&self, _record: T) {
            self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[test]
    fn every_registered_sink_receives_the_same_record() {
        let dish = DishSocket::bind("SinkTest", "127.0.0.1:19301").unwrap();
        dish.set_read_timeout(Duration::from_millis(200)).unwrap();
        let sender = Arc::new(MulticastSender::new("sink_test_sender", "SinkTest", "127.0.0.1:19301", None, None));
        sender.start().unwrap();

        let radio_sink: Arc<dyn Sink<DelayTrack>> = Arc::new(RadioSink::new(sender.clone()));
        let counting_sink = Arc::new(CountingSink {
            count: std::sync::atomic::AtomicUsize::new(0),
        });
        let sinks: Vec<Arc<dyn Sink<DelayTrack>>> = vec![radio_sink, counting_sink.clone()];

        let record = sample();
        for sink in &sinks {
            sink.accept(record);
        }

        assert_eq!(counting_sink.count.load(std::sync::atomic::Ordering::SeqCst), 1);
        let received = dish.recv().unwrap().expect("expected the radio sink's datagram");
        assert_eq!(received, record.encode());

        sender.stop();
    }
}
