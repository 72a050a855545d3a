//! Outbound delivery of encoded change records.
//!
//! A transport accepts one JSON payload per event and returns nothing the
//! notifier acts on. Retries, backoff, and buffering belong to the
//! transport's own implementation, never to the notifier.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedSender;

/// Fire-and-forget sink for change record payloads.
pub trait Transport: Send {
    /// Hands one payload to the transport. Must not block.
    fn send(&self, payload: &[u8]);
}

/// Stub send point that only logs the payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

impl Transport for LogTransport {
    fn send(&self, payload: &[u8]) {
        tracing::debug!(
            payload = %String::from_utf8_lossy(payload),
            "no transport attached, payload dropped"
        );
    }
}

/// Hands payloads to an async consumer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: UnboundedSender<Vec<u8>>,
}

impl ChannelTransport {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub const fn new(tx: UnboundedSender<Vec<u8>>) -> Self {
        Self { tx }
    }
}

impl Transport for ChannelTransport {
    fn send(&self, payload: &[u8]) {
        if self.tx.send(payload.to_vec()).is_err() {
            tracing::warn!("delivery channel closed, payload dropped");
        }
    }
}

/// Keeps every payload in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingTransport {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all payloads sent so far, in order.
    #[must_use]
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, payload: &[u8]) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_transport_shares_buffer_between_clones() {
        let recorder = RecordingTransport::new();
        let handle = recorder.clone();
        handle.send(b"one");
        handle.send(b"two");
        assert_eq!(recorder.payloads(), vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn channel_transport_forwards_payloads() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let transport = ChannelTransport::new(tx);
        transport.send(b"{}");
        assert_eq!(rx.try_recv().unwrap(), b"{}".to_vec());
    }

    #[test]
    fn channel_transport_ignores_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let transport = ChannelTransport::new(tx);
        transport.send(b"{}");
        transport.send(b"{}");
        assert!(transport.tx.is_closed());
    }

    #[test]
    fn log_transport_accepts_any_payload() {
        let transport = LogTransport;
        transport.send(b"{\"action\":\"add\"}");
        transport.send(&[0xff, 0xfe]);
        assert_eq!(format!("{transport:?}"), "LogTransport");
    }
}
