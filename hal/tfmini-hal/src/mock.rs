//! Scripted in-memory transport
//!
//! Used by host-side tests to drive a session without hardware. Bytes
//! queued with [`MockTransport::push_rx`] are handed out by `receive` in
//! order; everything passed to `send` is recorded.

use heapless::{Deque, Vec};

use crate::transport::{DeviceId, Transport};

/// Receive queue capacity in bytes
pub const RX_CAPACITY: usize = 512;

/// Sent-byte log capacity in bytes
pub const TX_CAPACITY: usize = 1024;

/// Mock transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MockError {
    /// Link marked as down
    Disconnected,
    /// Receive queue or sent log is full
    Overflow,
}

/// Scripted transport with call counters
#[derive(Debug, Default)]
pub struct MockTransport {
    rx: Deque<u8, RX_CAPACITY>,
    sent: Vec<u8, TX_CAPACITY>,
    reply: Option<Vec<u8, 16>>,
    idle_byte: Option<u8>,
    send_calls: usize,
    receive_calls: usize,
    last_device: Option<DeviceId>,
    disconnected: bool,
}

impl MockTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that answers every send with `reply`
    ///
    /// Handy for acknowledging every command frame with the same ack.
    pub fn replying(reply: &[u8]) -> Self {
        let mut mock = Self::new();
        mock.set_reply(reply);
        mock
    }

    /// Queue bytes for `receive`
    pub fn push_rx(&mut self, bytes: &[u8]) -> Result<(), MockError> {
        for &b in bytes {
            self.rx.push_back(b).map_err(|_| MockError::Overflow)?;
        }
        Ok(())
    }

    /// Queue `reply` after every subsequent send
    ///
    /// Replies longer than 16 bytes are truncated.
    pub fn set_reply(&mut self, reply: &[u8]) {
        let len = reply.len().min(16);
        let mut v = Vec::new();
        // Cannot fail: length clamped to capacity
        let _ = v.extend_from_slice(&reply[..len]);
        self.reply = Some(v);
    }

    /// Stop replying to sends
    pub fn clear_reply(&mut self) {
        self.reply = None;
    }

    /// Once the queue is empty, keep producing `byte` instead of short reads
    ///
    /// Models a line full of noise that never carries a frame.
    pub fn set_idle_byte(&mut self, byte: Option<u8>) {
        self.idle_byte = byte;
    }

    /// Mark the link as up or down
    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.disconnected = disconnected;
    }

    /// All bytes sent so far
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Sent bytes split into 8-byte command frames
    pub fn sent_frames(&self) -> impl Iterator<Item = &[u8]> {
        self.sent.chunks(8)
    }

    /// Forget the sent-byte log and counters
    pub fn clear_sent(&mut self) {
        self.sent.clear();
        self.send_calls = 0;
        self.receive_calls = 0;
    }

    /// Number of `send` calls
    pub fn send_calls(&self) -> usize {
        self.send_calls
    }

    /// Number of `receive` calls
    pub fn receive_calls(&self) -> usize {
        self.receive_calls
    }

    /// Bytes still waiting in the receive queue
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Device id used by the most recent call
    pub fn last_device(&self) -> Option<DeviceId> {
        self.last_device
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn send(&mut self, device: DeviceId, data: &[u8]) -> Result<(), MockError> {
        self.send_calls += 1;
        self.last_device = Some(device);
        if self.disconnected {
            return Err(MockError::Disconnected);
        }
        self.sent
            .extend_from_slice(data)
            .map_err(|_| MockError::Overflow)?;

        if let Some(reply) = self.reply.clone() {
            self.push_rx(&reply)?;
        }
        Ok(())
    }

    fn receive(&mut self, device: DeviceId, buf: &mut [u8]) -> Result<usize, MockError> {
        self.receive_calls += 1;
        self.last_device = Some(device);
        if self.disconnected {
            return Err(MockError::Disconnected);
        }

        let mut filled = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop_front().or(self.idle_byte) {
                Some(b) => {
                    *slot = b;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }
}
