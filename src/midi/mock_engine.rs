use crate::midi::{MidiError, PortIo, RawEvent, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory port for tests.
///
/// Clones share the same queues, so a test can keep one handle to push
/// events and inspect output while a worker owns another.
#[derive(Clone, Default)]
pub struct MockPort {
    incoming: Arc<Mutex<VecDeque<RawEvent>>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_sends: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// A port whose every `send` fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn push_event(&self, event: RawEvent) {
        lock(&self.incoming).push_back(event);
    }

    pub fn pending(&self) -> usize {
        lock(&self.incoming).len()
    }

    /// Everything sent so far, one entry per `send` call.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.sent).clone()
    }

    /// Sent messages excluding clock ticks.
    pub fn sent_commands(&self) -> Vec<Vec<u8>> {
        self.sent()
            .into_iter()
            .filter(|bytes| bytes.first() != Some(&0xF8))
            .collect()
    }

    pub fn clear_sent(&self) {
        lock(&self.sent).clear();
    }
}

impl PortIo for MockPort {
    fn receive_event(&mut self) -> Option<RawEvent> {
        lock(&self.incoming).pop_front()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if self.fail_sends {
            return Err(MidiError::Send("mock port rejects sends".to_string()));
        }
        lock(&self.sent).push(bytes.to_vec());
        Ok(())
    }
}
