use std::time::Instant;
use thiserror::Error;

/// Error type for MIDI port operations
#[derive(Debug, Error)]
pub enum MidiError {
    /// The MIDI backend could not be initialised
    #[error("MIDI init error: {0}")]
    Init(String),
    /// A port index is outside the list of available ports
    #[error("MIDI {direction} port {index} not found ({available} available)")]
    PortNotFound {
        direction: &'static str,
        index: usize,
        available: usize,
    },
    /// Error when connecting to a MIDI port
    #[error("MIDI connection error: {0}")]
    Connection(String),
    /// Error when sending a MIDI message
    #[error("MIDI send error: {0}")]
    Send(String),
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

const SYSEX: u8 = 0xF0;
const TIME_CODE: u8 = 0xF1;
const TIMING_CLOCK: u8 = 0xF8;
const ACTIVE_SENSING: u8 = 0xFE;

/// Sysex, timing and active sensing never reach the pedal logic. They would
/// otherwise consume the skip armed by a toggle.
pub fn is_ignored_status(status: u8) -> bool {
    matches!(status, SYSEX | TIME_CODE | TIMING_CLOCK | ACTIVE_SENSING)
}

/// A single incoming message as read from the pedal, stamped on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub status: u8,
    pub data: Option<u8>,
    pub key: Option<u8>,
    pub arrival: Instant,
}

impl RawEvent {
    pub fn new(status: u8, data: u8, arrival: Instant) -> Self {
        Self {
            status,
            data: Some(data),
            key: None,
            arrival,
        }
    }

    /// Builds an event from raw bytes. Empty messages carry nothing to
    /// classify, and ignored system messages are dropped.
    pub fn from_bytes(bytes: &[u8], arrival: Instant) -> Option<Self> {
        let (&status, rest) = bytes.split_first()?;
        if is_ignored_status(status) {
            return None;
        }
        Some(Self {
            status,
            data: rest.first().copied(),
            key: rest.get(1).copied(),
            arrival,
        })
    }

    /// The `(status, data)` pair used for button lookup.
    pub fn codes(&self) -> Option<(u8, u8)> {
        self.data.map(|data| (self.status, data))
    }
}

/// A connection to one input and one output port.
///
/// Each worker owns its own `PortIo`; connections are never shared.
pub trait PortIo: Send {
    /// Returns the next pending event, or `None` when nothing is waiting.
    /// Must not block.
    fn receive_event(&mut self) -> Option<RawEvent>;

    /// Writes raw MIDI bytes to the output port.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<P: PortIo + ?Sized> PortIo for Box<P> {
    fn receive_event(&mut self) -> Option<RawEvent> {
        (**self).receive_event()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }
}
