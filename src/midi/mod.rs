//! MIDI plumbing for the pedal controller
//!
//! This module provides:
//! - The [`PortIo`] trait every worker talks through, and the [`RawEvent`]s it yields
//! - [`MidirPort`] for real MIDI ports via midir
//! - [`MockPort`] for testing
//! - The [`Drumbrute`] command encoder
//! - The [`ClockGenerator`] master clock loop
//!
mod clock;
mod drumbrute;
mod engine;
pub mod midir_engine;
pub mod mock_engine;

pub use engine::{MidiError, PortIo, RawEvent, Result};

pub use midir_engine::{list_input_ports, list_output_ports, query_port, MidirPort, PortSelection};
pub use mock_engine::MockPort;

pub use clock::{
    coarse_sleep, pulse_interval, ClockGenerator, COARSE_SLEEP_RATIO, SLEEP_CEILING_BPM,
};
pub use drumbrute::{
    Drumbrute, CLOCK_TICK, CONTROL_CHANGE, DEFAULT_CHANNEL, DEFAULT_MAX_BANKS,
    DEFAULT_MAX_PATTERNS, PROGRAM_CHANGE, TRANSPORT_START, TRANSPORT_STOP,
};
