use crate::midi::{MidiError, PortIo, RawEvent, Result};
use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use log::{debug, info, warn};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::time::Instant;

const CLIENT_NAME: &str = "drumbrute-pedal";

/// Incoming messages held until the owning worker reads them. Further
/// messages are dropped while the queue is full.
pub const INPUT_QUEUE_CAPACITY: usize = 1024;

/// Queues one message from the input callback. Returns whether it was kept.
fn enqueue(tx: &Sender<RawEvent>, message: &[u8], arrival: Instant) -> bool {
    let Some(event) = RawEvent::from_bytes(message, arrival) else {
        return false;
    };
    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
    }
}

/// The pair of port indices chosen at start-up.
///
/// Every call to [`PortSelection::open`] produces a fresh, independent
/// connection, so each worker can own its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSelection {
    pub input: usize,
    pub output: usize,
}

impl PortSelection {
    pub fn new(input: usize, output: usize) -> Self {
        Self { input, output }
    }

    pub fn open(&self) -> Result<MidirPort> {
        MidirPort::open(self.input, self.output)
    }
}

pub struct MidirPort {
    // Held to keep the input callback alive.
    _input: MidiInputConnection<()>,
    output: MidiOutputConnection,
    rx: Receiver<RawEvent>,
}

impl MidirPort {
    pub fn open(input_index: usize, output_index: usize) -> Result<Self> {
        let mut midi_in = MidiInput::new(&format!("{}-in", CLIENT_NAME))
            .map_err(|e| MidiError::Init(e.to_string()))?;
        midi_in.ignore(Ignore::All);

        let in_ports = midi_in.ports();
        let in_port = in_ports.get(input_index).ok_or(MidiError::PortNotFound {
            direction: "input",
            index: input_index,
            available: in_ports.len(),
        })?;
        let in_name = midi_in.port_name(in_port).unwrap_or_default();

        let (tx, rx) = bounded(INPUT_QUEUE_CAPACITY);
        let input = midi_in
            .connect(
                in_port,
                &format!("{}-input", CLIENT_NAME),
                move |_stamp, message, _| {
                    enqueue(&tx, message, Instant::now());
                },
                (),
            )
            .map_err(|e| MidiError::Connection(e.to_string()))?;

        let midi_out = MidiOutput::new(&format!("{}-out", CLIENT_NAME))
            .map_err(|e| MidiError::Init(e.to_string()))?;
        let out_ports = midi_out.ports();
        let out_port = out_ports.get(output_index).ok_or(MidiError::PortNotFound {
            direction: "output",
            index: output_index,
            available: out_ports.len(),
        })?;
        let out_name = midi_out.port_name(out_port).unwrap_or_default();
        let output = midi_out
            .connect(out_port, &format!("{}-output", CLIENT_NAME))
            .map_err(|e| MidiError::Connection(e.to_string()))?;

        debug!(
            "Opened MIDI ports: input {} ({}), output {} ({})",
            input_index, in_name, output_index, out_name
        );

        Ok(MidirPort {
            _input: input,
            output,
            rx,
        })
    }
}

impl PortIo for MidirPort {
    fn receive_event(&mut self) -> Option<RawEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("MIDI input callback disconnected");
                None
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.output
            .send(bytes)
            .map_err(|e| MidiError::Send(e.to_string()))
    }
}

/// Lists the names of all MIDI input ports, in index order.
pub fn list_input_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new(&format!("{}-list", CLIENT_NAME))
        .map_err(|e| MidiError::Init(e.to_string()))?;
    Ok(midi_in
        .ports()
        .iter()
        .map(|p| midi_in.port_name(p).unwrap_or_default())
        .collect())
}

/// Lists the names of all MIDI output ports, in index order.
pub fn list_output_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new(&format!("{}-list", CLIENT_NAME))
        .map_err(|e| MidiError::Init(e.to_string()))?;
    Ok(midi_out
        .ports()
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_default())
        .collect())
}

/// Finds the first port whose name contains `query`, ignoring case.
pub fn query_port(available: &[String], query: &str) -> Option<usize> {
    let query = query.to_lowercase();
    let found = available
        .iter()
        .position(|name| name.to_lowercase().contains(&query));
    if let Some(index) = found {
        info!("Port query '{}' matched {} ({})", query, index, available[index]);
    }
    found
}
