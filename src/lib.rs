pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod midi;
pub mod pedal;
pub mod scheduler;
pub mod state;
pub mod store;

pub use cli::Args;
pub use config::Config;
pub use scheduler::{Scheduler, StopSignal, ThreadScheduler};
pub use state::{SharedState, TempoState};

use log::error;
use std::sync::Arc;
use store::StateStore;

pub fn create_scheduler() -> ThreadScheduler {
    ThreadScheduler::new()
}

/// Builds the shared tempo state, seeded with the stored pattern and its tempo.
pub fn create_shared_state(config: &Config, store: &dyn StateStore) -> SharedState {
    let state = TempoState::new(
        store.bpm().unwrap_or(config.default_bpm),
        config.max_bpm,
        config.max_patterns * config.max_banks,
    );
    state.set_pattern_index(i64::from(store.pattern()));
    state.set_playing(store.playing());
    Arc::new(state)
}

/// Returns one line per MIDI port, inputs first.
pub fn handle_device_list() -> Vec<String> {
    let mut lines = Vec::new();
    match midi::list_input_ports() {
        Ok(ports) => lines.extend(
            ports
                .iter()
                .enumerate()
                .map(|(i, name)| format!("input  {}: {}", i, name)),
        ),
        Err(e) => error!("Failed to list MIDI input ports: {}", e),
    }
    match midi::list_output_ports() {
        Ok(ports) => lines.extend(
            ports
                .iter()
                .enumerate()
                .map(|(i, name)| format!("output {}: {}", i, name)),
        ),
        Err(e) => error!("Failed to list MIDI output ports: {}", e),
    }
    lines
}
