//! Master clock generation.
//!
//! Ticks are sent 24 times per quarter note. Each interval is taken from the
//! tempo read at the start of that interval, so tempo changes apply on the
//! very next tick. Waiting is split into a coarse sleep followed by a spin on
//! the remainder; the sleep alone is not accurate enough at typical tempos.

use crate::config::TICKS_PER_BEAT;
use crate::midi::{Drumbrute, PortIo};
use crate::scheduler::StopSignal;
use crate::state::{TempoState, MIN_BPM};
use log::{error, info};
use std::thread;
use std::time::{Duration, Instant};

/// Above this tempo the coarse sleep is skipped and the whole interval is spun.
pub const SLEEP_CEILING_BPM: u32 = 3000;

/// Share of each interval spent sleeping before spinning.
pub const COARSE_SLEEP_RATIO: f64 = 0.8;

/// Time between two clock pulses at `bpm`. Tempos below [`MIN_BPM`] are raised to it.
pub fn pulse_interval(bpm: u32) -> Duration {
    let bpm = bpm.max(MIN_BPM);
    Duration::from_secs_f64(60.0 / (f64::from(bpm) * TICKS_PER_BEAT as f64))
}

/// Part of the interval at `bpm` spent sleeping before the spin, if any.
pub fn coarse_sleep(bpm: u32) -> Option<Duration> {
    if bpm > SLEEP_CEILING_BPM {
        return None;
    }
    Some(pulse_interval(bpm).mul_f64(COARSE_SLEEP_RATIO))
}

pub struct ClockGenerator {
    device: Drumbrute,
}

impl ClockGenerator {
    pub fn new(device: Drumbrute) -> Self {
        Self { device }
    }

    /// Sends ticks to `sink` until `stop` is set. Returns the number of ticks sent.
    pub fn run(&self, stop: &StopSignal, tempo: &TempoState, sink: &mut dyn PortIo) -> u64 {
        info!("MIDI clock running at {} BPM", tempo.tempo());
        let mut ticks = 0u64;

        while !stop.is_set() {
            let bpm = tempo.tempo().max(MIN_BPM);
            let interval = pulse_interval(bpm);
            let started = Instant::now();

            match self.device.send_clock_tick(sink) {
                Ok(()) => ticks += 1,
                Err(e) => error!("Failed to send clock tick: {}", e),
            }

            if let Some(sleep) = coarse_sleep(bpm) {
                thread::sleep(sleep);
            }
            while !stop.is_set() && started.elapsed() < interval {
                std::hint::spin_loop();
            }
        }

        info!("MIDI clock stopped after {} ticks", ticks);
        ticks
    }
}
