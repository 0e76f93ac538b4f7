//! Mode state machine for the pedal.
//!
//! The controller starts in [`Mode::Play`]. Pressing the mode button starts a
//! hold timer; once the timer is older than the threshold the controller is
//! in [`Mode::TempoEdit`]. The threshold is evaluated lazily, whenever an
//! event arrives or the listener polls, never from a timer thread.
//!
//! Pressing the mode button while in tempo edit returns to play and arms a
//! one-shot skip: the next event is dropped unseen, because it is the release
//! generated by that same press.

use super::PedalButton;
use crate::midi::RawEvent;
use log::{debug, info};
use std::fmt;
use std::time::{Duration, Instant};

pub const DEFAULT_CHANGE_MODE_THRESHOLD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Play,
    TempoEdit,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Play => f.write_str("PLAY"),
            Mode::TempoEdit => f.write_str("TEMPO_EDIT"),
        }
    }
}

/// What a classified event means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Mode button pressed in play mode; the hold timer is running.
    StartEdit,
    /// Mode button pressed in tempo edit; back to play, next event skipped.
    Toggle,
    /// Any other button, to be looked up in the registry for `mode`.
    Regular { button: PedalButton, mode: Mode },
}

pub struct GestureClassifier {
    mode_button: PedalButton,
    threshold: Duration,
    hold_started: Option<Instant>,
    edit_announced: bool,
    skip_next: bool,
}

impl GestureClassifier {
    pub fn new(mode_button: PedalButton, threshold: Duration) -> Self {
        Self {
            mode_button,
            threshold,
            hold_started: None,
            edit_announced: false,
            skip_next: false,
        }
    }

    pub fn mode_button(&self) -> PedalButton {
        self.mode_button
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Mode as of `now`, without side effects.
    pub fn mode_at(&self, now: Instant) -> Mode {
        match self.hold_started {
            Some(started) if now.saturating_duration_since(started) >= self.threshold => {
                Mode::TempoEdit
            }
            _ => Mode::Play,
        }
    }

    /// Re-evaluates the hold timer, logging the entry into tempo edit once.
    pub fn poll(&mut self, now: Instant) -> Mode {
        let mode = self.mode_at(now);
        if mode == Mode::TempoEdit && !self.edit_announced {
            info!("TEMPO MODE ACTIVE");
            self.edit_announced = true;
        }
        mode
    }

    pub fn is_hold_pending(&self) -> bool {
        self.hold_started.is_some()
    }

    /// Consumes the one-shot skip flag. Returns whether the current event must be dropped.
    pub fn take_skip(&mut self) -> bool {
        std::mem::take(&mut self.skip_next)
    }

    /// Consults the skip flag, then classifies `event`.
    pub fn classify(&mut self, event: &RawEvent) -> Option<Gesture> {
        if self.take_skip() {
            debug!("Skipping event {:?}", event.codes());
            return None;
        }
        self.classify_unskipped(event)
    }

    /// Classifies `event` at its arrival time. The caller has already handled
    /// the skip flag via [`GestureClassifier::take_skip`].
    pub fn classify_unskipped(&mut self, event: &RawEvent) -> Option<Gesture> {
        let Some(button) = event
            .codes()
            .and_then(|(status, data)| PedalButton::from_codes(status, data))
        else {
            debug!("Button not mapped: ({}, {:?})", event.status, event.data);
            return None;
        };

        let mode = self.poll(event.arrival);

        if button == self.mode_button {
            return Some(match mode {
                Mode::Play => {
                    if self.hold_started.is_none() {
                        info!(
                            "ACTIVATE TEMPO MODE ({} seconds)",
                            self.threshold.as_secs_f64()
                        );
                        self.hold_started = Some(event.arrival);
                    }
                    Gesture::StartEdit
                }
                Mode::TempoEdit => {
                    info!("TOGGLE BACK TO PLAY MODE");
                    self.reset();
                    self.skip_next = true;
                    Gesture::Toggle
                }
            });
        }

        if mode == Mode::Play && self.hold_started.take().is_some() {
            debug!("Hold released before threshold, staying in PLAY");
        }
        Some(Gesture::Regular { button, mode })
    }

    /// Drops any pending hold and returns to play. The skip flag is left alone.
    pub fn reset(&mut self) {
        self.hold_started = None;
        self.edit_announced = false;
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(PedalButton::CPress, DEFAULT_CHANGE_MODE_THRESHOLD)
    }
}
