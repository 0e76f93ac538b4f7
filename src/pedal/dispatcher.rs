use super::{Mode, PedalButton};
use crate::midi::{PortIo, RawEvent};
use log::debug;
use std::collections::HashMap;
use thiserror::Error;

/// A registered pedal action: receives the worker's port, the triggering
/// event and the whole seconds since the previous event.
pub type Behavior = Box<dyn FnMut(&mut dyn PortIo, &RawEvent, u64) + Send>;

/// Fired once after the ports are opened, before the first event is read.
pub type StartHook = Box<dyn FnOnce(&mut dyn PortIo) + Send>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    #[error("{button} is the mode button and cannot be bound in {mode} mode")]
    ModeButtonReserved { button: PedalButton, mode: Mode },
}

pub struct BehaviorDispatcher {
    mode_button: PedalButton,
    play: HashMap<PedalButton, Behavior>,
    tempo_edit: HashMap<PedalButton, Behavior>,
    on_start: Option<StartHook>,
}

impl BehaviorDispatcher {
    pub fn new(mode_button: PedalButton) -> Self {
        Self {
            mode_button,
            play: HashMap::new(),
            tempo_edit: HashMap::new(),
            on_start: None,
        }
    }

    pub fn mode_button(&self) -> PedalButton {
        self.mode_button
    }

    fn registry(&self, mode: Mode) -> &HashMap<PedalButton, Behavior> {
        match mode {
            Mode::Play => &self.play,
            Mode::TempoEdit => &self.tempo_edit,
        }
    }

    fn registry_mut(&mut self, mode: Mode) -> &mut HashMap<PedalButton, Behavior> {
        match mode {
            Mode::Play => &mut self.play,
            Mode::TempoEdit => &mut self.tempo_edit,
        }
    }

    /// Binds `behavior` to `button` in `mode`, replacing any previous binding.
    /// The mode button can never be bound.
    pub fn register<F>(
        &mut self,
        mode: Mode,
        button: PedalButton,
        behavior: F,
    ) -> Result<(), BehaviorError>
    where
        F: FnMut(&mut dyn PortIo, &RawEvent, u64) + Send + 'static,
    {
        if button == self.mode_button {
            return Err(BehaviorError::ModeButtonReserved { button, mode });
        }
        self.registry_mut(mode).insert(button, Box::new(behavior));
        Ok(())
    }

    pub fn is_bound(&self, mode: Mode, button: PedalButton) -> bool {
        self.registry(mode).contains_key(&button)
    }

    pub fn on_start<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce(&mut dyn PortIo) + Send + 'static,
    {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Runs the start hook if one is set and has not run yet.
    pub fn fire_start(&mut self, port: &mut dyn PortIo) -> bool {
        match self.on_start.take() {
            Some(hook) => {
                hook(port);
                true
            }
            None => false,
        }
    }

    /// Invokes the behavior bound to `button` in `mode`. Unbound buttons are
    /// ignored. Returns whether a behavior ran.
    pub fn dispatch(
        &mut self,
        button: PedalButton,
        mode: Mode,
        port: &mut dyn PortIo,
        event: &RawEvent,
        delta_seconds: u64,
    ) -> bool {
        match self.registry_mut(mode).get_mut(&button) {
            Some(behavior) => {
                behavior(port, event, delta_seconds);
                true
            }
            None => {
                debug!("Nothing bound for {} in {} mode", button, mode);
                false
            }
        }
    }
}
