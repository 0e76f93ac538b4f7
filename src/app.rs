//! Wiring and lifetime of the two workers.

use crate::actions::BehaviorController;
use crate::config::Config;
use crate::midi::{ClockGenerator, Drumbrute, PortIo, PortSelection};
use crate::pedal::{
    BehaviorDispatcher, BehaviorError, GestureClassifier, Mode, PedalButton, PedalListener,
};
use crate::scheduler::{Scheduler, StopSignal};
use crate::state::SharedState;
use crate::store::StateStore;
use anyhow::Context;
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the coordinator checks on the workers.
const SUPERVISE_INTERVAL: Duration = Duration::from_millis(100);

pub fn create_device(config: &Config) -> Drumbrute {
    Drumbrute::new(config.channel, config.max_patterns, config.max_banks)
}

/// Binds the pedal buttons to the controller's actions.
///
/// Fails if the configured mode button collides with one of the bindings.
pub fn build_listener(
    mode_button: PedalButton,
    threshold: Duration,
    controller: Arc<BehaviorController>,
) -> Result<PedalListener, BehaviorError> {
    let mut dispatcher = BehaviorDispatcher::new(mode_button);

    let c = controller.clone();
    dispatcher.on_start(move |port| c.on_start(port));

    let c = controller.clone();
    dispatcher.register(Mode::Play, PedalButton::APress, move |port, _, _| {
        c.toggle_play(port);
    })?;
    let c = controller.clone();
    dispatcher.register(Mode::Play, PedalButton::BPress, move |port, _, _| {
        c.previous_pattern(port);
    })?;
    let c = controller.clone();
    dispatcher.register(Mode::Play, PedalButton::CRelease, move |port, _, _| {
        c.next_pattern(port);
    })?;

    let c = controller.clone();
    dispatcher.register(Mode::TempoEdit, PedalButton::APress, move |_, _, _| {
        c.decrease_bpm();
    })?;
    let c = controller.clone();
    dispatcher.register(Mode::TempoEdit, PedalButton::BPress, move |_, _, _| {
        c.increase_bpm();
    })?;
    let c = controller;
    dispatcher.register(Mode::TempoEdit, PedalButton::CRelease, move |_, _, _| {
        c.show_enter_tempo_mode();
    })?;

    Ok(PedalListener::new(
        GestureClassifier::new(mode_button, threshold),
        dispatcher,
    ))
}

pub struct Workers {
    clock: JoinHandle<()>,
    listener: JoinHandle<()>,
}

impl Workers {
    /// Blocks until `stop` is set or a worker exits, then stops and joins both.
    pub fn wait(self, stop: &StopSignal) {
        while !stop.is_set() && !self.clock.is_finished() && !self.listener.is_finished() {
            thread::sleep(SUPERVISE_INTERVAL);
        }
        if !stop.is_set() {
            warn!("A worker exited unexpectedly, stopping the other");
        }
        stop.set();

        if self.listener.join().is_err() {
            error!("Pedal listener worker panicked");
        }
        if self.clock.join().is_err() {
            error!("Clock worker panicked");
        }
        info!("Workers joined, exiting");
    }
}

/// Starts the clock and gesture workers, each with its own port.
pub fn spawn_workers<S, C, P>(
    scheduler: &S,
    config: &Config,
    tempo: SharedState,
    store: Arc<dyn StateStore>,
    clock_port: C,
    pedal_port: P,
    stop: &StopSignal,
) -> anyhow::Result<Workers>
where
    S: Scheduler,
    C: PortIo + 'static,
    P: PortIo + 'static,
{
    let device = create_device(config);
    let controller = Arc::new(BehaviorController::new(
        device,
        tempo.clone(),
        store,
        config.default_bpm,
    ));
    let mut listener = build_listener(
        config.mode_button()?,
        config.change_mode_threshold(),
        controller,
    )?;

    let listener_stop = stop.clone();
    let mut pedal_port = pedal_port;
    let listener = scheduler.spawn(move || {
        listener.listen(&listener_stop, &mut pedal_port);
    });
    info!("Starting MIDI listener...");

    let clock_stop = stop.clone();
    let mut clock_port = clock_port;
    let clock = scheduler.spawn(move || {
        ClockGenerator::new(device).run(&clock_stop, &tempo, &mut clock_port);
    });
    info!("Starting MIDI clock...");

    Ok(Workers { clock, listener })
}

/// Opens one connection per worker, runs until Ctrl-C, then shuts down.
pub fn run(
    config: &Config,
    tempo: SharedState,
    store: Arc<dyn StateStore>,
    ports: PortSelection,
) -> anyhow::Result<()> {
    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        info!("Interrupt received, stopping workers");
        handler_stop.set();
    })
    .context("Failed to install interrupt handler")?;

    let clock_port = ports
        .open()
        .context("Failed to open MIDI ports for the clock worker")?;
    let pedal_port = ports
        .open()
        .context("Failed to open MIDI ports for the pedal worker")?;

    let workers = spawn_workers(
        &crate::create_scheduler(),
        config,
        tempo,
        store,
        clock_port,
        pedal_port,
        &stop,
    )?;

    info!("Running. Press Ctrl+C to exit...");
    workers.wait(&stop);
    Ok(())
}
