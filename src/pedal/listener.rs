use super::{BehaviorDispatcher, Gesture, GestureClassifier};
use crate::midi::PortIo;
use crate::scheduler::StopSignal;
use log::{debug, info};
use std::thread;
use std::time::{Duration, Instant};

/// Sleep between two polls of the input port.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The gesture worker: polls the pedal, classifies, dispatches.
pub struct PedalListener {
    classifier: GestureClassifier,
    dispatcher: BehaviorDispatcher,
}

impl PedalListener {
    pub fn new(classifier: GestureClassifier, dispatcher: BehaviorDispatcher) -> Self {
        Self {
            classifier,
            dispatcher,
        }
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Runs until `stop` is set. Returns the number of behaviors invoked.
    pub fn listen(&mut self, stop: &StopSignal, port: &mut dyn PortIo) -> u64 {
        self.dispatcher.fire_start(port);
        info!("Pedal listener running");

        let mut dispatched = 0u64;
        let mut last_event = Instant::now();

        while !stop.is_set() {
            thread::sleep(POLL_INTERVAL);
            self.classifier.poll(Instant::now());

            let Some(event) = port.receive_event() else {
                continue;
            };
            if self.classifier.take_skip() {
                debug!("Skipping event {:?}", event.codes());
                continue;
            }

            let delta_seconds = event
                .arrival
                .saturating_duration_since(last_event)
                .as_secs_f64()
                .round() as u64;
            last_event = event.arrival;
            debug!(
                "MIDI IN: type:{}, data:{:?}, key:{:?}, delta:{}s",
                event.status, event.data, event.key, delta_seconds
            );

            match self.classifier.classify_unskipped(&event) {
                Some(Gesture::Regular { button, mode }) => {
                    if self
                        .dispatcher
                        .dispatch(button, mode, port, &event, delta_seconds)
                    {
                        dispatched += 1;
                    }
                }
                Some(Gesture::StartEdit) | Some(Gesture::Toggle) | None => {}
            }
        }

        self.classifier.reset();
        info!("Pedal listener stopped");
        dispatched
    }
}
