//! Built-in pedal actions.
//!
//! These are the only places where shared tempo, pattern and transport state
//! are mutated. Each mutation is written through to the store.

use crate::midi::{self, Drumbrute, PortIo};
use crate::state::SharedState;
use crate::store::StateStore;
use log::{error, info};
use std::sync::Arc;

pub struct BehaviorController {
    device: Drumbrute,
    tempo: SharedState,
    store: Arc<dyn StateStore>,
    default_bpm: u32,
}

fn report(result: midi::Result<impl Sized>, what: &str) {
    if let Err(e) = result {
        error!("Failed to send {}: {}", what, e);
    }
}

fn persist(result: crate::store::Result<()>, what: &str) {
    if let Err(e) = result {
        error!("Failed to persist {}: {}", what, e);
    }
}

impl BehaviorController {
    pub fn new(
        device: Drumbrute,
        tempo: SharedState,
        store: Arc<dyn StateStore>,
        default_bpm: u32,
    ) -> Self {
        Self {
            device,
            tempo,
            store,
            default_bpm,
        }
    }

    pub fn device(&self) -> &Drumbrute {
        &self.device
    }

    pub fn tempo(&self) -> &SharedState {
        &self.tempo
    }

    /// Tempo remembered for the current stored pattern.
    fn stored_bpm(&self) -> u32 {
        self.store.bpm().unwrap_or(self.default_bpm)
    }

    /// Re-applies the stored pattern, tempo and transport state to the device.
    pub fn on_start(&self, port: &mut dyn PortIo) {
        self.apply_pattern(port, i64::from(self.store.pattern()), true);
        self.set_bpm(i64::from(self.stored_bpm()));

        let playing = self.store.playing();
        self.tempo.set_playing(playing);
        if playing {
            report(self.device.play(port), "transport start");
        } else {
            report(self.device.stop(port), "transport stop");
        }
    }

    pub fn toggle_play(&self, port: &mut dyn PortIo) -> bool {
        let playing = self.tempo.toggle_playing();
        if playing {
            report(self.device.play(port), "transport start");
        } else {
            report(self.device.stop(port), "transport stop");
        }
        persist(self.store.set_playing(playing), "play state");

        let action = if playing { "PLAY" } else { "STOP" };
        info!(
            "{} PATTERN:{} BPM:{}",
            action,
            self.tempo.pattern_index() + 1,
            self.tempo.tempo()
        );
        playing
    }

    /// Moves `delta` patterns from the current one, then restores the tempo
    /// remembered for the new pattern. Returns the new pattern index.
    pub fn change_pattern(&self, port: &mut dyn PortIo, delta: i64) -> u32 {
        let target = i64::from(self.tempo.pattern_index()) + delta;
        let index = self.apply_pattern(port, target, false);
        self.set_bpm(i64::from(self.stored_bpm()));
        index
    }

    pub fn previous_pattern(&self, port: &mut dyn PortIo) -> u32 {
        self.change_pattern(port, -1)
    }

    pub fn next_pattern(&self, port: &mut dyn PortIo) -> u32 {
        self.change_pattern(port, 1)
    }

    /// Adds `delta` to the tempo. Returns the tempo after clamping.
    pub fn adjust_bpm(&self, delta: i64) -> u32 {
        let bpm = self.tempo.adjust_tempo(delta);
        self.record_bpm(bpm);
        bpm
    }

    pub fn increase_bpm(&self) -> u32 {
        self.adjust_bpm(1)
    }

    pub fn decrease_bpm(&self) -> u32 {
        self.adjust_bpm(-1)
    }

    pub fn show_enter_tempo_mode(&self) {
        info!("TEMPO MODE ACTIVATED BPM:{}", self.tempo.tempo());
    }

    /// Clamps `target`, sends the bank change when the bank differs from the
    /// previous one (or always, with `force_bank`), then the pattern change.
    fn apply_pattern(&self, port: &mut dyn PortIo, target: i64, force_bank: bool) -> u32 {
        let (previous_bank, _) = self.device.decompose(self.tempo.pattern_index());
        let index = self.tempo.set_pattern_index(target);
        let (bank, local) = self.device.decompose(index);

        info!("DRUMBRUTE PATTERN:{} BANK:{}", local + 1, bank + 1);

        if force_bank || bank != previous_bank {
            report(self.device.change_bank(port, bank), "bank change");
        }
        report(self.device.change_pattern(port, local), "pattern change");
        persist(self.store.set_pattern(index), "pattern");
        index
    }

    /// Sets the tempo, clamped, and stores it for the current pattern.
    pub fn set_bpm(&self, bpm: i64) -> u32 {
        let bpm = self.tempo.set_tempo(bpm);
        self.record_bpm(bpm);
        bpm
    }

    fn record_bpm(&self, bpm: u32) {
        persist(self.store.set_bpm_for(self.tempo.pattern_index(), bpm), "tempo");
        info!(
            "CHANGE PATTERN:{} BPM:{}",
            self.tempo.pattern_index() + 1,
            bpm
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MockPort;
    use crate::state::TempoState;
    use crate::store::MemoryStore;

    fn controller() -> (BehaviorController, Arc<MemoryStore>) {
        let device = Drumbrute::default();
        let tempo = Arc::new(TempoState::new(120, 300, device.pattern_count()));
        let store = Arc::new(MemoryStore::new());
        (
            BehaviorController::new(device, tempo, store.clone(), 120),
            store,
        )
    }

    #[test]
    fn test_toggle_play_flips_and_persists() {
        let (controller, store) = controller();
        let mut port = MockPort::new();

        assert!(controller.toggle_play(&mut port));
        assert!(store.playing());
        assert!(!controller.toggle_play(&mut port));
        assert!(!store.playing());

        assert_eq!(port.sent(), vec![vec![0xFA, 255, 255], vec![0xFC, 255, 255]]);
    }

    #[test]
    fn test_bank_change_only_when_crossing_banks() {
        let (controller, _) = controller();
        let mut port = MockPort::new();
        controller.tempo().set_pattern_index(15);

        assert_eq!(controller.next_pattern(&mut port), 16);
        assert_eq!(port.sent(), vec![vec![0xB9, 0, 1], vec![0xC9, 0, 0]]);

        port.clear_sent();
        assert_eq!(controller.next_pattern(&mut port), 17);
        assert_eq!(port.sent(), vec![vec![0xC9, 0, 1]]);
    }

    #[test]
    fn test_pattern_clamped_at_last_index() {
        let (controller, store) = controller();
        let mut port = MockPort::new();
        controller.tempo().set_pattern_index(63);

        assert_eq!(controller.next_pattern(&mut port), 63);
        assert_eq!(store.pattern(), 63);
        assert_eq!(port.sent(), vec![vec![0xC9, 0, 15]]);
    }

    #[test]
    fn test_each_pattern_restores_its_tempo() {
        let (controller, store) = controller();
        let mut port = MockPort::new();

        controller.adjust_bpm(10);
        assert_eq!(store.bpm_for(0), Some(130));

        controller.next_pattern(&mut port);
        assert_eq!(controller.tempo().tempo(), 120);
        controller.adjust_bpm(-20);
        assert_eq!(store.bpm_for(1), Some(100));

        controller.previous_pattern(&mut port);
        assert_eq!(controller.tempo().tempo(), 130);
    }

    #[test]
    fn test_send_failures_do_not_stop_state_changes() {
        let (controller, store) = controller();
        let mut port = MockPort::failing();

        assert_eq!(controller.next_pattern(&mut port), 1);
        assert!(controller.toggle_play(&mut port));
        assert_eq!(store.pattern(), 1);
        assert!(store.playing());
    }
}
