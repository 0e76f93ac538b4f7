use drumbrute_pedal::app::{spawn_workers, Workers};
use drumbrute_pedal::midi::{MockPort, RawEvent};
use drumbrute_pedal::pedal::PedalButton;
use drumbrute_pedal::store::{MemoryStore, StateStore};
use drumbrute_pedal::{create_scheduler, create_shared_state, Config, SharedState, StopSignal};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const START_SEQUENCE: [[u8; 3]; 3] = [[0xB9, 0, 0], [0xC9, 0, 0], [0xFC, 255, 255]];

struct Rig {
    clock_port: MockPort,
    pedal_port: MockPort,
    store: Arc<MemoryStore>,
    tempo: SharedState,
    stop: StopSignal,
    workers: Workers,
}

impl Rig {
    fn start(store: MemoryStore) -> Self {
        let config = Config::default();
        let store = Arc::new(store);
        let tempo = create_shared_state(&config, store.as_ref());
        let clock_port = MockPort::new();
        let pedal_port = MockPort::new();
        let stop = StopSignal::new();

        let workers = spawn_workers(
            &create_scheduler(),
            &config,
            tempo.clone(),
            store.clone(),
            clock_port.clone(),
            pedal_port.clone(),
            &stop,
        )
        .unwrap();

        let rig = Rig {
            clock_port,
            pedal_port,
            store,
            tempo,
            stop,
            workers,
        };
        rig.wait_for_commands(START_SEQUENCE.len());
        rig
    }

    fn press(&self, button: PedalButton, at: Instant) {
        let (status, data) = button.codes();
        self.pedal_port.push_event(RawEvent::new(status, data, at));
    }

    fn wait_for_commands(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.pedal_port.sent_commands().len() < count {
            assert!(
                Instant::now() < deadline,
                "Timed out waiting for {} commands, got {:?}",
                count,
                self.pedal_port.sent_commands()
            );
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Waits until the listener has drained its queue and had time to act on
    /// the last event.
    fn settle(&self) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.pedal_port.pending() > 0 {
            assert!(Instant::now() < deadline, "Listener did not drain its queue");
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(Duration::from_millis(50));
    }

    /// Commands sent after the start sequence.
    fn commands(&self) -> Vec<Vec<u8>> {
        self.pedal_port
            .sent_commands()
            .into_iter()
            .skip(START_SEQUENCE.len())
            .collect()
    }

    fn shutdown(self) -> (MockPort, Arc<MemoryStore>, SharedState) {
        self.stop.set();
        self.workers.wait(&self.stop);
        (self.clock_port, self.store, self.tempo)
    }
}

fn past(seconds: u64) -> Instant {
    Instant::now()
        .checked_sub(Duration::from_secs(seconds))
        .unwrap_or_else(Instant::now)
}

#[test]
fn test_start_reapplies_stored_state() {
    let rig = Rig::start(MemoryStore::new());

    let sent = rig.pedal_port.sent_commands();
    assert_eq!(sent, START_SEQUENCE.iter().map(|m| m.to_vec()).collect::<Vec<_>>());
    assert_eq!(rig.tempo.tempo(), 120);
    assert_eq!(rig.tempo.pattern_index(), 0);

    let deadline = Instant::now() + Duration::from_secs(2);
    while rig.clock_port.sent().is_empty() {
        assert!(Instant::now() < deadline, "Clock never ticked");
        thread::sleep(Duration::from_millis(5));
    }

    let (clock_port, store, _) = rig.shutdown();
    assert_eq!(store.bpm_for(0), Some(120));
    assert!(clock_port.sent_commands().is_empty());
}

#[test]
fn test_start_resumes_playing_pattern_in_second_bank() {
    let store = MemoryStore::new();
    store.set_pattern(17).unwrap();
    store.set_bpm_for(17, 98).unwrap();
    store.set_playing(true).unwrap();

    let rig = Rig::start(store);
    assert_eq!(
        rig.pedal_port.sent_commands(),
        vec![vec![0xB9, 0, 1], vec![0xC9, 0, 1], vec![0xFA, 255, 255]]
    );
    assert_eq!(rig.tempo.tempo(), 98);
    assert!(rig.tempo.is_playing());
    rig.shutdown();
}

#[test]
fn test_previous_pattern_at_first_pattern_stays_put() {
    let rig = Rig::start(MemoryStore::new());

    rig.press(PedalButton::BPress, Instant::now());
    rig.wait_for_commands(START_SEQUENCE.len() + 1);
    rig.settle();

    assert_eq!(rig.commands(), vec![vec![0xC9, 0, 0]]);
    assert_eq!(rig.tempo.pattern_index(), 0);
    rig.shutdown();
}

#[test]
fn test_next_pattern_steps_without_bank_change() {
    let rig = Rig::start(MemoryStore::new());

    for _ in 0..3 {
        rig.press(PedalButton::CPress, Instant::now());
        rig.press(PedalButton::CRelease, Instant::now());
    }
    rig.wait_for_commands(START_SEQUENCE.len() + 3);
    rig.settle();

    assert_eq!(
        rig.commands(),
        vec![vec![0xC9, 0, 1], vec![0xC9, 0, 2], vec![0xC9, 0, 3]]
    );
    let (_, store, tempo) = rig.shutdown();
    assert_eq!(tempo.pattern_index(), 3);
    assert_eq!(store.pattern(), 3);
}

#[test]
fn test_toggle_play_sends_transport() {
    let rig = Rig::start(MemoryStore::new());

    rig.press(PedalButton::APress, Instant::now());
    rig.press(PedalButton::ARelease, Instant::now());
    rig.wait_for_commands(START_SEQUENCE.len() + 1);
    rig.settle();

    assert_eq!(rig.commands(), vec![vec![0xFA, 255, 255]]);
    let (_, store, tempo) = rig.shutdown();
    assert!(tempo.is_playing());
    assert!(store.playing());
}

#[test]
fn test_tempo_edit_session() {
    let rig = Rig::start(MemoryStore::new());
    let base = past(20);
    let at = |s: u64| base + Duration::from_secs(s);

    // Hold the mode button past the threshold, then nudge the tempo.
    rig.press(PedalButton::CPress, at(0));
    rig.press(PedalButton::CRelease, at(4));
    rig.press(PedalButton::BPress, at(5));
    rig.press(PedalButton::BPress, at(6));
    rig.press(PedalButton::BPress, at(7));
    rig.press(PedalButton::APress, at(8));
    // Back to play: the release of this press is skipped.
    rig.press(PedalButton::CPress, at(9));
    rig.press(PedalButton::CRelease, at(9));
    rig.settle();

    assert!(rig.commands().is_empty());
    assert_eq!(rig.tempo.tempo(), 122);
    assert_eq!(rig.tempo.pattern_index(), 0);

    // Play bindings are live again.
    rig.press(PedalButton::CRelease, at(10));
    rig.wait_for_commands(START_SEQUENCE.len() + 1);
    rig.settle();
    assert_eq!(rig.commands(), vec![vec![0xC9, 0, 1]]);

    let (_, store, tempo) = rig.shutdown();
    assert_eq!(store.bpm_for(0), Some(122));
    // Pattern 2 has no tempo of its own yet.
    assert_eq!(tempo.tempo(), 120);
    assert_eq!(store.bpm_for(1), Some(120));
}

#[test]
fn test_tempo_follows_pattern() {
    let store = MemoryStore::new();
    store.set_bpm_for(0, 90).unwrap();
    store.set_bpm_for(1, 150).unwrap();

    let rig = Rig::start(store);
    assert_eq!(rig.tempo.tempo(), 90);

    rig.press(PedalButton::CRelease, Instant::now());
    rig.wait_for_commands(START_SEQUENCE.len() + 1);
    rig.settle();
    assert_eq!(rig.tempo.tempo(), 150);

    rig.press(PedalButton::BPress, Instant::now());
    rig.wait_for_commands(START_SEQUENCE.len() + 2);
    rig.settle();
    assert_eq!(rig.tempo.tempo(), 90);
    rig.shutdown();
}

#[test]
fn test_shutdown_joins_both_workers() {
    let rig = Rig::start(MemoryStore::new());
    let started = Instant::now();
    rig.shutdown();
    assert!(started.elapsed() < Duration::from_secs(1));
}
