use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Lowest tempo handed to the clock. Zero would make the pulse interval infinite.
pub const MIN_BPM: u32 = 1;
pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_MAX_BPM: u32 = 300;

/// Tempo, pattern and transport flag shared by the clock and gesture workers.
///
/// Every write clamps into range, so readers never observe an invalid value.
pub struct TempoState {
    bpm: AtomicU32,
    pattern_index: AtomicU32,
    is_playing: AtomicBool,
    max_bpm: u32,
    max_pattern_index: u32,
}

pub type SharedState = Arc<TempoState>;

impl Default for TempoState {
    fn default() -> Self {
        Self::new(DEFAULT_BPM, DEFAULT_MAX_BPM, 64)
    }
}

impl TempoState {
    /// `pattern_count` is the total number of addressable patterns across all banks.
    pub fn new(bpm: u32, max_bpm: u32, pattern_count: u32) -> Self {
        let max_bpm = max_bpm.max(MIN_BPM);
        Self {
            bpm: AtomicU32::new(bpm.clamp(MIN_BPM, max_bpm)),
            pattern_index: AtomicU32::new(0),
            is_playing: AtomicBool::new(false),
            max_bpm,
            max_pattern_index: pattern_count.saturating_sub(1),
        }
    }

    pub fn max_bpm(&self) -> u32 {
        self.max_bpm
    }

    pub fn max_pattern_index(&self) -> u32 {
        self.max_pattern_index
    }

    fn clamp_bpm(&self, bpm: i64) -> u32 {
        bpm.clamp(i64::from(MIN_BPM), i64::from(self.max_bpm)) as u32
    }

    fn clamp_pattern(&self, index: i64) -> u32 {
        index.clamp(0, i64::from(self.max_pattern_index)) as u32
    }

    pub fn tempo(&self) -> u32 {
        self.bpm.load(Ordering::SeqCst)
    }

    /// Stores `bpm` clamped to `[MIN_BPM, max_bpm]` and returns the stored value.
    pub fn set_tempo(&self, bpm: i64) -> u32 {
        let bpm = self.clamp_bpm(bpm);
        self.bpm.store(bpm, Ordering::SeqCst);
        bpm
    }

    /// Atomically adds `delta` to the tempo, clamping the result.
    pub fn adjust_tempo(&self, delta: i64) -> u32 {
        let update = |current: u32| Some(self.clamp_bpm(i64::from(current) + delta));
        let previous = self
            .bpm
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, update)
            .unwrap_or_else(|current| current);
        self.clamp_bpm(i64::from(previous) + delta)
    }

    pub fn pattern_index(&self) -> u32 {
        self.pattern_index.load(Ordering::SeqCst)
    }

    /// Stores the pattern index clamped to the device range and returns it.
    pub fn set_pattern_index(&self, index: i64) -> u32 {
        let index = self.clamp_pattern(index);
        self.pattern_index.store(index, Ordering::SeqCst);
        index
    }

    pub fn set_playing(&self, playing: bool) {
        self.is_playing.store(playing, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::SeqCst)
    }

    /// Flips the transport flag and returns the new state.
    pub fn toggle_playing(&self) -> bool {
        !self.is_playing.fetch_xor(true, Ordering::SeqCst)
    }
}
