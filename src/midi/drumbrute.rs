//! Command encoding for the Arturia DrumBrute.
//!
//! Patterns are addressed as a flat index across banks; the device itself
//! wants a bank control-change followed by a program-change for the local
//! pattern inside that bank.

use crate::midi::{PortIo, Result};

pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const TRANSPORT_START: u8 = 0xFA;
pub const TRANSPORT_STOP: u8 = 0xFC;
pub const CLOCK_TICK: u8 = 0xF8;

/// Filler for the unused data bytes of real-time messages.
const UNUSED: u8 = 255;

pub const DEFAULT_CHANNEL: u8 = 10;
pub const DEFAULT_MAX_PATTERNS: u32 = 16;
pub const DEFAULT_MAX_BANKS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drumbrute {
    channel: u8,
    max_patterns: u32,
    max_banks: u32,
}

impl Default for Drumbrute {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL, DEFAULT_MAX_PATTERNS, DEFAULT_MAX_BANKS)
    }
}

impl Drumbrute {
    /// `channel` is 1-based, as printed on the device. Callers validate it;
    /// see [`crate::config::Config::validate`].
    pub fn new(channel: u8, max_patterns: u32, max_banks: u32) -> Self {
        Self {
            channel,
            max_patterns,
            max_banks,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn max_patterns(&self) -> u32 {
        self.max_patterns
    }

    pub fn max_banks(&self) -> u32 {
        self.max_banks
    }

    /// Number of addressable patterns across all banks.
    pub fn pattern_count(&self) -> u32 {
        self.max_patterns * self.max_banks
    }

    /// Splits a flat pattern index into `(bank, local_pattern)`.
    pub fn decompose(&self, pattern_index: u32) -> (u32, u32) {
        (
            pattern_index / self.max_patterns,
            pattern_index % self.max_patterns,
        )
    }

    fn status(&self, command: u8) -> u8 {
        command + (self.channel - 1)
    }

    /// Selects a pattern inside the current bank. Returns the clamped value sent.
    pub fn change_pattern(&self, port: &mut dyn PortIo, pattern: u32) -> Result<u32> {
        let pattern = pattern.min(self.max_patterns - 1);
        port.send(&[self.status(PROGRAM_CHANGE), 0, pattern as u8])?;
        Ok(pattern)
    }

    /// Selects a bank. Returns the clamped value sent.
    pub fn change_bank(&self, port: &mut dyn PortIo, bank: u32) -> Result<u32> {
        let bank = bank.min(self.max_banks - 1);
        port.send(&[self.status(CONTROL_CHANGE), 0, bank as u8])?;
        Ok(bank)
    }

    pub fn play(&self, port: &mut dyn PortIo) -> Result<()> {
        port.send(&[TRANSPORT_START, UNUSED, UNUSED])
    }

    pub fn stop(&self, port: &mut dyn PortIo) -> Result<()> {
        port.send(&[TRANSPORT_STOP, UNUSED, UNUSED])
    }

    pub fn send_clock_tick(&self, port: &mut dyn PortIo) -> Result<()> {
        port.send(&[CLOCK_TICK, UNUSED, UNUSED])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MockPort;

    #[test]
    fn test_command_bytes_on_channel_ten() {
        let device = Drumbrute::default();
        let mut port = MockPort::new();

        device.change_pattern(&mut port, 5).unwrap();
        device.change_bank(&mut port, 2).unwrap();
        device.play(&mut port).unwrap();
        device.stop(&mut port).unwrap();
        device.send_clock_tick(&mut port).unwrap();

        assert_eq!(
            port.sent(),
            vec![
                vec![0xC9, 0, 5],
                vec![0xB9, 0, 2],
                vec![0xFA, 255, 255],
                vec![0xFC, 255, 255],
                vec![0xF8, 255, 255],
            ]
        );
    }

    #[test]
    fn test_channel_one_uses_base_status() {
        let device = Drumbrute::new(1, 16, 4);
        let mut port = MockPort::new();
        device.change_pattern(&mut port, 0).unwrap();
        device.change_bank(&mut port, 0).unwrap();
        assert_eq!(port.sent(), vec![vec![0xC0, 0, 0], vec![0xB0, 0, 0]]);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let device = Drumbrute::default();
        let mut port = MockPort::new();
        assert_eq!(device.change_pattern(&mut port, 40).unwrap(), 15);
        assert_eq!(device.change_bank(&mut port, 9).unwrap(), 3);
    }

    #[test]
    fn test_decompose_round_trips() {
        let device = Drumbrute::default();
        for index in 0..device.pattern_count() {
            let (bank, local) = device.decompose(index);
            assert!(bank < device.max_banks());
            assert!(local < device.max_patterns());
            assert_eq!(bank * device.max_patterns() + local, index);
        }
    }
}
