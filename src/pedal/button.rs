use std::fmt;
use std::str::FromStr;

/// Logical identity of a pedal gesture, decoupled from the raw codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PedalButton {
    APress,
    ARelease,
    BPress,
    CPress,
    CRelease,
}

/// Fixed hardware table of `(status, data)` codes sent by the M-Vave pedal.
const BUTTON_CODES: [(PedalButton, (u8, u8)); 5] = [
    (PedalButton::APress, (201, 0)),
    (PedalButton::ARelease, (185, 0)),
    (PedalButton::BPress, (193, 1)),
    (PedalButton::CPress, (153, 49)),
    (PedalButton::CRelease, (153, 42)),
];

impl PedalButton {
    pub const ALL: [PedalButton; 5] = [
        PedalButton::APress,
        PedalButton::ARelease,
        PedalButton::BPress,
        PedalButton::CPress,
        PedalButton::CRelease,
    ];

    pub fn from_codes(status: u8, data: u8) -> Option<Self> {
        BUTTON_CODES
            .iter()
            .find(|(_, codes)| *codes == (status, data))
            .map(|(button, _)| *button)
    }

    pub fn codes(self) -> (u8, u8) {
        BUTTON_CODES
            .iter()
            .find(|(button, _)| *button == self)
            .map(|(_, codes)| *codes)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            PedalButton::APress => "A_PRESS",
            PedalButton::ARelease => "A_RELEASE",
            PedalButton::BPress => "B_PRESS",
            PedalButton::CPress => "C_PRESS",
            PedalButton::CRelease => "C_RELEASE",
        }
    }
}

impl fmt::Display for PedalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PedalButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        PedalButton::ALL
            .iter()
            .copied()
            .find(|button| button.name() == wanted)
            .ok_or_else(|| format!("unknown pedal button '{}'", s))
    }
}
