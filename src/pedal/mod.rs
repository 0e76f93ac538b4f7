//! Pedal gesture handling
//!
//! Raw events from the foot pedal go through three steps:
//! - [`PedalButton`] resolves the hardware `(status, data)` codes
//! - [`GestureClassifier`] tracks the PLAY / TEMPO_EDIT mode machine
//! - [`BehaviorDispatcher`] runs the behavior bound for that mode
//!
//! [`PedalListener`] is the worker loop tying them together.
mod button;
mod classifier;
mod dispatcher;
mod listener;

pub use button::PedalButton;
pub use classifier::{Gesture, GestureClassifier, Mode, DEFAULT_CHANGE_MODE_THRESHOLD};
pub use dispatcher::{Behavior, BehaviorDispatcher, BehaviorError, StartHook};
pub use listener::{PedalListener, POLL_INTERVAL};
