//! Page/company rotation for the TV display.
//!
//! [`state::Rotation`] is the pure state machine deciding which company and
//! page is visible; [`driver::RotationDriver`] advances it on tokio timers
//! and publishes snapshots for rendering.

pub mod driver;
pub mod state;

pub use driver::{COUNTDOWN_PERIOD, RotationDriver, RotationHandle, RotationSettings};
pub use state::{Rotation, RotationView};
