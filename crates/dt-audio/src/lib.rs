//! Audio output backends for the diatone simulator.

mod cpal_backend;
mod frame;
mod traits;

pub use cpal_backend::CpalOutput;
pub use frame::Frame;
pub use traits::{AudioError, AudioOutput};
