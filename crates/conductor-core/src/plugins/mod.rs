//! Built-in processors.

mod gain;
mod passthrough;

pub use gain::GainPlugin;
pub use passthrough::PassthroughPlugin;
