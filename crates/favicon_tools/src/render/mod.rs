//! Frame rendering: pad, letterbox, compose, round, encode

mod mask;
mod png;
mod resample;

pub use mask::*;
pub use png::*;
pub use resample::*;
