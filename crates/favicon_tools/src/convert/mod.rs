//! Artifact builders: icon set, ICO container, web manifest

mod ico;
mod icon_set;
mod manifest;

pub use ico::*;
pub use icon_set::*;
pub use manifest::*;
