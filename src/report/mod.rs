//! Response envelope and rendering.

pub mod envelope;
pub mod generator;

pub use envelope::*;
pub use generator::*;
