//! Indicator computations over normalized record sequences.

mod keltner;

pub use keltner::{keltner_channels, KeltnerConfig};
