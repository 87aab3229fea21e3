//! beatviz library - frequency band and beat analysis for audio-reactive visuals

pub mod analyzer;
pub mod audio;
pub mod cli;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod reactive;
