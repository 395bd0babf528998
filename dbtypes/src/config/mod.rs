//! Configuration for a generation run

pub mod defaults;
mod settings;

pub use settings::GenerationConfig;
