// src/services/mod.rs

pub mod analytics;
pub mod pipeline;
pub mod recorder;
pub mod resolver;
pub mod scorer;
