//! Library side of the `participant-completion` binary.

pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
