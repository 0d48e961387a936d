// src/stream/mod.rs
pub mod session;
pub mod source;
pub mod utf8;

pub use session::{run_session, GenerationSession};
