//! Common utilities and types shared across Procenv components.

pub mod error;
pub mod logging;
pub mod message;

pub use error::{Error, Result};
pub use message::{MemorySink, Message, MessageSink, Reporter, StderrSink};
