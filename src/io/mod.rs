//! I/O layer: spawning the renderer process and the logging sinks it reports to.
pub mod logging;
pub use logging::{LogEntry, LogSink, MemorySink, TracingSink};

pub mod process;
pub use process::{ExecutionResult, ProcessRunner};
