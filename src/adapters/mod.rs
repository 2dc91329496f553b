// Adapters layer: concrete output targets for rendered resources.

pub mod console_sink;
pub mod file_sink;
pub mod memory_sink;

pub use console_sink::ConsoleSink;
pub use file_sink::FileSink;
pub use memory_sink::MemorySink;
