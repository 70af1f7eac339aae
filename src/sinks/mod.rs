//! Sink implementations

pub mod file;
pub mod memory;
pub mod remote;
pub mod transport;

pub use file::FileSink;
pub use memory::MemorySink;
pub use remote::{RemoteStreamSink, DEFAULT_QUEUE_CAPACITY};
pub use transport::{RemoteTransport, StreamTarget, TcpTransport, TcpTransportProvider, TransportProvider};

// Re-export the trait next to its implementations
pub use crate::core::Sink;
