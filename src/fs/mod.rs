pub mod archive;
pub mod entry;
pub mod gateway;
pub mod logging;
pub mod ops;
pub mod version;
pub mod volumes;

pub use archive::CompressionLevel;
pub use entry::{DIR_EXTENSION, EntryKind, FileSystemEntry};
pub use gateway::{FileSystemGateway, LocalFileSystem};
pub use logging::LoggingGateway;
