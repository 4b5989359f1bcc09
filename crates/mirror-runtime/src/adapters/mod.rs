//! # Runtime Adapters
//!
//! Filesystem-backed implementations of the outbound ports: per-node
//! object sources under a mount root, the JSON address book registry, and
//! the accepted-file archive.

pub mod archive;
pub mod fs_source;
pub mod registry;

pub use archive::ArchiveSink;
pub use fs_source::FsObjectSource;
pub use registry::AddressBookRegistry;
