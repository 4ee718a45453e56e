//! Durable filesystem tier and its record format.

pub mod codec;
pub mod fs;
mod model;

pub use codec::{CodecError, CodecResult};
pub use fs::{FilesystemTier, FsError, FsResult};
pub use model::{Expiry, FilesystemRecord, Ttl};
