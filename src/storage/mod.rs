//! Storage layer implementation
//!
//! Shard files are flat, checksummed blobs, so all that's needed here
//! is the checksum wrapper used to detect on-disk corruption.

pub mod checksum;

pub use checksum::{Checksum, ChecksumError, ChecksumType};
