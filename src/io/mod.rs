mod local;
mod memory;

pub use local::LocalFileReader;

use std::io;

/// Trait for random access reading from a data source.
///
/// All archive operations are synchronous, blocking reads against one
/// seekable source; there is no internal parallelism.
pub trait ReadAt {
    /// Fill `buf` exactly with the bytes starting at `offset`.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the source ends
    /// before the buffer is full.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    /// Get the total size of the data source.
    fn size(&self) -> u64;
}
