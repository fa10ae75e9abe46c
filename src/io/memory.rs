use super::ReadAt;
use std::io;

/// In-memory archives: a byte buffer is a valid random-access source.
///
/// Used by collaborators that already hold the archive bytes (e.g. a
/// nested container extracted from an outer one) and by the test suite.
impl ReadAt for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "offset out of range"))?;
        let end = start.checked_add(buf.len()).filter(|end| *end <= self.len());
        match end {
            Some(end) => {
                buf.copy_from_slice(&self[start..end]);
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read past end of buffer",
            )),
        }
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}
