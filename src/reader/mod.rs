pub mod buffered;

pub use buffered::BufferedReader;

use std::fs::File;
use std::io::{self, Cursor, Read, Seek};

/// A seekable byte stream whose length can grow while it is being read.
///
/// Implemented for `File` (the append-only log on disk) and for in-memory
/// cursors used by tests and by callers that already hold the bytes.
pub trait ByteSource: Read + Seek + Send {
    /// Current length of the underlying resource in bytes
    fn size(&self) -> io::Result<u64>;
}

impl ByteSource for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl<T> ByteSource for Cursor<T>
where
    T: AsRef<[u8]> + Send,
{
    fn size(&self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }
}
