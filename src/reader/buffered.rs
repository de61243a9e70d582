use super::ByteSource;
use crate::index::LogRange;
use memchr::memchr;
use std::fs::File;
use std::io::{self, ErrorKind, SeekFrom};
use std::path::Path;

/// Default window size for a freshly opened reader
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Buffered, seekable reader over an append-only byte stream
///
/// Keeps a window of up to `capacity` bytes read from an absolute stream
/// offset. Lines and strings that straddle the end of the window are
/// assembled across refills, so the capacity only changes how often the
/// underlying handle is touched, never the bytes that come back.
///
/// End of stream is not sticky: once the writer appends more bytes, the
/// next read picks them up from where the previous one stopped.
pub struct BufferedReader<S> {
    /// Underlying handle (None once closed)
    source: Option<S>,

    /// Window storage, `capacity` bytes long
    buffer: Box<[u8]>,

    /// Absolute stream offset of `buffer[0]`
    window_start: u64,

    /// Number of valid bytes in the window
    filled: usize,

    /// Index of the next unread byte within the window
    consumed: usize,

    /// Where the underlying handle currently points, if known.
    /// Lets sequential refills skip the seek syscall.
    source_pos: Option<u64>,
}

impl BufferedReader<File> {
    /// Open a file for reading with the given window size
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, capacity))
    }
}

impl<S: ByteSource> BufferedReader<S> {
    /// Wrap a stream; reading starts at offset 0
    pub fn new(source: S, capacity: usize) -> Self {
        Self {
            source: Some(source),
            buffer: vec![0u8; capacity.max(1)].into_boxed_slice(), // Minimum capacity of 1
            window_start: 0,
            filled: 0,
            consumed: 0,
            source_pos: None,
        }
    }

    /// Size of the internal window in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Absolute offset of the next unread byte
    pub fn position(&self) -> u64 {
        self.window_start + self.consumed as u64
    }

    /// Move the cursor to an absolute offset.
    ///
    /// Drops the buffered window; the next read refills lazily from `offset`.
    pub fn seek(&mut self, offset: u64) {
        self.window_start = offset;
        self.filled = 0;
        self.consumed = 0;
    }

    /// Current length of the underlying resource (0 once closed)
    pub fn size(&self) -> io::Result<u64> {
        match &self.source {
            Some(source) => source.size(),
            None => Ok(0),
        }
    }

    /// True when every byte written so far has been consumed
    pub fn is_at_end(&self) -> io::Result<bool> {
        Ok(self.position() >= self.size()?)
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Release the underlying handle. Calling it again is a no-op.
    pub fn close(&mut self) {
        self.source = None;
        self.source_pos = None;
        self.filled = 0;
        self.consumed = 0;
    }

    /// Ensure at least one unread byte is buffered.
    ///
    /// Returns `false` at end of stream or when the reader is closed.
    fn fill(&mut self) -> io::Result<bool> {
        if self.consumed < self.filled {
            return Ok(true);
        }

        let Some(source) = self.source.as_mut() else {
            return Ok(false);
        };

        // The next window starts right after the one just used up
        let next = self.window_start + self.filled as u64;
        if self.source_pos != Some(next) {
            self.source_pos = None;
            source.seek(SeekFrom::Start(next))?;
        }

        let read = loop {
            match source.read(&mut self.buffer) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.source_pos = None;
                    return Err(e);
                }
            }
        };

        self.window_start = next;
        self.filled = read;
        self.consumed = 0;
        self.source_pos = Some(next + read as u64);

        Ok(read > 0)
    }

    /// Read the next line as raw bytes, without the trailing `\n`.
    ///
    /// Bytes after the last delimiter are returned as a final line.
    /// Returns `None` when nothing is left to read.
    pub fn read_line_bytes(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let mut consumed_any = false;

        while self.fill()? {
            consumed_any = true;
            let window = &self.buffer[self.consumed..self.filled];

            if let Some(at) = memchr(b'\n', window) {
                line.extend_from_slice(&window[..at]);
                self.consumed += at + 1;
                return Ok(Some(line));
            }

            // No delimiter in this window, keep accumulating
            line.extend_from_slice(window);
            self.consumed = self.filled;
        }

        Ok(consumed_any.then_some(line))
    }

    /// Read the next line decoded as UTF-8 (invalid sequences replaced)
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.read_line_bytes()?.map(decode))
    }

    /// Consume the next line without materializing it.
    ///
    /// Returns the offset right after the consumed delimiter, or the stream
    /// length when the last line has no delimiter. `None` if nothing is left.
    pub fn skip_line(&mut self) -> io::Result<Option<u64>> {
        let mut consumed_any = false;

        while self.fill()? {
            consumed_any = true;
            let window = &self.buffer[self.consumed..self.filled];

            if let Some(at) = memchr(b'\n', window) {
                self.consumed += at + 1;
                return Ok(Some(self.position()));
            }

            self.consumed = self.filled;
        }

        Ok(consumed_any.then(|| self.position()))
    }

    /// Read exactly `length` bytes from the cursor.
    ///
    /// Returns `None` if fewer than `length` bytes are available; the cursor
    /// is left where it was in that case.
    pub fn read_bytes(&mut self, length: usize) -> io::Result<Option<Vec<u8>>> {
        if !self.is_open() {
            return Ok(None);
        }

        let start = self.position();
        let mut bytes = Vec::with_capacity(length.min(self.capacity()));

        while bytes.len() < length {
            if !self.fill()? {
                self.seek(start);
                return Ok(None);
            }

            let take = (length - bytes.len()).min(self.filled - self.consumed);
            bytes.extend_from_slice(&self.buffer[self.consumed..self.consumed + take]);
            self.consumed += take;
        }

        Ok(Some(bytes))
    }

    /// Read exactly `length` bytes and decode them as UTF-8
    pub fn read_string(&mut self, length: usize) -> io::Result<Option<String>> {
        Ok(self.read_bytes(length)?.map(decode))
    }

    /// Materialize the text of an indexed entry
    pub fn read_range(&mut self, range: LogRange) -> io::Result<Option<String>> {
        self.seek(range.start());
        self.read_string(range.len() as usize)
    }
}

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
