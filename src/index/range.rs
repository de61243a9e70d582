use std::fmt;
use thiserror::Error;

/// Largest offset a packed range can address (just under 4 GiB)
pub const MAX_OFFSET: u64 = u32::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("range {start}..{end} does not fit in 32-bit offsets")]
    OutOfBounds { start: u64, end: u64 },
    #[error("range start {start} is past its end {end}")]
    Inverted { start: u64, end: u64 },
}

/// Pack a byte range into one word: start in the high half, end in the low half
pub fn encode(start: u32, end: u32) -> u64 {
    ((start as u64) << 32) | end as u64
}

/// Inverse of [`encode`]
pub fn decode(packed: u64) -> (u32, u32) {
    ((packed >> 32) as u32, packed as u32)
}

/// Byte range of one logical log entry, stored packed in a single `u64`.
///
/// Start is inclusive, end exclusive. Both must fit in 32 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogRange(u64);

impl LogRange {
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if start > MAX_OFFSET || end > MAX_OFFSET {
            return Err(RangeError::OutOfBounds { start, end });
        }
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self(encode(start as u32, end as u32)))
    }

    /// Rebuild a range from its packed form.
    ///
    /// Returns `None` if the packed start lies past the packed end.
    pub fn from_packed(packed: u64) -> Option<Self> {
        let (start, end) = decode(packed);
        (start <= end).then_some(Self(packed))
    }

    pub fn packed(self) -> u64 {
        self.0
    }

    pub fn start(self) -> u64 {
        decode(self.0).0 as u64
    }

    pub fn end(self) -> u64 {
        decode(self.0).1 as u64
    }

    pub fn len(self) -> u64 {
        self.end() - self.start()
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for LogRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogRange({}..{})", self.start(), self.end())
    }
}

impl From<LogRange> for u64 {
    fn from(range: LogRange) -> Self {
        range.packed()
    }
}
