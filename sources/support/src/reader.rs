use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    #[error("read of {wanted} bytes overflows {remaining} remaining")]
    Overflow { wanted: usize, remaining: usize },

    #[error("reverse read of {wanted} bytes underflows {available} available")]
    Underflow { wanted: usize, available: usize },
}

/// Position-tracked cursor over an immutable byte buffer.
///
/// `head` advances through forward and positioned reads; `tail` retreats
/// through the `*_from_end` family. A failed read leaves both untouched.
///
/// Endianness is explicit at every call site: the `read_*` family is
/// big-endian (class-file order), the `read_*_le` family is little-endian
/// (ZIP record order).
pub struct ByteReader {
    buf: Bytes,
    head: usize,
    tail: usize,
}

macro_rules! scalar_reads {
    ($fwd: ident, $le: ident, $at: ident, $le_at: ident, $end: ident, $ty: ty) => {
        pub fn $fwd(&mut self) -> Result<$ty, ReadError> {
            let raw = self.take(std::mem::size_of::<$ty>())?;
            Ok(<$ty>::from_be_bytes(raw.try_into().unwrap()))
        }

        pub fn $le(&mut self) -> Result<$ty, ReadError> {
            let raw = self.take(std::mem::size_of::<$ty>())?;
            Ok(<$ty>::from_le_bytes(raw.try_into().unwrap()))
        }

        pub fn $at(&mut self, pos: usize) -> Result<$ty, ReadError> {
            self.seek(pos)?;
            self.$fwd()
        }

        pub fn $le_at(&mut self, pos: usize) -> Result<$ty, ReadError> {
            self.seek(pos)?;
            self.$le()
        }

        pub fn $end(&mut self) -> Result<$ty, ReadError> {
            let raw = self.retreat(std::mem::size_of::<$ty>())?;
            Ok(<$ty>::from_be_bytes(raw.try_into().unwrap()))
        }
    };
}

impl ByteReader {
    pub fn new(buf: Bytes) -> Self {
        let tail = buf.len();
        Self { buf, head: 0, tail }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn position(&self) -> usize {
        self.head
    }

    /// Bytes between `head` and the end of the buffer.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), ReadError> {
        if pos > self.buf.len() {
            return Err(ReadError::Overflow {
                wanted: pos,
                remaining: self.buf.len(),
            });
        }

        self.head = pos;
        Ok(())
    }

    fn take(&mut self, count: usize) -> Result<&[u8], ReadError> {
        let end = self.head + count;
        if end > self.buf.len() {
            return Err(ReadError::Overflow {
                wanted: count,
                remaining: self.buf.len() - self.head,
            });
        }

        let slice = &self.buf[self.head..end];
        self.head = end;
        Ok(slice)
    }

    fn retreat(&mut self, count: usize) -> Result<&[u8], ReadError> {
        // The tail may not cross the head
        if self.tail < self.head + count {
            return Err(ReadError::Underflow {
                wanted: count,
                available: self.tail.saturating_sub(self.head),
            });
        }

        self.tail -= count;
        Ok(&self.buf[self.tail..self.tail + count])
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Bytes, ReadError> {
        let begin = self.head;
        self.take(count)?;
        Ok(self.buf.slice(begin..begin + count))
    }

    pub fn read_bytes_at(&mut self, pos: usize, count: usize) -> Result<Bytes, ReadError> {
        self.seek(pos)?;
        self.read_bytes(count)
    }

    /// Yield the trailing `count` bytes, retreating the tail past them.
    pub fn read_bytes_from_end(&mut self, count: usize) -> Result<Bytes, ReadError> {
        self.retreat(count)?;
        Ok(self.buf.slice(self.tail..self.tail + count))
    }

    scalar_reads!(read_u16, read_u16_le, read_u16_at, read_u16_le_at, read_u16_from_end, u16);
    scalar_reads!(read_u32, read_u32_le, read_u32_at, read_u32_le_at, read_u32_from_end, u32);
    scalar_reads!(read_u64, read_u64_le, read_u64_at, read_u64_le_at, read_u64_from_end, u64);
}
