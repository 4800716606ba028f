//! Bounds-checked byte buffer with zeroization.

use crate::error::{Result, RevscopeError};
use std::sync::atomic::{compiler_fence, Ordering};

/// A growable byte container whose reads and writes are bounds-checked and
/// whose contents are zero-filled on `clear()` and on drop.
///
/// Used to stage sensitive intermediate content (captured tool output) so no
/// residue stays live once analysis completes.
#[derive(Default)]
pub struct SafeBuffer {
    buf: Vec<u8>,
}

impl SafeBuffer {
    /// A zero-filled buffer of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self { buf: vec![0; size] }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self { buf: data.to_vec() }
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Copy of `length` bytes at `offset`; out-of-range requests fail.
    pub fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        let end = self.check_bounds(offset, length)?;
        Ok(self.buf[offset..end].to_vec())
    }

    /// Overwrite bytes in place starting at `offset`. Never grows the buffer.
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = self.check_bounds(offset, data.len())?;
        self.buf[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Appends `data`. A reallocation would leave the old allocation behind
    /// un-zeroed, so growth goes through a fresh buffer that replaces the
    /// current one after the current one has been wiped.
    pub fn append(&mut self, data: &[u8]) {
        let needed = self.buf.len() + data.len();
        if needed > self.buf.capacity() {
            let mut grown = Vec::with_capacity(needed.max(self.buf.capacity() * 2));
            grown.extend_from_slice(&self.buf);
            self.clear();
            self.buf = grown;
        }
        self.buf.extend_from_slice(data);
    }

    /// Zero-fills every byte in place; the length is unchanged.
    pub fn clear(&mut self) {
        for b in self.buf.iter_mut() {
            // volatile so the wipe is not elided as a dead store
            unsafe { std::ptr::write_volatile(b, 0) };
        }
        compiler_fence(Ordering::SeqCst);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Borrowed view, valid until the next mutation.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn check_bounds(&self, offset: usize, length: usize) -> Result<usize> {
        match offset.checked_add(length) {
            Some(end) if end <= self.buf.len() => Ok(end),
            _ => Err(RevscopeError::OutOfBounds {
                offset,
                length,
                size: self.buf.len(),
            }),
        }
    }
}

impl Drop for SafeBuffer {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for SafeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // contents deliberately withheld
        f.debug_struct("SafeBuffer").field("len", &self.buf.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_roundtrip() {
        let mut buf = SafeBuffer::new(16);
        buf.write(4, b"secret").unwrap();
        assert_eq!(buf.read(4, 6).unwrap(), b"secret");
        assert_eq!(buf.read(0, 4).unwrap(), vec![0; 4]);
    }

    #[test]
    fn clear_zeroes_but_keeps_length() {
        let mut buf = SafeBuffer::from_bytes(b"password123");
        buf.clear();
        let bytes = buf.to_bytes();
        assert_eq!(bytes.len(), 11);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn read_past_end_is_out_of_bounds() {
        let buf = SafeBuffer::new(8);
        assert!(matches!(
            buf.read(4, 5),
            Err(RevscopeError::OutOfBounds { offset: 4, length: 5, size: 8 })
        ));
        assert!(buf.read(8, 0).is_ok());
        assert!(buf.read(9, 0).is_err());
    }

    #[test]
    fn write_past_end_is_out_of_bounds() {
        let mut buf = SafeBuffer::new(4);
        assert!(buf.write(2, b"abc").is_err());
        // failed write leaves contents untouched
        assert_eq!(buf.to_bytes(), vec![0; 4]);
    }

    #[test]
    fn overflowing_offset_is_out_of_bounds() {
        let buf = SafeBuffer::new(4);
        assert!(matches!(
            buf.read(usize::MAX, 2),
            Err(RevscopeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn append_grows_buffer() {
        let mut buf = SafeBuffer::new(0);
        for chunk in [&b"abc"[..], b"def", b"ghijklmnop"] {
            buf.append(chunk);
        }
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.read(0, 16).unwrap(), b"abcdefghijklmnop");
    }

    #[test]
    fn debug_does_not_leak_contents() {
        let buf = SafeBuffer::from_bytes(b"hunter2");
        let shown = format!("{buf:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("len: 7"));
    }
}
