//! Bounds-checked byte buffer used as the substrate for all decoding.
//!
//! A [`Buffer`] owns or borrows a contiguous region plus a movable cursor.
//! Every derivation is explicit: [`Buffer::view`] aliases the source memory
//! (and borrows it, so no view can outlive a resize of its source), while
//! [`Buffer::copy`] duplicates it into an independent owned buffer.

use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::{Error, Result};

/// Round `offset` up to the next multiple of `alignment`.
///
/// `alignment` must be non-zero.
#[inline]
pub const fn align_up(offset: usize, alignment: usize) -> usize {
    let rem = offset % alignment;
    if rem == 0 {
        offset
    } else {
        offset + alignment - rem
    }
}

#[derive(Debug)]
enum Storage<'a> {
    Owned(Vec<u8>),
    Shared(&'a [u8]),
    Exclusive(&'a mut [u8]),
}

/// A cursor over an owned or borrowed byte region.
///
/// Invariant: `0 <= tell() <= size()`. Reads and writes that would cross the
/// end fail with [`Error::BufferOverrun`] and leave the cursor untouched,
/// unless the buffer is stretchy and the operation is a write, in which case
/// the region grows to exactly fit the write first.
///
/// # Example
///
/// ```
/// use rwbs_common::Buffer;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut buffer = Buffer::wrap(&data);
///
/// assert_eq!(buffer.read_u32().unwrap(), 0x04030201);
/// assert_eq!(buffer.tell(), 4);
/// assert_eq!(buffer.remaining(), 4);
/// ```
#[derive(Debug)]
pub struct Buffer<'a> {
    storage: Storage<'a>,
    head: usize,
    stretchy: bool,
}

impl Default for Buffer<'_> {
    /// An empty, owned, non-stretchy buffer.
    fn default() -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            head: 0,
            stretchy: false,
        }
    }
}

impl Buffer<'static> {
    /// Allocate an owned, zero-filled buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self::from_vec(vec![0; len])
    }

    /// Take ownership of an existing allocation.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            storage: Storage::Owned(data),
            head: 0,
            stretchy: false,
        }
    }

    /// An empty owned buffer that grows on every out-of-bounds write.
    pub fn stretchy() -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            head: 0,
            stretchy: true,
        }
    }
}

impl<'a> Buffer<'a> {
    /// Wrap an existing region without taking ownership.
    #[inline]
    pub const fn wrap(data: &'a [u8]) -> Self {
        Self {
            storage: Storage::Shared(data),
            head: 0,
            stretchy: false,
        }
    }

    /// Wrap an existing mutable region without taking ownership.
    #[inline]
    pub fn wrap_mut(data: &'a mut [u8]) -> Self {
        Self {
            storage: Storage::Exclusive(data),
            head: 0,
            stretchy: false,
        }
    }

    /// Whether this buffer owns its region.
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// The whole region, independent of the cursor.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(v) => v.as_slice(),
            Storage::Shared(s) => *s,
            Storage::Exclusive(s) => &**s,
        }
    }

    fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
        match &mut self.storage {
            Storage::Owned(v) => Ok(v.as_mut_slice()),
            Storage::Exclusive(s) => Ok(&mut **s),
            Storage::Shared(_) => Err(Error::ReadOnly),
        }
    }

    /// Consume the buffer, returning its bytes (copied if borrowed).
    pub fn into_vec(self) -> Vec<u8> {
        match self.storage {
            Storage::Owned(v) => v,
            Storage::Shared(s) => s.to_vec(),
            Storage::Exclusive(s) => s.to_vec(),
        }
    }

    /// Move the contents out, leaving this buffer empty, owned and zero-length.
    pub fn take(&mut self) -> Buffer<'a> {
        std::mem::take(self)
    }

    /// A read-only view of the whole region. The cursor starts at 0.
    #[inline]
    pub fn view(&self) -> Buffer<'_> {
        Buffer::wrap(self.as_slice())
    }

    /// A read-only view of `len` bytes starting at `start`.
    pub fn view_range(&self, start: usize, len: usize) -> Result<Buffer<'_>> {
        let range = self.range(start, len)?;
        Ok(Buffer::wrap(&self.as_slice()[range]))
    }

    /// A writable view of `len` bytes starting at `start`.
    ///
    /// Writes through the view land in this buffer's memory. The view is
    /// never stretchy.
    pub fn view_mut(&mut self, start: usize, len: usize) -> Result<Buffer<'_>> {
        let range = self.range(start, len)?;
        let slice = self.as_mut_slice()?;
        Ok(Buffer::wrap_mut(&mut slice[range]))
    }

    /// An owned duplicate of the whole region.
    pub fn copy(&self) -> Buffer<'static> {
        Buffer::from_vec(self.as_slice().to_vec())
    }

    /// An owned duplicate of `len` bytes starting at `start`.
    pub fn copy_range(&self, start: usize, len: usize) -> Result<Buffer<'static>> {
        let range = self.range(start, len)?;
        Ok(Buffer::from_vec(self.as_slice()[range].to_vec()))
    }

    fn range(&self, start: usize, len: usize) -> Result<std::ops::Range<usize>> {
        match start.checked_add(len) {
            Some(end) if end <= self.size() => Ok(start..end),
            _ => Err(Error::BufferOverrun {
                offset: start,
                needed: len,
                available: self.size().saturating_sub(start),
            }),
        }
    }

    #[inline]
    fn overrun(&self, needed: usize) -> Error {
        Error::BufferOverrun {
            offset: self.head,
            needed,
            available: self.remaining(),
        }
    }

    #[inline]
    fn check(&self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(self.overrun(count));
        }
        Ok(())
    }

    /// Set the cursor to an absolute position (at most `size()`).
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.size() {
            return Err(self.overrun(position.saturating_sub(self.head)));
        }
        self.head = position;
        Ok(())
    }

    /// Advance the cursor by `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.check(count)?;
        self.head += count;
        Ok(())
    }

    /// Current cursor position.
    #[inline]
    pub fn tell(&self) -> usize {
        self.head
    }

    /// Total length of the region.
    #[inline]
    pub fn size(&self) -> usize {
        self.as_slice().len()
    }

    /// Bytes between the cursor and the end.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.size() - self.head
    }

    /// Whether the cursor is at the end.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes between the cursor and the end, without advancing.
    #[inline]
    pub fn remaining_bytes(&self) -> &[u8] {
        &self.as_slice()[self.head..]
    }

    /// Move the cursor to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        self.seek(align_up(self.head, alignment))
    }

    /// Align the cursor to a 2 byte boundary.
    pub fn align2(&mut self) -> Result<()> {
        self.align(2)
    }

    /// Align the cursor to a 4 byte boundary.
    pub fn align4(&mut self) -> Result<()> {
        self.align(4)
    }

    /// Align the cursor to an 8 byte boundary.
    pub fn align8(&mut self) -> Result<()> {
        self.align(8)
    }

    /// Align the cursor to a 16 byte boundary.
    pub fn align16(&mut self) -> Result<()> {
        self.align(16)
    }

    /// Fill `dst` from the cursor.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<()> {
        let bytes = self.read_bytes(dst.len())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Peek at bytes without advancing the cursor.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&[u8]> {
        self.check(count)?;
        Ok(&self.as_slice()[self.head..self.head + count])
    }

    /// Read bytes and advance the cursor.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&[u8]> {
        self.check(count)?;
        let start = self.head;
        self.head += count;
        Ok(&self.as_slice()[start..start + count])
    }

    /// Read a little-endian u32 at an absolute offset without moving the cursor.
    pub fn peek_u32_at(&self, offset: usize) -> Result<u32> {
        let range = self.range(offset, 4)?;
        let bytes = &self.as_slice()[range];
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a 32-bit word as a boolean (non-zero = true).
    #[inline]
    pub fn read_bool32(&mut self) -> Result<bool> {
        self.read_u32().map(|v| v != 0)
    }

    /// Read a string from a fixed-size field, stopping at the first NUL.
    pub fn read_fixed_string(&mut self, size: usize) -> Result<String> {
        let bytes = self.read_bytes(size)?;
        let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read a struct using zerocopy.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::BufferOverrun {
            offset: 0,
            needed: size,
            available: bytes.len(),
        })
    }

    /// Read `count` consecutive structs.
    ///
    /// The whole array is bounds-checked before anything is allocated, so a
    /// corrupt count fails fast instead of reserving memory.
    pub fn read_array<T: FromBytes>(&mut self, count: usize) -> Result<Vec<T>> {
        let elem_size = std::mem::size_of::<T>();
        let total = count
            .checked_mul(elem_size)
            .ok_or_else(|| self.overrun(usize::MAX))?;
        let bytes = self.read_bytes(total)?;

        let mut result = Vec::with_capacity(count);
        for chunk in bytes.chunks_exact(elem_size.max(1)).take(count) {
            let item = T::read_from_bytes(chunk).map_err(|_| Error::BufferOverrun {
                offset: 0,
                needed: elem_size,
                available: chunk.len(),
            })?;
            result.push(item);
        }
        Ok(result)
    }

    /// Write `src` at the cursor and advance past it.
    pub fn write(&mut self, src: &[u8]) -> Result<()> {
        let end = self
            .head
            .checked_add(src.len())
            .ok_or_else(|| self.overrun(src.len()))?;
        if end > self.size() {
            if !self.stretchy {
                return Err(self.overrun(src.len()));
            }
            self.resize(end)?;
        }
        let head = self.head;
        self.as_mut_slice()?[head..end].copy_from_slice(src);
        self.head = end;
        Ok(())
    }

    /// Write a little-endian u16.
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Write a little-endian u32.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Write a little-endian i32.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Write a little-endian f32.
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Write a struct using zerocopy.
    pub fn write_struct<T: IntoBytes + Immutable>(&mut self, value: &T) -> Result<()> {
        self.write(value.as_bytes())
    }

    /// Set every byte of the region to `value`. The cursor does not move.
    pub fn fill(&mut self, value: u8) -> Result<()> {
        self.as_mut_slice()?.fill(value);
        Ok(())
    }

    /// Resize the region. Only stretchy buffers may be resized.
    ///
    /// Existing bytes and the cursor offset are preserved; a cursor past the
    /// new end is pulled back to it.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        if !self.stretchy {
            return Err(Error::NotStretchy);
        }
        match &mut self.storage {
            Storage::Owned(v) => v.resize(len, 0),
            _ => return Err(Error::NotOwned),
        }
        self.head = self.head.min(len);
        Ok(())
    }

    /// Enable or disable auto-growth. Only owned buffers may grow.
    pub fn set_stretchy(&mut self, enable: bool) -> Result<()> {
        if enable && !self.is_owned() {
            return Err(Error::NotOwned);
        }
        self.stretchy = enable;
        Ok(())
    }

    /// Whether auto-growth is enabled.
    #[inline]
    pub fn is_stretchy(&self) -> bool {
        self.stretchy
    }
}
