//! Archive writer stream.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::core::Transform;
use crate::guid::ShortGuid;
use crate::pak::format::{pos_to_word, WORD};
use crate::util::{Result, Vec3};

/// Position-tracking output stream.
pub struct OStream<W: Write + Seek> {
    writer: W,
    pos: u64,
}

impl OStream<BufWriter<File>> {
    /// Create a new output stream for the given file path.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self::new(BufWriter::with_capacity(1024 * 1024, file)))
    }
}

impl OStream<Cursor<Vec<u8>>> {
    /// Create an in-memory stream.
    pub fn memory() -> Self {
        Self::new(Cursor::new(Vec::new()))
    }

    /// Take the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

impl<W: Write + Seek> OStream<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, pos: 0 }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Current position as a stored word offset.
    #[inline]
    pub fn word(&self) -> Result<u32> {
        pos_to_word(self.pos)
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write an i32 value (little-endian).
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.writer.write_i32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write an f32 value (little-endian).
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.writer.write_f32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    #[inline]
    pub fn write_guid(&mut self, id: ShortGuid) -> Result<()> {
        self.write_u32(id.value())
    }

    pub fn write_vec3(&mut self, v: Vec3) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)
    }

    pub fn write_transform(&mut self, t: &Transform) -> Result<()> {
        self.write_vec3(t.position)?;
        self.write_vec3(t.rotation)
    }

    /// Write an `(offset, count)` pair.
    pub fn write_pair(&mut self, (word, count): (u32, u32)) -> Result<()> {
        self.write_u32(word)?;
        self.write_u32(count)
    }

    /// Pad with zeros to the next word boundary.
    pub fn align(&mut self) -> Result<()> {
        let rem = (self.pos % WORD) as usize;
        if rem != 0 {
            self.write_bytes(&[0u8; WORD as usize][rem..])?;
        }
        Ok(())
    }

    /// Seek to a position and return the current position.
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        self.writer.flush()?;
        let new_pos = self.writer.seek(SeekFrom::Start(pos))?;
        self.pos = new_pos;
        Ok(new_pos)
    }

    /// Seek to end and return the position.
    pub fn seek_end(&mut self) -> Result<u64> {
        self.writer.flush()?;
        let new_pos = self.writer.seek(SeekFrom::End(0))?;
        self.pos = new_pos;
        Ok(new_pos)
    }

    /// Flush the buffer to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
