//! RIFF sub-chunk walking

/// Size of the `RIFF <size> WAVE` preamble
pub const RIFF_PREAMBLE_SIZE: usize = 12;
/// Size of a sub-chunk header (identifier + little-endian u32 size)
pub const CHUNK_HEADER_SIZE: usize = 8;

/// A sub-chunk header found while walking the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// Four ASCII identifier bytes, e.g. `b"fmt "`
    pub id: [u8; 4],
    /// Declared payload size in bytes (excluding the pad byte)
    pub size: u32,
    /// Offset of the identifier within the buffer
    pub offset: usize,
}

impl ChunkDescriptor {
    /// Offset of the first payload byte
    pub fn payload_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_SIZE
    }

    /// Offset of the next chunk header, accounting for the pad byte after
    /// odd-sized payloads
    fn next_offset(&self) -> usize {
        let size = self.size as usize;
        self.offset
            .saturating_add(CHUNK_HEADER_SIZE)
            .saturating_add(size)
            .saturating_add(size % 2)
    }
}

/// Iterator over the sub-chunks that follow the RIFF preamble.
///
/// Unknown chunk types are yielded like any other; callers skip them whole.
/// Iteration ends once fewer than eight bytes remain.
pub struct RiffChunks<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for RiffChunks<'a> {
    type Item = ChunkDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self
            .buffer
            .get(self.offset..self.offset.checked_add(CHUNK_HEADER_SIZE)?)?;

        let chunk = ChunkDescriptor {
            id: [header[0], header[1], header[2], header[3]],
            size: u32::from_le_bytes([header[4], header[5], header[6], header[7]]),
            offset: self.offset,
        };
        self.offset = chunk.next_offset();
        Some(chunk)
    }
}

/// Walk every sub-chunk of a RIFF buffer
pub fn chunks(buffer: &[u8]) -> RiffChunks<'_> {
    RiffChunks {
        buffer,
        offset: RIFF_PREAMBLE_SIZE,
    }
}

/// Find the chunk with identifier `id`, returning the offset of its header
/// (pointing at the identifier, not the payload).
pub fn find_chunk(buffer: &[u8], id: &[u8; 4]) -> Option<usize> {
    find_chunk_descriptor(buffer, id).map(|chunk| chunk.offset)
}

pub fn find_chunk_descriptor(buffer: &[u8], id: &[u8; 4]) -> Option<ChunkDescriptor> {
    chunks(buffer).find(|chunk| &chunk.id == id)
}
