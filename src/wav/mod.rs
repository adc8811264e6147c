//! RIFF/WAVE container handling
//!
//! Reader and writer for uncompressed PCM WAV at 8, 16, 24 and 32 bits,
//! any channel count. The reader tolerates chunks in any order and skips
//! chunk types it does not know.

pub mod chunk;
pub mod codec;
pub mod reader;
pub mod writer;

pub use chunk::{chunks, find_chunk, ChunkDescriptor};
pub use codec::{decode_sample, encode_sample, BitDepth};
pub use reader::{decode, WavFormat};
pub use writer::{encode, EncodeOptions, WAV_HEADER_SIZE};
