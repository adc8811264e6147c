//! PCM sample codec
//!
//! Converts single samples between little-endian PCM bytes and normalized `f32`.
//! All integer depths are signed two's complement except 8-bit, which is
//! unsigned with a midpoint of 128. 32-bit is integer PCM, never IEEE float,
//! because the container only ever carries format tag 1.

use crate::error::{Error, Result};

/// Largest magnitude fed to the encoder (32767 / 32768). Keeps +1.0 from
/// overflowing the positive range of any depth.
pub const SAFE_LIMIT: f32 = 32_767.0 / 32_768.0;

/// Supported PCM bit depths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits() as usize / 8
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            24 => Ok(BitDepth::TwentyFour),
            32 => Ok(BitDepth::ThirtyTwo),
            other => Err(Error::UnsupportedBitDepth { bit_depth: other }),
        }
    }
}

/// Decode the sample starting at `offset`.
pub fn decode_sample(bytes: &[u8], offset: usize, depth: BitDepth) -> Result<f32> {
    let raw = offset
        .checked_add(depth.bytes_per_sample())
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| {
            Error::malformed(format!(
                "sample at byte {} runs past the end of the payload",
                offset
            ))
        })?;
    Ok(decode_raw(raw, depth))
}

/// Decode one sample from a slice of exactly `depth.bytes_per_sample()` bytes.
pub(crate) fn decode_raw(raw: &[u8], depth: BitDepth) -> f32 {
    match depth {
        BitDepth::Eight => (raw[0] as f32 - 128.0) / 128.0,
        BitDepth::Sixteen => i16::from_le_bytes([raw[0], raw[1]]) as f32 / 32768.0,
        BitDepth::TwentyFour => {
            // shift up then arithmetic-shift back down to sign-extend bit 23
            let packed = i32::from_le_bytes([0, raw[0], raw[1], raw[2]]) >> 8;
            packed as f32 / 8_388_608.0
        }
        BitDepth::ThirtyTwo => {
            let value = i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            (value as f64 / 2_147_483_648.0) as f32
        }
    }
}

/// Encode a sample into a freshly allocated byte vector.
pub fn encode_sample(value: f32, depth: BitDepth) -> Vec<u8> {
    let mut out = vec![0u8; depth.bytes_per_sample()];
    write_sample(&mut out, value, depth);
    out
}

/// Encode a sample into `dst`, which must be exactly one sample wide.
pub(crate) fn write_sample(dst: &mut [u8], value: f32, depth: BitDepth) {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(-SAFE_LIMIT, SAFE_LIMIT) as f64
    };

    match depth {
        BitDepth::Eight => {
            dst[0] = (clamped * 127.5 + 127.5).round() as u8;
        }
        BitDepth::Sixteen => {
            let scaled = (clamped * 32_767.0).round() as i16;
            dst.copy_from_slice(&scaled.to_le_bytes());
        }
        BitDepth::TwentyFour => {
            let scaled = (clamped * 8_388_607.0).round() as i32;
            dst.copy_from_slice(&scaled.to_le_bytes()[..3]);
        }
        BitDepth::ThirtyTwo => {
            let scaled = (clamped * 2_147_483_647.0).round() as i32;
            dst.copy_from_slice(&scaled.to_le_bytes());
        }
    }
}
