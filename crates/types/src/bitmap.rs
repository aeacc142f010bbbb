//! Bitmap over committee positions.

use serde::{Deserialize, Serialize};

/// A compact bitmap marking which committee positions took part in a vote.
///
/// Carried alongside an aggregated signature in quorum certificates. Bit `i`
/// refers to the committee member at position `i`; callers add the
/// committee's id offset to turn positions into validator ids.
///
/// Always holds exactly `size.div_ceil(8)` bytes with no bit set at or
/// beyond `size`. Deserialization rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawCommitteeBitmap")]
pub struct CommitteeBitmap {
    /// The bitmap bytes, least significant bit first.
    bits: Vec<u8>,
    /// Number of positions this bitmap covers.
    size: usize,
}

/// Errors raised when a decoded bitmap is inconsistent with its size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitmapError {
    #[error("bitmap of {size} positions needs {expected} bytes, got {actual}")]
    LengthMismatch {
        size: usize,
        expected: usize,
        actual: usize,
    },

    #[error("bitmap of {size} positions has bits set past its size")]
    PaddingSet { size: usize },
}

#[derive(Deserialize)]
struct RawCommitteeBitmap {
    bits: Vec<u8>,
    size: usize,
}

impl TryFrom<RawCommitteeBitmap> for CommitteeBitmap {
    type Error = BitmapError;

    fn try_from(raw: RawCommitteeBitmap) -> Result<Self, Self::Error> {
        let RawCommitteeBitmap { bits, size } = raw;
        let expected = size.div_ceil(8);
        if bits.len() != expected {
            return Err(BitmapError::LengthMismatch {
                size,
                expected,
                actual: bits.len(),
            });
        }
        let used = size % 8;
        if used != 0 && bits.last().is_some_and(|&last| last >> used != 0) {
            return Err(BitmapError::PaddingSet { size });
        }
        Ok(Self { bits, size })
    }
}

impl CommitteeBitmap {
    /// Create an empty bitmap covering `size` committee positions.
    pub fn new(size: usize) -> Self {
        Self {
            bits: vec![0u8; size.div_ceil(8)],
            size,
        }
    }

    /// Create a bitmap of `size` positions with the given positions set.
    ///
    /// Positions at or beyond `size` are ignored.
    pub fn from_positions(size: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut bitmap = Self::new(size);
        for position in positions {
            bitmap.set(position);
        }
        bitmap
    }

    /// Mark a position as set.
    pub fn set(&mut self, position: usize) {
        if position >= self.size {
            return;
        }
        if let Some(byte) = self.bits.get_mut(position / 8) {
            *byte |= 1 << (position % 8);
        }
    }

    /// Clear a position.
    pub fn clear(&mut self, position: usize) {
        if position >= self.size {
            return;
        }
        if let Some(byte) = self.bits.get_mut(position / 8) {
            *byte &= !(1 << (position % 8));
        }
    }

    /// Check if a position is set.
    pub fn is_set(&self, position: usize) -> bool {
        if position >= self.size {
            return false;
        }
        self.bits
            .get(position / 8)
            .is_some_and(|byte| (byte >> (position % 8)) & 1 == 1)
    }

    /// Number of set positions.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Number of positions this bitmap covers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Set positions in ascending order.
    ///
    /// Walks the set bits of the stored bytes, so the cost follows the
    /// byte length rather than `size`.
    pub fn elements(&self) -> impl Iterator<Item = usize> + '_ {
        let size = self.size;
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &byte)| byte != 0)
            .flat_map(|(index, &byte)| {
                (0..8)
                    .filter(move |&bit| (byte >> bit) & 1 == 1)
                    .map(move |bit| index * 8 + bit)
            })
            .take_while(move |&position| position < size)
    }

    /// Check if no position is set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }
}
