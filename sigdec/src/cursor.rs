use crate::CursorError;

/// A read position over an immutable byte buffer, addressed in bits.
///
/// Bits are consumed most-significant first within each byte. Every read either advances the
/// position by exactly the width requested or fails and leaves the position where it was.
///
/// A cursor may carry a *limit* below the end of the buffer. Reads may not cross the limit; this
/// is how records with a declared length are kept from reading into their neighbours.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    buffer: &'a [u8],
    position: usize,
    limit: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        BitCursor {
            buffer,
            position: 0,
            limit: buffer.len() * 8,
        }
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn bit_position(&self) -> usize {
        self.position
    }

    pub fn byte_offset(&self) -> usize {
        self.position / 8
    }

    /// Bits left before the current limit.
    pub fn remaining_bits(&self) -> usize {
        self.limit - self.position
    }

    pub fn buffer_bits(&self) -> usize {
        self.buffer.len() * 8
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.position % 8 == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Replaces the limit, returning the previous one. The new limit is clamped between the
    /// current position and the end of the buffer.
    pub fn set_limit(&mut self, limit: usize) -> usize {
        let old = self.limit;
        self.limit = limit.clamp(self.position, self.buffer_bits());
        old
    }

    fn check(&self, n: usize) -> Result<(), CursorError> {
        if n > self.remaining_bits() {
            return Err(CursorError::OutOfBounds {
                position: self.position,
                requested: n,
                available: self.remaining_bits(),
            });
        }
        Ok(())
    }

    fn extract(&self, n: usize) -> u64 {
        let mut value = 0u64;
        let mut pos = self.position;
        let mut left = n;
        while left > 0 {
            let byte = self.buffer[pos / 8];
            let in_byte = pos % 8;
            let take = (8 - in_byte).min(left);
            let shift = 8 - in_byte - take;
            let chunk = (byte >> shift) & (((1u16 << take) - 1) as u8);
            value = (value << take) | chunk as u64;
            pos += take;
            left -= take;
        }
        value
    }

    /// Reads `n` bits (at most 64) as an unsigned integer.
    pub fn read_bits(&mut self, n: usize) -> Result<u64, CursorError> {
        let value = self.peek_bits(n)?;
        self.position += n;
        Ok(value)
    }

    /// Like [`read_bits`](Self::read_bits), but the position stays where it is.
    pub fn peek_bits(&self, n: usize) -> Result<u64, CursorError> {
        assert!(n <= 64, "a single read is at most 64 bits wide, got {n}");
        self.check(n)?;
        Ok(self.extract(n))
    }

    pub fn read_bool(&mut self) -> Result<bool, CursorError> {
        self.read_bits(1).map(|bit| bit == 1)
    }

    /// Reads an arbitrary number of bits into bytes. The final byte is left-aligned when `n` is not
    /// a multiple of 8.
    pub fn read_bit_run(&mut self, n: usize) -> Result<Vec<u8>, CursorError> {
        self.check(n)?;
        let mut ret = Vec::with_capacity(n.div_ceil(8));
        let mut left = n;
        while left > 0 {
            let take = left.min(8);
            let chunk = self.extract(take) as u8;
            ret.push(chunk << (8 - take));
            self.position += take;
            left -= take;
        }
        Ok(ret)
    }

    /// Reads `n` whole bytes. The cursor must sit on a byte boundary.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
        let bytes = self.peek_bytes(n)?;
        self.position += n * 8;
        Ok(bytes)
    }

    pub fn peek_bytes(&self, n: usize) -> Result<&'a [u8], CursorError> {
        if !self.is_byte_aligned() {
            return Err(CursorError::Unaligned {
                position: self.position,
            });
        }
        self.check(n.saturating_mul(8))?;
        let start = self.byte_offset();
        Ok(&self.buffer[start..start + n])
    }

    pub fn skip_bits(&mut self, n: usize) -> Result<(), CursorError> {
        self.check(n)?;
        self.position += n;
        Ok(())
    }

    /// Moves up to the next byte boundary and returns how many bits were skipped. Skipping is
    /// bounded by the limit.
    pub fn skip_to_byte_boundary(&mut self) -> usize {
        let skipped = ((8 - self.position % 8) % 8).min(self.remaining_bits());
        self.position += skipped;
        skipped
    }

    /// A second cursor over the same buffer starting at `bit`, with no limit. This cursor does not
    /// move.
    pub fn fork_at(&self, bit: usize) -> BitCursor<'a> {
        BitCursor {
            buffer: self.buffer,
            position: bit.min(self.buffer_bits()),
            limit: self.buffer_bits(),
        }
    }

    /// Moves forward to `bit`, clamped to the limit. The cursor never moves backwards.
    pub fn advance_to(&mut self, bit: usize) {
        self.position = bit.clamp(self.position, self.limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reads_msb_first_across_bytes() {
        let data = [0b1011_0101, 0b1100_1010];
        let mut cursor = BitCursor::new(&data);

        assert_eq!(cursor.read_bits(1), Ok(1));
        assert_eq!(cursor.read_bits(3), Ok(0b011));
        assert_eq!(cursor.read_bits(6), Ok(0b0101_11));
        assert_eq!(cursor.read_bits(6), Ok(0b00_1010));
        assert_eq!(cursor.remaining_bits(), 0);
    }

    #[test]
    fn reads_full_width() {
        let data = [0xFF; 9];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(3).unwrap();
        assert_eq!(cursor.read_bits(64), Ok(u64::MAX));
        assert_eq!(cursor.read_bits(0), Ok(0));
    }

    #[test]
    fn failed_read_keeps_position() {
        let data = [0x12];
        let mut cursor = BitCursor::new(&data);
        cursor.read_bits(5).unwrap();
        assert_eq!(
            cursor.read_bits(4),
            Err(CursorError::OutOfBounds {
                position: 5,
                requested: 4,
                available: 3
            })
        );
        assert_eq!(cursor.bit_position(), 5);
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [0xA5];
        let cursor = BitCursor::new(&data);
        assert_eq!(cursor.peek_bits(4), Ok(0xA));
        assert_eq!(cursor.bit_position(), 0);
    }

    #[test]
    fn byte_reads_need_alignment() {
        let data = [1, 2, 3];
        let mut cursor = BitCursor::new(&data);
        cursor.read_bits(4).unwrap();
        assert_eq!(
            cursor.read_bytes(1),
            Err(CursorError::Unaligned { position: 4 })
        );
        assert_eq!(cursor.skip_to_byte_boundary(), 4);
        assert_eq!(cursor.read_bytes(2), Ok(&data[1..]));
        assert_eq!(cursor.skip_to_byte_boundary(), 0);
    }

    #[test]
    fn limit_bounds_reads() {
        let data = [0xFF, 0x00, 0xFF];
        let mut cursor = BitCursor::new(&data);
        let old = cursor.set_limit(12);
        assert_eq!(old, 24);
        assert!(cursor.read_bits(16).is_err());
        assert_eq!(cursor.read_bits(12), Ok(0xFF0));
        cursor.set_limit(old);
        assert_eq!(cursor.read_bits(12), Ok(0x0FF));
    }

    #[test]
    fn bit_runs_are_left_aligned() {
        let data = [0b1010_1111, 0b0110_0000];
        let mut cursor = BitCursor::new(&data);
        cursor.read_bits(2).unwrap();
        assert_eq!(cursor.read_bit_run(11), Ok(vec![0b1011_1101, 0b1000_0000]));
        assert_eq!(cursor.bit_position(), 13);
    }

    #[test]
    fn advance_is_clamped() {
        let data = [0; 2];
        let mut cursor = BitCursor::new(&data);
        cursor.advance_to(5);
        cursor.advance_to(2);
        assert_eq!(cursor.bit_position(), 5);
        cursor.advance_to(100);
        assert_eq!(cursor.bit_position(), 16);
    }

    #[test]
    fn forks_are_independent() {
        let data = [0x12, 0x34];
        let mut cursor = BitCursor::new(&data);
        cursor.set_limit(8);
        let mut fork = cursor.fork_at(8);
        assert_eq!(fork.read_bits(8), Ok(0x34));
        assert_eq!(cursor.bit_position(), 0);
        assert_eq!(cursor.fork_at(99).remaining_bits(), 0);
    }

    #[derive(Debug, Clone)]
    enum Read {
        Bits(usize),
        Bytes(usize),
    }

    fn read_strategy() -> impl Strategy<Value = Read> {
        prop_oneof![
            (0usize..=64).prop_map(Read::Bits),
            (0usize..=8).prop_map(Read::Bytes),
        ]
    }

    proptest! {
        #[test]
        fn position_tracks_successful_reads(
            data in proptest::collection::vec(any::<u8>(), 0..64),
            reads in proptest::collection::vec(read_strategy(), 0..32),
        ) {
            let mut cursor = BitCursor::new(&data);
            let mut expected = 0usize;
            for read in reads {
                let before = cursor.bit_position();
                let outcome = match read {
                    Read::Bits(n) => cursor.read_bits(n).map(|_| n),
                    Read::Bytes(n) => cursor.read_bytes(n).map(|_| n * 8),
                };
                match outcome {
                    Ok(width) => expected += width,
                    Err(_) => prop_assert_eq!(cursor.bit_position(), before),
                }
                prop_assert_eq!(cursor.bit_position(), expected);
                prop_assert!(cursor.bit_position() <= data.len() * 8);
            }
        }

        #[test]
        fn fixed_fields_round_trip(
            fields in proptest::collection::vec((1usize..=64, any::<u64>()), 1..16),
        ) {
            let fields: Vec<(usize, u64)> = fields
                .into_iter()
                .map(|(width, value)| (width, if width == 64 { value } else { value & ((1 << width) - 1) }))
                .collect();

            let mut bits = Vec::new();
            for (width, value) in &fields {
                for i in (0..*width).rev() {
                    bits.push((value >> i) & 1 == 1);
                }
            }
            let mut buffer = vec![0u8; bits.len().div_ceil(8)];
            for (i, bit) in bits.iter().enumerate() {
                if *bit {
                    buffer[i / 8] |= 0x80 >> (i % 8);
                }
            }

            let mut cursor = BitCursor::new(&buffer);
            for (width, value) in &fields {
                prop_assert_eq!(cursor.read_bits(*width), Ok(*value));
            }
        }
    }
}
