//! Coarse-to-fine work schedule for progressive track builds.
//!
//! A monotone counter `r` enumerates units of work. Level `l` holds `2^l`
//! units, each covering one of `2^l` equal segments of the sample range at
//! stride `max(1, max_stride >> l)`.

use std::ops::Range;

/// One decoded unit of refinement work.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Refinement {
    pub level: u32,
    pub segment: u64,
    /// Segments at this level, `2^level`.
    pub segment_count: u64,
}

impl Refinement {
    /// Decodes the `counter`-th unit: level 0 has one segment, level 1 two, ...
    pub fn decode(counter: u64) -> Self {
        let mut level = 0;
        let mut segment_count: u64 = 1;
        let mut remaining = counter;
        while remaining >= segment_count {
            remaining -= segment_count;
            level += 1;
            segment_count = segment_count.saturating_mul(2);
        }
        Self {
            level,
            segment: remaining,
            segment_count,
        }
    }

    pub fn stride(&self, max_stride: u32) -> u32 {
        max_stride.checked_shr(self.level).unwrap_or(0).max(1)
    }

    /// Sample indices this unit covers, clamped to `len`.
    pub fn range(&self, len: usize) -> Range<usize> {
        let len = len as u64;
        let segment_len = len.div_ceil(self.segment_count).max(1);
        let start = self.segment.saturating_mul(segment_len).min(len);
        let end = start.saturating_add(segment_len).min(len);
        start as usize..end as usize
    }
}

/// Coarsest stride for `len` samples: the largest power of two `k` with
/// `k <= len / budget`, or 1 when the build fits in one budget.
pub fn max_stride(len: usize, budget: usize) -> u32 {
    if budget == 0 || len <= budget {
        return 1;
    }
    1 << (len / budget).ilog2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_walks_levels_in_order() {
        let decoded: Vec<(u32, u64)> = (0..15)
            .map(Refinement::decode)
            .map(|unit| (unit.level, unit.segment))
            .collect();

        assert_eq!(
            decoded,
            vec![
                (0, 0),
                (1, 0),
                (1, 1),
                (2, 0),
                (2, 1),
                (2, 2),
                (2, 3),
                (3, 0),
                (3, 1),
                (3, 2),
                (3, 3),
                (3, 4),
                (3, 5),
                (3, 6),
                (3, 7),
            ]
        );
        assert_eq!(Refinement::decode(15).level, 4);
    }

    #[test]
    fn decode_handles_huge_counters() {
        let unit = Refinement::decode(u64::MAX);
        assert!(unit.level >= 63);
        assert!(unit.segment < unit.segment_count);
    }

    #[test]
    fn stride_halves_per_level_and_floors_at_one() {
        assert_eq!(Refinement::decode(0).stride(8), 8);
        assert_eq!(Refinement::decode(1).stride(8), 4);
        assert_eq!(Refinement::decode(3).stride(8), 2);
        assert_eq!(Refinement::decode(7).stride(8), 1);
        assert_eq!(Refinement::decode(15).stride(8), 1);
        assert_eq!(Refinement::decode(u64::MAX).stride(8), 1);
    }

    #[test]
    fn segments_tile_the_range() {
        for counter in 3..7 {
            let unit = Refinement::decode(counter);
            let range = unit.range(100_000);
            assert_eq!(range.len(), 25_000);
            assert_eq!(range.start, unit.segment as usize * 25_000);
        }
    }

    #[test]
    fn uneven_segments_clamp_to_len() {
        let last = Refinement::decode(6);
        assert_eq!(last.range(10), 9..10);

        let past_end = Refinement {
            level: 4,
            segment: 15,
            segment_count: 16,
        };
        assert_eq!(past_end.range(10), 10..10);
    }

    #[test]
    fn max_stride_is_power_of_two_below_ratio() {
        assert_eq!(max_stride(100_000, 10_000), 8);
        assert_eq!(max_stride(160_000, 10_000), 16);
        assert_eq!(max_stride(159_999, 10_000), 8);
        assert_eq!(max_stride(10_000, 10_000), 1);
        assert_eq!(max_stride(19_999, 10_000), 1);
        assert_eq!(max_stride(500, 10_000), 1);
    }
}
