//! Half-open range helpers used to map a read request onto chunks.

use std::ops::Range;

#[inline(always)]
pub fn imin(a: u64, b: u64) -> u64 {
    if a < b {
        a
    } else {
        b
    }
}

#[inline(always)]
pub fn imax(a: u64, b: u64) -> u64 {
    if a > b {
        a
    } else {
        b
    }
}

/// Intersection of `chunk` and `request`, both `[start, end)` in stream
/// coordinates. Disjoint or inverted inputs give an empty range positioned
/// inside `chunk`, so callers can always slice with it.
#[inline(always)]
pub fn overlap(chunk: Range<u64>, request: Range<u64>) -> Range<u64> {
    let start = imin(chunk.end, imax(chunk.start, request.start));
    let end = imax(start, imin(chunk.end, request.end));
    start..end
}

/// Translates a stream range lying inside the chunk starting at
/// `chunk_start` into indices for that chunk's slice.
#[inline(always)]
pub fn local(chunk_start: u64, range: Range<u64>) -> Range<usize> {
    debug_assert!(range.start >= chunk_start);
    (range.start - chunk_start) as usize..(range.end - chunk_start) as usize
}

#[inline(always)]
pub fn is_empty(range: &Range<u64>) -> bool {
    range.end <= range.start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_inside_chunk() {
        assert_eq!(overlap(10..20, 12..15), 12..15);
    }

    #[test]
    fn chunk_inside_request() {
        assert_eq!(overlap(10..20, 0..100), 10..20);
    }

    #[test]
    fn partial_overlaps() {
        assert_eq!(overlap(10..20, 5..15), 10..15);
        assert_eq!(overlap(10..20, 15..25), 15..20);
    }

    #[test]
    fn request_before_chunk() {
        let r = overlap(10..20, 0..5);
        assert!(is_empty(&r));
        assert_eq!(r, 10..10);

        // Touching but not overlapping
        assert!(is_empty(&overlap(10..20, 0..10)));
    }

    #[test]
    fn request_after_chunk() {
        let r = overlap(10..20, 25..30);
        assert!(is_empty(&r));
        assert_eq!(r, 20..20);
        assert!(is_empty(&overlap(10..20, 20..30)));
    }

    #[test]
    fn inverted_request_is_empty() {
        assert!(is_empty(&overlap(10..20, 18..12)));
        assert!(is_empty(&overlap(0..0, 0..10)));
    }

    #[test]
    fn local_coordinates() {
        assert_eq!(local(10, 12..15), 2..5);
        assert_eq!(local(10, 20..20), 10..10);
    }
}
