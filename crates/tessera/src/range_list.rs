//! Range-indexed list.
//!
//! A [`RangeIndexedList`] is an ordered list of segments. Each segment owns a
//! value and a half-open range of flat positions. Segments tile the span
//! `[0, total)` with no gaps and no overlaps, in sequence order, so the
//! upper bounds are monotonic and a flat position resolves to its segment by
//! binary search.
//!
//! # Example
//!
//! ```
//! use tessera::range_list::{Range, RangeIndexedList};
//!
//! let mut list = RangeIndexedList::new();
//! list.push("header", 1);
//! list.push("rows", 10);
//! list.add(1, "banner", 2).unwrap();
//!
//! assert_eq!(list.span(), Range::new(0, 13));
//! assert_eq!(*list.value_at(2).unwrap(), "banner");
//! assert_eq!(list.get(2).unwrap().range, Range::new(3, 13));
//! ```

use std::fmt;

use tessera_core::logging::targets;

use crate::error::{Error, Result, check_index};

/// A half-open interval `[lower, upper)` of flat positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    /// First position covered.
    pub lower: usize,
    /// One past the last position covered.
    pub upper: usize,
}

impl Range {
    /// Creates a range.
    ///
    /// `upper` is clamped so the range is never inverted.
    pub const fn new(lower: usize, upper: usize) -> Self {
        let upper = if upper < lower { lower } else { upper };
        Self { lower, upper }
    }

    /// Creates a range starting at `lower` covering `size` positions.
    pub const fn with_size(lower: usize, size: usize) -> Self {
        Self {
            lower,
            upper: lower + size,
        }
    }

    /// Number of positions covered.
    #[inline]
    pub const fn size(&self) -> usize {
        self.upper - self.lower
    }

    /// Returns `true` if the range covers no positions.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.upper == self.lower
    }

    /// Returns `true` if `position` lies inside the range.
    #[inline]
    pub const fn contains(&self, position: usize) -> bool {
        self.lower <= position && position < self.upper
    }

    /// Returns this range shifted right by `by`.
    #[inline]
    pub const fn offset(self, by: usize) -> Self {
        Self {
            lower: self.lower + by,
            upper: self.upper + by,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lower, self.upper)
    }
}

/// A value together with the range it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangedValue<T> {
    /// The segment's value.
    pub value: T,
    /// The segment's range.
    pub range: Range,
}

impl<T> RangedValue<T> {
    /// Creates a ranged value.
    pub fn new(value: T, range: Range) -> Self {
        Self { value, range }
    }

    /// Borrows the value, keeping the range.
    pub fn borrowed(&self) -> RangedValue<&T> {
        RangedValue::new(&self.value, self.range)
    }

    /// Maps the value, keeping the range.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RangedValue<U> {
        RangedValue::new(f(self.value), self.range)
    }
}

/// An ordered list of contiguous, non-overlapping ranged segments.
#[derive(Debug, Clone)]
pub struct RangeIndexedList<T> {
    segments: Vec<RangedValue<T>>,
}

impl<T> Default for RangeIndexedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RangeIndexedList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if there are no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The range covered by all segments, `[0, total)`.
    pub fn span(&self) -> Range {
        Range::new(0, self.segments.last().map_or(0, |s| s.range.upper))
    }

    /// Returns the segment at sequence position `index`.
    pub fn get(&self, index: usize) -> Result<RangedValue<&T>> {
        self.segments
            .get(index)
            .map(RangedValue::borrowed)
            .ok_or_else(|| Error::out_of_range(index, self.segments.len()))
    }

    /// Returns the value of the segment covering flat `position`.
    pub fn value_at(&self, position: usize) -> Result<&T> {
        self.ranged_value_at(position).map(|ranged| ranged.value)
    }

    /// Returns the segment covering flat `position`, with its range.
    pub fn ranged_value_at(&self, position: usize) -> Result<RangedValue<&T>> {
        let index = self.index_at(position)?;
        Ok(self.segments[index].borrowed())
    }

    /// Returns the sequence index of the segment covering flat `position`.
    ///
    /// Zero-sized segments never cover a position.
    pub fn index_at(&self, position: usize) -> Result<usize> {
        let total = self.span().upper;
        check_index(position, total)?;
        // Upper bounds are monotonic, so this is the first segment ending
        // past `position`; its lower bound is the previous upper, <= position.
        Ok(self
            .segments
            .partition_point(|segment| segment.range.upper <= position))
    }

    /// Inserts a segment of `size` positions at sequence position `index`.
    ///
    /// Every later segment shifts right by `size`.
    pub fn add(&mut self, index: usize, value: T, size: usize) -> Result<()> {
        if index > self.segments.len() {
            return Err(Error::out_of_range(index, self.segments.len()));
        }
        let lower = self.lower_bound_of(index);
        self.segments
            .insert(index, RangedValue::new(value, Range::with_size(lower, size)));
        self.relayout_from(index + 1);
        tracing::trace!(target: targets::RANGE_LIST, index, size, "segment added");
        Ok(())
    }

    /// Appends a segment of `size` positions.
    pub fn push(&mut self, value: T, size: usize) {
        let lower = self.span().upper;
        self.segments
            .push(RangedValue::new(value, Range::with_size(lower, size)));
    }

    /// Removes the segment at `index` and returns it with the range it had.
    ///
    /// Every later segment shifts left by the removed size.
    pub fn remove(&mut self, index: usize) -> Result<RangedValue<T>> {
        check_index(index, self.segments.len())?;
        let removed = self.segments.remove(index);
        self.relayout_from(index);
        tracing::trace!(target: targets::RANGE_LIST, index, size = removed.range.size(), "segment removed");
        Ok(removed)
    }

    /// Replaces the value at `index` and resizes its segment to `size`.
    ///
    /// Every later segment shifts by the size difference. Returns the old
    /// value with its old range.
    pub fn set(&mut self, index: usize, value: T, size: usize) -> Result<RangedValue<T>> {
        check_index(index, self.segments.len())?;
        let lower = self.segments[index].range.lower;
        let old = std::mem::replace(
            &mut self.segments[index],
            RangedValue::new(value, Range::with_size(lower, size)),
        );
        if old.range.size() != size {
            self.relayout_from(index + 1);
        }
        Ok(old)
    }

    /// Removes every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Iterates segments in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = RangedValue<&T>> + '_ {
        self.segments.iter().map(RangedValue::borrowed)
    }

    /// Iterates segment values in sequence order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.segments.iter().map(|segment| &segment.value)
    }

    fn lower_bound_of(&self, index: usize) -> usize {
        match index.checked_sub(1) {
            Some(previous) => self.segments[previous].range.upper,
            None => 0,
        }
    }

    /// Re-tiles segments from `start` on, preserving each segment's size.
    fn relayout_from(&mut self, start: usize) {
        let mut cursor = self.lower_bound_of(start);
        for segment in &mut self.segments[start..] {
            let size = segment.range.size();
            segment.range = Range::with_size(cursor, size);
            cursor += size;
        }
    }
}
