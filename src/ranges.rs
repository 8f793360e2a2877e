//! Allocation-range annotations threaded through rendered enum entries.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Registration policy covering the inclusive id range `start..=end`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RangeMarker {
    pub start: u64,
    pub end: u64,
    pub description: String,
}

impl RangeMarker {
    pub fn new(start: u64, end: u64, description: &str) -> Self {
        Self {
            start,
            end,
            description: description.to_string(),
        }
    }
}

/// Forward-only cursor that hands out each marker exactly once.
///
/// Markers must be sorted by `start` and non-overlapping; entries must be
/// visited in ascending id order.
#[derive(Debug)]
pub struct RangeCursor<'a> {
    markers: &'a [RangeMarker],
    next: usize,
}

impl<'a> RangeCursor<'a> {
    pub fn new(markers: &'a [RangeMarker]) -> Self {
        Self { markers, next: 0 }
    }

    /// Markers that must be emitted before the entry with `id`.
    pub fn due_before(&mut self, id: u64) -> &'a [RangeMarker] {
        let first = self.next;
        while self
            .markers
            .get(self.next)
            .is_some_and(|marker| marker.start <= id)
        {
            self.next += 1;
        }
        &self.markers[first..self.next]
    }

    /// Markers not yet emitted once all entries are rendered.
    pub fn remaining(&mut self) -> &'a [RangeMarker] {
        let first = self.next;
        self.next = self.markers.len();
        &self.markers[first..]
    }
}

/// Check that a marker table is sorted, non-overlapping, and well-formed.
pub fn validate_markers(markers: &[RangeMarker]) -> Result<()> {
    for marker in markers {
        if marker.start > marker.end {
            return Err(anyhow!(
                "range marker {}-{} starts after it ends",
                marker.start,
                marker.end
            ));
        }
        if marker.description.contains("*/") {
            return Err(anyhow!(
                "range marker {}-{} description must not contain \"*/\"",
                marker.start,
                marker.end
            ));
        }
    }
    for pair in markers.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start <= prev.end {
            return Err(anyhow!(
                "range markers {}-{} and {}-{} are unsorted or overlap",
                prev.start,
                prev.end,
                next.start,
                next.end
            ));
        }
    }
    Ok(())
}
