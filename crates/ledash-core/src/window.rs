#![forbid(unsafe_code)]

//! Scroll-window and reorder arithmetic.
//!
//! The display shows [`SCROLL_CONTEXT_SIZE`] entries starting at the scroll
//! position. Both the bindings and the optimistic cache updates go through
//! these helpers so the bounds are checked in exactly one place.
//!
//! # Invariants
//!
//! 1. `0 <= scroll <= count` after any [`step_scroll`].
//! 2. [`swap_adjacent`] in one direction followed by the opposite direction
//!    from the neighbor slot restores the original order.
//! 3. A slot has a neighbor only if both slots are in `0..count`.

use std::ops::Range;

use crate::entry::Direction;

/// Number of entries visible on the panel at once.
pub const SCROLL_CONTEXT_SIZE: usize = 7;

/// Whether a scroll move would change the position.
///
/// Callers check this before posting a scroll request; the remote side clamps
/// but callers are not supposed to rely on it.
#[must_use]
pub fn can_scroll(direction: Direction, scroll: usize, count: usize) -> bool {
    match direction {
        Direction::Up => scroll > 0,
        Direction::Down => scroll < count,
    }
}

/// Clamps a scroll value into `[0, count]`.
#[must_use]
pub fn clamp_scroll(scroll: usize, count: usize) -> usize {
    scroll.min(count)
}

/// Moves the scroll position one step, clamped to `[0, count]`.
#[must_use]
pub fn step_scroll(scroll: usize, direction: Direction, count: usize) -> usize {
    let moved = match direction {
        Direction::Up => scroll.saturating_sub(1),
        Direction::Down => scroll.saturating_add(1),
    };
    clamp_scroll(moved, count)
}

/// Indices of the entries currently on the panel.
#[must_use]
pub fn visible_range(scroll: usize, count: usize) -> Range<usize> {
    let start = clamp_scroll(scroll, count);
    let end = start.saturating_add(SCROLL_CONTEXT_SIZE).min(count);
    start..end
}

/// The slot `index` would trade places with, if any.
#[must_use]
pub fn neighbor(index: usize, direction: Direction, count: usize) -> Option<usize> {
    if index >= count {
        return None;
    }
    match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|&next| next < count),
    }
}

#[must_use]
pub fn can_reorder(index: usize, direction: Direction, count: usize) -> bool {
    neighbor(index, direction, count).is_some()
}

/// Swaps `items[index]` with its neighbor. Returns `false` and leaves the
/// slice untouched when there is no neighbor.
pub fn swap_adjacent<T>(items: &mut [T], index: usize, direction: Direction) -> bool {
    match neighbor(index, direction, items.len()) {
        Some(other) => {
            items.swap(index, other);
            true
        }
        None => false,
    }
}

/// Removes slot `index`; later slots shift down by one.
pub fn remove_slot<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}
