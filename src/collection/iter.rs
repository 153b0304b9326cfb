use super::LabeledSequence;
use crate::core::*;
use log::*;
use std::{
    iter::FusedIterator,
    ops::{Deref, DerefMut},
};

/// Mutation tolerant walk over indices of a labeled sequence.
///
/// Holds the sequence for the duration of the walk and gives it back through
/// `Deref`/`DerefMut`, so the sequence can be mutated between steps:
///
/// ```
/// use labeled_seq::LabeledSequence;
///
/// let mut seq = LabeledSequence::from(vec![1, 2, 3, 4]);
/// let mut walk = seq.iterate_indices_labeled();
/// while let Some(i) = walk.next() {
///     if walk[i] % 2 == 0 {
///         walk.insert_at(i, 0).unwrap();
///     }
/// }
/// drop(walk);
///
/// assert_eq!(seq.as_inner(), &vec![1, 0, 2, 3, 0, 4]);
/// ```
///
/// Position is tracked by an internal item label, the cursor. Mutations renumber
/// it like any other label and each step moves it forward by one. Walk ends
/// once the cursor is past the last element or its slot was removed.
///
/// Cursor is released once the walk ends or the guard is dropped.
pub struct LabeledIndices<'a, T, S: Sequence<T> = Vec<T>> {
    sequence: &'a mut LabeledSequence<T, S>,
    cursor: Option<Label>,
    started: bool,
}

impl<'a, T, S: Sequence<T>> LabeledIndices<'a, T, S> {
    pub(super) fn new(sequence: &'a mut LabeledSequence<T, S>) -> Self {
        let cursor = sequence.labels.add(LabelKind::Item, Some(0), true);
        Self {
            sequence,
            cursor: Some(cursor),
            started: false,
        }
    }

    /// Index of the last yielded element as renumbered by the mutations since.
    /// None if it was removed or the walk has ended.
    pub fn cursor_index(&self) -> Option<usize> {
        if !self.started {
            return None;
        }
        let cursor = self.cursor?;
        self.sequence
            .labels
            .index(cursor, self.sequence.len())
            .ok()
            .flatten()
    }

    fn release(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            // Labels could have been cleared from under us.
            if self.sequence.labels.contains(cursor) {
                let _ = self.sequence.labels.remove(cursor);
                trace!("Released cursor {:?}", cursor);
            }
        }
    }
}

impl<'a, T, S: Sequence<T>> Iterator for LabeledIndices<'a, T, S> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let cursor = self.cursor?;
        let len = self.sequence.len();

        let index = match self.sequence.labels.index(cursor, len) {
            Ok(Some(index)) if self.started => index + 1,
            Ok(Some(index)) => index,
            // Detached or removed
            Ok(None) | Err(_) => {
                self.release();
                return None;
            }
        };
        self.started = true;

        if index >= len {
            self.release();
            return None;
        }

        self.sequence.labels.place(cursor, Some(index));
        Some(index)
    }
}

impl<'a, T, S: Sequence<T>> FusedIterator for LabeledIndices<'a, T, S> {}

impl<'a, T, S: Sequence<T>> Deref for LabeledIndices<'a, T, S> {
    type Target = LabeledSequence<T, S>;

    fn deref(&self) -> &Self::Target {
        self.sequence
    }
}

impl<'a, T, S: Sequence<T>> DerefMut for LabeledIndices<'a, T, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.sequence
    }
}

impl<'a, T, S: Sequence<T>> Drop for LabeledIndices<'a, T, S> {
    fn drop(&mut self) {
        self.release();
    }
}
