use getset::CopyGetters;
use std::{
    fmt,
    num::NonZeroU64,
    sync::atomic::{AtomicU64, Ordering},
};

/// Identity of one labeled sequence.
///
/// Drawn from a process wide counter so labels can't be mixed between sequences.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SequenceId(NonZeroU64);

impl SequenceId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let id = NEXT.fetch_add(1, Ordering::Relaxed);
        SequenceId(NonZeroU64::new(id).expect("Sequence ids exhausted"))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Handle to a logical position in a labeled sequence.
///
/// Label denotes "the N-th slot", not a specific element. Owning sequence
/// keeps N correct while it's being mutated, label itself is just a key
/// into the sequence's registry so it's cheap to copy around.
///
/// Two kinds exist:
/// - item label, bound to an index which is renumbered on every mutation.
/// - end label, always equal to the current length of the sequence.
///
/// Generation part of the key is bumped once the label is removed, so stale
/// copies of the handle are rejected instead of aliasing a newer label.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Label {
    sequence: SequenceId,
    #[getset(skip)]
    slot: u32,
    #[getset(skip)]
    generation: u32,
}

impl Label {
    /// Should only be constructed by registries.
    pub(crate) fn new(sequence: SequenceId, slot: u32, generation: u32) -> Self {
        Self {
            sequence,
            slot,
            generation,
        }
    }

    pub(crate) fn slot(self) -> usize {
        self.slot as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}#{}", self.sequence, self.slot, self.generation)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Bound to an index, detached if its slot is removed.
    Item,
    /// Tracks the length of the sequence.
    End,
}

impl LabelKind {
    pub fn is_end(self) -> bool {
        self == LabelKind::End
    }
}

/// Notification of a label whose index was changed by the owning sequence.
///
/// `None` stands for a detached label, one whose slot was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct LabelChange {
    label: Label,
    before: Option<usize>,
    after: Option<usize>,
}

impl LabelChange {
    pub(crate) fn new(label: Label, before: Option<usize>, after: Option<usize>) -> Self {
        debug_assert_ne!(before, after, "No-op change");
        Self {
            label,
            before,
            after,
        }
    }

    /// True if the label lost its slot with this change.
    pub fn detached(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }
}
