use crate::core::*;
use ahash::AHashMap;
use log::*;

pub(crate) type Listener = Box<dyn FnMut(&LabelChange)>;

#[derive(Debug, Clone, Copy)]
struct Record {
    kind: LabelKind,
    /// Only meaningful for item labels. None if detached.
    index: Option<usize>,
    /// Not visible to the users of the sequence.
    internal: bool,
}

impl Record {
    fn index(&self, len: usize) -> Option<usize> {
        match self.kind {
            LabelKind::Item => self.index,
            LabelKind::End => Some(len),
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    record: Option<Record>,
}

/// All labels of one sequence.
///
/// Arena of label records indexed by `Label` keys. Vacant slots are reused,
/// with their generation bumped so that keys of removed labels stay invalid.
///
/// Registry doesn't know the length of the sequence, it's passed in by the
/// sequence on every call that needs it.
pub(crate) struct LabelRegistry {
    sequence: SequenceId,
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Number of live public labels.
    count: usize,
    listeners: AHashMap<Label, Vec<Listener>>,
}

impl LabelRegistry {
    pub(crate) fn new() -> Self {
        Self {
            sequence: SequenceId::next(),
            slots: Vec::new(),
            free: Vec::new(),
            count: 0,
            listeners: AHashMap::new(),
        }
    }

    pub(crate) fn sequence(&self) -> SequenceId {
        self.sequence
    }

    /// Number of public labels.
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// Caller is responsible for index being in range.
    pub(crate) fn add(&mut self, kind: LabelKind, index: Option<usize>, internal: bool) -> Label {
        let record = Record {
            kind,
            index: if kind.is_end() { None } else { index },
            internal,
        };

        let slot = if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            debug_assert!(entry.record.is_none(), "Free slot in use");
            entry.record = Some(record);
            slot
        } else {
            let slot = u32::try_from(self.slots.len()).expect("Out of label slots");
            self.slots.push(Slot {
                generation: 0,
                record: Some(record),
            });
            slot
        };

        if !internal {
            self.count += 1;
        }

        let label = Label::new(self.sequence, slot, self.slots[slot as usize].generation);
        trace!("Added {:?} label {:?} at {:?}", kind, label, index);
        label
    }

    pub(crate) fn remove(&mut self, label: Label) -> Result<()> {
        let record = *self.record(label)?;
        let slot = &mut self.slots[label.slot()];
        slot.record = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(label.slot() as u32);
        self.listeners.remove(&label);

        if !record.internal {
            self.count -= 1;
        }

        trace!("Removed label {:?}", label);
        Ok(())
    }

    pub(crate) fn contains(&self, label: Label) -> bool {
        self.lookup(label).is_some()
    }

    pub(crate) fn kind(&self, label: Label) -> Result<LabelKind> {
        self.record(label).map(|record| record.kind)
    }

    /// Current index of the label. None if detached.
    pub(crate) fn index(&self, label: Label, len: usize) -> Result<Option<usize>> {
        self.record(label).map(|record| record.index(len))
    }

    /// Moves item label to a new index, notifying listeners if it changed.
    pub(crate) fn relocate(&mut self, label: Label, index: usize, len: usize) -> Result<()> {
        let record = self.record(label)?;
        if record.kind.is_end() {
            return Err(LabelError::invalid_op(label, "set_index"));
        }
        if index > len {
            return Err(LabelError::out_of_range(index, len));
        }

        let old = record.index;
        if old != Some(index) {
            self.place(label, Some(index));
            self.dispatch(vec![LabelChange::new(label, old, Some(index))]);
        }

        Ok(())
    }

    /// Moves item label without validation or notification.
    pub(super) fn place(&mut self, label: Label, index: Option<usize>) {
        if let Some(record) = self.lookup_mut(label) {
            debug_assert_eq!(record.kind, LabelKind::Item);
            record.index = index;
        }
    }

    pub(crate) fn listen(&mut self, label: Label, listener: Listener) -> Result<()> {
        self.record(label)?;
        self.listeners.entry(label).or_default().push(listener);
        Ok(())
    }

    /// Public labels in no particular order.
    pub(crate) fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(i, slot)| match slot.record {
                Some(record) if !record.internal => {
                    Some(Label::new(self.sequence, i as u32, slot.generation))
                }
                _ => None,
            })
    }

    /// Removes all labels, internal ones included.
    pub(crate) fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.record.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(i as u32);
            }
        }
        self.listeners.clear();
        self.count = 0;
    }

    // ******************************** Renumbering ******************************** //

    /// Element was inserted at `at`, sequence had `len` elements before that.
    pub(crate) fn on_insert(&mut self, at: usize, len: usize) {
        self.renumber("insert", len, len + 1, |index| {
            index.map(|index| if index >= at { index + 1 } else { index })
        });
    }

    /// Element at `at` was removed, sequence had `len` elements before that.
    pub(crate) fn on_remove(&mut self, at: usize, len: usize) {
        self.renumber("remove", len, len - 1, |index| match index {
            Some(index) if index > at => Some(index - 1),
            Some(index) if index == at => None,
            other => other,
        });
    }

    /// Sequence with `len` elements was cleared.
    /// Every item label ends up at 0, detached ones included.
    pub(crate) fn on_clear(&mut self, len: usize) {
        self.renumber("clear", len, 0, |_| Some(0));
    }

    /// Applies `map` to every item label and notifies listeners of all labels
    /// that changed, end labels included. Detached labels are passed in as None.
    ///
    /// Listeners are called after every label has been renumbered.
    fn renumber(
        &mut self,
        op: &'static str,
        len_before: usize,
        len_after: usize,
        map: impl Fn(Option<usize>) -> Option<usize>,
    ) {
        let mut changes = Vec::new();
        let mut changed = 0;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let record = match slot.record.as_mut() {
                Some(record) => record,
                None => continue,
            };

            let (old, new) = match record.kind {
                LabelKind::Item => {
                    let old = record.index;
                    record.index = map(old);
                    (old, record.index)
                }
                LabelKind::End => (Some(len_before), Some(len_after)),
            };

            if old != new {
                changed += 1;
                let label = Label::new(self.sequence, i as u32, slot.generation);
                if self.listeners.contains_key(&label) {
                    changes.push(LabelChange::new(label, old, new));
                }
            }
        }

        if changed > 0 {
            debug!(
                "Sequence {:?} {} renumbered {} labels, len {} -> {}",
                self.sequence, op, changed, len_before, len_after
            );
        }
        self.debug_check(len_after);

        self.dispatch(changes);
    }

    fn dispatch(&mut self, changes: Vec<LabelChange>) {
        for change in changes {
            if let Some(listeners) = self.listeners.get_mut(&change.label()) {
                for listener in listeners.iter_mut() {
                    listener(&change);
                }
            }
        }
    }

    fn debug_check(&self, len: usize) {
        if cfg!(debug_assertions) {
            for slot in &self.slots {
                if let Some(Record {
                    index: Some(index), ..
                }) = slot.record
                {
                    assert!(index <= len, "Label index {} past len {}", index, len);
                }
            }
        }
    }

    // ******************************** Lookup ******************************** //

    fn lookup(&self, label: Label) -> Option<&Record> {
        if label.sequence() != self.sequence {
            return None;
        }
        let slot = self.slots.get(label.slot())?;
        if slot.generation != label.generation() {
            return None;
        }
        slot.record.as_ref()
    }

    fn lookup_mut(&mut self, label: Label) -> Option<&mut Record> {
        if label.sequence() != self.sequence {
            return None;
        }
        let slot = self.slots.get_mut(label.slot())?;
        if slot.generation != label.generation() {
            return None;
        }
        slot.record.as_mut()
    }

    fn record(&self, label: Label) -> Result<&Record> {
        self.lookup(label).ok_or_else(|| {
            if label.sequence() != self.sequence {
                warn!("Label {:?} used with sequence {:?}", label, self.sequence);
            } else {
                warn!("Stale label {:?}", label);
            }
            LabelError::invalid_label(label)
        })
    }
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LabelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelRegistry")
            .field("sequence", &self.sequence)
            .field("slots", &self.slots)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}
