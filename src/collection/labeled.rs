use super::{LabelRegistry, LabeledIndices};
use crate::core::*;
use std::{fmt, marker::PhantomData, ops};

/// Ordered collection with labels that follow their slot through mutations.
///
/// Every mutation first validates its arguments, then mutates the backing
/// sequence and finally renumbers all labels. A rejected call changes nothing.
///
/// Renumbering rules, against the index of a label before the mutation:
/// - insert at `i`: item labels with index `>= i` are moved by +1.
/// - remove at `i`: item labels with index `> i` are moved by -1,
///   those with index `== i` are detached.
/// - clear: all item labels are moved to 0, detached ones included.
/// - set: no label changes.
///
/// End labels always read the current length.
///
/// Each mutation is O(labels) on top of the cost of the backing sequence.
pub struct LabeledSequence<T, S = Vec<T>> {
    pub(super) items: S,
    pub(super) labels: LabelRegistry,
    _item: PhantomData<fn() -> T>,
}

impl<T> LabeledSequence<T, Vec<T>> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_sequence(Vec::with_capacity(capacity))
    }
}

impl<T, S: Sequence<T> + Default> LabeledSequence<T, S> {
    pub fn new() -> Self {
        Self::from_sequence(S::default())
    }
}

impl<T, S: Sequence<T>> LabeledSequence<T, S> {
    pub fn from_sequence(items: S) -> Self {
        Self {
            items,
            labels: LabelRegistry::new(),
            _item: PhantomData,
        }
    }

    /// Returns backing sequence, all labels are invalidated.
    pub fn into_inner(self) -> S {
        self.items
    }

    pub fn as_inner(&self) -> &S {
        &self.items
    }

    pub fn sequence_id(&self) -> SequenceId {
        self.labels.sequence()
    }

    // ******************************** Elements ******************************** //

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        let len = self.len();
        self.items
            .get(index)
            .ok_or_else(|| LabelError::out_of_range(index, len))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.items
            .get_mut(index)
            .ok_or_else(|| LabelError::out_of_range(index, len))
    }

    /// Overwrites element in place, returning the old one.
    /// Labels are left as they are.
    pub fn set(&mut self, index: usize, item: T) -> Result<T> {
        Ok(std::mem::replace(self.get_mut(index)?, item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len()).filter_map(move |i| self.items.get(i))
    }

    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.position(item)
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(item).is_some()
    }

    // ******************************** Mutations ******************************** //

    /// Appends item at the end.
    pub fn add(&mut self, item: T) {
        let len = self.len();
        self.items.insert(len, item);
        self.labels.on_insert(len, len);
    }

    /// Inserts item at `index` in `0..=len`.
    ///
    /// Item label at `index` is pushed forward so it keeps denoting the
    /// element that was there.
    pub fn insert_at(&mut self, index: usize, item: T) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(LabelError::out_of_range(index, len));
        }

        self.items.insert(index, item);
        self.labels.on_insert(index, len);
        Ok(())
    }

    /// Removes item at `index` in `0..len`.
    ///
    /// Item labels at `index` are detached.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let len = self.len();
        if index >= len {
            return Err(LabelError::out_of_range(index, len));
        }

        let item = self.items.remove(index);
        self.labels.on_remove(index, len);
        Ok(item)
    }

    /// Removes first element equal to `item`.
    pub fn remove_value(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        let len = self.len();
        self.items.clear();
        self.labels.on_clear(len);
    }

    // ******************************** Labels ******************************** //

    /// Label that always equals the current length.
    pub fn create_end_label(&mut self) -> Label {
        self.labels.add(LabelKind::End, None, false)
    }

    /// Item label at `index` in `0..=len`.
    pub fn create_label(&mut self, index: usize) -> Result<Label> {
        let len = self.len();
        if index > len {
            return Err(LabelError::out_of_range(index, len));
        }

        Ok(self.labels.add(LabelKind::Item, Some(index), false))
    }

    /// Removes label together with its listeners.
    pub fn remove_label(&mut self, label: Label) -> Result<()> {
        self.labels.remove(label)
    }

    /// Removes all labels of this sequence.
    ///
    /// Running labeled iterations stop at their next step.
    pub fn clear_labels(&mut self) {
        self.labels.clear()
    }

    /// Current index of the label, None if it's detached.
    pub fn label_index(&self, label: Label) -> Result<Option<usize>> {
        self.labels.index(label, self.len())
    }

    /// Moves item label to `index` in `0..=len`.
    /// This also reattaches a detached label.
    pub fn set_label_index(&mut self, label: Label, index: usize) -> Result<()> {
        let len = self.len();
        self.labels.relocate(label, index, len)
    }

    /// True until the label is removed.
    pub fn is_attached(&self, label: Label) -> bool {
        self.labels.contains(label)
    }

    pub fn is_end(&self, label: Label) -> Result<bool> {
        self.labels.kind(label).map(LabelKind::is_end)
    }

    /// Calls `listener` every time the index of the label changes.
    ///
    /// Listener is called after the whole mutation has been applied, while the
    /// sequence is still mutably borrowed. Reaching the sequence from the listener
    /// through a `RefCell` fails at runtime.
    pub fn on_label_changed(
        &mut self,
        label: Label,
        listener: impl FnMut(&LabelChange) + 'static,
    ) -> Result<()> {
        self.labels.listen(label, Box::new(listener))
    }

    /// Element denoted by the label.
    ///
    /// Errors if label is detached or positioned at the end.
    pub fn get_by_label(&self, label: Label) -> Result<&T> {
        match self.label_index(label)? {
            Some(index) => self
                .items
                .get(index)
                .ok_or(LabelError::invalid_label(label)),
            None => Err(LabelError::invalid_label(label)),
        }
    }

    pub fn get_by_label_mut(&mut self, label: Label) -> Result<&mut T> {
        match self.label_index(label)? {
            Some(index) => self
                .items
                .get_mut(index)
                .ok_or(LabelError::invalid_label(label)),
            None => Err(LabelError::invalid_label(label)),
        }
    }

    /// Labels created by users of this sequence, in no particular order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.labels.labels()
    }

    pub fn label_count(&self) -> usize {
        self.labels.count()
    }

    // ******************************** Iteration ******************************** //

    /// Walks indices of the sequence while allowing it to be mutated between steps.
    ///
    /// Mutations done through the returned guard renumber its cursor like any
    /// other label, so insertions and removals before the cursor neither skip
    /// nor repeat elements. Element inserted at the yielded index isn't visited.
    /// Walk ends once the cursor reaches the end or its slot is removed.
    ///
    /// ```
    /// use labeled_seq::LabeledSequence;
    ///
    /// let mut seq = LabeledSequence::from(vec![0, 1, 2]);
    /// let mut walk = seq.iterate_indices_labeled();
    /// let mut visited = Vec::new();
    /// while let Some(i) = walk.next() {
    ///     visited.push(walk[i]);
    ///     walk.insert_at(i, 99).unwrap();
    /// }
    /// drop(walk);
    ///
    /// assert_eq!(visited, vec![0, 1, 2]);
    /// assert_eq!(seq.len(), 6);
    /// ```
    pub fn iterate_indices_labeled(&mut self) -> LabeledIndices<'_, T, S> {
        LabeledIndices::new(self)
    }
}

impl<T, S: Sequence<T> + Default> Default for LabeledSequence<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for LabeledSequence<T, Vec<T>> {
    fn from(items: Vec<T>) -> Self {
        Self::from_sequence(items)
    }
}

impl<T, S: Sequence<T> + Default> FromIterator<T> for LabeledSequence<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T, S: Sequence<T>> Extend<T> for LabeledSequence<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T, S: Sequence<T>> ops::Index<usize> for LabeledSequence<T, S> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(item) => item,
            Err(error) => panic!("{}", error),
        }
    }
}

impl<T, S: Sequence<T>> ops::IndexMut<usize> for LabeledSequence<T, S> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match self.get_mut(index) {
            Ok(item) => item,
            Err(error) => panic!("{}", error),
        }
    }
}

impl<T, S: Sequence<T>> ops::Index<Label> for LabeledSequence<T, S> {
    type Output = T;

    fn index(&self, label: Label) -> &Self::Output {
        match self.get_by_label(label) {
            Ok(item) => item,
            Err(error) => panic!("{}", error),
        }
    }
}

impl<T, S: Sequence<T>> ops::IndexMut<Label> for LabeledSequence<T, S> {
    fn index_mut(&mut self, label: Label) -> &mut Self::Output {
        match self.get_by_label_mut(label) {
            Ok(item) => item,
            Err(error) => panic!("{}", error),
        }
    }
}

impl<T, S: fmt::Debug> fmt::Debug for LabeledSequence<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabeledSequence")
            .field("items", &self.items)
            .field("labels", &self.labels)
            .finish()
    }
}

// ************************ Convenient methods *************************** //

impl Label {
    pub fn index<T, S: Sequence<T>>(self, seq: &LabeledSequence<T, S>) -> Result<Option<usize>> {
        seq.label_index(self)
    }

    pub fn set_index<T, S: Sequence<T>>(
        self,
        seq: &mut LabeledSequence<T, S>,
        index: usize,
    ) -> Result<()> {
        seq.set_label_index(self, index)
    }

    pub fn is_attached<T, S: Sequence<T>>(self, seq: &LabeledSequence<T, S>) -> bool {
        seq.is_attached(self)
    }

    pub fn is_end<T, S: Sequence<T>>(self, seq: &LabeledSequence<T, S>) -> Result<bool> {
        seq.is_end(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn label_follows_element_on_insert_before() {
        let mut seq = LabeledSequence::from(vec!['A', 'B', 'C']);
        let label = seq.create_label(1).unwrap();
        seq.insert_at(0, 'X').unwrap();
        assert_eq!(label.index(&seq), Ok(Some(2)));
        assert_eq!(seq[label], 'B');
    }

    #[test]
    fn label_follows_element_on_remove_before() {
        let mut seq = LabeledSequence::from(vec!['A', 'B', 'C']);
        let label = seq.create_label(1).unwrap();
        assert_eq!(seq.remove_at(0), Ok('A'));
        assert_eq!(label.index(&seq), Ok(Some(0)));
        assert_eq!(seq[label], 'B');
    }

    #[test]
    fn end_label_tracks_len() {
        let mut seq: LabeledSequence<char> = LabeledSequence::new();
        let end = seq.create_end_label();
        assert_eq!(end.is_end(&seq), Ok(true));
        assert_eq!(end.index(&seq), Ok(Some(0)));
        seq.add('A');
        assert_eq!(end.index(&seq), Ok(Some(1)));
        seq.insert_at(0, 'Z').unwrap();
        assert_eq!(end.index(&seq), Ok(Some(2)));
        seq.remove_at(1).unwrap();
        assert_eq!(end.index(&seq), Ok(Some(1)));
        seq.clear();
        assert_eq!(end.index(&seq), Ok(Some(0)));
    }

    #[test]
    fn insert_at_label_pushes_it_forward() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let before = seq.create_label(0).unwrap();
        let at = seq.create_label(1).unwrap();
        let past_end = seq.create_label(3).unwrap();

        seq.insert_at(1, 10).unwrap();
        assert_eq!(seq.label_index(before), Ok(Some(0)));
        assert_eq!(seq.label_index(at), Ok(Some(2)));
        assert_eq!(seq[at], 2);
        assert_eq!(seq.label_index(past_end), Ok(Some(4)));

        seq.add(4);
        assert_eq!(seq.label_index(past_end), Ok(Some(5)));
    }

    #[test]
    fn remove_at_label_detaches_it() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let label = seq.create_label(1).unwrap();
        seq.remove_at(1).unwrap();

        assert!(label.is_attached(&seq));
        assert_eq!(label.index(&seq), Ok(None));
        assert_eq!(
            seq.get_by_label(label),
            Err(LabelError::invalid_label(label))
        );

        // Inserts and removes leave detached labels alone.
        seq.insert_at(0, 0).unwrap();
        seq.remove_at(0).unwrap();
        assert_eq!(label.index(&seq), Ok(None));

        // Relocation reattaches it.
        seq.extend([5, 6]);
        label.set_index(&mut seq, 3).unwrap();
        assert_eq!(seq[label], 6);
    }

    #[test]
    fn clear_reattaches_detached_labels_at_zero() {
        let mut seq = LabeledSequence::from(vec!['A', 'B', 'C']);
        let label = seq.create_label(1).unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        seq.on_label_changed(label, move |change| sink.borrow_mut().push(*change))
            .unwrap();

        seq.remove_at(1).unwrap();
        assert_eq!(label.index(&seq), Ok(None));
        seq.clear();

        assert!(label.is_attached(&seq));
        assert_eq!(label.index(&seq), Ok(Some(0)));
        assert!(seq.get_by_label(label).is_err());
        assert_eq!(
            changes
                .borrow()
                .iter()
                .map(|c| (c.before(), c.after()))
                .collect::<Vec<_>>(),
            vec![(Some(1), None), (None, Some(0))]
        );

        // Like any label at the insertion point, it's pushed forward.
        seq.add('D');
        assert_eq!(label.index(&seq), Ok(Some(1)));
    }

    #[test]
    fn listener_cannot_borrow_mutating_sequence() {
        let seq = Rc::new(RefCell::new(LabeledSequence::from(vec![1, 2, 3])));
        let label = seq.borrow_mut().create_label(1).unwrap();
        let borrowed = Rc::new(RefCell::new(Vec::new()));
        let (weak, sink) = (Rc::downgrade(&seq), borrowed.clone());
        seq.borrow_mut()
            .on_label_changed(label, move |_| {
                let seq = weak.upgrade().unwrap();
                sink.borrow_mut().push(seq.try_borrow_mut().is_ok());
            })
            .unwrap();

        seq.borrow_mut().insert_at(0, 0).unwrap();
        assert_eq!(*borrowed.borrow(), vec![false]);
        assert_eq!(seq.borrow().label_index(label), Ok(Some(2)));
    }

    #[test]
    fn set_keeps_labels() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let label = seq.create_label(2).unwrap();
        let fired = Rc::new(RefCell::new(0));
        let counter = fired.clone();
        seq.on_label_changed(label, move |_| *counter.borrow_mut() += 1)
            .unwrap();

        assert_eq!(seq.set(2, 30), Ok(3));
        assert_eq!(seq.label_index(label), Ok(Some(2)));
        assert_eq!(seq[label], 30);
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn clear_collapses_labels() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let a = seq.create_label(2).unwrap();
        let b = seq.create_label(3).unwrap();
        seq.clear();
        assert_eq!(seq.label_index(a), Ok(Some(0)));
        assert_eq!(seq.label_index(b), Ok(Some(0)));
        assert!(seq.get_by_label(a).is_err());
    }

    #[test]
    fn remove_value() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3, 2]);
        let label = seq.create_label(3).unwrap();
        assert!(seq.remove_value(&2));
        assert_eq!(seq.index_of(&2), Some(2));
        assert_eq!(label.index(&seq), Ok(Some(2)));
        assert!(!seq.remove_value(&7));
        assert!(!seq.contains(&7));
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![1, 3, 2]);
    }

    #[test]
    fn rejected_calls_change_nothing() {
        let mut seq = LabeledSequence::from(vec![1, 2]);
        let label = seq.create_label(1).unwrap();
        let end = seq.create_end_label();

        assert_eq!(seq.create_label(3), Err(LabelError::out_of_range(3, 2)));
        assert_eq!(seq.insert_at(3, 0), Err(LabelError::out_of_range(3, 2)));
        assert_eq!(seq.remove_at(2), Err(LabelError::out_of_range(2, 2)));
        assert_eq!(seq.set(2, 0), Err(LabelError::out_of_range(2, 2)));
        assert_eq!(seq.get(2), Err(LabelError::out_of_range(2, 2)));
        assert_eq!(
            seq.set_label_index(label, 3),
            Err(LabelError::out_of_range(3, 2))
        );
        assert_eq!(
            seq.set_label_index(end, 1),
            Err(LabelError::invalid_op(end, "set_index"))
        );

        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(seq.label_index(label), Ok(Some(1)));
        assert_eq!(seq.label_index(end), Ok(Some(2)));
        assert_eq!(seq.label_count(), 2);
    }

    #[test]
    fn removed_label_is_invalid() {
        let mut seq = LabeledSequence::from(vec![1, 2]);
        let label = seq.create_label(0).unwrap();
        seq.remove_label(label).unwrap();

        assert!(!label.is_attached(&seq));
        assert_eq!(seq.label_index(label), Err(LabelError::invalid_label(label)));
        assert_eq!(seq.is_end(label), Err(LabelError::invalid_label(label)));
        assert_eq!(seq.remove_label(label), Err(LabelError::invalid_label(label)));
        assert!(seq.on_label_changed(label, |_| ()).is_err());
        assert_eq!(seq.label_count(), 0);
    }

    #[test]
    fn foreign_label_is_invalid() {
        let mut first = LabeledSequence::from(vec![1, 2]);
        let mut second = LabeledSequence::from(vec![1, 2]);
        let label = first.create_label(0).unwrap();
        let _ = second.create_label(0).unwrap();

        assert_ne!(first.sequence_id(), second.sequence_id());
        assert!(!second.is_attached(label));
        assert_eq!(second.get_by_label(label), Err(LabelError::invalid_label(label)));
        assert!(second.set_label_index(label, 1).is_err());
        assert_eq!(first.label_index(label), Ok(Some(0)));
    }

    #[test]
    fn end_label_has_no_element() {
        let mut seq = LabeledSequence::from(vec![1]);
        let end = seq.create_end_label();
        assert_eq!(seq.get_by_label(end), Err(LabelError::invalid_label(end)));
        assert!(seq.get_by_label_mut(end).is_err());
    }

    #[test]
    #[should_panic]
    fn index_by_detached_label_panics() {
        let mut seq = LabeledSequence::from(vec![1]);
        let label = seq.create_label(0).unwrap();
        seq.remove_at(0).unwrap();
        let _ = seq[label];
    }

    #[test]
    fn mutate_through_label() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let label = seq.create_label(2).unwrap();
        seq[label] += 10;
        *seq.get_by_label_mut(label).unwrap() += 1;
        *seq.get_mut(0).unwrap() = 0;
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![0, 2, 14]);
    }

    #[test]
    fn relocation_fires_once() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let label = seq.create_label(0).unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        seq.on_label_changed(label, move |change| sink.borrow_mut().push(*change))
            .unwrap();

        label.set_index(&mut seq, 2).unwrap();
        label.set_index(&mut seq, 2).unwrap();
        assert_eq!(changes.borrow().len(), 1);
        assert_eq!(changes.borrow()[0].before(), Some(0));
        assert_eq!(changes.borrow()[0].after(), Some(2));
    }

    #[test]
    fn listener_fires_on_renumbering() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let label = seq.create_label(1).unwrap();
        let end = seq.create_end_label();
        let changes = Rc::new(RefCell::new(Vec::new()));
        for label in [label, end] {
            let sink = changes.clone();
            seq.on_label_changed(label, move |change| sink.borrow_mut().push(*change))
                .unwrap();
        }

        // After the label, only end changes.
        seq.add(4);
        // Before the label, both change.
        seq.remove_at(0).unwrap();
        // At the label, it's detached.
        seq.remove_at(0).unwrap();

        let changes = changes.borrow();
        let of = |l: Label| {
            changes
                .iter()
                .filter(|c| c.label() == l)
                .map(|c| (c.before(), c.after()))
                .collect::<Vec<_>>()
        };
        assert_eq!(of(label), vec![(Some(1), Some(0)), (Some(0), None)]);
        assert!(changes
            .iter()
            .filter(|c| c.label() == label)
            .last()
            .unwrap()
            .detached());
        assert_eq!(
            of(end),
            vec![(Some(3), Some(4)), (Some(4), Some(3)), (Some(3), Some(2))]
        );
    }

    #[test]
    fn labels_enumeration() {
        let mut seq = LabeledSequence::from(vec![1, 2, 3]);
        let a = seq.create_label(0).unwrap();
        let b = seq.create_end_label();
        let mut labels = seq.labels().collect::<Vec<_>>();
        labels.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(labels, expected);

        seq.clear_labels();
        assert_eq!(seq.label_count(), 0);
        assert!(!seq.is_attached(a));
    }

    #[cfg(feature = "deque")]
    #[test]
    fn deque_backed() {
        use std::collections::VecDeque;

        let mut seq = LabeledSequence::<u32, VecDeque<u32>>::new();
        seq.extend([1, 2, 3]);
        let label = seq.create_label(2).unwrap();
        seq.insert_at(0, 0).unwrap();
        assert_eq!(seq[label], 3);
        assert_eq!(seq.into_inner(), VecDeque::from(vec![0, 1, 2, 3]));
    }

    /// Checks labels against a naive model under random mutations.
    #[test]
    fn doppelganger() {
        let ops = 10000;

        let mut seq: LabeledSequence<u32> = LabeledSequence::new();
        let mut doppelganger = Vec::<u32>::new();
        // (label, expected index)
        let mut labels = Vec::<(Label, Option<usize>)>::new();
        let end = seq.create_end_label();
        let mut rand = thread_rng();
        for _ in 0..ops {
            match rand.gen_range(0..12) {
                // Insert
                0 | 1 | 2 | 3 => {
                    let index = rand.gen_range(0..=doppelganger.len());
                    let val = rand.gen();
                    seq.insert_at(index, val).unwrap();
                    doppelganger.insert(index, val);
                    for (_, expected) in labels.iter_mut() {
                        if let Some(i) = expected {
                            if *i >= index {
                                *i += 1;
                            }
                        }
                    }
                }
                // Remove
                4 | 5 | 6 if !doppelganger.is_empty() => {
                    let index = rand.gen_range(0..doppelganger.len());
                    assert_eq!(seq.remove_at(index), Ok(doppelganger.remove(index)));
                    for (_, expected) in labels.iter_mut() {
                        *expected = match *expected {
                            Some(i) if i > index => Some(i - 1),
                            Some(i) if i == index => None,
                            other => other,
                        };
                    }
                }
                // Create label
                7 | 8 => {
                    let index = rand.gen_range(0..=doppelganger.len());
                    labels.push((seq.create_label(index).unwrap(), Some(index)));
                }
                // Remove label
                9 if !labels.is_empty() => {
                    let (label, _) = labels.swap_remove(rand.gen_range(0..labels.len()));
                    seq.remove_label(label).unwrap();
                }
                // Relocate
                10 if !labels.is_empty() => {
                    let at = rand.gen_range(0..labels.len());
                    let index = rand.gen_range(0..=doppelganger.len());
                    seq.set_label_index(labels[at].0, index).unwrap();
                    labels[at].1 = Some(index);
                }
                // Clear
                11 if rand.gen_range(0..20) == 0 => {
                    seq.clear();
                    doppelganger.clear();
                    for (_, expected) in labels.iter_mut() {
                        *expected = Some(0);
                    }
                }
                _ => (),
            }

            assert_eq!(seq.len(), doppelganger.len());
            assert_eq!(end.index(&seq), Ok(Some(doppelganger.len())));
            for &(label, expected) in &labels {
                assert_eq!(label.index(&seq), Ok(expected));
                if let Some(i) = expected {
                    assert!(i <= seq.len());
                    assert_eq!(seq.get_by_label(label).ok(), doppelganger.get(i));
                }
            }
        }
        assert_eq!(seq.into_inner(), doppelganger);
    }
}
