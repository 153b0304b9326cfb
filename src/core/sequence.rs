#[cfg(feature = "deque")]
use std::collections::VecDeque;

/// Ordered, index addressable storage of elements.
///
/// Labeled sequence validates every index before calling in here, so
/// implementations are free to panic on out of range indices the way
/// `Vec` does.
pub trait Sequence<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&T>;

    fn get_mut(&mut self, index: usize) -> Option<&mut T>;

    /// Panics if index larger than len.
    fn insert(&mut self, index: usize, item: T);

    /// Panics if index out of bounds.
    fn remove(&mut self, index: usize) -> T;

    fn clear(&mut self);

    /// Position of first element equal to `item`.
    fn position(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        (0..self.len()).find(|&i| self.get(i) == Some(item))
    }
}

impl<T> Sequence<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    fn insert(&mut self, index: usize, item: T) {
        Vec::insert(self, index, item)
    }

    fn remove(&mut self, index: usize) -> T {
        Vec::remove(self, index)
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn position(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|e| e == item)
    }
}

#[cfg(feature = "deque")]
impl<T> Sequence<T> for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        VecDeque::get_mut(self, index)
    }

    fn insert(&mut self, index: usize, item: T) {
        VecDeque::insert(self, index, item)
    }

    fn remove(&mut self, index: usize) -> T {
        VecDeque::remove(self, index).expect("Index out of bounds")
    }

    fn clear(&mut self) {
        VecDeque::clear(self)
    }

    fn position(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|e| e == item)
    }
}
