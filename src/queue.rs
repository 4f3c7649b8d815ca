use std::collections::{vec_deque, VecDeque};

// `VecDeque::with_capacity` may over-allocate, so the bound is tracked
// explicitly rather than read back from the deque.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> Queue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub fn try_push(&mut self, item: T) -> Option<T> {
        if self.is_full() {
            return Some(item);
        }

        self.data.push_back(item);
        None
    }

    pub fn try_pop(&mut self) -> Option<T> {
        self.data.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        self.data.front()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> vec_deque::IterMut<'_, T> {
        self.data.iter_mut()
    }
}
