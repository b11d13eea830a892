use std::collections::VecDeque;

use crate::event::Event;

/// FIFO queue between input polling and dispatch.
///
/// Each loop iteration publishes input and timer events, then drains the
/// queue and handles events in arrival order. A tick and the clicks that
/// preceded it are therefore seen in the order they happened.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event at the back of the queue.
    pub fn publish(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Remove and return all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        self.queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
