//! Ordered list of display strings in discovery order.
//!
//! Observers get incremental updates through [`DisplayList::subscribe`].
//! Subscribers whose receiver was dropped are pruned on the next update.

use crossbeam_channel::{unbounded, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListUpdate {
    Cleared,
    Added { index: usize, entry: String },
}

#[derive(Debug, Default)]
pub struct DisplayList {
    entries: Vec<String>,
    subscribers: Vec<Sender<ListUpdate>>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<ListUpdate> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn push(&mut self, entry: String) {
        let index = self.entries.len();
        self.entries.push(entry.clone());
        self.notify(ListUpdate::Added { index, entry });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.notify(ListUpdate::Cleared);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn notify(&mut self, update: ListUpdate) {
        self.subscribers
            .retain(|subscriber| subscriber.send(update.clone()).is_ok());
    }
}
