//! Optimistic delete/update bookkeeping.
//!
//! A change is *pending* from the moment the user acts until the server
//! answers. The visible list is the authoritative list with every pending
//! change projected on top; committing folds the change into the
//! authoritative list, rolling back just forgets it.

use std::borrow::Cow;

use adminlist_core::{Record, RecordId};

#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange<R> {
    Delete(RecordId),
    Update(R),
}

impl<R: Record> PendingChange<R> {
    pub fn record_id(&self) -> RecordId {
        match self {
            PendingChange::Delete(id) => id.clone(),
            PendingChange::Update(record) => record.record_id(),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            PendingChange::Delete(_) => "delete",
            PendingChange::Update(_) => "update",
        }
    }

    /// Fold the change into `items`.
    pub fn apply_to(&self, items: &mut Vec<R>) {
        match self {
            PendingChange::Delete(id) => items.retain(|r| &r.record_id() != id),
            PendingChange::Update(record) => {
                let id = record.record_id();
                if let Some(slot) = items.iter_mut().find(|r| r.record_id() == id) {
                    *slot = record.clone();
                }
            }
        }
    }
}

/// Handle for one pending change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    pub id: u64,
    pub record_id: RecordId,
}

#[derive(Debug)]
pub struct MutationLedger<R> {
    next: u64,
    pending: Vec<(u64, PendingChange<R>)>,
}

impl<R> Default for MutationLedger<R> {
    fn default() -> Self {
        Self {
            next: 0,
            pending: Vec::new(),
        }
    }
}

impl<R: Record> MutationLedger<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, change: PendingChange<R>) -> MutationTicket {
        self.next += 1;
        let ticket = MutationTicket {
            id: self.next,
            record_id: change.record_id(),
        };
        self.pending.push((ticket.id, change));
        ticket
    }

    /// Remove and return the change behind `ticket`.
    pub fn take(&mut self, ticket: &MutationTicket) -> Option<PendingChange<R>> {
        let index = self.pending.iter().position(|(id, _)| *id == ticket.id)?;
        Some(self.pending.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// `items` as the user should see them, pending changes applied in order.
    pub fn project<'a>(&self, items: &'a [R]) -> Cow<'a, [R]> {
        if self.pending.is_empty() {
            return Cow::Borrowed(items);
        }
        let mut projected = items.to_vec();
        for (_, change) in &self.pending {
            change.apply_to(&mut projected);
        }
        Cow::Owned(projected)
    }
}
