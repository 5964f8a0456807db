//! Ledger change notifications.
//!
//! Presentation layers call [`crate::Ledger::subscribe`] and re-render after
//! draining the receiver instead of polling ledger state.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::log_entry::LogId;
use crate::source::SourceId;

/// One successful ledger mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    SourceAdded(SourceId),
    SourceUpdated(SourceId),
    SourceDeleted { id: SourceId, removed_logs: usize },
    LogAdded { id: LogId, source_id: SourceId },
    SettingsChanged,
    Imported { sources: usize, logs: usize },
    Cleared,
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<Sender<LedgerEvent>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> Receiver<LedgerEvent> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver to every live receiver, dropping senders whose receiver is gone.
    pub(crate) fn notify(&mut self, event: LedgerEvent) {
        log::debug!("[WRM] ledger: {:?}", event);
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
