//! Load → mutate → persist lifecycle for one CLI invocation.
//!
//! The session subscribes to ledger events when it loads the ledger. After a
//! command runs, [`Session::commit`] drains those events; any event means the
//! ledger changed, so the full state is written back to the store.

use log::info;
use std::sync::mpsc::Receiver;

use wrm_core::{Ledger, LedgerEvent};
use wrm_db::Database;

use crate::GlobalArgs;

pub struct Session {
    db: Database,
    ledger: Ledger,
    events: Receiver<LedgerEvent>,
}

impl Session {
    /// Open the store named by the global options and load the ledger from it.
    pub fn open(args: &GlobalArgs) -> anyhow::Result<Self> {
        let db = if args.in_memory {
            Database::new()?
        } else {
            Database::open(&args.db)?
        };
        Self::with_database(db)
    }

    pub fn with_database(db: Database) -> anyhow::Result<Self> {
        let mut ledger = db.load_ledger()?;
        let events = ledger.subscribe();
        Ok(Self { db, ledger, events })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Persist the ledger if anything changed since the last commit.
    ///
    /// Returns the drained events; empty means nothing was written.
    pub fn commit(&mut self) -> anyhow::Result<Vec<LedgerEvent>> {
        let events: Vec<LedgerEvent> = self.events.try_iter().collect();
        if events.is_empty() {
            return Ok(events);
        }
        if events.contains(&LedgerEvent::Cleared) {
            self.db.clear()?;
        }
        self.db.save_ledger(&self.ledger)?;
        info!("[WRM] session: persisted ledger after {} change(s)", events.len());
        Ok(events)
    }
}
