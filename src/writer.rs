//! Background persistence writer.
//!
//! State changes are queued as write intents and processed by a dedicated
//! thread, one write at a time. When several intents are waiting, only the
//! newest state is written. Write failures are logged and counted; the
//! in-memory store stays authoritative.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::state::TrackerState;
use crate::storage::Storage;

enum WriteIntent {
    Save(Box<TrackerState>),
    Flush(Sender<()>),
}

#[derive(Debug, Default)]
struct WriterCounters {
    writes: AtomicUsize,
    failures: AtomicUsize,
}

/// Handle to the writer thread. Dropping it drains the queue and joins.
pub struct PersistenceWriter {
    tx: Option<Sender<WriteIntent>>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<WriterCounters>,
}

impl PersistenceWriter {
    pub fn spawn(storage: Storage) -> Self {
        let (tx, rx) = mpsc::channel();
        let counters = Arc::new(WriterCounters::default());
        let thread_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("trackwise-writer".to_string())
            .spawn(move || run_writer(storage, rx, thread_counters));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "failed to start persistence writer; changes will not be saved");
                None
            }
        };

        Self {
            tx: handle.as_ref().map(|_| tx),
            handle,
            counters,
        }
    }

    /// Queue `state` to be written. Returns immediately.
    pub fn submit(&self, state: TrackerState) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(WriteIntent::Save(Box::new(state))).is_err() {
            tracing::warn!("persistence writer stopped; dropping write");
        }
    }

    /// Block until every intent queued before this call has been processed.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if tx.send(WriteIntent::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// Number of completed writes.
    pub fn writes(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }

    /// Number of failed writes.
    pub fn failures(&self) -> usize {
        self.counters.failures.load(Ordering::SeqCst)
    }
}

impl Drop for PersistenceWriter {
    fn drop(&mut self) {
        // Closing the channel lets the thread finish the backlog and exit.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("persistence writer panicked");
            }
        }
    }
}

fn run_writer(storage: Storage, rx: Receiver<WriteIntent>, counters: Arc<WriterCounters>) {
    while let Ok(first) = rx.recv() {
        let mut latest: Option<Box<TrackerState>> = None;
        let mut waiters = Vec::new();

        let mut absorb = |intent: WriteIntent| match intent {
            WriteIntent::Save(state) => latest = Some(state),
            WriteIntent::Flush(done) => waiters.push(done),
        };
        absorb(first);
        while let Ok(next) = rx.try_recv() {
            absorb(next);
        }

        if let Some(state) = latest {
            match storage.save(&state) {
                Ok(()) => {
                    counters.writes.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!(path = %storage.path().display(), "state saved");
                }
                Err(err) => {
                    counters.failures.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!(path = %storage.path().display(), error = %err, "failed to save state");
                }
            }
        }

        for done in waiters {
            let _ = done.send(());
        }
    }
}
