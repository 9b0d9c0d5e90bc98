use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::stores::AuditStore;
use crate::types::internal::audit::NewAuditLogEntry;

/// Handle for queueing audit entries
///
/// Entries go to a single background writer task. Emitting never waits for
/// storage; when the buffer is full the entry is dropped with a warning.
#[derive(Clone)]
pub struct AuditEmitter {
    sender: mpsc::Sender<NewAuditLogEntry>,
}

impl AuditEmitter {
    /// Start the background writer
    ///
    /// Returns the emitter handle and the writer task. The task ends once every
    /// emitter clone has been dropped and the queue is drained.
    pub fn spawn(store: Arc<AuditStore>, buffer_size: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let writer = tokio::spawn(audit_writer_task(receiver, store));

        (Self { sender }, writer)
    }

    /// Queue an entry without blocking
    pub fn emit(&self, entry: NewAuditLogEntry) {
        match self.sender.try_send(entry) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(entry)) => {
                tracing::warn!(
                    method = %entry.method,
                    path = %entry.path,
                    username = %entry.username,
                    "Audit buffer full, entry dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(entry)) => {
                tracing::error!(
                    method = %entry.method,
                    path = %entry.path,
                    "Audit writer stopped, entry dropped"
                );
            }
        }
    }
}

async fn audit_writer_task(mut receiver: mpsc::Receiver<NewAuditLogEntry>, store: Arc<AuditStore>) {
    tracing::debug!("Audit writer task started");

    while let Some(entry) = receiver.recv().await {
        let method = entry.method;
        let path = entry.path.clone();

        if let Err(e) = store.append(entry).await {
            tracing::error!(error = %e, %method, %path, "Failed to write audit log");
        }
    }

    tracing::debug!("Audit writer task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{sample_entry, setup_test_stores};
    use crate::types::internal::audit::{AuditMethod, AuditQuery};

    #[tokio::test]
    async fn test_emitted_entries_are_written() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;
        let (emitter, writer) = AuditEmitter::spawn(audit_store.clone(), 16);

        emitter.emit(sample_entry("alice", AuditMethod::Post));
        emitter.emit(sample_entry("bob", AuditMethod::Delete));
        drop(emitter);
        writer.await.unwrap();

        let page = audit_store.query(&AuditQuery::default()).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_without_blocking() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;
        let (sender, _receiver) = mpsc::channel(1);
        let emitter = AuditEmitter { sender };

        emitter.emit(sample_entry("alice", AuditMethod::Post));
        emitter.emit(sample_entry("alice", AuditMethod::Post));

        // Nothing consumed the queue, so nothing was stored
        let page = audit_store.query(&AuditQuery::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
