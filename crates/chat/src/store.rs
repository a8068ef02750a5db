//! Conversation state management.
//!
//! The `ChatStore` owns every conversation thread and is the only writer
//! of their turn lists. Submissions on one thread are serialized through a
//! per-thread ordering gate; different threads proceed in parallel. The
//! store is also the one place where an engine failure becomes a graceful
//! user-visible reply instead of an error, because an interactive chat must
//! stay usable after a failed turn.

use crate::thread::{derive_title, ConversationThread, ConversationTurn, ThreadId, DEFAULT_TITLE};
use faqchat_core::{AppError, AppResult};
use faqchat_retrieval::AnswerEngine;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Fixed reply appended when the query engine fails.
pub const FALLBACK_REPLY: &str = "There was an error, can you try asking again?";

/// Lightweight listing of a thread for sidebars and CLIs.
#[derive(Debug, Clone)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub title: String,
    pub turn_count: usize,
}

struct ThreadEntry {
    thread: ConversationThread,
    /// Ordering gate: held across the engine call so submissions on this
    /// thread land in submission order.
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl ThreadEntry {
    fn new(id: ThreadId) -> Self {
        Self {
            thread: ConversationThread::new(id),
            gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

struct StoreInner {
    threads: BTreeMap<ThreadId, ThreadEntry>,
    active: ThreadId,
    next_id: ThreadId,
}

/// Client-side store of conversation threads.
///
/// Always holds at least one thread; deleting the last one is forbidden.
pub struct ChatStore {
    engine: Arc<dyn AnswerEngine>,
    inner: Mutex<StoreInner>,
}

impl ChatStore {
    /// Create a store with one empty active thread.
    pub fn new(engine: Arc<dyn AnswerEngine>) -> Self {
        let first_id: ThreadId = 1;
        let mut threads = BTreeMap::new();
        threads.insert(first_id, ThreadEntry::new(first_id));

        Self {
            engine,
            inner: Mutex::new(StoreInner {
                threads,
                active: first_id,
                next_id: first_id + 1,
            }),
        }
    }

    /// Allocate a new empty thread and make it active.
    pub fn create_thread(&self) -> ThreadId {
        let mut inner = self.inner.lock().unwrap();

        let id = inner.next_id;
        inner.next_id += 1;
        inner.threads.insert(id, ThreadEntry::new(id));
        inner.active = id;

        tracing::debug!("Created thread {}", id);

        id
    }

    /// Delete a thread.
    ///
    /// Fails with `LastThread` when `id` is the only remaining thread. If
    /// the deleted thread was active, the earliest remaining thread
    /// becomes active.
    pub fn delete_thread(&self, id: ThreadId) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.threads.contains_key(&id) {
            return Err(AppError::UnknownThread(id));
        }

        if inner.threads.len() == 1 {
            return Err(AppError::LastThread);
        }

        inner.threads.remove(&id);

        if inner.active == id {
            // BTreeMap keys are ordered, so first_key is the earliest id
            let first = *inner.threads.keys().next().expect("at least one thread remains");
            inner.active = first;
        }

        tracing::debug!("Deleted thread {}", id);

        Ok(())
    }

    /// Id of the currently active thread.
    pub fn active_thread(&self) -> ThreadId {
        self.inner.lock().unwrap().active
    }

    /// Make a thread active.
    pub fn set_active_thread(&self, id: ThreadId) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.threads.contains_key(&id) {
            return Err(AppError::UnknownThread(id));
        }

        inner.active = id;
        Ok(())
    }

    /// Snapshot of one thread.
    pub fn thread(&self, id: ThreadId) -> AppResult<ConversationThread> {
        let inner = self.inner.lock().unwrap();

        inner
            .threads
            .get(&id)
            .map(|entry| entry.thread.clone())
            .ok_or(AppError::UnknownThread(id))
    }

    /// Summaries of all threads, earliest first.
    pub fn threads(&self) -> Vec<ThreadSummary> {
        let inner = self.inner.lock().unwrap();

        inner
            .threads
            .values()
            .map(|entry| ThreadSummary {
                id: entry.thread.id,
                title: entry.thread.title.clone(),
                turn_count: entry.thread.turns.len(),
            })
            .collect()
    }

    /// Submit a user message to a thread.
    ///
    /// Blank input is a no-op. The user turn is appended immediately; the
    /// engine then runs against the history accumulated *before* this
    /// turn, and its answer (or the fallback reply on failure) is appended
    /// when it resolves. Engine errors never escape this method.
    pub async fn submit(&self, id: ThreadId, text: &str) -> AppResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        // Grab the gate handle first, then lock it. The registry lock is
        // never held across an await.
        let gate = {
            let inner = self.inner.lock().unwrap();
            let entry = inner.threads.get(&id).ok_or(AppError::UnknownThread(id))?;
            Arc::clone(&entry.gate)
        };
        let _ordering = gate.lock().await;

        // Append the user turn and snapshot the prior history
        let history = {
            let mut inner = self.inner.lock().unwrap();
            let entry = inner
                .threads
                .get_mut(&id)
                .ok_or(AppError::UnknownThread(id))?;

            let history = entry.thread.history();

            if entry.thread.title == DEFAULT_TITLE {
                entry.thread.title = derive_title(text);
            }
            entry.thread.turns.push(ConversationTurn::user(text));

            history
        };

        let reply = match self.engine.answer(text, &history).await {
            Ok(answer) => answer.text,
            Err(e) => {
                tracing::warn!("Query engine failed for thread {}: {}", id, e);
                FALLBACK_REPLY.to_string()
            }
        };

        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.threads.get_mut(&id) {
            entry.thread.turns.push(ConversationTurn::assistant(reply));
        }

        Ok(())
    }
}
