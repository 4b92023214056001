//! Scriptable in-process provider.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use campusbell_core::error::AppError;
use campusbell_core::result::AppResult;

use crate::message::{PushMessage, PushTicket};
use crate::provider::PushProvider;

/// Records submitted chunks and answers with scripted tickets.
#[derive(Debug)]
pub struct MockPushProvider {
    max_batch_size: usize,
    chunks: Mutex<Vec<Vec<PushMessage>>>,
    rejected: Mutex<HashSet<String>>,
    failures_left: AtomicUsize,
}

impl Default for MockPushProvider {
    fn default() -> Self {
        Self::new(100)
    }
}

impl MockPushProvider {
    /// Create a provider accepting `max_batch_size` messages per chunk.
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: max_batch_size.max(1),
            chunks: Mutex::new(Vec::new()),
            rejected: Mutex::new(HashSet::new()),
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Answer messages to `token` with an error ticket.
    pub fn reject_token(&self, token: impl Into<String>) {
        self.rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.into());
    }

    /// Fail the next `count` submissions.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Every chunk submitted so far, including failed ones.
    pub fn chunks(&self) -> Vec<Vec<PushMessage>> {
        self.chunks.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every message submitted so far.
    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.chunks().into_iter().flatten().collect()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn send_chunk(&self, messages: &[PushMessage]) -> AppResult<Vec<PushTicket>> {
        self.chunks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages.to_vec());

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(AppError::external("mock provider unavailable"));
        }

        let rejected = self.rejected.lock().unwrap_or_else(|e| e.into_inner());
        Ok(messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                if rejected.contains(&message.to) {
                    PushTicket::error("DeviceNotRegistered")
                } else {
                    PushTicket::ok(format!("mock-{i}"))
                }
            })
            .collect())
    }
}
