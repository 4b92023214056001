//! Push provider abstraction.

use async_trait::async_trait;

use campusbell_core::result::AppResult;

use crate::message::{PushMessage, PushTicket};

/// An external push-delivery provider.
///
/// `send_chunk` returns one ticket per message, in order. An `Err` means
/// the submission itself failed and nothing can be assumed delivered.
#[async_trait]
pub trait PushProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Maximum messages accepted per request.
    fn max_batch_size(&self) -> usize;

    /// Submit one chunk of at most `max_batch_size` messages.
    async fn send_chunk(&self, messages: &[PushMessage]) -> AppResult<Vec<PushTicket>>;
}
