use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use market::FetchError;
use tracing::{debug, error, info, warn};
use tracing_futures::Instrument;

use crate::{
    command::Router,
    sender::ResponseSender,
    telegram::{InboundEvent, Update},
};

/// Inbound side of the messaging platform.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Long-poll for updates with `update_id >= offset`, blocking server-side
    /// for up to `timeout`.
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>, FetchError>;
}

/// Offset of the next unseen update. Only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(i64);

impl Cursor {
    pub fn new(offset: i64) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> i64 {
        self.0
    }

    /// `max(seen) + 1`, never below the current offset.
    pub fn advance(self, seen: impl IntoIterator<Item = i64>) -> Self {
        seen.into_iter()
            .map(|id| Self(id.saturating_add(1)))
            .fold(self, Ord::max)
    }
}

pub struct Poller {
    source: Arc<dyn UpdateSource>,
    timeout: Duration,
    retry_delay: Duration,
}

impl Poller {
    pub fn new(source: Arc<dyn UpdateSource>, timeout: Duration, retry_delay: Duration) -> Self {
        Self {
            source,
            timeout,
            retry_delay,
        }
    }

    /// One long-poll round trip.
    ///
    /// Events come back in ascending id order. The cursor moves past every
    /// update seen, including ones that carry nothing routable. On failure
    /// the batch is empty, the cursor is unchanged, and the call returns only
    /// after `retry_delay`.
    pub async fn poll(&self, cursor: Cursor) -> (Vec<InboundEvent>, Cursor) {
        let mut updates = match self.source.get_updates(cursor.offset(), self.timeout).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(offset = cursor.offset(), error = %e, "poll failed, retrying");
                tokio::time::sleep(self.retry_delay).await;
                return (Vec::new(), cursor);
            }
        };

        updates.sort_by_key(|u| u.update_id);
        let next = cursor.advance(updates.iter().map(|u| u.update_id));

        let events: Vec<InboundEvent> = updates.into_iter().filter_map(Update::into_event).collect();
        debug!(
            offset = cursor.offset(),
            next = next.offset(),
            events = events.len(),
            "poll ok"
        );

        (events, next)
    }
}

/// Poll forever, handling each event to completion before the next.
pub async fn run(poller: Poller, router: Arc<Router>, sender: ResponseSender) {
    let mut cursor = Cursor::default();
    info!("polling for updates");

    loop {
        let (events, next) = poller.poll(cursor).await;
        cursor = next;

        for event in events {
            dispatch(&router, &sender, event).await;
        }
    }
}

/// Route one event and deliver its reply. A panicking handler is contained
/// to its own task so the loop keeps going.
pub async fn dispatch(router: &Arc<Router>, sender: &ResponseSender, event: InboundEvent) {
    let span = tracing::info_span!("event", id = event.id, chat_id = event.chat_id, kind = ?event.kind);
    let chat_id = event.chat_id;

    let router = Arc::clone(router);
    let handled = tokio::spawn(async move { router.route(&event).await }.instrument(span)).await;

    match handled {
        Ok(Some(reply)) => sender.deliver(chat_id, reply).await,
        Ok(None) => {}
        Err(e) => error!(chat_id, error = ?e, "handler aborted"),
    }
}
