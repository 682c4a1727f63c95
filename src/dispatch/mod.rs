//! Bulk dispatcher: bounded-concurrency fan-out over a batch of messages.
//!
//! A batch of `N` messages is drained by `min(5, N)` worker futures sharing
//! one pending queue. Each worker loops "pop front, send one, record the
//! outcome" until the queue is empty, so the initial fill is the full window
//! width and every refill afterwards replaces exactly one completed call.
//! Items are submitted in batch order; completion order follows the network.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use futures::future::join_all;
use serde::Serialize;

use crate::client::YunpianClient;
use crate::domain::Message;
use crate::events::Event;
use crate::transport::{encode_message_form, message_content};

/// Maximum number of in-flight calls per batch.
pub const DISPATCH_WINDOW: usize = 5;

/// Final tally of one bulk send. `ok + fail` equals the batch size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub ok: usize,
    pub fail: usize,
}

/// Per-item payload carried by `item-sent-ok` / `item-sent-failed` events.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchItem {
    pub mobile: String,
    /// The message text, or the normalized template-value string.
    pub content: String,
}

struct Tally {
    ok: usize,
    fail: usize,
    total: usize,
}

/// Send every message in the batch, absorbing per-item failures into the
/// report. Never fails: callers learn about partial failure from the report
/// or from the event stream.
///
/// An empty batch resolves immediately with a zero report.
pub(crate) async fn run(client: &YunpianClient, batch: Vec<Message>) -> DispatchReport {
    let total = batch.len();
    if total == 0 {
        let report = DispatchReport::default();
        client.events().emit(Event::BatchComplete { report });
        return report;
    }

    let width = total.min(DISPATCH_WINDOW);
    let pending = Mutex::new(VecDeque::from(batch));
    let tally = Mutex::new(Tally {
        ok: 0,
        fail: 0,
        total,
    });

    let workers = (0..width).map(|_| {
        let pending = &pending;
        let tally = &tally;
        async move {
            loop {
                let message = pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some(message) = message else { break };

                let item = DispatchItem {
                    mobile: message.mobile().as_str().to_owned(),
                    content: message_content(&message),
                };
                let outcome = client
                    .request("sms", message.action(), encode_message_form(&message))
                    .await;
                record(client, tally, item, outcome.is_ok());
            }
        }
    });
    join_all(workers).await;

    let tally = tally.into_inner().unwrap_or_else(PoisonError::into_inner);
    DispatchReport {
        ok: tally.ok,
        fail: tally.fail,
    }
}

// Counter bump and event emission happen under one lock so the progress
// fraction is monotone and batch-complete fires exactly once.
fn record(client: &YunpianClient, tally: &Mutex<Tally>, item: DispatchItem, ok: bool) {
    let mut tally = tally.lock().unwrap_or_else(PoisonError::into_inner);
    let events = client.events();

    if ok {
        tally.ok += 1;
        events.emit(Event::ItemSentOk { item });
    } else {
        tally.fail += 1;
        events.emit(Event::ItemSentFailed { item });
    }

    let done = tally.ok + tally.fail;
    events.emit(Event::Progress {
        fraction: done as f64 / tally.total as f64,
    });

    if done == tally.total {
        events.emit(Event::BatchComplete {
            report: DispatchReport {
                ok: tally.ok,
                fail: tally.fail,
            },
        });
    }
}
