//! Typed Rust client for the Yunpian SMS HTTP API.
//!
//! The design follows three layers: a domain layer of strong types, a
//! transport layer for wire-format details, and a client layer orchestrating
//! requests. Bulk sends go through a bounded-concurrency dispatcher (at most
//! five calls in flight per batch) that reports per-item outcomes and
//! progress through the client's event bus.
//!
//! ```rust,no_run
//! use yunpian::{ApiKey, Message, MessageText, Mobile, YunpianClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), yunpian::YunpianError> {
//!     let client = YunpianClient::new(ApiKey::new("...")?);
//!
//!     client.events().on(yunpian::EventKind::Progress, |event| {
//!         println!("{event:?}");
//!     });
//!
//!     let batch = vec![Message::text(
//!         Mobile::new("13888888888")?,
//!         MessageText::new("hello")?,
//!     )];
//!     let report = client.send(batch).await;
//!     println!("ok: {}, fail: {}", report.ok, report.fail);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod dispatch;
pub mod domain;
pub mod events;
mod transport;

pub use client::{
    ApiPayload, Failure, NETWORK_ERROR_CODE, PARSE_ERROR_CODE, Sms, Tpl, User, YunpianClient,
    YunpianClientBuilder, YunpianError,
};
pub use dispatch::{DISPATCH_WINDOW, DispatchItem, DispatchReport};
pub use domain::{
    AccountSettings, ApiKey, ExtendCode, Message, MessageText, Mobile, ReplyQuery,
    TemplateContent, TemplateId, TemplateMessage, TemplateValue, TemplateValues, TextMessage, Uid,
    ValidationError,
};
pub use events::{Event, EventBus, EventKind};
