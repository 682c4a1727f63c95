//! Client layer: endpoint construction, response classification, and the
//! resource façades.

mod resources;

pub use resources::{Sms, Tpl, User};

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::dispatch::{self, DispatchReport};
use crate::domain::{ApiKey, Message, ValidationError};
use crate::events::{Event, EventBus};
use crate::transport::decode_envelope;

const DEFAULT_BASE_URI: &str = "https://yunpian.com";
const API_VERSION: &str = "v1";

/// Sentinel failure code for transport/network problems.
pub const NETWORK_ERROR_CODE: i64 = -100;
/// Sentinel failure code for unparseable response bodies.
pub const PARSE_ERROR_CODE: i64 = -101;

const NO_BODY_SENTINEL: &str = "no body data";

/// Parsed JSON payload of a successful call. Detail fields are
/// resource-specific, so the payload is surfaced as-is.
pub type ApiPayload = serde_json::Value;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.post(url).form(&params).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

/// Uniform `{code, msg, detail}` view of a failed call, as carried by
/// `error` events.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub code: i64,
    pub msg: String,
    pub detail: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`YunpianClient`].
///
/// Single-call failures come in three kinds, all carrying a numeric code
/// (see [`YunpianError::code`]): network failures (`-100`), parse failures
/// (`-101`), and remote API errors (the remote's own non-zero code).
pub enum YunpianError {
    /// Transport failure, non-200 status, or empty response body.
    #[error("network error: {detail}")]
    Network { detail: String },

    /// 200 response whose body is not the expected JSON envelope.
    #[error("response parse error")]
    Parse { body: String },

    /// Well-formed error response with a non-zero `code`.
    #[error("API error {code}: {msg}")]
    Api {
        code: i64,
        msg: String,
        detail: serde_json::Value,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The configured base URL does not form a valid endpoint.
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Http(#[source] Box<dyn StdError + Send + Sync>),
}

impl YunpianError {
    /// The classification code: `-100` network, `-101` parse, or the remote
    /// API's own code. Configuration and validation errors map to `-1`.
    pub fn code(&self) -> i64 {
        match self {
            Self::Network { .. } => NETWORK_ERROR_CODE,
            Self::Parse { .. } => PARSE_ERROR_CODE,
            Self::Api { code, .. } => *code,
            Self::Validation(_) | Self::BaseUrl(_) | Self::Http(_) => -1,
        }
    }

    pub(crate) fn to_failure(&self) -> Failure {
        match self {
            Self::Network { detail } => Failure {
                code: NETWORK_ERROR_CODE,
                msg: "network error".to_owned(),
                detail: serde_json::Value::String(detail.clone()),
            },
            Self::Parse { body } => Failure {
                code: PARSE_ERROR_CODE,
                msg: "response parse error".to_owned(),
                detail: serde_json::Value::String(body.clone()),
            },
            Self::Api { code, msg, detail } => Failure {
                code: *code,
                msg: msg.clone(),
                detail: detail.clone(),
            },
            other => Failure {
                code: other.code(),
                msg: other.to_string(),
                detail: serde_json::Value::Null,
            },
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`YunpianClient`].
///
/// Use this when you need to enable debug logging or customize the endpoint,
/// timeout, or user-agent.
pub struct YunpianClientBuilder {
    api_key: ApiKey,
    base_url: String,
    debug: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl YunpianClientBuilder {
    /// Create a builder with the default endpoint and debug logging off.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URI.to_owned(),
            debug: false,
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the API base URI (the part before `/v1/...`).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Tee every emitted event to the `tracing` sink at debug level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`YunpianClient`].
    pub fn build(self) -> Result<YunpianClient, YunpianError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| YunpianError::Http(Box::new(err)))?;

        Ok(YunpianClient {
            api_key: self.api_key,
            base_url: self.base_url,
            events: Arc::new(EventBus::new(self.debug)),
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level Yunpian client.
///
/// Single-recipient operations live on the resource façades ([`Sms`],
/// [`User`], [`Tpl`]); batches go through the bounded-concurrency dispatcher
/// via [`YunpianClient::send`] or the `sms` bulk operations. Lifecycle events
/// can be observed through [`YunpianClient::events`].
pub struct YunpianClient {
    api_key: ApiKey,
    base_url: String,
    events: Arc<EventBus>,
    http: Arc<dyn HttpTransport>,
}

impl YunpianClient {
    /// Create a client with the default endpoint and debug logging off.
    ///
    /// For more customization, use [`YunpianClient::builder`].
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URI.to_owned(),
            events: Arc::new(EventBus::new(false)),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> YunpianClientBuilder {
        YunpianClientBuilder::new(api_key)
    }

    /// The messaging resource (`sms/...` actions).
    pub fn sms(&self) -> Sms {
        Sms::new(self.clone())
    }

    /// The account resource (`user/...` actions).
    pub fn user(&self) -> User {
        User::new(self.clone())
    }

    /// The template resource (`tpl/...` actions).
    pub fn tpl(&self) -> Tpl {
        Tpl::new(self.clone())
    }

    /// The client's event bus, for subscribing to lifecycle events.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Send a batch of messages, routing each item by its body: free text
    /// through `sms/send`, template references through `sms/tpl_send`.
    ///
    /// Per-item failures are absorbed into the report and surfaced as
    /// events; this call itself never fails. Digit-only text messages route
    /// to plain send like any other text.
    pub async fn send(&self, batch: Vec<Message>) -> DispatchReport {
        dispatch::run(self, batch).await
    }

    /// Issue one POST to `{base}/v1/{resource}/{action}.json` and classify
    /// the response. The `apikey` is carried both in the query string and in
    /// the form body.
    pub(crate) async fn request(
        &self,
        resource: &str,
        action: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<ApiPayload, YunpianError> {
        let url = self.endpoint(resource, action)?;
        params.push((ApiKey::FIELD.to_owned(), self.api_key.as_str().to_owned()));

        self.events.emit(Event::RequestIssued {
            resource: resource.to_owned(),
            action: action.to_owned(),
            url: url.to_string(),
            params: params.clone(),
        });

        let response = match self.http.post_form(url.as_str(), params).await {
            Ok(response) => {
                self.events.emit(Event::ResponseReceived {
                    status: Some(response.status),
                    body: Some(response.body.clone()),
                    transport_error: None,
                });
                response
            }
            Err(err) => {
                self.events.emit(Event::ResponseReceived {
                    status: None,
                    body: None,
                    transport_error: Some(err.to_string()),
                });
                return Err(self.classified(YunpianError::Network {
                    detail: NO_BODY_SENTINEL.to_owned(),
                }));
            }
        };

        if response.status != 200 || response.body.is_empty() {
            let detail = if response.body.is_empty() {
                NO_BODY_SENTINEL.to_owned()
            } else {
                response.body
            };
            return Err(self.classified(YunpianError::Network { detail }));
        }

        let envelope = match decode_envelope(&response.body) {
            Ok(envelope) => envelope,
            Err(_) => {
                return Err(self.classified(YunpianError::Parse {
                    body: response.body,
                }));
            }
        };

        match envelope.code {
            Some(0) => Ok(envelope.payload),
            Some(code) => Err(self.classified(YunpianError::Api {
                code,
                msg: envelope.msg.unwrap_or_default(),
                detail: envelope.payload,
            })),
            // A JSON body without an integer `code` is off-protocol.
            None => Err(self.classified(YunpianError::Parse {
                body: response.body,
            })),
        }
    }

    fn endpoint(&self, resource: &str, action: &str) -> Result<Url, YunpianError> {
        let mut url = Url::parse(&format!(
            "{}/{}/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            API_VERSION,
            resource,
            action
        ))?;
        url.query_pairs_mut()
            .append_pair(ApiKey::FIELD, self.api_key.as_str());
        Ok(url)
    }

    // Every classified failure is mirrored onto the event bus.
    fn classified(&self, err: YunpianError) -> YunpianError {
        self.events.emit(Event::Error {
            failure: err.to_failure(),
        });
        err
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Responder =
        Arc<dyn Fn(&str, &[(String, String)]) -> Result<(u16, String), String> + Send + Sync>;

    #[derive(Default)]
    struct FakeTransportState {
        requests: Vec<(String, Vec<(String, String)>)>,
        inflight: usize,
        max_inflight: usize,
    }

    /// In-memory [`HttpTransport`] recording every request and tracking how
    /// many calls are in flight at once.
    #[derive(Clone)]
    pub(crate) struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
        responder: Responder,
    }

    impl FakeTransport {
        /// Respond to every request with HTTP 200 and the given body.
        pub(crate) fn ok(body: &str) -> Self {
            let body = body.to_owned();
            Self::with_responder(move |_, _| Ok((200, body.clone())))
        }

        /// Respond via a function of the request URL and form params;
        /// `Err` simulates a transport-level failure.
        pub(crate) fn with_responder(
            responder: impl Fn(&str, &[(String, String)]) -> Result<(u16, String), String>
            + Send
            + Sync
            + 'static,
        ) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState::default())),
                responder: Arc::new(responder),
            }
        }

        pub(crate) fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.state.lock().unwrap().requests.clone()
        }

        pub(crate) fn last_request(&self) -> (Option<String>, Vec<(String, String)>) {
            let state = self.state.lock().unwrap();
            match state.requests.last() {
                Some((url, params)) => (Some(url.clone()), params.clone()),
                None => (None, Vec::new()),
            }
        }

        pub(crate) fn max_inflight(&self) -> usize {
            self.state.lock().unwrap().max_inflight
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_form<'a>(
            &'a self,
            url: &'a str,
            params: Vec<(String, String)>,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                {
                    let mut state = self.state.lock().unwrap();
                    state.requests.push((url.to_owned(), params.clone()));
                    state.inflight += 1;
                    state.max_inflight = state.max_inflight.max(state.inflight);
                }

                // Yield so concurrently dispatched calls overlap.
                for _ in 0..3 {
                    tokio::task::yield_now().await;
                }

                let outcome = (self.responder)(url, &params);

                self.state.lock().unwrap().inflight -= 1;

                match outcome {
                    Ok((status, body)) => Ok(HttpResponse { status, body }),
                    Err(message) => Err(message.into()),
                }
            })
        }
    }

    pub(crate) fn client_with(transport: FakeTransport, debug: bool) -> YunpianClient {
        YunpianClient {
            api_key: ApiKey::new("test-key").unwrap(),
            base_url: "https://example.invalid".to_owned(),
            events: Arc::new(EventBus::new(debug)),
            http: Arc::new(transport),
        }
    }

    pub(crate) fn assert_param(params: &[(String, String)], key: &str, value: &str) {
        assert!(
            params.iter().any(|(k, v)| k == key && v == value),
            "missing param {key}={value}; got: {params:?}"
        );
    }
}
