//! Resource façades: thin payload shaping over the client's core request.

use crate::client::{ApiPayload, YunpianClient, YunpianError};
use crate::dispatch::{self, DispatchReport};
use crate::domain::{
    AccountSettings, Message, MessageText, Mobile, ReplyQuery, TemplateContent, TemplateId,
    TemplateMessage, TextMessage,
};

/// Messaging resource (`sms/...` actions).
#[derive(Clone)]
pub struct Sms {
    client: YunpianClient,
}

impl Sms {
    const RESOURCE: &'static str = "sms";

    pub(crate) fn new(client: YunpianClient) -> Self {
        Self { client }
    }

    /// Send free-text messages through `sms/send`, one HTTP call per
    /// recipient, bounded by the dispatch window.
    pub async fn send(&self, messages: Vec<TextMessage>) -> DispatchReport {
        let batch = messages.into_iter().map(Message::from).collect();
        dispatch::run(&self.client, batch).await
    }

    /// Send templated messages through `sms/tpl_send`. Template-value
    /// mappings are normalized to the `#key#=value&...` wire form.
    pub async fn tpl_send(&self, messages: Vec<TemplateMessage>) -> DispatchReport {
        let batch = messages.into_iter().map(Message::from).collect();
        dispatch::run(&self.client, batch).await
    }

    /// Pull delivery status reports (`sms/pull_status`).
    pub async fn pull_status(&self, page_size: Option<u32>) -> Result<ApiPayload, YunpianError> {
        let mut params = Vec::new();
        if let Some(page_size) = page_size {
            params.push(("page_size".to_owned(), page_size.to_string()));
        }
        self.client
            .request(Self::RESOURCE, "pull_status", params)
            .await
    }

    /// Pull inbound replies (`sms/pull_reply`).
    pub async fn pull_reply(&self, page_size: Option<u32>) -> Result<ApiPayload, YunpianError> {
        let mut params = Vec::new();
        if let Some(page_size) = page_size {
            params.push(("page_size".to_owned(), page_size.to_string()));
        }
        self.client
            .request(Self::RESOURCE, "pull_reply", params)
            .await
    }

    /// Screen a text against the provider's blocked-word list
    /// (`sms/get_black_word`).
    pub async fn get_black_word(&self, text: MessageText) -> Result<ApiPayload, YunpianError> {
        let params = vec![(MessageText::FIELD.to_owned(), text.as_str().to_owned())];
        self.client
            .request(Self::RESOURCE, "get_black_word", params)
            .await
    }

    /// Query stored replies by time window and page (`sms/get_reply`).
    pub async fn get_reply(&self, query: ReplyQuery) -> Result<ApiPayload, YunpianError> {
        let mut params = Vec::new();
        if let Some(start_time) = query.start_time {
            params.push(("start_time".to_owned(), start_time));
        }
        if let Some(end_time) = query.end_time {
            params.push(("end_time".to_owned(), end_time));
        }
        if let Some(page_num) = query.page_num {
            params.push(("page_num".to_owned(), page_num.to_string()));
        }
        if let Some(page_size) = query.page_size {
            params.push(("page_size".to_owned(), page_size.to_string()));
        }
        if let Some(mobile) = query.mobile {
            params.push((Mobile::FIELD.to_owned(), mobile.as_str().to_owned()));
        }
        self.client
            .request(Self::RESOURCE, "get_reply", params)
            .await
    }
}

/// Account resource (`user/...` actions).
#[derive(Clone)]
pub struct User {
    client: YunpianClient,
}

impl User {
    const RESOURCE: &'static str = "user";

    pub(crate) fn new(client: YunpianClient) -> Self {
        Self { client }
    }

    /// Fetch account information (`user/get`).
    pub async fn get(&self) -> Result<ApiPayload, YunpianError> {
        self.client.request(Self::RESOURCE, "get", Vec::new()).await
    }

    /// Update account settings (`user/set`). Unset fields are left untouched
    /// on the remote side.
    pub async fn set(&self, settings: AccountSettings) -> Result<ApiPayload, YunpianError> {
        let mut params = Vec::new();
        if let Some(contact) = settings.emergency_contact {
            params.push(("emergency_contact".to_owned(), contact));
        }
        if let Some(mobile) = settings.emergency_mobile {
            params.push(("emergency_mobile".to_owned(), mobile.as_str().to_owned()));
        }
        if let Some(balance) = settings.alarm_balance {
            params.push(("alarm_balance".to_owned(), balance.to_string()));
        }
        self.client.request(Self::RESOURCE, "set", params).await
    }
}

/// Template resource (`tpl/...` actions).
#[derive(Clone)]
pub struct Tpl {
    client: YunpianClient,
}

impl Tpl {
    const RESOURCE: &'static str = "tpl";

    pub(crate) fn new(client: YunpianClient) -> Self {
        Self { client }
    }

    /// Fetch provider-default templates (`tpl/get_default`); all of them
    /// when no id is given.
    pub async fn get_default(
        &self,
        tpl_id: Option<TemplateId>,
    ) -> Result<ApiPayload, YunpianError> {
        let mut params = Vec::new();
        if let Some(tpl_id) = tpl_id {
            params.push((TemplateId::FIELD.to_owned(), tpl_id.as_str().to_owned()));
        }
        self.client
            .request(Self::RESOURCE, "get_default", params)
            .await
    }

    /// Submit a new template for review (`tpl/add`).
    pub async fn add(
        &self,
        content: TemplateContent,
        notify_type: Option<u8>,
    ) -> Result<ApiPayload, YunpianError> {
        let mut params = vec![(
            TemplateContent::FIELD.to_owned(),
            content.as_str().to_owned(),
        )];
        if let Some(notify_type) = notify_type {
            params.push(("notify_type".to_owned(), notify_type.to_string()));
        }
        self.client.request(Self::RESOURCE, "add", params).await
    }

    /// Fetch an owned template (`tpl/get`).
    pub async fn get(&self, tpl_id: TemplateId) -> Result<ApiPayload, YunpianError> {
        let params = vec![(TemplateId::FIELD.to_owned(), tpl_id.as_str().to_owned())];
        self.client.request(Self::RESOURCE, "get", params).await
    }

    /// Replace a template's content (`tpl/update`).
    pub async fn update(
        &self,
        tpl_id: TemplateId,
        content: TemplateContent,
    ) -> Result<ApiPayload, YunpianError> {
        let params = vec![
            (TemplateId::FIELD.to_owned(), tpl_id.as_str().to_owned()),
            (
                TemplateContent::FIELD.to_owned(),
                content.as_str().to_owned(),
            ),
        ];
        self.client.request(Self::RESOURCE, "update", params).await
    }

    /// Delete a template (`tpl/del`).
    pub async fn del(&self, tpl_id: TemplateId) -> Result<ApiPayload, YunpianError> {
        let params = vec![(TemplateId::FIELD.to_owned(), tpl_id.as_str().to_owned())];
        self.client.request(Self::RESOURCE, "del", params).await
    }
}
