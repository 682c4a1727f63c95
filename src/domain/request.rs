use crate::domain::value::{ExtendCode, MessageText, Mobile, TemplateId, Uid};

/// Insertion-ordered template placeholder values.
///
/// Keys are placeholder names without the surrounding `#` markers; the wire
/// form (`#key#=value&...`) is produced by the transport layer at encode time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValues(Vec<(String, String)>);

impl TemplateValues {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a placeholder pair, preserving insertion order.
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Borrow the pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Template substitution payload for `tpl_send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// Placeholder pairs, normalized to the wire form at encode time.
    Values(TemplateValues),
    /// An already-encoded `#key#=value&...` string, passed through untouched.
    Raw(String),
}

/// A free-text message for the `sms/send` action.
#[derive(Debug, Clone)]
pub struct TextMessage {
    pub mobile: Mobile,
    pub text: MessageText,
    pub extend: Option<ExtendCode>,
    pub uid: Option<Uid>,
}

impl TextMessage {
    pub fn new(mobile: Mobile, text: MessageText) -> Self {
        Self {
            mobile,
            text,
            extend: None,
            uid: None,
        }
    }

    pub fn extend(mut self, extend: ExtendCode) -> Self {
        self.extend = Some(extend);
        self
    }

    pub fn uid(mut self, uid: Uid) -> Self {
        self.uid = Some(uid);
        self
    }
}

/// A templated message for the `sms/tpl_send` action.
#[derive(Debug, Clone)]
pub struct TemplateMessage {
    pub mobile: Mobile,
    pub tpl_id: TemplateId,
    pub tpl_value: TemplateValue,
    pub extend: Option<ExtendCode>,
    pub uid: Option<Uid>,
}

impl TemplateMessage {
    pub fn new(mobile: Mobile, tpl_id: TemplateId, tpl_value: TemplateValue) -> Self {
        Self {
            mobile,
            tpl_id,
            tpl_value,
            extend: None,
            uid: None,
        }
    }

    pub fn extend(mut self, extend: ExtendCode) -> Self {
        self.extend = Some(extend);
        self
    }

    pub fn uid(mut self, uid: Uid) -> Self {
        self.uid = Some(uid);
        self
    }
}

/// One outbound message, either free text or a template reference.
///
/// The variant is the routing discriminant: [`Message::Text`] is sent through
/// the `send` action, [`Message::Template`] through `tpl_send`. Exactly one
/// body representation exists per message by construction.
#[derive(Debug, Clone)]
pub enum Message {
    Text(TextMessage),
    Template(TemplateMessage),
}

impl Message {
    /// Convenience constructor for a plain-text message.
    pub fn text(mobile: Mobile, text: MessageText) -> Self {
        Self::Text(TextMessage::new(mobile, text))
    }

    /// Convenience constructor for a templated message.
    pub fn template(mobile: Mobile, tpl_id: TemplateId, tpl_value: TemplateValue) -> Self {
        Self::Template(TemplateMessage::new(mobile, tpl_id, tpl_value))
    }

    /// The recipient, regardless of body kind.
    pub fn mobile(&self) -> &Mobile {
        match self {
            Self::Text(msg) => &msg.mobile,
            Self::Template(msg) => &msg.mobile,
        }
    }

    /// Remote action name this message routes to.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Text(_) => "send",
            Self::Template(_) => "tpl_send",
        }
    }
}

impl From<TextMessage> for Message {
    fn from(msg: TextMessage) -> Self {
        Self::Text(msg)
    }
}

impl From<TemplateMessage> for Message {
    fn from(msg: TemplateMessage) -> Self {
        Self::Template(msg)
    }
}

/// Filters for `sms/get_reply`.
#[derive(Debug, Clone, Default)]
pub struct ReplyQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
    pub mobile: Option<Mobile>,
}

/// Account settings accepted by `user/set`.
#[derive(Debug, Clone, Default)]
pub struct AccountSettings {
    pub emergency_contact: Option<String>,
    pub emergency_mobile: Option<Mobile>,
    pub alarm_balance: Option<u32>,
}
