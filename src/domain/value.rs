use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Yunpian `apikey` token.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Form/query field name used by Yunpian (`apikey`).
    pub const FIELD: &'static str = "apikey";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Recipient mobile number (`mobile`).
///
/// Yunpian accepts the number as an opaque string; only non-emptiness is
/// enforced here.
pub struct Mobile(String);

impl Mobile {
    /// Form field name used by Yunpian (`mobile`).
    pub const FIELD: &'static str = "mobile";

    /// Create a validated [`Mobile`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Free-text message body (`text`).
///
/// Invariant: non-empty after trimming. The original value (including
/// whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Form field name used by Yunpian (`text`).
    pub const FIELD: &'static str = "text";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Template identifier (`tpl_id`).
///
/// Invariant: non-empty after trimming.
pub struct TemplateId(String);

impl TemplateId {
    /// Form field name used by Yunpian (`tpl_id`).
    pub const FIELD: &'static str = "tpl_id";

    /// Create a validated [`TemplateId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Optional extended sender code appended to the channel number (`extend`).
pub struct ExtendCode(String);

impl ExtendCode {
    /// Form field name used by Yunpian (`extend`).
    pub const FIELD: &'static str = "extend";

    /// Create a validated [`ExtendCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Optional caller-side correlation id echoed back by Yunpian (`uid`).
pub struct Uid(String);

impl Uid {
    /// Form field name used by Yunpian (`uid`).
    pub const FIELD: &'static str = "uid";

    /// Create a validated [`Uid`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Template body content (`tpl_content`).
///
/// Invariant: non-empty after trimming.
pub struct TemplateContent(String);

impl TemplateContent {
    /// Form field name used by Yunpian (`tpl_content`).
    pub const FIELD: &'static str = "tpl_content";

    /// Create validated template content.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the content as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
