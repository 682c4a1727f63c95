//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod validation;
mod value;

pub use request::{
    AccountSettings, Message, ReplyQuery, TemplateMessage, TemplateValue, TemplateValues,
    TextMessage,
};
pub use validation::ValidationError;
pub use value::{ApiKey, ExtendCode, MessageText, Mobile, TemplateContent, TemplateId, Uid};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_rejects_empty() {
        assert!(matches!(
            ApiKey::new("   "),
            Err(ValidationError::Empty {
                field: ApiKey::FIELD
            })
        ));
    }

    #[test]
    fn api_key_trims_surrounding_whitespace() {
        let key = ApiKey::new("  abc123  ").unwrap();
        assert_eq!(key.as_str(), "abc123");
    }

    #[test]
    fn mobile_rejects_empty() {
        assert!(matches!(
            Mobile::new(""),
            Err(ValidationError::Empty {
                field: Mobile::FIELD
            })
        ));
    }

    #[test]
    fn message_text_preserves_whitespace() {
        let text = MessageText::new(" hello ").unwrap();
        assert_eq!(text.as_str(), " hello ");
        assert!(MessageText::new("   ").is_err());
    }

    #[test]
    fn template_values_preserve_insertion_order() {
        let values = TemplateValues::new()
            .insert("code", "1234")
            .insert("company", "Acme");
        assert_eq!(
            values.pairs(),
            &[
                ("code".to_owned(), "1234".to_owned()),
                ("company".to_owned(), "Acme".to_owned()),
            ]
        );
    }

    #[test]
    fn message_routes_by_body_variant() {
        let mobile = Mobile::new("13888888888").unwrap();
        let text = Message::text(mobile.clone(), MessageText::new("hello").unwrap());
        assert_eq!(text.action(), "send");

        let tpl = Message::template(
            mobile,
            TemplateId::new("1").unwrap(),
            TemplateValue::Values(TemplateValues::new().insert("code", "1234")),
        );
        assert_eq!(tpl.action(), "tpl_send");
    }

    #[test]
    fn digit_only_text_still_routes_to_plain_send() {
        let msg = Message::text(
            Mobile::new("13888888888").unwrap(),
            MessageText::new("12345").unwrap(),
        );
        assert_eq!(msg.action(), "send");
    }
}
