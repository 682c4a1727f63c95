use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::{ExtendCode, Message, MessageText, Mobile, TemplateId, TemplateValue, Uid};

/// Percent-encoding set matching `encodeURIComponent`: everything except
/// alphanumerics and `- _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Produce the wire form of a template-value payload.
///
/// Mappings become `#key#=value&...` with key and value percent-encoded and
/// insertion order preserved; raw strings are assumed already encoded and
/// pass through untouched.
pub fn template_value_wire(value: &TemplateValue) -> String {
    match value {
        TemplateValue::Raw(raw) => raw.clone(),
        TemplateValue::Values(values) => values
            .pairs()
            .iter()
            .map(|(key, value)| {
                format!(
                    "#{}#={}",
                    utf8_percent_encode(key, COMPONENT),
                    utf8_percent_encode(value, COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&"),
    }
}

/// Shape one message into form parameters for its action (`send` or
/// `tpl_send`). Absent optional fields are omitted; the `apikey` parameter is
/// appended by the client layer.
pub fn encode_message_form(message: &Message) -> Vec<(String, String)> {
    let mut params = Vec::<(String, String)>::new();

    match message {
        Message::Text(msg) => {
            params.push((Mobile::FIELD.to_owned(), msg.mobile.as_str().to_owned()));
            params.push((MessageText::FIELD.to_owned(), msg.text.as_str().to_owned()));
            push_common(&mut params, msg.extend.as_ref(), msg.uid.as_ref());
        }
        Message::Template(msg) => {
            params.push((Mobile::FIELD.to_owned(), msg.mobile.as_str().to_owned()));
            params.push((TemplateId::FIELD.to_owned(), msg.tpl_id.as_str().to_owned()));
            params.push(("tpl_value".to_owned(), template_value_wire(&msg.tpl_value)));
            push_common(&mut params, msg.extend.as_ref(), msg.uid.as_ref());
        }
    }

    params
}

/// The per-item content surfaced in dispatch events: the free text, or the
/// normalized template-value string.
pub fn message_content(message: &Message) -> String {
    match message {
        Message::Text(msg) => msg.text.as_str().to_owned(),
        Message::Template(msg) => template_value_wire(&msg.tpl_value),
    }
}

fn push_common(
    params: &mut Vec<(String, String)>,
    extend: Option<&ExtendCode>,
    uid: Option<&Uid>,
) {
    if let Some(extend) = extend {
        params.push((ExtendCode::FIELD.to_owned(), extend.as_str().to_owned()));
    }
    if let Some(uid) = uid {
        params.push((Uid::FIELD.to_owned(), uid.as_str().to_owned()));
    }
}
