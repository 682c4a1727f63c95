use serde_json::Value;

/// Parsed shape of every Yunpian JSON response: an integer `code` (0 on
/// success), an optional `msg`, and resource-specific detail fields.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub code: Option<i64>,
    pub msg: Option<String>,
    pub payload: Value,
}

/// Parse a response body into the common envelope.
///
/// A `code` field that is missing or not an integer yields `code: None`; the
/// client layer treats that as a malformed response.
pub fn decode_envelope(body: &str) -> Result<Envelope, serde_json::Error> {
    let payload: Value = serde_json::from_str(body)?;
    let code = payload.get("code").and_then(Value::as_i64);
    let msg = payload
        .get("msg")
        .and_then(Value::as_str)
        .map(str::to_owned);
    Ok(Envelope { code, msg, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_success_envelope() {
        let envelope = decode_envelope(r#"{"code":0,"msg":"OK","result":{"count":1}}"#).unwrap();
        assert_eq!(envelope.code, Some(0));
        assert_eq!(envelope.msg.as_deref(), Some("OK"));
        assert_eq!(envelope.payload["result"]["count"], 1);
    }

    #[test]
    fn decode_error_envelope() {
        let envelope = decode_envelope(r#"{"code":8,"msg":"bad mobile"}"#).unwrap();
        assert_eq!(envelope.code, Some(8));
        assert_eq!(envelope.msg.as_deref(), Some("bad mobile"));
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(decode_envelope("not json").is_err());
    }

    #[test]
    fn missing_code_field_yields_none() {
        let envelope = decode_envelope(r#"{"msg":"odd"}"#).unwrap();
        assert_eq!(envelope.code, None);
    }
}
