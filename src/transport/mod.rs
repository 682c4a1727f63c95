//! Transport layer: wire-format details (form shaping and envelope parsing).

mod envelope;
mod message;

pub use envelope::{Envelope, decode_envelope};
pub use message::{encode_message_form, message_content, template_value_wire};
