//! `multipart/form-data` writer.
//!
//! Accepts the same form shape the server reader produces: each field is a
//! string, a file object `{filename, contentType, data}` with base64 `data`,
//! or an array of those for repeated fields.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hermes_core::wire::render;
use hermes_core::Issue;
use serde_json::Value;
use uuid::Uuid;

/// An encoded form body.
#[derive(Debug)]
pub struct Form {
    /// The full `Content-Type` value, including the boundary.
    pub content_type: String,
    /// The encoded body.
    pub body: Vec<u8>,
}

/// Encodes a form object.
pub fn write_form(form: &Value) -> Result<Form, Issue> {
    let Value::Object(fields) = form else {
        return Err(Issue::root("form object", render(form)));
    };

    let boundary = format!("hermes-{}", Uuid::now_v7().simple());
    let mut body = Vec::new();

    for (name, value) in fields {
        let values = match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        };
        for value in values {
            write_part(&mut body, &boundary, name, value)?;
        }
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Ok(Form {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body,
    })
}

fn write_part(body: &mut Vec<u8>, boundary: &str, name: &str, value: &Value) -> Result<(), Issue> {
    let field_issue = |expected: &str| Issue::new(vec![name.to_string()], expected, render(value));

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    match value {
        Value::String(text) => {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(text.as_bytes());
        }
        Value::Object(file) => {
            let filename = file
                .get("filename")
                .and_then(Value::as_str)
                .ok_or_else(|| field_issue("file with a filename"))?;
            let content_type = file
                .get("contentType")
                .and_then(Value::as_str)
                .unwrap_or("application/octet-stream");
            let data = file
                .get("data")
                .and_then(Value::as_str)
                .and_then(|d| STANDARD.decode(d).ok())
                .ok_or_else(|| field_issue("file with base64 data"))?;
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(&data);
        }
        _ => return Err(field_issue("string or file")),
    }
    body.extend_from_slice(b"\r\n");
    Ok(())
}
