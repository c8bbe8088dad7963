//! `multipart/form-data` bodies.
//!
//! A form is read into a JSON object so it can flow into a handler input
//! like any other slot. Text fields become strings; file fields become
//! `{filename, contentType, data}` with the content base64-encoded. A name
//! that appears more than once becomes an array.

use std::io;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use hermes_core::Issue;
use serde_json::{json, Map, Value};

const OCTET_STREAM: &str = "application/octet-stream";

/// Reads a multipart body into an object.
pub async fn read_form(
    content_type: Option<&str>,
    body: Bytes,
    max_fields: usize,
) -> Result<Value, Issue> {
    let content_type = content_type
        .ok_or_else(|| Issue::root("multipart/form-data", "no content-type"))?;
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| Issue::root("multipart/form-data with a boundary", format!("{content_type:?}")))?;

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = Map::new();
    let mut count = 0usize;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Issue::root("well-formed multipart body", e.to_string()))?
    {
        count += 1;
        if count > max_fields {
            return Err(Issue::root(
                format!("at most {max_fields} form fields"),
                format!("{count} fields"),
            ));
        }

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(ToString::to_string);
        let field_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| Issue::new(vec![name.clone()], "readable form field", e.to_string()))?;

        let value = match file_name {
            Some(filename) => json!({
                "filename": filename,
                "contentType": field_type.unwrap_or_else(|| OCTET_STREAM.to_string()),
                "data": STANDARD.encode(&data),
            }),
            None => Value::String(String::from_utf8_lossy(&data).into_owned()),
        };

        match form.get_mut(&name) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                form.insert(name, value);
            }
        }
    }
    Ok(Value::Object(form))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-HERMES-BOUNDARY";

    fn form_body() -> Bytes {
        Bytes::from(format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Holiday\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"tag\"\r\n\r\n\
             beach\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"tag\"\r\n\r\n\
             sun\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        ))
    }

    fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    #[tokio::test]
    async fn test_read_form() {
        let form = read_form(Some(&content_type()), form_body(), 10)
            .await
            .unwrap();
        assert_eq!(form["title"], "Holiday");
        assert_eq!(form["tag"], json!(["beach", "sun"]));
        assert_eq!(form["photo"]["filename"], "a.txt");
        assert_eq!(form["photo"]["contentType"], "text/plain");
        assert_eq!(form["photo"]["data"], STANDARD.encode("hello"));
    }

    #[tokio::test]
    async fn test_field_limit() {
        let issue = read_form(Some(&content_type()), form_body(), 2)
            .await
            .unwrap_err();
        assert_eq!(issue.expected, "at most 2 form fields");
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let issue = read_form(Some("multipart/form-data"), form_body(), 10)
            .await
            .unwrap_err();
        assert!(issue.expected.contains("boundary"));

        assert!(read_form(None, Bytes::new(), 10).await.is_err());
    }
}
