use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::Value;

use crate::service::FieldUpdate;

/// A url-encoded form body that keeps repeated keys (`custom_field_name[]`).
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn parse(body: &[u8]) -> Self {
        let pairs = form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Every pair whose key is not in `skip`, as inline-edit updates.
    pub fn field_updates(&self, skip: &[&str]) -> Vec<FieldUpdate> {
        self.pairs
            .iter()
            .filter(|(k, _)| !skip.contains(&k.as_str()))
            .map(|(k, v)| FieldUpdate {
                field: k.clone(),
                value: Value::String(v.clone()),
            })
            .collect()
    }

    /// `custom_field_name[]` / `custom_field_value[]` zipped in order.
    pub fn custom_fields(&self) -> Vec<(String, String)> {
        self.get_all("custom_field_name[]")
            .into_iter()
            .zip(self.get_all("custom_field_value[]"))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

/// A file posted as multipart form data.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Optional `name` text field used as the display name.
    pub name: Option<String>,
}

/// Read the `file` part and optional `name` part of a multipart body using multer.
pub async fn parse_upload(headers: &HeaderMap, body: Bytes) -> Result<Upload, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut upload = Upload::default();
    let mut saw_file = false;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("file") => {
                upload.filename = field.file_name().unwrap_or_default().to_string();
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("File read error: {e}"))?
                    .to_vec();
                saw_file = true;
            }
            Some("name") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| format!("Field read error: {e}"))?;
                upload.name = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    if !saw_file || upload.filename.is_empty() {
        return Err("No file selected".to_string());
    }
    Ok(upload)
}
