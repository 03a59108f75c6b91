/// Request form extraction
///
/// Catalog endpoints accept JSON, urlencoded or `multipart/form-data` bodies,
/// plus query-string parameters. Everything lands in one field map; list
/// fields are normalized through `IdList`/`NameList` before any catalog
/// logic sees them.
use crate::error::{Result, ServerError};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use musicify_core::{IdList, NameList, UploadFile};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RequestForm {
    fields: Map<String, Value>,
    files: HashMap<String, UploadFile>,
}

impl RequestForm {
    /// Build a form from a JSON object (tests and internal callers)
    pub fn from_json(value: Value) -> Result<Self> {
        let mut form = Self::default();
        form.merge_json(value)?;
        Ok(form)
    }

    fn merge_json(&mut self, value: Value) -> Result<()> {
        match value {
            Value::Object(map) => {
                self.fields.extend(map);
                Ok(())
            }
            Value::Null => Ok(()),
            _ => Err(ServerError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }

    /// Insert a text value; repeated names accumulate into an array
    fn push_text(&mut self, name: &str, value: String) {
        let name = name.strip_suffix("[]").unwrap_or(name).to_string();
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                self.fields.insert(name, Value::String(value));
            }
        }
    }

    fn push_pairs(&mut self, raw: &[u8]) {
        for (name, value) in url::form_urlencoded::parse(raw) {
            self.push_text(&name, value.into_owned());
        }
    }

    async fn read_multipart(&mut self, body: Bytes, content_type: &str) -> Result<()> {
        let boundary = multer::parse_boundary(content_type)
            .map_err(|e| ServerError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().map(ToString::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read upload: {}", e)))?;
                // Browsers send an empty part for an untouched file input
                if data.is_empty() && file_name.is_empty() {
                    continue;
                }
                self.files.insert(
                    name,
                    UploadFile {
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    },
                );
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Invalid form field: {}", e)))?;
                self.push_text(&name, text);
            }
        }

        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }

    /// Scalar text value; numbers and booleans are stringified
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
            _ => None,
        }
    }

    /// Non-blank text, trimmed
    pub fn required_text(&self, key: &str, message: &str) -> Result<String> {
        self.text(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServerError::BadRequest(message.to_string()))
    }

    pub fn opt_id(&self, key: &str) -> Result<Option<i64>> {
        let Some(value) = self.fields.get(key) else {
            return Ok(None);
        };
        let ids = IdList::from_value(value)?;
        match ids.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => Err(ServerError::BadRequest(format!("{} must be a single id", key))),
        }
    }

    pub fn id(&self, key: &str) -> Result<i64> {
        self.opt_id(key)?
            .ok_or_else(|| ServerError::BadRequest(format!("{} is required", key)))
    }

    /// Id list; absent means empty
    pub fn ids(&self, key: &str) -> Result<IdList> {
        Ok(self.opt_ids(key)?.unwrap_or_default())
    }

    /// Id list; absent means "not given", present-but-empty means "clear"
    pub fn opt_ids(&self, key: &str) -> Result<Option<IdList>> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(value) => Ok(Some(IdList::from_value(value)?)),
        }
    }

    pub fn names(&self, key: &str) -> Result<NameList> {
        match self.fields.get(key) {
            None => Ok(NameList::new()),
            Some(value) => Ok(NameList::from_value(value)?),
        }
    }

    pub fn opt_flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_i64().is_some_and(|n| n != 0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Some(true),
                "false" | "0" | "off" | "no" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.opt_flag(key).unwrap_or(false)
    }

    /// Take an uploaded file out of the form
    pub fn take_file(&mut self, key: &str) -> Option<UploadFile> {
        self.files.remove(key)
    }
}

#[async_trait]
impl<S> FromRequest<S> for RequestForm
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let mut form = RequestForm::default();

        if let Some(query) = req.uri().query() {
            form.push_pairs(query.as_bytes());
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let mime = content_type.to_ascii_lowercase();

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ServerError::BadRequest(format!("Failed to read body: {}", e)))?;

        // The multipart boundary is case-sensitive, so only the mime is lowercased
        if mime.starts_with("multipart/form-data") {
            form.read_multipart(body, &content_type).await?;
        } else if mime.starts_with("application/x-www-form-urlencoded") {
            form.push_pairs(&body);
        } else if !body.iter().all(u8::is_ascii_whitespace) {
            let value: Value = serde_json::from_slice(&body)
                .map_err(|e| ServerError::BadRequest(format!("Invalid JSON body: {}", e)))?;
            form.merge_json(value)?;
        }

        Ok(form)
    }
}
