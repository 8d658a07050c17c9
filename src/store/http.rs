//! Payload REST [`Store`] backend.
//!
//! Speaks the Payload CMS REST conventions: `where[field][equals]` query
//! filters, 1-based `page`/`limit` pagination, `depth=0` to keep
//! relationship fields as ids, and API-key authorization. Every request
//! carries the configured timeout; a slow store demotes one file to
//! failed instead of hanging the batch.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Map, Value};

use crate::error::StoreError;

use super::{DocPage, Filter, MediaRef, Store, StoredDoc};

pub struct HttpStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    page_limit: usize,
}

impl HttpStore {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        page_limit: usize,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            page_limit,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn authed(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("users API-Key {key}")),
            None => req,
        }
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<Value, StoreError> {
        let response = self
            .authed(req)
            .send()
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| StoreError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: truncate(&body, 300),
            });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Request(format!("invalid json: {e}")))
    }
}

impl Store for HttpStore {
    fn find(&self, collection: &str, filter: &Filter, page: usize) -> Result<DocPage, StoreError> {
        let mut query: Vec<(String, String)> = vec![
            ("limit".into(), self.page_limit.to_string()),
            ("page".into(), page.to_string()),
            ("depth".into(), "0".into()),
        ];
        if let Filter::Eq { field, value } = filter {
            query.push((format!("where[{field}][equals]"), value_to_query(value)));
        }

        let body = self.send(self.client.get(self.url(collection)).query(&query))?;
        let docs = body["docs"]
            .as_array()
            .map(|docs| docs.iter().filter_map(parse_doc).collect())
            .unwrap_or_default();

        Ok(DocPage {
            docs,
            total_docs: body["totalDocs"].as_u64().unwrap_or(0),
            page,
            total_pages: body["totalPages"].as_u64().unwrap_or(1) as usize,
        })
    }

    fn create(&self, collection: &str, data: Map<String, Value>) -> Result<StoredDoc, StoreError> {
        let body = self.send(self.client.post(self.url(collection)).json(&data))?;
        parse_doc_body(&body).ok_or_else(|| StoreError::Request("create returned no doc".into()))
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<StoredDoc, StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        let body = self.send(self.client.patch(url).json(&data))?;
        parse_doc_body(&body).ok_or_else(|| StoreError::Request("update returned no doc".into()))
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        self.send(self.client.delete(url))?;
        Ok(())
    }

    fn upload(&self, filename: &str, bytes: Vec<u8>, mime: &str) -> Result<MediaRef, StoreError> {
        let part = reqwest::blocking::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);
        let body = self.send(self.client.post(self.url("media")).multipart(form))?;

        let doc = body.get("doc").unwrap_or(&body);
        let id = doc["id"]
            .as_str()
            .map(str::to_string)
            .or_else(|| doc["id"].as_u64().map(|n| n.to_string()))
            .ok_or_else(|| StoreError::Request("upload returned no id".into()))?;
        let url = doc["url"].as_str().unwrap_or_default().to_string();
        Ok(MediaRef { id, url })
    }
}

/// Render a filter value the way Payload's query parser expects.
fn value_to_query(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_doc(value: &Value) -> Option<StoredDoc> {
    let obj = value.as_object()?;
    let id = obj
        .get("id")
        .and_then(|id| {
            id.as_str()
                .map(str::to_string)
                .or_else(|| id.as_u64().map(|n| n.to_string()))
        })?;
    Some(StoredDoc {
        id,
        data: obj.clone(),
    })
}

/// Create/update responses wrap the document under `doc`.
fn parse_doc_body(body: &Value) -> Option<StoredDoc> {
    parse_doc(body.get("doc").unwrap_or(body))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max])
    }
}
