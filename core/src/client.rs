//! Stateless request builder and response parser for the record API.
//!
//! # Design
//! `RecordClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; the round trip in between belongs to a
//! transport.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::QueryParams;
use crate::types::{CreateRecord, Record};

#[derive(Debug, Clone)]
pub struct RecordClient {
    base_url: String,
}

impl RecordClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The current page as the operator sees it.
    pub fn build_list_records(&self, params: &QueryParams) -> HttpRequest {
        get(self.list_url(params))
    }

    /// The same page with deleted records forced in; the deleted subset is
    /// derived from this.
    pub fn build_snapshot_records(&self, params: &QueryParams) -> HttpRequest {
        get(format!("{}&showDeleted=true", self.list_url(params)))
    }

    pub fn build_create_record(&self, input: &CreateRecord) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(json(HttpMethod::Post, format!("{}/records", self.base_url), body))
    }

    pub fn build_update_record(&self, id: i64, record: &Record) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(record)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(json(HttpMethod::Put, format!("{}/records/{id}", self.base_url), body))
    }

    pub fn build_delete_record(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/records/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_records(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        check_status(&response, &[200])?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// `None` when the server accepted the record without echoing it back.
    pub fn parse_create_record(&self, response: HttpResponse) -> Result<Option<Record>, ApiError> {
        check_status(&response, &[200, 201, 204])?;
        parse_echo(&response)
    }

    /// `None` when the server answers 204 without echoing the record.
    pub fn parse_update_record(&self, response: HttpResponse) -> Result<Option<Record>, ApiError> {
        check_status(&response, &[200, 204])?;
        parse_echo(&response)
    }

    pub fn parse_delete_record(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])?;
        Ok(())
    }

    fn list_url(&self, params: &QueryParams) -> String {
        format!(
            "{}/records?page={}&search={}&isDeleted={}",
            self.base_url,
            params.page(),
            urlencoding::encode(params.search()),
            params.include_deleted()
        )
    }
}

fn get(path: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn json(method: HttpMethod, path: String, body: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    }
}

fn parse_echo(response: &HttpResponse) -> Result<Option<Record>, ApiError> {
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&response.body)
        .map(Some)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map unexpected status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
