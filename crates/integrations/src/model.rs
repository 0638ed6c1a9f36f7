use chrono::{DateTime, Utc};
use gridbook_http::{ApiRequest, HttpMethod};
use gridbook_worksheet::ColumnId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique integration identifier.
pub type IntegrationId = Uuid;

/// How often an integration is meant to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Manual,
    Hourly,
    Daily,
    Weekly,
}

/// Run cadence and bookkeeping for an integration. `last_run` only
/// advances when a run succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
}

/// An external data-fetch configuration whose response fields map onto
/// worksheet columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiIntegration {
    pub id: IntegrationId,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Maps API response fields to column ids. Iteration order is the
    /// order values are written within a row.
    pub response_mapping: IndexMap<String, ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl ApiIntegration {
    /// The wire request this integration describes.
    #[must_use]
    pub fn request(&self) -> ApiRequest {
        ApiRequest {
            url: self.url.clone(),
            method: self.method,
            headers: self.headers.clone(),
            body: self.body.clone(),
            timeout_secs: None,
        }
    }
}

/// Everything needed to register an integration, minus the id the
/// registry assigns.
#[derive(Debug, Clone, Default)]
pub struct IntegrationDraft {
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub response_mapping: IndexMap<String, ColumnId>,
    pub schedule: Option<Schedule>,
}

impl IntegrationDraft {
    pub(crate) fn into_integration(self) -> ApiIntegration {
        ApiIntegration {
            id: Uuid::new_v4(),
            name: self.name,
            url: self.url,
            method: self.method,
            headers: self.headers,
            body: self.body,
            response_mapping: self.response_mapping,
            schedule: self.schedule,
        }
    }
}

/// Partial update for `IntegrationRegistry::update`.
/// `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct IntegrationUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<String>,
    pub response_mapping: Option<IndexMap<String, ColumnId>>,
    pub schedule: Option<Schedule>,
}

impl ApiIntegration {
    /// Merge the set fields of a partial update; the id is untouched.
    pub(crate) fn apply(&mut self, update: IntegrationUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(method) = update.method {
            self.method = method;
        }
        if let Some(headers) = update.headers {
            self.headers = headers;
        }
        if let Some(body) = update.body {
            self.body = Some(body);
        }
        if let Some(response_mapping) = update.response_mapping {
            self.response_mapping = response_mapping;
        }
        if let Some(schedule) = update.schedule {
            self.schedule = Some(schedule);
        }
    }
}
