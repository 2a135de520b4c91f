use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use crate::client::ClientConfig;
use crate::domain::query::{Command, Filter, FilterOperator, Query};
use crate::domain::store::{Row, StoreError, TableStore};

/// Hosted table store speaking the PostgREST wire protocol.
///
/// Queries become single HTTP calls against `{base}/rest/v1/{table}`;
/// filter conditions travel as `field=op.value` query parameters and
/// mutations ask for `return=representation` so the affected rows come
/// back in the response body.
#[derive(Debug)]
pub struct RestTableStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestTableStore {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

// 演算子タグから比較パラメータへの明示的なマッピング
fn render_filter(filter: &Filter) -> (String, String) {
    let rendered = match (filter.operator, &filter.value) {
        (FilterOperator::In, Value::Array(items)) => {
            let joined = items
                .iter()
                .map(render_scalar)
                .collect::<Vec<_>>()
                .join(",");
            format!("in.({joined})")
        }
        (op, value) => format!("{op}.{}", render_scalar(value)),
    };
    (filter.field.clone(), rendered)
}

// Strings travel bare (PostgREST quotes nothing), everything else in its
// JSON form.
fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_rows(status: StatusCode, body: &str) -> Result<Vec<Row>, StoreError> {
    if !status.is_success() {
        return Err(StoreError::Remote {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            },
        });
    }

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let payload: Value = serde_json::from_str(body)
        .map_err(|e| StoreError::InvalidPayload(e.to_string()))?;
    match payload {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(StoreError::InvalidPayload(format!(
                    "expected row object, got {other}"
                ))),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        other => Err(StoreError::InvalidPayload(format!(
            "expected row array, got {other}"
        ))),
    }
}

#[async_trait]
impl TableStore for RestTableStore {
    async fn execute(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let endpoint = self.endpoint(&query.table);

        let mut request = match &query.command {
            Command::Insert(data) => self
                .http
                .post(&endpoint)
                .header("Prefer", "return=representation")
                .json(data),
            Command::Select { columns } => self
                .http
                .get(&endpoint)
                .query(&[("select", columns.as_str())]),
            Command::Update(data) => self
                .http
                .patch(&endpoint)
                .header("Prefer", "return=representation")
                .json(data),
            Command::Delete => self
                .http
                .delete(&endpoint)
                .header("Prefer", "return=representation"),
        };
        request = self.authorize(request);

        for filter in &query.filters {
            request = request.query(&[render_filter(filter)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        parse_rows(status, &body)
    }
}
