//! HTTP client for the server's task resource endpoints.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::config::Configuration;
use crate::domain::{ConductorError, Task, TaskResult};
use crate::ports::TaskResourceApi;

/// `TaskResourceApi` over the server REST API.
///
/// - batch poll: `GET {base}/tasks/poll/batch/{task_name}`
/// - update: `POST {base}/tasks`
#[derive(Debug, Clone)]
pub struct HttpTaskResourceApi {
    base_url: Url,
    client: Client,
}

impl HttpTaskResourceApi {
    pub fn new(config: &Configuration) -> Result<Self, ConductorError> {
        let base_url = Url::parse(&config.server_api_url)
            .map_err(|e| ConductorError::Config(format!("{}: {e}", config.server_api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConductorError::Config(format!(
                "{} cannot be used as a base url",
                config.server_api_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConductorError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    /// `{base}/seg/seg/...` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in new(): the base url can always take path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send_error(url: &Url, source: reqwest::Error) -> ConductorError {
        if source.is_connect() {
            ConductorError::Connection(format!("{url}: {source}"))
        } else {
            ConductorError::Http {
                url: url.to_string(),
                source,
            }
        }
    }

    async fn read_body(url: &Url, response: reqwest::Response) -> Result<String, ConductorError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| Self::send_error(url, source))?;
        if !status.is_success() {
            return Err(ConductorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Query parameters for a batch poll. Absent `worker_id` / `domain` are left
/// out rather than sent empty.
pub fn batch_poll_query(
    count: usize,
    worker_id: Option<&str>,
    domain: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("count", count.to_string())];
    if let Some(worker_id) = worker_id {
        query.push(("workerid", worker_id.to_string()));
    }
    if let Some(domain) = domain {
        query.push(("domain", domain.to_string()));
    }
    query
}

/// Empty body and `null` both mean "no tasks".
fn parse_poll_body(url: &Url, body: &str) -> Result<Vec<Task>, ConductorError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tasks: Option<Vec<Task>> =
        serde_json::from_str(body).map_err(|source| ConductorError::Decode {
            url: url.to_string(),
            source,
        })?;
    Ok(tasks.unwrap_or_default())
}

#[async_trait]
impl TaskResourceApi for HttpTaskResourceApi {
    async fn batch_poll(
        &self,
        task_name: &str,
        count: usize,
        worker_id: Option<&str>,
        domain: Option<&str>,
    ) -> Result<Vec<Task>, ConductorError> {
        let url = self.endpoint(&["tasks", "poll", "batch", task_name]);
        let response = self
            .client
            .get(url.clone())
            .query(&batch_poll_query(count, worker_id, domain))
            .send()
            .await
            .map_err(|source| Self::send_error(&url, source))?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let body = Self::read_body(&url, response).await?;
        parse_poll_body(&url, &body)
    }

    async fn update_task(&self, result: &TaskResult) -> Result<String, ConductorError> {
        let url = self.endpoint(&["tasks"]);
        let response = self
            .client
            .post(url.clone())
            .json(result)
            .send()
            .await
            .map_err(|source| Self::send_error(&url, source))?;

        Self::read_body(&url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpTaskResourceApi {
        HttpTaskResourceApi::new(&Configuration::new(base).unwrap()).unwrap()
    }

    #[test]
    fn query_omits_absent_optionals() {
        assert_eq!(batch_poll_query(1, None, None), vec![("count", "1".to_string())]);

        let query = batch_poll_query(1, Some("host-1"), Some("staging"));
        assert_eq!(
            query,
            vec![
                ("count", "1".to_string()),
                ("workerid", "host-1".to_string()),
                ("domain", "staging".to_string()),
            ]
        );
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let api = api("http://localhost:8080/api");
        let url = api.endpoint(&["tasks", "poll", "batch", "image resize"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/tasks/poll/batch/image%20resize"
        );
        assert_eq!(api.endpoint(&["tasks"]).as_str(), "http://localhost:8080/api/tasks");
    }

    #[test]
    fn poll_body_variants() {
        let url = Url::parse("http://localhost:8080/api/tasks/poll/batch/x").unwrap();
        assert!(parse_poll_body(&url, "").unwrap().is_empty());
        assert!(parse_poll_body(&url, "null").unwrap().is_empty());
        assert!(parse_poll_body(&url, "[]").unwrap().is_empty());

        let body = r#"[{"taskId":"t","workflowInstanceId":"wf","taskDefName":"x"}]"#;
        let tasks = parse_poll_body(&url, body).unwrap();
        assert_eq!(tasks[0].task_id, "t");

        let err = parse_poll_body(&url, "{not json").unwrap_err();
        assert_eq!(err.kind(), "DecodeError");
    }
}
