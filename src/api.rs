//! Client for the remote `cuzlers` resource.

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::cuz::Cuz;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct CuzlerList {
    response: Vec<Cuz>,
}

#[derive(Debug, Serialize)]
struct NameUpdate<'a> {
    #[serde(rename = "personName")]
    person_name: &'a str,
}

/// Talks to `GET /cuzlers` and `PATCH /cuzlers/{id}`.
///
/// Every call is a single round trip: no retries and no caching.
#[derive(Debug, Clone)]
pub struct CuzlerClient {
    http: Client,
    base_url: String,
}

impl CuzlerClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        CuzlerClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches every record of every hatim, in the order the server sends them.
    pub async fn fetch_all(&self) -> Result<Vec<Cuz>, ApiError> {
        let url = format!("{}/cuzlers", self.base_url);
        let response = check_status(self.http.get(&url).send().await?)?;
        let list: CuzlerList = response.json().await?;
        Ok(list.response)
    }

    /// Sets (or with `""`, clears) the name on one record.
    pub async fn update_person_name(&self, id: &str, name: &str) -> Result<(), ApiError> {
        let url = format!("{}/cuzlers/{}", self.base_url, urlencoding::encode(id));
        let response = self
            .http
            .patch(&url)
            .json(&NameUpdate { person_name: name })
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_all_reads_response_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cuzlers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [
                    {"_id": "b", "hatimNumber": 1, "cuzNumber": 2, "personName": "Ali"},
                    {"_id": "a", "hatimNumber": 1, "cuzNumber": 1}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CuzlerClient::new(&server.uri());
        let records = client.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "b");
        assert_eq!(records[0].name(), "Ali");
        assert_eq!(records[1].person_name, None);
    }

    #[tokio::test]
    async fn fetch_all_fails_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cuzlers"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = CuzlerClient::new(&server.uri());
        match client.fetch_all().await {
            Err(ApiError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_all_fails_on_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cuzlers"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = CuzlerClient::new(&server.uri());
        assert!(matches!(client.fetch_all().await, Err(ApiError::Http(_))));
    }

    #[tokio::test]
    async fn update_sends_person_name_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/cuzlers/abc"))
            .and(body_json(serde_json::json!({"personName": ""})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "abc", "hatimNumber": 1, "cuzNumber": 1, "personName": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CuzlerClient::new(&format!("{}/", server.uri()));
        client.update_person_name("abc", "").await.unwrap();
    }

    #[tokio::test]
    async fn update_fails_on_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = CuzlerClient::new(&server.uri());
        let err = client.update_person_name("missing", "Ali").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }
}
