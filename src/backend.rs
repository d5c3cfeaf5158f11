use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;

use crate::session::ResponseEnvelope;

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
}

/// HTTP client for the question-answering backend.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// One question, one reply. A non-success status is an error just like
    /// a network failure; the session controller treats them uniformly.
    pub async fn ask(&self, query: &str) -> Result<ResponseEnvelope> {
        let url = format!("{}/ask", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { query })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("backend returned status {}", response.status()));
        }

        let envelope: ResponseEnvelope = response.json().await?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn ask_posts_the_query_and_parses_the_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"query": "What is the return policy?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "30 days",
                "intents": ["policies"],
                "latency_ms": 450,
                "sources": ["policy.pdf"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri());
        let reply = client.ask("What is the return policy?").await.unwrap();

        assert_eq!(reply.answer.as_deref(), Some("30 days"));
        assert_eq!(reply.intents, Some(vec!["policies".to_string()]));
        assert_eq!(reply.latency_ms, Some(450));
        assert_eq!(reply.sources, Some(vec!["policy.pdf".to_string()]));
    }

    #[tokio::test]
    async fn ask_rejects_non_success_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri());
        assert!(client.ask("anything").await.is_err());
    }

    #[tokio::test]
    async fn ask_rejects_a_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri());
        assert!(client.ask("anything").await.is_err());
    }

    #[tokio::test]
    async fn ask_tolerates_a_minimal_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "yes"})))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri());
        let reply = client.ask("anything").await.unwrap();
        assert_eq!(reply.answer.as_deref(), Some("yes"));
        assert!(reply.intents.is_none());
        assert!(reply.latency_ms.is_none());
        assert!(reply.sources.is_none());
    }
}
