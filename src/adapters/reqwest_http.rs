//! Production [`HttpClient`] on top of `reqwest`.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

const USER_AGENT: &str = concat!("confab/", env!("CARGO_PKG_VERSION"));

/// Reqwest-backed transport. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Transport without a request timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::build(reqwest::Client::builder())
    }

    /// Transport whose exchanges are abandoned after `timeout`.
    ///
    /// The timeout covers reading a streamed body too, so keep it generous
    /// for long replies.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        Self::build(reqwest::Client::builder().timeout(timeout))
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self, HttpError> {
        let client = builder
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }

    fn classify(err: reqwest::Error) -> HttpError {
        let message = err.to_string();
        if err.is_timeout() {
            HttpError::Timeout(message)
        } else if err.is_connect() {
            HttpError::ConnectionFailed(message)
        } else if err.is_builder() {
            HttpError::InvalidRequest(message)
        } else if err.is_body() || err.is_decode() {
            HttpError::Body(message)
        } else {
            HttpError::Other(message)
        }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&str>,
        headers: &Headers,
    ) -> Result<reqwest::Response, HttpError> {
        let mut request = self.client.request(method, url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body.to_owned());
        }
        request.send().await.map_err(Self::classify)
    }

    async fn buffered(response: reqwest::Response) -> Result<Response, HttpError> {
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Self::classify)?;
        Ok(Response::new(status, body))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = self.send(reqwest::Method::GET, url, None, headers).await?;
        Self::buffered(response).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = self
            .send(reqwest::Method::POST, url, Some(body), headers)
            .await?;
        Self::buffered(response).await
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let response = self
            .send(reqwest::Method::POST, url, Some(body), headers)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HttpError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(Self::classify)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("confab/"));
    }

    #[test]
    fn test_with_timeout_builds() {
        assert!(ReqwestHttpClient::with_timeout(Duration::from_secs(30)).is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connection_failed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = ReqwestHttpClient::new().unwrap();
        let result = client
            .get(&format!("http://127.0.0.1:{}/", port), &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_post_stream_rejects_error_status() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let result = client.post_stream(&server.uri(), "{}", &Headers::new()).await;
        match result {
            Err(HttpError::ServerError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            _ => panic!("Expected ServerError"),
        }
    }
}
