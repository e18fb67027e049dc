use std::time::Duration;

use async_trait::async_trait;
use courier_core::SendResult;
use courier_gateway::{Escalation, EscalationError};
use reqwest::Client;
use tracing::{info, instrument};

/// Escalates exhausted sends by POSTing the failed [`SendResult`] as JSON to
/// an operator endpoint.
pub struct WebhookEscalation {
    url: String,
    client: Client,
}

impl WebhookEscalation {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EscalationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EscalationError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl Escalation for WebhookEscalation {
    #[instrument(skip(self, result), fields(message_id = %result.message_id, url = %self.url))]
    async fn escalate(&self, result: &SendResult) -> Result<(), EscalationError> {
        let response = self
            .client
            .post(&self.url)
            .json(result)
            .send()
            .await
            .map_err(|e| EscalationError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EscalationError(format!("HTTP {status}: {body}")));
        }
        info!(attempts = result.attempts.len(), "exhausted send escalated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use courier_core::MessageId;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    async fn respond_once(listener: tokio::net::TcpListener, status_code: u16) -> String {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 16384];
        let n = stream.read(&mut buf).await.unwrap();
        buf.truncate(n);

        let response = format!(
            "HTTP/1.1 {status_code} OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn posts_failed_result() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let escalation =
            WebhookEscalation::new(format!("http://127.0.0.1:{port}/hook"), Duration::from_secs(5))
                .unwrap();

        let handle = tokio::spawn(respond_once(listener, 200));
        let result = SendResult::failed(MessageId::new("m-42"), Vec::new());
        escalation.escalate(&result).await.unwrap();

        let request = handle.await.unwrap();
        assert!(request.starts_with("POST /hook "));
        assert!(request.contains("m-42"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let escalation =
            WebhookEscalation::new(format!("http://127.0.0.1:{port}"), Duration::from_secs(5))
                .unwrap();

        let handle = tokio::spawn(respond_once(listener, 500));
        let result = SendResult::failed(MessageId::new("m-1"), Vec::new());
        let err = escalation.escalate(&result).await.unwrap_err();
        handle.await.unwrap();

        assert!(err.to_string().contains("500"));
    }
}
