use crate::failure::UpstreamFailure;

impl UpstreamFailure {
    /// Build a failure from an upstream response, consuming its body
    ///
    /// The message is the status line (`502 Bad Gateway`). A body that cannot
    /// be read is reported as empty.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let message = response.status().to_string();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "failed to read upstream error body");
                String::new()
            }
        };

        Self::new(message, body)
    }
}
