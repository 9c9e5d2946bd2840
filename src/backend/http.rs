use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Response, Url};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    BackendError, ObjectStorage, ProgressCallback, Subscription, SUBSCRIPTION_BUFFER, TodoModel,
    TransferProgress,
};
use crate::api::models::{CreateTodoRequest, ErrorResponse, TodoListResponse};
use crate::todo::{CreateTodoInput, TodoItem};

/// Size of each body chunk handed to the transport; progress fires per chunk.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Client for the reference backend's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Network(format!("invalid backend URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Network(format!(
                "invalid backend URL {base_url}"
            )));
        }

        let client = Client::builder()
            .user_agent("cloud-todo")
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `/api/objects/<key>` with the whole key as one encoded segment, so `/`
    /// becomes `%2F` and dot segments inside the key survive unchanged.
    fn object_url(&self, key: &str) -> Result<Url, BackendError> {
        if matches!(key, "." | "..") {
            return Err(BackendError::InvalidKey(format!(
                "object key {key:?} cannot be sent as a path"
            )));
        }
        Ok(self.endpoint(["api", "objects", key]))
    }

    pub async fn health(&self) -> bool {
        let request = self
            .client
            .get(self.endpoint(["api", "health"]))
            .timeout(self.timeout);
        matches!(request.send().await, Ok(response) if response.status().is_success())
    }

}

/// Turns a non-success response into a typed error carrying the server's message.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => fallback,
    };
    Err(BackendError::from_status(status.as_u16(), message))
}

/// Splits complete lines off the front of `buffer`, leaving any partial line.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

impl TodoModel for HttpBackend {
    async fn observe_query(&self) -> Result<Subscription, BackendError> {
        let url = self.endpoint(["api", "todos", "observe"]);
        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;
        info!(url = %self.base_url, "live query connected");

        let mut body = response.bytes_stream();
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

        let forwarder = tokio::spawn(async move {
            let mut buffer = Vec::new();
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => buffer.extend_from_slice(&bytes),
                    Err(e) => {
                        warn!(error = %e, "live query stream failed");
                        return;
                    }
                }

                for line in drain_lines(&mut buffer) {
                    match serde_json::from_slice::<TodoListResponse>(&line) {
                        Ok(snapshot) => {
                            if tx.send(snapshot.into()).await.is_err() {
                                debug!("live query receiver dropped");
                                return;
                            }
                        }
                        Err(e) => warn!(error = %e, "skipping undecodable snapshot"),
                    }
                }
            }
            info!("live query stream ended");
        });

        Ok(Subscription::new(rx, forwarder))
    }

    async fn create(&self, input: CreateTodoInput) -> Result<TodoItem, BackendError> {
        let response = self
            .client
            .post(self.endpoint(["api", "todos"]))
            .timeout(self.timeout)
            .json(&CreateTodoRequest::from(&input))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

impl ObjectStorage for HttpBackend {
    async fn put(
        &self,
        key: &str,
        payload: Vec<u8>,
        mut progress: ProgressCallback,
    ) -> Result<(), BackendError> {
        let url = self.object_url(key)?;
        let total = payload.len() as u64;

        if total == 0 {
            progress(TransferProgress { loaded: 0, total });
        }

        let chunks: Vec<Vec<u8>> = payload
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();
        let mut loaded = 0u64;
        let body = futures_util::stream::iter(chunks).map(move |chunk| {
            loaded += chunk.len() as u64;
            progress(TransferProgress { loaded, total });
            Ok::<_, std::io::Error>(chunk)
        });

        debug!(key, total, "uploading object");
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, total)
            .body(Body::wrap_stream(body))
            .send()
            .await?;
        check_status(response).await?;

        info!(key, total, "object uploaded");
        Ok(())
    }
}
