use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use super::{non_json_body, ClientError, Reply, Transport};

/// Dispatches requests straight into an axum [`Router`] without a socket.
#[derive(Clone)]
pub struct LocalTransport {
    router: Router,
}

impl LocalTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Reply, ClientError> {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?)),
            None => builder.body(Body::empty()),
        }
        .map_err(|err| ClientError::Transport(err.to_string()))?;

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        Ok(Reply {
            status,
            body: non_json_body(&bytes),
        })
    }
}
