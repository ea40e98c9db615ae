//! A backend that talks to the career assistant service over HTTP.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use career_chat_model::{
    Backend, BackendError, ConversationSummary, ConversationTranscript,
    Credentials, ErrorKind, PerformanceMetrics, Registration, TurnReply,
    TurnRequest, User,
};
use mime::Mime;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use config::{DEFAULT_BASE_URL, HttpBackendConfig, HttpBackendConfigBuilder};
use proto::{AuthResponse, ChatResponse, PerformanceResponse};

/// Error type for [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    #[inline]
    fn transport(message: impl Into<String>) -> Self {
        Self::new(message, ErrorKind::TransportFailure)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Builds the error for a non-success response.
    fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = proto::error_reason(body).unwrap_or_else(|| {
            format!("request failed with status {}", status.as_u16())
        });
        let kind = if status == StatusCode::NOT_FOUND {
            ErrorKind::NotFound
        } else {
            ErrorKind::TransportFailure
        };
        Self::new(message, kind)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// The career assistant backend, reached over HTTP with JSON bodies.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<HttpBackendConfig>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    pub fn new(config: HttpBackendConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| Error::transport(format!("{err}")))?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Resolves an endpoint against the base URL, escaping every segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = Url::parse(&self.config.base_url).map_err(|err| {
            Error::transport(format!(
                "invalid base URL {:?}: {err}",
                self.config.base_url
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::transport(format!(
                    "base URL {:?} cannot have a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, Error> {
        let url = self.endpoint(segments)?;
        debug!("{method} {url}");
        Ok(self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json"))
    }

    fn get<T>(
        &self,
        segments: &[&str],
    ) -> impl Future<Output = Result<T, Error>> + Send + 'static + use<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        execute(self.request(Method::GET, segments))
    }

    fn post<B, T>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> impl Future<Output = Result<T, Error>> + Send + 'static + use<B, T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let req = self.request(Method::POST, segments).map(|req| {
            req.header(header::CONTENT_TYPE, "application/json")
                .json(body)
        });
        execute(req)
    }
}

impl Backend for HttpBackend {
    type Error = Error;

    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'static {
        let fut = self.post::<_, AuthResponse>(&["auth", "login"], credentials);
        async move { fut.await.map(|resp| resp.user) }
    }

    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'static {
        let fut =
            self.post::<_, AuthResponse>(&["auth", "register"], registration);
        async move { fut.await.map(|resp| resp.user) }
    }

    fn submit_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<TurnReply, Self::Error>> + Send + 'static
    {
        let fut = self.post::<_, ChatResponse>(&["chat"], req);
        async move { fut.await.map(TurnReply::from) }
    }

    fn list_conversations(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>, Self::Error>>
    + Send
    + 'static {
        self.get(&["conversations", user_id])
    }

    fn fetch_transcript(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<ConversationTranscript, Self::Error>>
    + Send
    + 'static {
        self.get(&["transcripts", conversation_id])
    }

    fn fetch_performance(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<PerformanceMetrics, Self::Error>>
    + Send
    + 'static {
        let fut = self.get::<PerformanceResponse>(&["performance", user_id]);
        async move { fut.await.map(|resp| resp.metrics) }
    }
}

async fn execute<T: DeserializeOwned>(
    req: Result<RequestBuilder, Error>,
) -> Result<T, Error> {
    let resp = match req?.send().await {
        Ok(resp) => resp,
        Err(err) => {
            warn!("request failed: {err}");
            return Err(Error::transport(format!("{err}")));
        }
    };
    read_response(resp).await
}

async fn read_response<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.bytes().await.unwrap_or_default();
        let err = Error::from_status(status, &body);
        warn!("got status {status}: {err}");
        return Err(err);
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    if let Some(content_type) = &content_type {
        let is_json = content_type
            .parse::<Mime>()
            .map(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
            .unwrap_or(false);
        if !is_json {
            return Err(Error::transport(format!(
                "unexpected content type: {content_type}"
            )));
        }
    }

    // Here we got a successful response.
    let body = resp
        .bytes()
        .await
        .map_err(|err| Error::transport(format!("{err}")))?;
    trace!("got response body: {}", String::from_utf8_lossy(&body));
    serde_json::from_slice(&body).map_err(|err| {
        Error::transport(format!("malformed response body: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    async fn bind() -> (String, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        (base_url, listener)
    }

    /// Serves exactly one request with a canned response, and hands the raw
    /// request back.
    async fn serve_once(
        listener: TcpListener,
        status_line: &'static str,
        body: &'static str,
    ) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if !name.eq_ignore_ascii_case("content-length") {
                            return None;
                        }
                        value.trim().parse::<usize>().ok()
                    })
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + content_length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).to_string()
    }

    fn backend(base_url: &str) -> HttpBackend {
        // Keep the requests away from any proxy configured in the
        // environment.
        let client = Client::builder().no_proxy().build().unwrap();
        let config =
            HttpBackendConfigBuilder::new().with_base_url(base_url).build();
        HttpBackend {
            client,
            config: Arc::new(config),
        }
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let backend = backend("http://localhost:8000/api/");
        let url = backend.endpoint(&["conversations", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/conversations/a%20b%2Fc"
        );
    }

    #[test]
    fn test_error_from_status() {
        let err = Error::from_status(
            StatusCode::UNAUTHORIZED,
            br#"{"detail": "Invalid email or password"}"#,
        );
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert_eq!(err.message(), "Invalid email or password");

        let err = Error::from_status(StatusCode::NOT_FOUND, b"");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "request failed with status 404");

        let err = Error::from_status(StatusCode::BAD_GATEWAY, b"<html></html>");
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert_eq!(err.message(), "request failed with status 502");
    }

    #[tokio::test]
    async fn test_submit_turn() {
        let (base_url, listener) = bind().await;
        let server = serve_once(
            listener,
            "HTTP/1.1 200 OK",
            r#"{"response": {"user_id": "u-1", "user_query": "hi", "bot_reply": "Hello!", "query_summary": "Greeting", "time": "2024-05-01T10:00:00", "intent": "DEFAULT-NORMAL", "sentiment": "happy"}, "conversation_id": "c-1"}"#,
        );
        let req = TurnRequest {
            user_id: "u-1".to_owned(),
            query: "hi".to_owned(),
            session_id: None,
        };
        let (reply, raw_request) =
            tokio::join!(backend(&base_url).submit_turn(&req), server);
        let reply = reply.unwrap();
        assert_eq!(reply.reply_text, "Hello!");
        assert_eq!(reply.new_conversation_id.as_deref(), Some("c-1"));

        let raw_request = raw_request.to_ascii_lowercase();
        assert!(raw_request.starts_with("post /chat "));
        assert!(raw_request.contains("content-type: application/json"));
        assert!(raw_request.contains(r#""query":"hi""#));
        assert!(!raw_request.contains("session_id"));
    }

    #[tokio::test]
    async fn test_not_found_transcript() {
        let (base_url, listener) = bind().await;
        let server = serve_once(
            listener,
            "HTTP/1.1 404 Not Found",
            r#"{"detail": "Conversation not found"}"#,
        );
        let (result, raw_request) =
            tokio::join!(backend(&base_url).fetch_transcript("c-404"), server);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "Conversation not found");
        assert!(raw_request.starts_with("GET /transcripts/c-404 "));
    }

    #[tokio::test]
    async fn test_server_error_on_listing() {
        let (base_url, listener) = bind().await;
        let server =
            serve_once(listener, "HTTP/1.1 500 Internal Server Error", "{}");
        let (result, _) =
            tokio::join!(backend(&base_url).list_conversations("u-1"), server);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert_eq!(err.message(), "request failed with status 500");
    }

    #[tokio::test]
    async fn test_requests_can_be_spawned() {
        let (base_url, listener) = bind().await;
        let backend = backend(&base_url);
        let user_id = "u-1".to_owned();
        let task = tokio::spawn(backend.list_conversations(&user_id));
        drop(user_id);

        let raw_request = serve_once(listener, "HTTP/1.1 200 OK", "[]").await;
        assert!(raw_request.starts_with("GET /conversations/u-1 "));
        assert!(task.await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let (base_url, listener) = bind().await;
        drop(listener);

        let err = backend(&base_url)
            .list_conversations("u-1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
    }
}
