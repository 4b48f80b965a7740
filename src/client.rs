use std::env;
use std::fmt;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::assembler::StreamAssembler;
use crate::chunk_stream::process_chunks;
use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_ABANDONED,
    STREAM_DURATION, STREAM_TTFB,
};
use crate::session_id::SessionId;
use crate::types::{
    ApiResponse, ChatRequest, ChatState, ClearedSessions, CreatedSession, Model, ModelUpdate,
    NewSession, SessionInfo, TitleUpdate,
};

const DEFAULT_BASE_URL: &str = "http://localhost:8787/";
const BASE_URL_ENV: &str = "AETHERMIND_BASE_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Callback receiving each decoded chunk of a streamed reply.
///
/// Returning `ControlFlow::Break(())` abandons the stream.
pub type ChunkHandler<'a> = dyn FnMut(&str) -> ControlFlow<()> + Send + 'a;

/// Typed access to the remote chat and session API.
///
/// Session-scoped calls take the session explicitly; implementations hold no notion of an
/// "active" session.  Every method surfaces a failure exactly once and never retries.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends `request` and waits for the full `ChatState` in reply.
    async fn send_message(&self, session: &SessionId, request: ChatRequest) -> Result<ChatState>;

    /// Sends `message` as a streaming request, forwarding each non-empty decoded chunk to
    /// `on_chunk` in receive order.
    ///
    /// Completion carries no payload; callers refetch canonical state with
    /// [`get_messages`](Self::get_messages).  If `on_chunk` breaks, the response body is
    /// released and `Error::Abort` is returned.
    async fn stream_message(
        &self,
        session: &SessionId,
        message: &str,
        model: Option<&Model>,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<()>;

    /// Fetches the session's canonical state.
    async fn get_messages(&self, session: &SessionId) -> Result<ChatState>;

    /// Clears the session's message log.
    async fn clear_messages(&self, session: &SessionId) -> Result<ChatState>;

    /// Selects the model for subsequent turns in the session.
    async fn update_model(&self, session: &SessionId, model: &Model) -> Result<ChatState>;

    /// Registers a session in the directory.
    async fn create_session(&self, request: NewSession) -> Result<CreatedSession>;

    /// Lists the session directory.
    async fn list_sessions(&self) -> Result<Vec<SessionInfo>>;

    /// Removes a session.
    async fn delete_session(&self, session: &SessionId) -> Result<()>;

    /// Renames a session.
    async fn update_session_title(&self, session: &SessionId, title: &str) -> Result<()>;

    /// Removes every session, returning how many were deleted.
    async fn clear_all_sessions(&self) -> Result<usize>;
}

/// HTTP client for the AetherMind chat API.
#[derive(Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl ChatClient {
    /// Create a new chat client.
    ///
    /// The base URL can be provided directly or read from the AETHERMIND_BASE_URL
    /// environment variable, falling back to a local development server.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `timeout` bounds connection setup and every non-streaming request.  Streamed replies
    /// are not bounded as a whole; abandon them through the chunk handler instead.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        let mut base_url = Url::parse(&base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::url(
                format!("{base_url} cannot be used as a base URL"),
                None,
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .connect_timeout(timeout)
            .default_headers(Self::default_headers())
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attaches a logger that observes every response and streamed chunk.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL all endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns a handle scoped to `session_id`.
    pub fn session(&self, session_id: SessionId) -> SessionClient {
        SessionClient {
            client: self.clone(),
            session_id,
        }
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::url(format!("{} cannot be a base", self.base_url), None))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn chat_endpoint(&self, session: &SessionId, action: &str) -> Result<Url> {
        self.endpoint(&["api", "chat", session.as_str(), action])
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Sends the request and turns transport failures and non-2xx statuses into errors.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = request.send().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(self.transport_error(e));
            }
        };
        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Executes a non-streaming request and decodes the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(u16, ApiResponse<T>)> {
        let response = self.execute(request.timeout(self.timeout)).await?;
        let status = response.status().as_u16();
        let envelope = response.json::<ApiResponse<T>>().await.map_err(|e| {
            CLIENT_REQUEST_ERRORS.click();
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })?;
        Ok((status, envelope))
    }

    async fn call_state(
        &self,
        session: &SessionId,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<ChatState> {
        let (status, envelope) = self.call::<ChatState>(request).await?;
        let state = envelope.into_result(status, fallback)?;
        if let Some(logger) = &self.logger {
            logger.log_response(session, &state);
        }
        Ok(state)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorBody {
            error: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let error_message = serde_json::from_str::<ErrorBody>(&error_body)
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if error_body.trim().is_empty() {
                    format!("HTTP {status_code}")
                } else {
                    error_body.clone()
                }
            });

        match status_code {
            400 => Error::bad_request(error_message, None),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message, None, None),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, None, error_message),
        }
    }

    /// Sends a message as a streaming request and returns the decoded text chunks.
    ///
    /// Dropping the returned stream abandons the reply and releases the connection.
    pub async fn stream_chat(
        &self,
        session: &SessionId,
        message: &str,
        model: Option<&Model>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String>> + Send>>> {
        let url = self.chat_endpoint(session, "chat")?;
        let body = ChatRequest::streaming(message, model.cloned());
        let response = self.execute(self.client.post(url).json(&body)).await?;
        Ok(Box::pin(process_chunks(response.bytes_stream())))
    }
}

#[async_trait]
impl ChatApi for ChatClient {
    async fn send_message(&self, session: &SessionId, request: ChatRequest) -> Result<ChatState> {
        let url = self.chat_endpoint(session, "chat")?;
        let request = ChatRequest {
            stream: false,
            ..request
        };
        self.call_state(
            session,
            self.client.post(url).json(&request),
            "Failed to send message",
        )
        .await
    }

    async fn stream_message(
        &self,
        session: &SessionId,
        message: &str,
        model: Option<&Model>,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut stream = self.stream_chat(session, message, model).await?;
        let mut full = String::new();
        let mut assembler = StreamAssembler::new(&mut full);
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    CLIENT_REQUEST_ERRORS.click();
                    return Err(e);
                }
            };
            if assembler.chunk_count() == 0 {
                STREAM_TTFB.add(start.elapsed().as_secs_f64());
            }
            if let Some(logger) = &self.logger {
                logger.log_chunk(session, &chunk);
            }
            assembler.push(&chunk);
            if on_chunk(&chunk).is_break() {
                STREAM_ABANDONED.click();
                return Err(Error::abort("stream abandoned by caller"));
            }
        }
        STREAM_DURATION.add(start.elapsed().as_secs_f64());
        if let Some(logger) = &self.logger {
            logger.log_stream_complete(session, assembler.text());
        }
        Ok(())
    }

    async fn get_messages(&self, session: &SessionId) -> Result<ChatState> {
        let url = self.chat_endpoint(session, "messages")?;
        self.call_state(session, self.client.get(url), "Failed to load messages")
            .await
    }

    async fn clear_messages(&self, session: &SessionId) -> Result<ChatState> {
        let url = self.chat_endpoint(session, "clear")?;
        self.call_state(session, self.client.delete(url), "Failed to clear messages")
            .await
    }

    async fn update_model(&self, session: &SessionId, model: &Model) -> Result<ChatState> {
        let url = self.chat_endpoint(session, "model")?;
        let body = ModelUpdate {
            model: model.clone(),
        };
        self.call_state(
            session,
            self.client.post(url).json(&body),
            "Failed to update model",
        )
        .await
    }

    async fn create_session(&self, request: NewSession) -> Result<CreatedSession> {
        let url = self.endpoint(&["api", "sessions"])?;
        let (status, envelope) = self
            .call::<CreatedSession>(self.client.post(url).json(&request))
            .await?;
        envelope.into_result(status, "Failed to create session")
    }

    async fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        let url = self.endpoint(&["api", "sessions"])?;
        let (status, envelope) = self.call::<Vec<SessionInfo>>(self.client.get(url)).await?;
        envelope.into_result(status, "Failed to list sessions")
    }

    async fn delete_session(&self, session: &SessionId) -> Result<()> {
        let url = self.endpoint(&["api", "sessions", session.as_str()])?;
        let (status, envelope) = self
            .call::<serde_json::Value>(self.client.delete(url))
            .await?;
        envelope.into_unit(status, "Failed to delete session")?;
        Ok(())
    }

    async fn update_session_title(&self, session: &SessionId, title: &str) -> Result<()> {
        let url = self.endpoint(&["api", "sessions", session.as_str(), "title"])?;
        let body = TitleUpdate {
            title: title.to_string(),
        };
        let (status, envelope) = self
            .call::<serde_json::Value>(self.client.put(url).json(&body))
            .await?;
        envelope.into_unit(status, "Failed to update title")?;
        Ok(())
    }

    async fn clear_all_sessions(&self) -> Result<usize> {
        let url = self.endpoint(&["api", "sessions"])?;
        let (status, envelope) = self
            .call::<ClearedSessions>(self.client.delete(url))
            .await?;
        let cleared = envelope.into_unit(status, "Failed to clear all sessions")?;
        Ok(cleared.map(|c| c.deleted_count).unwrap_or(0))
    }
}

/// A [`ChatClient`] bound to one session.
///
/// The handle owns its session id; [`new_session`](Self::new_session) and
/// [`switch_session`](Self::switch_session) change it without contacting the network.
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: ChatClient,
    session_id: SessionId,
}

impl SessionClient {
    /// The session this handle is bound to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The underlying client, for directory operations.
    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Rebinds the handle to a freshly generated session id.
    pub fn new_session(&mut self) -> &SessionId {
        self.session_id = SessionId::generate();
        &self.session_id
    }

    /// Rebinds the handle to `session_id`.
    pub fn switch_session(&mut self, session_id: SessionId) {
        self.session_id = session_id;
    }

    /// Sends a message and waits for the complete reply.
    pub async fn send_message(&self, text: &str, model: Option<&Model>) -> Result<ChatState> {
        self.client
            .send_message(&self.session_id, ChatRequest::new(text, model.cloned()))
            .await
    }

    /// Sends a message and forwards every streamed chunk to `on_chunk`.
    pub async fn send_message_streaming<F>(
        &self,
        text: &str,
        model: Option<&Model>,
        mut on_chunk: F,
    ) -> Result<()>
    where
        F: FnMut(&str) + Send,
    {
        let mut handler = |chunk: &str| {
            on_chunk(chunk);
            ControlFlow::Continue(())
        };
        self.client
            .stream_message(&self.session_id, text, model, &mut handler)
            .await
    }

    /// Fetches the session's canonical state.
    pub async fn get_messages(&self) -> Result<ChatState> {
        self.client.get_messages(&self.session_id).await
    }

    /// Clears the session's messages.
    pub async fn clear_messages(&self) -> Result<ChatState> {
        self.client.clear_messages(&self.session_id).await
    }

    /// Selects the model for the session.
    pub async fn update_model(&self, model: &Model) -> Result<ChatState> {
        self.client.update_model(&self.session_id, model).await
    }
}
