//! Integration tests for the AetherMind client.
//! These tests run the client against an in-process fake of the chat API.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::ops::ControlFlow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{delete, get, post, put};
    use axum::{Json, Router};
    use bytes::Bytes;
    use futures::StreamExt;
    use serde_json::{Value, json};

    use aethermind::{
        ChatApi, ChatClient, ChatRequest, ChatState, ChatStore, ClientLogger, Message, Model,
        NewSession, Renderer, SessionId, ToolCall,
    };

    const REPLY_CHUNKS: [&[u8]; 4] = [
        b"The capital ",
        b"of France is Paris. Caf",
        b"\xC3",
        b"\xA9 au lait?",
    ];
    const REPLY_TEXT: &str = "The capital of France is Paris. Café au lait?";

    #[derive(Default)]
    struct Server {
        chats: HashMap<String, Vec<Value>>,
        models: HashMap<String, String>,
        sessions: Vec<Value>,
        clock: i64,
    }

    type Shared = Arc<Mutex<Server>>;

    impl Server {
        fn tick(&mut self) -> i64 {
            self.clock += 1;
            self.clock
        }

        fn state(&self, id: &str) -> Value {
            json!({
                "sessionId": id,
                "messages": self.chats.get(id).cloned().unwrap_or_default(),
                "isProcessing": false,
                "model": self.models.get(id).cloned().unwrap_or_else(|| "qwen/qwen-turbo".to_string()),
                "streamingMessage": ""
            })
        }

        fn answer(&mut self, id: &str, message: &str, reply: &str) {
            let now = self.tick();
            let chat = self.chats.entry(id.to_string()).or_default();
            chat.push(json!({"id": format!("u-{now}"), "role": "user", "content": message, "timestamp": now}));
            chat.push(json!({
                "id": format!("a-{now}"),
                "role": "assistant",
                "content": reply,
                "timestamp": now,
                "toolCalls": [{"name": "web_search", "result": {"content": "Search results for France"}}]
            }));
        }
    }

    fn ok(data: Value) -> Response {
        Json(json!({"success": true, "data": data})).into_response()
    }

    fn failed(status: StatusCode, error: &str) -> Response {
        (status, Json(json!({"success": false, "error": error}))).into_response()
    }

    async fn chat(
        State(server): State<Shared>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        let message = body["message"].as_str().unwrap_or_default().to_string();
        if message == "fail" {
            return failed(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        }
        let mut server = server.lock().unwrap();
        if let Some(model) = body["model"].as_str() {
            server.models.insert(id.clone(), model.to_string());
        }
        server.answer(&id, &message, REPLY_TEXT);
        if body["stream"].as_bool().unwrap_or(false) {
            let chunks = REPLY_CHUNKS
                .iter()
                .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(*c)))
                .collect::<Vec<_>>();
            Response::new(Body::from_stream(futures::stream::iter(chunks)))
        } else {
            ok(server.state(&id))
        }
    }

    async fn messages(State(server): State<Shared>, Path(id): Path<String>) -> Response {
        ok(server.lock().unwrap().state(&id))
    }

    async fn clear(State(server): State<Shared>, Path(id): Path<String>) -> Response {
        let mut server = server.lock().unwrap();
        server.chats.remove(&id);
        ok(server.state(&id))
    }

    async fn model(
        State(server): State<Shared>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        let Some(model) = body["model"].as_str() else {
            return failed(StatusCode::BAD_REQUEST, "model is required");
        };
        let mut server = server.lock().unwrap();
        server.models.insert(id.clone(), model.to_string());
        ok(server.state(&id))
    }

    async fn create_session(State(server): State<Shared>, Json(body): Json<Value>) -> Response {
        let mut server = server.lock().unwrap();
        let now = server.tick();
        let id = body["sessionId"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("s-{now}"));
        let title = body["title"].as_str().unwrap_or("New Chat").to_string();
        server.sessions.push(json!({"id": id, "title": title, "createdAt": now, "lastActive": now}));
        ok(json!({"sessionId": id, "title": title}))
    }

    async fn list_sessions(State(server): State<Shared>) -> Response {
        ok(Value::Array(server.lock().unwrap().sessions.clone()))
    }

    async fn clear_sessions(State(server): State<Shared>) -> Response {
        let mut server = server.lock().unwrap();
        let count = server.sessions.len();
        server.sessions.clear();
        server.chats.clear();
        ok(json!({"deletedCount": count}))
    }

    async fn delete_session(State(server): State<Shared>, Path(id): Path<String>) -> Response {
        let mut server = server.lock().unwrap();
        let before = server.sessions.len();
        server.sessions.retain(|s| s["id"] != id.as_str());
        if server.sessions.len() == before {
            return failed(StatusCode::NOT_FOUND, "Session not found");
        }
        server.chats.remove(&id);
        Json(json!({"success": true})).into_response()
    }

    async fn rename_session(
        State(server): State<Shared>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        let mut server = server.lock().unwrap();
        let title = body["title"].clone();
        match server.sessions.iter_mut().find(|s| s["id"] == id.as_str()) {
            Some(session) => {
                session["title"] = title;
                Json(json!({"success": true})).into_response()
            }
            None => failed(StatusCode::NOT_FOUND, "Session not found"),
        }
    }

    async fn spawn_server() -> (SocketAddr, Shared) {
        let shared = Shared::default();
        let app = Router::new()
            .route("/api/chat/{id}/chat", post(chat))
            .route("/api/chat/{id}/messages", get(messages))
            .route("/api/chat/{id}/clear", delete(clear))
            .route("/api/chat/{id}/model", post(model))
            .route(
                "/api/sessions",
                post(create_session).get(list_sessions).delete(clear_sessions),
            )
            .route("/api/sessions/{id}", delete(delete_session))
            .route("/api/sessions/{id}/title", put(rename_session))
            .with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, shared)
    }

    async fn client() -> (ChatClient, Shared) {
        let (addr, shared) = spawn_server().await;
        let client = ChatClient::new(Some(format!("http://{addr}/"))).unwrap();
        (client, shared)
    }

    #[derive(Default)]
    struct Recorder {
        text: String,
        chunks: usize,
        errors: Vec<String>,
    }

    impl Renderer for Recorder {
        fn print_text(&mut self, text: &str) {
            self.text.push_str(text);
            self.chunks += 1;
        }

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn print_info(&mut self, _: &str) {}

        fn print_message(&mut self, _: &Message) {}

        fn print_tool_call(&mut self, _: &ToolCall) {}

        fn finish_response(&mut self) {}
    }

    #[tokio::test]
    async fn france_question_round_trip() {
        let (client, _) = client().await;
        let mut store = ChatStore::new(client, Model::default());
        let mut recorder = Recorder::default();
        let session = store.session_id().clone();

        let state = store
            .submit("What is the capital of France?", &mut recorder)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.session_id, session);
        assert_eq!(state.messages.len(), 2);
        assert!(state.messages[0].is_user());
        assert_eq!(state.messages[1].content, REPLY_TEXT);
        assert_eq!(state.messages[1].tool_calls[0].summary(), "Web Search: Results found");
        assert!(!state.is_processing);
        assert!(state.streaming_message.is_empty());
        assert_eq!(recorder.text, REPLY_TEXT);
        assert!(recorder.errors.is_empty());

        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.sessions()[0].id, session);
        assert!(store.sessions()[0].title.contains("What is the capital of France?"));
    }

    #[tokio::test]
    async fn split_characters_are_reassembled() {
        let (client, _) = client().await;
        let session = SessionId::from("utf8");
        let stream = client.stream_chat(&session, "hi", None).await.unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert!(chunks.iter().all(|c| !c.is_empty()));
        assert_eq!(chunks.concat(), REPLY_TEXT);
    }

    #[tokio::test]
    async fn breaking_out_of_a_stream_aborts() {
        let (client, _) = client().await;
        let session = SessionId::from("abort");
        let mut seen = 0;
        let mut on_chunk = |_: &str| {
            seen += 1;
            ControlFlow::Break(())
        };
        let err = client
            .stream_message(&session, "hi", None, &mut on_chunk)
            .await
            .unwrap_err();
        assert!(err.is_abort());
        assert_eq!(seen, 1);
    }

    #[tokio::test]
    async fn failed_send_is_reported_and_reconciled() {
        let (client, _) = client().await;
        let mut store = ChatStore::new(client, Model::default());
        let mut recorder = Recorder::default();

        let err = store.submit("fail", &mut recorder).await.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.message(), "upstream exploded");
        assert_eq!(recorder.errors, vec!["upstream exploded".to_string()]);
        assert!(!store.state().is_processing);
        assert!(store.state().messages.is_empty());
    }

    #[tokio::test]
    async fn whole_replies_without_streaming() {
        let (client, _) = client().await;
        let handle = client.session(SessionId::from("plain"));
        let state = handle
            .send_message("hi", Some(&Model::from("deepseek/deepseek-chat")))
            .await
            .unwrap();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.model, Model::from("deepseek/deepseek-chat"));

        let state = handle.get_messages().await.unwrap();
        assert_eq!(state.messages[1].content, REPLY_TEXT);

        let state = handle.clear_messages().await.unwrap();
        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn session_directory_operations() {
        let (client, _) = client().await;
        let created = client
            .create_session(NewSession::new().with_title("Fusion"))
            .await
            .unwrap();
        assert_eq!(created.title, "Fusion");
        client
            .create_session(NewSession::new().with_session_id(SessionId::from("fixed")))
            .await
            .unwrap();

        let sessions = client.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].id.as_str(), "fixed");

        client
            .update_session_title(&created.session_id, "Fusion energy")
            .await
            .unwrap();
        let sessions = client.list_sessions().await.unwrap();
        assert_eq!(sessions[0].title, "Fusion energy");

        client.delete_session(&created.session_id).await.unwrap();
        assert_eq!(client.clear_all_sessions().await.unwrap(), 1);
        assert!(client.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_statuses_are_typed() {
        let (client, _) = client().await;
        let err = client
            .delete_session(&SessionId::from("missing"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "Session not found");
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn deleting_active_session_starts_a_new_one() {
        let (client, _) = client().await;
        let mut store = ChatStore::new(client, Model::default());
        let mut recorder = Recorder::default();
        store.submit("hello", &mut recorder).await.unwrap();
        let active = store.session_id().clone();

        store.delete_session(&active).await.unwrap();
        assert_ne!(store.session_id(), &active);
        assert!(store.state().messages.is_empty());
        assert!(store.sessions().is_empty());
    }

    #[tokio::test]
    async fn refreshing_twice_yields_the_same_list() {
        let (client, _) = client().await;
        for title in ["One", "Two"] {
            client
                .create_session(NewSession::new().with_title(title))
                .await
                .unwrap();
        }
        let mut store = ChatStore::new(client, Model::default());
        let first = store.refresh_sessions().await.unwrap().to_vec();
        let second = store.refresh_sessions().await.unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn model_changes_round_trip() {
        let (client, shared) = client().await;
        let mut store = ChatStore::new(client, Model::default());
        let state = store
            .change_model(Model::from("qwen/qwen-plus"))
            .await
            .unwrap();
        assert_eq!(state.model.display_name(), "Qwen Plus");
        let id = store.session_id().to_string();
        assert_eq!(
            shared.lock().unwrap().models.get(&id).map(String::as_str),
            Some("qwen/qwen-plus")
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ChatClient::new(Some(format!("http://{addr}/"))).unwrap();
        let err = client.list_sessions().await.unwrap_err();
        assert!(err.is_connection());
        assert!(err.is_retryable());
    }

    #[derive(Default)]
    struct CountingLogger {
        responses: AtomicUsize,
        chunks: AtomicUsize,
        completed: Mutex<Vec<String>>,
    }

    impl ClientLogger for CountingLogger {
        fn log_response(&self, _: &SessionId, _: &ChatState) {
            self.responses.fetch_add(1, Ordering::Relaxed);
        }

        fn log_chunk(&self, _: &SessionId, _: &str) {
            self.chunks.fetch_add(1, Ordering::Relaxed);
        }

        fn log_stream_complete(&self, _: &SessionId, text: &str) {
            self.completed.lock().unwrap().push(text.to_string());
        }
    }

    #[tokio::test]
    async fn logger_sees_chunks_and_responses() {
        let (client, _) = client().await;
        let logger = Arc::new(CountingLogger::default());
        let client = client.with_logger(logger.clone());
        let session = SessionId::from("logged");

        let mut on_chunk = |_: &str| ControlFlow::Continue(());
        client
            .stream_message(&session, "hi", None, &mut on_chunk)
            .await
            .unwrap();
        client
            .send_message(&session, ChatRequest::new("again", None))
            .await
            .unwrap();

        assert!(logger.chunks.load(Ordering::Relaxed) >= 1);
        assert_eq!(logger.responses.load(Ordering::Relaxed), 1);
        assert_eq!(*logger.completed.lock().unwrap(), vec![REPLY_TEXT.to_string()]);
    }
}
