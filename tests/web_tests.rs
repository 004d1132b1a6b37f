//! Handler-level tests for the JSON web backend.

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Json;

use chatrelay::connector::web::handlers::{
    chat_api, history_api, quit_api, ChatFailure, ChatReply, ChatRequest, HistoryResponse,
    QuitResponse,
};
use chatrelay::connector::web::{WebState, SESSION_HEADER};
use chatrelay::{MockChatClient, Role, SinglePromptUseCase};

fn state(client: MockChatClient) -> Arc<WebState> {
    Arc::new(WebState::new(SinglePromptUseCase::new(
        Arc::new(client),
        "mock-model",
    )))
}

fn session(id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(SESSION_HEADER, HeaderValue::from_str(id).unwrap());
    headers
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
    }
}

async fn body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_returns_reply_and_html() {
    let state = state(MockChatClient::new().with_reply("Hello", "**Hi** there"));

    let response = chat_api(State(state.clone()), session("s1"), Ok(Json(request("Hello")))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SESSION_HEADER], "s1");
    let reply: ChatReply = body(response).await;
    assert!(reply.ok);
    assert_eq!(reply.reply, "**Hi** there");
    assert!(reply.html.contains("<strong>Hi</strong>"));
    assert_eq!(reply.session_id, "s1");
}

#[tokio::test]
async fn test_blank_message_is_bad_request() {
    let state = state(MockChatClient::new());

    let response = chat_api(State(state.clone()), session("s1"), Ok(Json(request("   ")))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.sessions().entries("s1").await.is_empty());
}

#[tokio::test]
async fn test_failure_returns_500_and_keeps_history() {
    let state = state(
        MockChatClient::new()
            .with_reply("first", "ok")
            .with_failure("second", "upstream down"),
    );

    chat_api(State(state.clone()), session("s1"), Ok(Json(request("first")))).await;
    let response = chat_api(State(state.clone()), session("s1"), Ok(Json(request("second")))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let failure: ChatFailure = body(response).await;
    assert!(!failure.ok);
    assert!(failure.error.contains("upstream down"));

    let history: HistoryResponse = body(history_api(State(state.clone()), session("s1")).await).await;
    assert_eq!(history.history.len(), 2);
    assert_eq!(history.history[0].role(), Role::User);
    assert_eq!(history.history[1].text(), "ok");
}

#[tokio::test]
async fn test_quit_returns_and_clears_history() {
    let state = state(MockChatClient::new());
    chat_api(State(state.clone()), session("s1"), Ok(Json(request("Hello")))).await;
    chat_api(State(state.clone()), session("s2"), Ok(Json(request("other")))).await;

    let quit: QuitResponse = body(quit_api(State(state.clone()), session("s1")).await).await;

    assert!(quit.quit);
    assert_eq!(quit.history.len(), 2);
    assert!(state.sessions().entries("s1").await.is_empty());
    assert_eq!(state.sessions().entries("s2").await.len(), 2);
}

#[tokio::test]
async fn test_missing_session_header_mints_one() {
    let state = state(MockChatClient::new());

    let response = chat_api(State(state.clone()), HeaderMap::new(), Ok(Json(request("Hi")))).await;

    let minted = response.headers()[SESSION_HEADER].to_str().unwrap().to_string();
    assert!(!minted.is_empty());
    let reply: ChatReply = body(response).await;
    assert_eq!(reply.session_id, minted);
    assert_eq!(state.sessions().entries(&minted).await.len(), 2);
}
