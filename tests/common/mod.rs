//! Common test utilities - stub inference server and recording chat

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use image::{ImageBuffer, ImageFormat, Rgb};
use imagebot::bot::{Generator, Replier};
use imagebot::inference::InferenceClient;
use imagebot::{BotError, BotResult, Config};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as the stub server saw it
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: Bytes,
    delay: Duration,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Inference endpoint stand-in that answers every POST the same way
pub struct StubInference {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    _handle: JoinHandle<()>,
}

impl StubInference {
    /// Start a stub on a random port
    pub async fn start(status: StatusCode, body: impl Into<Bytes>) -> Result<Self> {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    /// Start a stub that waits `delay` before answering
    pub async fn start_with_delay(
        status: StatusCode,
        body: impl Into<Bytes>,
        delay: Duration,
    ) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status,
            body: body.into(),
            delay,
            requests: requests.clone(),
        };

        let router = Router::new()
            .route("/models/stub", post(answer))
            .with_state(state);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("Stub server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            requests,
            _handle: handle,
        })
    }

    /// Endpoint URL to configure the bot with
    pub fn url(&self) -> String {
        format!("http://{}/models/stub", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubInference {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

async fn answer(State(state): State<StubState>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let captured = CapturedRequest {
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    };
    state.requests.lock().unwrap().push(captured);

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, state.body.clone())
}

/// Something the handler sent to the chat
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Photo {
        file_name: String,
        caption: String,
        data: Vec<u8>,
    },
}

/// Replier that records everything instead of talking to Telegram
#[derive(Default)]
pub struct RecordingChat {
    replies: Mutex<Vec<Reply>>,
    pub fail_photos: bool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chat whose photo uploads always fail
    pub fn rejecting_photos() -> Self {
        Self {
            fail_photos: true,
            ..Self::default()
        }
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn photos(&self) -> Vec<Reply> {
        self.replies()
            .into_iter()
            .filter(|r| matches!(r, Reply::Photo { .. }))
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter_map(|r| match r {
                Reply::Text(text) => Some(text),
                Reply::Photo { .. } => None,
            })
            .collect()
    }
}

impl Replier for RecordingChat {
    async fn reply_text(&self, text: String) -> BotResult<()> {
        self.replies.lock().unwrap().push(Reply::Text(text));
        Ok(())
    }

    async fn reply_photo(&self, path: &Path, caption: String) -> BotResult<()> {
        if self.fail_photos {
            return Err(BotError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "upload interrupted",
            )));
        }

        // Read the file the way an upload would, while it still exists
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        self.replies.lock().unwrap().push(Reply::Photo {
            file_name,
            caption,
            data,
        });
        Ok(())
    }
}

/// Build a prompt pipeline aimed at `url`, writing temp files into `temp_dir`
pub fn generator(url: &str, temp_dir: &Path) -> Generator {
    let config = Config {
        telegram_token: "123:test".to_string(),
        hf_api_key: "hf_test_key".to_string(),
        inference_url: url.to_string(),
        num_inference_steps: 30,
        guidance_scale: 7.5,
        temp_dir: temp_dir.to_path_buf(),
        request_timeout_secs: Some(10),
    };
    Generator {
        inference: InferenceClient::new(&config).expect("client should build"),
        temp_dir: config.temp_dir,
    }
}

/// A small encoded image
pub fn sample_image(format: ImageFormat) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode sample image");
    out.into_inner()
}

/// Number of entries left in a directory
pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// A Bot API call as the Telegram stub saw it
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub method: String,
    pub body: serde_json::Value,
}

/// Bot API stand-in: records every call and answers with a sent message
pub struct TelegramStub {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<ApiCall>>>,
    _handle: JoinHandle<()>,
}

impl TelegramStub {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let calls = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .route("/{*path}", post(api_call))
            .with_state(calls.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("Telegram stub error: {}", e);
            }
        });

        Ok(Self {
            addr,
            calls,
            _handle: handle,
        })
    }

    /// A bot whose requests go to this stub
    pub fn bot(&self) -> teloxide::Bot {
        let url = format!("http://{}/", self.addr)
            .parse()
            .expect("stub url parses");
        teloxide::Bot::new("123:test").set_api_url(url)
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of every sendMessage call, in order
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.method.eq_ignore_ascii_case("sendMessage"))
            .filter_map(|c| c.body["text"].as_str().map(str::to_string))
            .collect()
    }
}

impl Drop for TelegramStub {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

async fn api_call(
    State(calls): State<Arc<Mutex<Vec<ApiCall>>>>,
    axum::extract::Path(path): axum::extract::Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let method = path.rsplit('/').next().unwrap_or_default().to_string();
    calls.lock().unwrap().push(ApiCall {
        method,
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    });

    axum::Json(serde_json::json!({
        "ok": true,
        "result": {
            "message_id": 1000,
            "date": 1_700_000_000,
            "chat": {"id": CHAT_ID, "type": "private", "first_name": "Ann"},
            "from": {"id": 1, "is_bot": true, "first_name": "Imagebot", "username": BOT_USERNAME},
            "text": "ok"
        }
    }))
}

pub const CHAT_ID: i64 = 99;
pub const USER_ID: u64 = 42;
pub const BOT_USERNAME: &str = "imagebot";

/// The bot's own identity, as `getMe` would return it
pub fn me() -> teloxide::types::Me {
    serde_json::from_value(serde_json::json!({
        "id": 1,
        "is_bot": true,
        "first_name": "Imagebot",
        "username": BOT_USERNAME,
        "can_join_groups": true,
        "can_read_all_group_messages": false,
        "supports_inline_queries": false,
        "can_connect_to_business": false,
        "has_main_web_app": false
    }))
    .expect("valid Me")
}

/// An incoming private text message
pub fn text_update(text: &str) -> teloxide::types::Update {
    // teloxide's Update deserializer only handles payloads parsed from a string
    let json = serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "date": 1_700_000_000,
            "chat": {"id": CHAT_ID, "type": "private", "first_name": "Ann"},
            "from": {"id": USER_ID, "is_bot": false, "first_name": "Ann"},
            "text": text
        }
    });
    serde_json::from_str(&json.to_string()).expect("valid update")
}
