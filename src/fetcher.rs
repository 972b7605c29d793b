// 例句获取：一次 chat completion 请求，在后台线程执行，
// 结果作为 AppEvent::Example 投回主事件队列

use std::{
    sync::{mpsc::Sender, Arc},
    thread,
    time::Duration,
};

use anyhow::Context;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{app::AppEvent, config::ApiSettings, deck::WordCard};

const PROMPT_PREFIX: &str =
    "Give me an example phrase in Chinese, Pinyin, and English with the following word: ";

pub fn prompt_for(card: &WordCard) -> String {
    format!("{}{}", PROMPT_PREFIX, card.chinese)
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to read response body: {0}")]
    Read(String),
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Api(String),
    #[error("No choices returned")]
    NoChoices,
}

/// 一次获取的结果，只被状态机消费一次
#[derive(Debug)]
pub struct FetchResult {
    pub index: usize,
    pub outcome: Result<String, FetchError>,
}

impl FetchResult {
    /// 写回卡片的文本：成功为原文，失败加 "Error: " 前缀
    pub fn into_example_text(self) -> String {
        match self.outcome {
            Ok(text) => text,
            Err(e) => format!("Error: {}", e),
        }
    }
}

pub trait ExampleSource: Send + Sync {
    fn example_for(&self, card: &WordCard) -> Result<String, FetchError>;
}

// ---------------- OpenAI 兼容接口 ----------------
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

pub fn parse_completion(body: &str) -> Result<String, FetchError> {
    let resp: ChatResponse = serde_json::from_str(body)?;
    if let Some(err) = resp.error {
        if !err.message.is_empty() {
            return Err(FetchError::Api(err.message));
        }
    }
    resp.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or(FetchError::NoChoices)
}

pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api: &ApiSettings, api_key: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .context("创建 HTTP 客户端失败")?;
        Ok(Self {
            http,
            endpoint: api.endpoint.clone(),
            model: api.model.clone(),
            api_key,
        })
    }
}

impl ExampleSource for OpenAiClient {
    fn example_for(&self, card: &WordCard) -> Result<String, FetchError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt_for(card),
            }],
        };
        // 不检查 HTTP 状态码：错误响应体里的 error.message 更有用
        let body = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?
            .text()
            .map_err(|e| FetchError::Read(e.to_string()))?;
        parse_completion(&body)
    }
}

// ---------------- 后台派发 ----------------
pub struct ExampleFetcher {
    source: Arc<dyn ExampleSource>,
    events: Sender<AppEvent>,
}

impl ExampleFetcher {
    pub fn new(source: Arc<dyn ExampleSource>, events: Sender<AppEvent>) -> Self {
        Self { source, events }
    }

    /// 立即返回；结果稍后经事件队列送达。失败也是数据，不会 panic
    pub fn fetch(&self, card: WordCard, index: usize) -> thread::JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        debug!(index, word = %card.chinese, "dispatching example fetch");
        thread::spawn(move || {
            let outcome = source.example_for(&card);
            if let Err(e) = &outcome {
                warn!(index, error = %e, "example fetch failed");
            }
            // 接收端已关闭说明程序在退出，丢弃即可
            let _ = events.send(AppEvent::Example(FetchResult { index, outcome }));
        })
    }
}
