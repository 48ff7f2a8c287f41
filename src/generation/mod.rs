//! 생성 모듈 - Gemini API 텍스트 생성 (최후 폴백)
//!
//! 지식 베이스와 검색이 모두 실패했을 때만 호출됩니다.
//! 전역 모델 싱글턴은 없으며, 호출자가 `TextGenerator` 트레이트 객체를 주입합니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let generator = GeminiGenerator::from_env("gemini-2.0-flash")?;
//! let text = generator.generate(&prompt).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::assistant::ConversationWindow;

// ============================================================================
// TextGenerator Trait
// ============================================================================

/// 텍스트 생성기 트레이트
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 프롬프트 → 생성 텍스트
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// 생성기 이름
    fn name(&self) -> &str;
}

// ============================================================================
// Persona & Prompt
// ============================================================================

/// 어시스턴트 페르소나 (시스템 프롬프트)
pub const PERSONA: &str = "You are a wise and culturally-grounded African griot, a keeper of stories.\n\
You possess deep knowledge of Africa's history, traditions, proverbs, and moral values passed down through generations, \
from the empires of Mali, Ghana, and Songhai to the oral storytelling of the griots and the community-centered philosophy of Ubuntu.\n\
You speak with clarity, respect, and warmth. When appropriate, use African proverbs, folk wisdom, or historical examples to explain ideas.\n\
You recognize culturally significant greetings such as \"How is the family?\" or \"You are invited.\"\n\
Always reply in clear, simple English, like an elder speaking to younger generations.";

/// 프롬프트에 포함할 최근 턴 수
const PROMPT_HISTORY_TURNS: usize = 3;

/// 생성 프롬프트 구성
///
/// 페르소나 + 최근 대화(최대 3턴) + 현재 질문.
pub fn build_prompt(persona: &str, query: &str, history: &ConversationWindow) -> String {
    let mut prompt = String::from(persona.trim());
    prompt.push('\n');

    let skip = history.len().saturating_sub(PROMPT_HISTORY_TURNS);
    for turn in history.iter().skip(skip) {
        prompt.push_str(&format!("\nHuman: {}\nGriot: {}", turn.query, turn.response));
    }

    prompt.push_str(&format!("\nHuman: {}\nGriot:", query.trim()));
    prompt
}

// ============================================================================
// Google Gemini Generation
// ============================================================================

/// Gemini generateContent 엔드포인트 (모델명 치환)
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 기본 생성 모델
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Rate Limiter 설정 (Gemini 무료 티어: 15 RPM)
const RATE_LIMIT_RPM: u32 = 15;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
/// 호출 간 최소 딜레이
const MIN_DELAY_MS: u64 = 1000;
/// 429 에러 시 최대 재시도 횟수
const MAX_RETRIES: u32 = 3;
/// 재시도 시 초기 백오프 (ms)
const INITIAL_BACKOFF_MS: u64 = 2000;
/// 출력 토큰 상한
const MAX_OUTPUT_TOKENS: u32 = 512;

/// Google Gemini 텍스트 생성 구현체
#[derive(Debug)]
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

/// 슬라이딩 윈도우 + 최소 딜레이
#[derive(Debug)]
struct RateLimiter {
    requests: Vec<Instant>,
    max_requests: u32,
    window: Duration,
    min_delay: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    fn new(max_requests: u32, window: Duration, min_delay: Duration) -> Self {
        Self {
            requests: Vec::new(),
            max_requests,
            window,
            min_delay,
            last_request: None,
        }
    }

    /// 요청 슬롯 확보 (필요하면 대기)
    async fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait_time = self.min_delay - elapsed;
                tracing::debug!("Min delay: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        let now = Instant::now();
        self.requests.retain(|&t| now.duration_since(t) < self.window);

        if self.requests.len() >= self.max_requests as usize {
            if let Some(&oldest) = self.requests.first() {
                let wait_time = self.window.saturating_sub(now.duration_since(oldest));
                if !wait_time.is_zero() {
                    tracing::debug!("Rate limit reached, waiting {:?}", wait_time);
                    tokio::time::sleep(wait_time).await;
                }
                let now = Instant::now();
                self.requests.retain(|&t| now.duration_since(t) < self.window);
            }
        }

        let now = Instant::now();
        self.requests.push(now);
        self.last_request = Some(now);
    }
}

impl GeminiGenerator {
    /// 새 생성기
    ///
    /// # Arguments
    /// * `api_key` - Google AI API 키
    /// * `model` - 모델명 (예: gemini-2.0-flash)
    pub fn new(api_key: String, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() || model.contains('/') {
            anyhow::bail!("Invalid model name: {:?}", model);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(
            RATE_LIMIT_RPM,
            RATE_LIMIT_WINDOW,
            Duration::from_millis(MIN_DELAY_MS),
        )));

        Ok(Self {
            api_key,
            model,
            client,
            rate_limiter,
        })
    }

    /// 환경변수에서 API 키를 읽어 생성
    ///
    /// 우선순위: GEMINI_API_KEY > GOOGLE_AI_API_KEY
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = get_api_key()?;
        Self::new(api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model)
    }
}

/// generateContent 요청 본문
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// generateContent 응답
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini API 에러 응답
#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[serde(default)]
    status: String,
}

/// 응답 본문에서 첫 후보의 텍스트 추출
fn parse_generate_response(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).context("Failed to parse generation response")?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Gemini returned no text");
    }
    Ok(text.to_string())
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt))
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            anyhow::bail!("Empty prompt");
        }

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };
        let endpoint = self.endpoint();

        let mut last_error: Option<anyhow::Error> = None;

        // 재시도 루프 (전송 실패 / 429 에러 시 지수 백오프)
        for attempt in 0..=MAX_RETRIES {
            {
                let mut limiter = self.rate_limiter.lock().await;
                limiter.acquire().await;
            }

            // API 키는 URL 이 아닌 헤더로 전송
            let response = match self
                .client
                .post(&endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(anyhow::anyhow!("Failed to send generation request: {}", e));
                    if attempt < MAX_RETRIES {
                        tracing::warn!(
                            "Request failed, retrying in {:?} (attempt {}/{})",
                            backoff(attempt),
                            attempt + 1,
                            MAX_RETRIES
                        );
                        tokio::time::sleep(backoff(attempt)).await;
                        continue;
                    }
                    break;
                }
            };

            let status = response.status();
            let body = response
                .text()
                .await
                .context("Failed to read response body")?;

            if status.is_success() {
                return parse_generate_response(&body);
            }

            if status.as_u16() == 429 {
                tracing::warn!(
                    "Rate limit hit (429), backing off {:?} (attempt {}/{})",
                    backoff(attempt),
                    attempt + 1,
                    MAX_RETRIES
                );
                last_error = Some(anyhow::anyhow!("Rate limit exceeded (429)"));

                if attempt < MAX_RETRIES {
                    tokio::time::sleep(backoff(attempt)).await;
                    continue;
                }
            } else {
                if let Ok(error) = serde_json::from_str::<GeminiError>(&body) {
                    anyhow::bail!(
                        "Gemini API error ({}): {}",
                        error.error.status,
                        error.error.message
                    );
                }
                anyhow::bail!("Gemini API error ({}): {}", status, body);
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("Generation failed after {} retries", MAX_RETRIES)))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// API Key Management
// ============================================================================

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_AI_API_KEY"];

/// API 키 로드 (환경변수에서)
///
/// 우선순위:
/// 1. `GEMINI_API_KEY` 환경변수
/// 2. `GOOGLE_AI_API_KEY` 환경변수
pub fn get_api_key() -> Result<String> {
    for var in API_KEY_VARS {
        if let Ok(key) = std::env::var(var) {
            if !key.is_empty() {
                tracing::debug!("Using API key from {}", var);
                return Ok(key);
            }
        }
    }

    anyhow::bail!(
        "API key not found. Set GEMINI_API_KEY or GOOGLE_AI_API_KEY environment variable.\n\
         Get your API key at: https://aistudio.google.com/app/apikey"
    )
}

/// API 키 존재 여부 확인
pub fn has_api_key() -> bool {
    API_KEY_VARS
        .iter()
        .any(|var| std::env::var(var).map(|k| !k.is_empty()).unwrap_or(false))
}

/// 생성기 생성 (키가 없으면 에러)
pub fn create_generator(model: &str) -> Result<GeminiGenerator> {
    if !has_api_key() {
        anyhow::bail!(
            "GEMINI_API_KEY or GOOGLE_AI_API_KEY not set.\n\
             Set: export GEMINI_API_KEY=your-api-key"
        );
    }

    let generator = GeminiGenerator::from_env(model)?;
    tracing::info!("Using Gemini text generation (model: {})", generator.model());
    Ok(generator)
}

// ============================================================================
// Tests
// ============================================================================
