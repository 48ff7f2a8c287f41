//! CLI 모듈
//!
//! griot CLI 명령어 정의 및 구현

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::assistant::{Answer, Assistant, ConversationWindow};
use crate::config::{config_path, AssistantConfig};
use crate::generation::{create_generator, has_api_key, GeminiGenerator, TextGenerator};
use crate::knowledge::{is_valid_topic_id, TopicClassifier};
use crate::search::{KnowledgeSearch, WikipediaSearch};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "griot")]
#[command(version, about = "문화 지식 기반 대화형 어시스턴트", long_about = None)]
pub struct Cli {
    /// 설정 파일 경로 (기본: 사용자 설정 디렉토리)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 질문 한 번에 답하기
    Ask {
        /// 질문
        query: String,

        /// 응답 rng 시드
        #[arg(long)]
        seed: Option<u64>,

        /// 외부 검색/생성 폴백 사용
        #[arg(long)]
        online: bool,

        /// JSON 출력
        #[arg(long)]
        json: bool,
    },

    /// 대화 모드 (/clear, /history, /quit)
    Chat {
        /// 응답 rng 시드
        #[arg(long)]
        seed: Option<u64>,

        /// 외부 검색/생성 폴백 사용
        #[arg(long)]
        online: bool,
    },

    /// 지식 청크 랭킹 확인
    Search {
        /// 검색 쿼리
        query: String,

        /// 결과 개수 제한 (기본: 설정의 top_k)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 주제 분류
    Classify {
        /// 분류할 질문
        query: String,
    },

    /// 지식 청크 목록
    Chunks {
        /// 토픽 ID 필터
        #[arg(short, long)]
        topic: Option<String>,

        /// JSON 출력
        #[arg(long)]
        json: bool,
    },

    /// 탐색 가능한 주제 제안
    Topics {
        /// 영역 (history, culture, philosophy, geography)
        #[arg(short, long)]
        area: Option<String>,
    },

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config = AssistantConfig::load_from(cli.config.as_deref()).context("설정 로드 실패")?;

    match cli.command {
        Commands::Ask {
            query,
            seed,
            online,
            json,
        } => cmd_ask(config, &query, seed, online, json).await,
        Commands::Chat { seed, online } => cmd_chat(config, seed, online).await,
        Commands::Search { query, limit } => cmd_search(config, &query, limit).await,
        Commands::Classify { query } => cmd_classify(&query).await,
        Commands::Chunks { topic, json } => cmd_chunks(config, topic, json).await,
        Commands::Topics { area } => cmd_topics(config, area).await,
        Commands::Status => cmd_status(config).await,
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// 온라인 폴백 협력자
#[derive(Default)]
struct Collaborators {
    search: Option<WikipediaSearch>,
    generator: Option<GeminiGenerator>,
}

impl Collaborators {
    fn build(config: &AssistantConfig) -> Self {
        if !config.online {
            return Self::default();
        }

        let search = match WikipediaSearch::new() {
            Ok(search) => Some(search),
            Err(e) => {
                tracing::warn!("Wikipedia search unavailable: {:#}", e);
                None
            }
        };

        let generator = if has_api_key() {
            match create_generator(&config.generation_model) {
                Ok(generator) => Some(generator),
                Err(e) => {
                    tracing::warn!("Text generation unavailable: {:#}", e);
                    None
                }
            }
        } else {
            println!("[!] API 키 미설정: 텍스트 생성 폴백을 건너뜁니다");
            None
        };

        Self { search, generator }
    }

    fn search(&self) -> Option<&dyn KnowledgeSearch> {
        self.search.as_ref().map(|s| s as &dyn KnowledgeSearch)
    }

    fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_ref().map(|g| g as &dyn TextGenerator)
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn build_assistant(mut config: AssistantConfig, seed: Option<u64>, online: bool) -> Result<Assistant> {
    if seed.is_some() {
        config.seed = seed;
    }
    if online {
        config.online = true;
    }
    Assistant::new(config).context("지식 베이스 로드 실패")
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 질문 명령어 (ask)
async fn cmd_ask(
    config: AssistantConfig,
    query: &str,
    seed: Option<u64>,
    online: bool,
    json: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("질문이 비어 있습니다");
    }

    let assistant = build_assistant(config, seed, online)?;
    let collaborators = Collaborators::build(assistant.config());
    let mut rng = make_rng(assistant.config().seed);
    let history = ConversationWindow::new(assistant.config().history_window);

    let answer = assistant
        .answer_with_fallback(
            query,
            &history,
            &mut rng,
            collaborators.search(),
            collaborators.generator(),
        )
        .await;

    if json {
        let output = serde_json::to_string_pretty(&answer).context("JSON 직렬화 실패")?;
        println!("{}", output);
    } else {
        println!("{}", answer.text);
    }

    Ok(())
}

/// 대화 명령어 (chat)
///
/// 표준 입력에서 한 줄씩 읽어 응답합니다. 대화 윈도우는 메모리에만 유지됩니다.
async fn cmd_chat(config: AssistantConfig, seed: Option<u64>, online: bool) -> Result<()> {
    let assistant = build_assistant(config, seed, online)?;
    let collaborators = Collaborators::build(assistant.config());
    let mut rng = make_rng(assistant.config().seed);
    let mut history = ConversationWindow::new(assistant.config().history_window);

    println!("[*] 대화를 시작합니다. 종료: /quit, 기록 삭제: /clear, 기록 보기: /history");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("입력 읽기 실패")? {
        let query = line.trim();
        match query {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                history.clear();
                println!("[OK] 대화 기록을 지웠습니다");
                continue;
            }
            "/history" => {
                print_history(&history);
                continue;
            }
            _ => {}
        }

        let answer = assistant
            .answer_with_fallback(
                query,
                &history,
                &mut rng,
                collaborators.search(),
                collaborators.generator(),
            )
            .await;

        print_answer(&answer);
        history.push(query, answer.text);
    }

    println!("[OK] 대화를 마칩니다 ({} 턴 기록)", history.len());
    Ok(())
}

fn print_answer(answer: &Answer) {
    println!();
    println!("{}", answer.text);
    println!();
    tracing::debug!("source: {}, label: {}", answer.source, answer.label);
}

fn print_history(history: &ConversationWindow) {
    if history.is_empty() {
        println!("[!] 대화 기록이 없습니다.");
        return;
    }

    println!("[OK] 최근 대화 ({} / {} 턴):\n", history.len(), history.capacity());
    for (i, turn) in history.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, turn.at.format("%H:%M:%S"), truncate_text(&turn.query, 60));
        println!("     {}", truncate_text(&turn.response, 80));
    }
    println!();
}

/// 검색 명령어 (search)
///
/// 어휘 스코어러 랭킹과 규칙별 점수 내역을 출력합니다.
async fn cmd_search(config: AssistantConfig, query: &str, limit: Option<usize>) -> Result<()> {
    let mut config = config;
    if let Some(limit) = limit {
        if limit == 0 {
            bail!("--limit 는 1 이상이어야 합니다");
        }
        config.top_k = limit;
    }

    let assistant = Assistant::new(config).context("지식 베이스 로드 실패")?;

    println!("[*] 검색 중: \"{}\"", query);

    let ranked = assistant.rank(query);
    if ranked.is_empty() {
        println!("\n[!] 일치하는 청크가 없습니다.");
        return Ok(());
    }

    println!("\n[OK] 검색 결과 ({} 건):\n", ranked.len());

    for (i, scored) in ranked.iter().enumerate() {
        let b = &scored.breakdown;
        println!(
            "{}. [점수: {}] {} ({}) #{}",
            i + 1,
            scored.score,
            scored.chunk.topic,
            scored.chunk.category,
            scored.position
        );
        println!(
            "   name {} | phrase {} | keyword {} | overlap {} | topic {} | category {}",
            b.name, b.phrase, b.keyword, b.overlap, b.topic, b.category
        );
        println!("   내용: {}", truncate_text(&scored.chunk.content, 200));
        println!();
    }

    Ok(())
}

/// 분류 명령어 (classify)
async fn cmd_classify(query: &str) -> Result<()> {
    let classifier = TopicClassifier::default();

    let label = classifier.classify(query);
    println!("[OK] 주제: {}", label);

    for (bucket, count) in classifier.counts(query) {
        if count > 0 {
            println!("     {:<14} {}", bucket.as_str(), count);
        }
    }

    Ok(())
}

/// 청크 목록 명령어 (chunks)
async fn cmd_chunks(config: AssistantConfig, topic: Option<String>, json: bool) -> Result<()> {
    let assistant = Assistant::new(config).context("지식 베이스 로드 실패")?;
    let store = assistant.store();

    let chunks: Vec<_> = match topic.as_deref() {
        Some(topic) => {
            if !is_valid_topic_id(topic) {
                bail!("잘못된 토픽 ID: {:?} (소문자 snake_case)", topic);
            }
            if store.record(topic).is_none() {
                bail!("토픽 '{}'을 찾을 수 없습니다", topic);
            }
            store.chunks_for(topic)
        }
        None => store.chunks().iter().collect(),
    };

    if json {
        let output = serde_json::to_string_pretty(&chunks).context("JSON 직렬화 실패")?;
        println!("{}", output);
        return Ok(());
    }

    println!("[OK] 청크 ({} 건):\n", chunks.len());
    for chunk in chunks {
        println!("  [{}] {} ({})", chunk.category, chunk.topic, chunk.keywords.join(", "));
        println!("        {}", truncate_text(&chunk.content, 100));
    }

    Ok(())
}

/// 주제 제안 명령어 (topics)
async fn cmd_topics(config: AssistantConfig, area: Option<String>) -> Result<()> {
    let assistant = Assistant::new(config).context("지식 베이스 로드 실패")?;
    let suggestions = assistant.store().suggestions(area.as_deref());

    match area.as_deref() {
        Some(area) => println!("[OK] 주제 제안 ({}):", area),
        None => println!("[OK] 주제 제안:"),
    }
    for suggestion in suggestions {
        println!("  - {}", suggestion);
    }

    Ok(())
}

/// 상태 명령어 (status)
async fn cmd_status(config: AssistantConfig) -> Result<()> {
    println!("griot v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // 설정 파일
    match config_path() {
        Some(path) if path.exists() => println!("[OK] 설정 파일: {}", path.display()),
        Some(path) => println!("[*] 설정 파일: {} (없음, 기본값 사용)", path.display()),
        None => println!("[!] 설정 디렉토리를 찾을 수 없습니다"),
    }
    println!(
        "     top_k {}, history {}, online {}, model {}",
        config.top_k, config.history_window, config.online, config.generation_model
    );

    // API 키 상태
    if has_api_key() {
        println!("[OK] API 키: 설정됨");
    } else {
        println!("[!] API 키: 미설정 (생성 폴백 비활성)");
        println!("    설정: export GEMINI_API_KEY=your-key");
    }

    // 지식 베이스 통계
    let assistant = Assistant::new(config).context("지식 베이스 로드 실패")?;
    let stats = assistant.store().stats();
    println!("[OK] 레코드: {} 건, 청크: {} 건", stats.record_count, stats.chunk_count);
    for (kind, count) in &stats.records_by_kind {
        println!("     {:<12} {}", kind, count);
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
