//! Assistant 모듈 - 코어 파이프라인 + 폴백 캐스케이드
//!
//! 지식 베이스 → 외부 검색 → 외부 생성 → 고정 폴백 순서로 응답합니다.
//! 협력자 오류는 여기서 잡아 로그로 남기고 다음 단계로 넘어갑니다.

mod history;

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use crate::compose::ResponseComposer;
use crate::config::AssistantConfig;
use crate::generation::{build_prompt, TextGenerator, PERSONA};
use crate::knowledge::{
    KnowledgeError, KnowledgeStore, LexicalScorer, ScoredChunk, TopicClassifier, TopicLabel,
};
use crate::search::{format_search_response, KnowledgeSearch};

pub use history::{ConversationWindow, Turn, DEFAULT_HISTORY_WINDOW};

// ============================================================================
// Answer
// ============================================================================

/// 응답 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    KnowledgeBase,
    WebSearch,
    Generated,
    Fallback,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnswerSource::KnowledgeBase => "knowledge_base",
            AnswerSource::WebSearch => "web_search",
            AnswerSource::Generated => "generated",
            AnswerSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// 최종 응답
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub label: TopicLabel,
    pub source: AnswerSource,
    /// 랭킹된 청크의 토픽 (순위 순)
    pub topics: Vec<String>,
}

// ============================================================================
// Assistant
// ============================================================================

/// 대화형 어시스턴트
#[derive(Debug, Clone)]
pub struct Assistant {
    store: Arc<KnowledgeStore>,
    scorer: LexicalScorer,
    classifier: TopicClassifier,
    composer: ResponseComposer,
    config: AssistantConfig,
}

impl Assistant {
    /// 내장 지식으로 생성
    pub fn new(config: AssistantConfig) -> Result<Self, KnowledgeError> {
        let store = Arc::new(KnowledgeStore::load()?);
        Ok(Self::with_store(store, config))
    }

    /// 공유 저장소로 생성
    pub fn with_store(store: Arc<KnowledgeStore>, config: AssistantConfig) -> Self {
        Self {
            scorer: LexicalScorer::new(config.top_k.max(1)),
            classifier: TopicClassifier::default(),
            composer: ResponseComposer::new(store.clone()),
            store,
            config,
        }
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn scorer(&self) -> &LexicalScorer {
        &self.scorer
    }

    pub fn classify(&self, query: &str) -> TopicLabel {
        self.classifier.classify(query)
    }

    /// 상위 K 청크
    pub fn rank(&self, query: &str) -> Vec<ScoredChunk<'_>> {
        self.scorer.score(query, self.store.chunks())
    }

    /// 지식 베이스만으로 응답 (동기)
    ///
    /// 일치하는 청크가 없으면 고정 폴백 응답을 반환합니다.
    pub fn answer<R: Rng + ?Sized>(
        &self,
        query: &str,
        history: &ConversationWindow,
        rng: &mut R,
    ) -> Answer {
        let label = self.classify(query);
        let ranked = self.rank(query);
        tracing::debug!(
            "Answering {:?} as {} with {} chunks ({} prior turns)",
            query,
            label,
            ranked.len(),
            history.len()
        );

        let source = if ranked.is_empty() {
            AnswerSource::Fallback
        } else {
            AnswerSource::KnowledgeBase
        };

        Answer {
            text: self.composer.compose(query, label, &ranked, rng),
            label,
            source,
            topics: topics_of(&ranked),
        }
    }

    /// 폴백 캐스케이드 응답 (비동기)
    ///
    /// 지식 베이스 → `search` → `generator` → 고정 폴백.
    /// 협력자는 선택적이며, 실패하면 경고 로그 후 다음 단계로 넘어갑니다.
    pub async fn answer_with_fallback<R: Rng + ?Sized>(
        &self,
        query: &str,
        history: &ConversationWindow,
        rng: &mut R,
        search: Option<&dyn KnowledgeSearch>,
        generator: Option<&dyn TextGenerator>,
    ) -> Answer {
        let label = self.classify(query);
        let ranked = self.rank(query);

        if !ranked.is_empty() {
            return Answer {
                text: self.composer.compose(query, label, &ranked, rng),
                label,
                source: AnswerSource::KnowledgeBase,
                topics: topics_of(&ranked),
            };
        }

        if let Some(search) = search {
            match search.search(query, self.config.search_limit).await {
                Ok(hits) if !hits.is_empty() => {
                    tracing::info!("Answered from {} ({} hits)", search.name(), hits.len());
                    return Answer {
                        text: format_search_response(&hits),
                        label,
                        source: AnswerSource::WebSearch,
                        topics: Vec::new(),
                    };
                }
                Ok(_) => tracing::debug!("{} returned no relevant hits", search.name()),
                Err(e) => tracing::warn!("Search via {} failed: {:#}", search.name(), e),
            }
        }

        if let Some(generator) = generator {
            let prompt = build_prompt(PERSONA, query, history);
            match generator.generate(&prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!("Answered from {}", generator.name());
                    return Answer {
                        text: text.trim().to_string(),
                        label,
                        source: AnswerSource::Generated,
                        topics: Vec::new(),
                    };
                }
                Ok(_) => tracing::warn!("{} returned an empty response", generator.name()),
                Err(e) => tracing::warn!("Generation via {} failed: {:#}", generator.name(), e),
            }
        }

        Answer {
            text: self.composer.fallback(rng),
            label,
            source: AnswerSource::Fallback,
            topics: Vec::new(),
        }
    }
}

fn topics_of(ranked: &[ScoredChunk<'_>]) -> Vec<String> {
    ranked.iter().map(|s| s.chunk.topic.clone()).collect()
}

// ============================================================================
// Tests
// ============================================================================
