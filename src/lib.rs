//! griot-rag - 문화 지식 기반 대화형 어시스턴트
//!
//! 인메모리 지식 베이스 + 가중 어휘 스코어링으로 청크를 찾고,
//! 카테고리별 템플릿으로 응답을 작성합니다.
//! 지식 베이스에 답이 없으면 외부 검색 → 텍스트 생성 → 고정 폴백 순으로 내려갑니다.

pub mod assistant;
pub mod cli;
pub mod compose;
pub mod config;
pub mod generation;
pub mod knowledge;
pub mod search;

// Re-exports
pub use assistant::{Answer, AnswerSource, Assistant, ConversationWindow, Turn};
pub use compose::{dedup_sentences, ResponseComposer};
pub use config::AssistantConfig;
pub use generation::{get_api_key, has_api_key, GeminiGenerator, TextGenerator};
pub use knowledge::{
    Category, Chunk, KnowledgeError, KnowledgeRecord, KnowledgeStore, LexicalScorer, RecordKind,
    ScoredChunk, StoreStats, TopicClassifier, TopicLabel,
};
pub use search::{KnowledgeSearch, SearchHit, WikipediaSearch};
