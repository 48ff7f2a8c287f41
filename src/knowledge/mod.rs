//! Knowledge 모듈 - 인메모리 어휘 검색 코어
//!
//! - Record: 카테고리별 태그드 레코드 + 로드 시점 검증
//! - Store: 불변 레코드/청크 저장소
//! - Chunker: 레코드 → 검색 청크
//! - Scorer: 가중 어휘 규칙으로 상위 K 랭킹
//! - Classifier: 키워드 버킷 주제 분류

mod chunker;
mod classifier;
pub(crate) mod data;
mod record;
mod scorer;
mod store;

// Re-exports
pub use chunker::{build_chunks, Chunk, RecordChunker};
pub use classifier::{TopicBucket, TopicClassifier, TopicLabel, DEFAULT_BUCKETS};
pub use record::{
    is_valid_topic_id, Category, Country, Culture, Empire, ExtraFields, FieldValue, Figure,
    KnowledgeError, KnowledgeRecord, Philosophy, Proverbs, RecordKind, Text, TextList, Tradition,
};
pub use scorer::{
    tokenize, LexicalScorer, PhraseOverride, ScoreBreakdown, ScoredChunk, DEFAULT_PHRASES,
    DEFAULT_TOP_K,
};
pub use store::{KnowledgeStore, StoreStats};
