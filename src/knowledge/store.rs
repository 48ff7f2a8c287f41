//! Knowledge Store - 불변 인메모리 지식 저장소
//!
//! 정적 정의에서 레코드를 한 번 로드하고, 청크를 만들어 프로세스 수명 동안 보관합니다.
//! 로드 이후 수정/삭제 연산은 없습니다.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::chunker::{build_chunks, Chunk};
use super::data::{builtin_records, TOPIC_SUGGESTIONS};
use super::record::{KnowledgeError, KnowledgeRecord};

// ============================================================================
// Types
// ============================================================================

/// 저장소 통계
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub record_count: usize,
    pub chunk_count: usize,
    /// 카테고리별 청크 수
    pub chunks_by_category: BTreeMap<String, usize>,
    /// 레코드 종류별 수
    pub records_by_kind: BTreeMap<String, usize>,
}

// ============================================================================
// KnowledgeStore
// ============================================================================

/// 불변 지식 저장소
///
/// `Send + Sync` 이며 `Arc` 로 공유됩니다.
#[derive(Debug)]
pub struct KnowledgeStore {
    records: Vec<KnowledgeRecord>,
    chunks: Vec<Chunk>,
}

impl KnowledgeStore {
    /// 내장 정의로 저장소 생성
    ///
    /// 정적 정의가 잘못된 경우에만 실패합니다 (시작 시점 오류).
    pub fn load() -> Result<Self, KnowledgeError> {
        Self::from_records(builtin_records())
    }

    /// 주어진 레코드로 저장소 생성 (검증 + 청크 생성)
    pub fn from_records(records: Vec<KnowledgeRecord>) -> Result<Self, KnowledgeError> {
        let mut topics = HashSet::with_capacity(records.len());

        for record in &records {
            record.validate()?;
            if !topics.insert(record.topic) {
                return Err(KnowledgeError::DuplicateTopic(record.topic.to_string()));
            }
        }

        let chunks = build_chunks(&records);

        tracing::info!(
            "Knowledge store loaded: {} records, {} chunks",
            records.len(),
            chunks.len()
        );

        Ok(Self { records, chunks })
    }

    /// 레코드 목록 (삽입 순서)
    pub fn records(&self) -> &[KnowledgeRecord] {
        &self.records
    }

    /// 토픽 ID 로 레코드 조회
    pub fn record(&self, topic: &str) -> Option<&KnowledgeRecord> {
        self.records.iter().find(|r| r.topic == topic)
    }

    /// 청크 목록 (방출 순서)
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// 특정 토픽의 청크
    pub fn chunks_for(&self, topic: &str) -> Vec<&Chunk> {
        self.chunks.iter().filter(|c| c.topic == topic).collect()
    }

    /// 주제 제안 목록
    ///
    /// `area` 가 알려진 영역(history, culture, philosophy, geography)이면 해당 목록,
    /// 아니면 전체를 반환합니다.
    pub fn suggestions(&self, area: Option<&str>) -> Vec<&'static str> {
        if let Some(area) = area {
            if let Some((_, items)) = TOPIC_SUGGESTIONS.iter().find(|(a, _)| *a == area) {
                return items.to_vec();
            }
        }

        TOPIC_SUGGESTIONS
            .iter()
            .flat_map(|(_, items)| items.iter().copied())
            .collect()
    }

    /// 저장소 통계
    pub fn stats(&self) -> StoreStats {
        let mut chunks_by_category = BTreeMap::new();
        for chunk in &self.chunks {
            *chunks_by_category
                .entry(chunk.category.to_string())
                .or_insert(0) += 1;
        }

        let mut records_by_kind = BTreeMap::new();
        for record in &self.records {
            *records_by_kind
                .entry(record.kind_name().to_string())
                .or_insert(0) += 1;
        }

        StoreStats {
            record_count: self.records.len(),
            chunk_count: self.chunks.len(),
            chunks_by_category,
            records_by_kind,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::record::{Culture, RecordKind, Tradition};

    fn tradition(topic: &'static str, definition: &'static str) -> KnowledgeRecord {
        KnowledgeRecord::new(
            topic,
            RecordKind::Tradition(Tradition {
                name: "Griot",
                definition,
                role: "Keeper of history.",
                significance: "Memory.",
                practices: &["Singing"],
                extra: &[],
            }),
        )
    }

    #[test]
    fn test_load_builtin() {
        let store = KnowledgeStore::load().unwrap();
        assert!(!store.records().is_empty());
        assert!(store.chunks().len() > store.records().len());
        assert_eq!(store.records()[0].topic, "mansa_musa");
    }

    #[test]
    fn test_every_record_yields_chunks() {
        let store = KnowledgeStore::load().unwrap();
        for record in store.records() {
            assert!(
                !store.chunks_for(record.topic).is_empty(),
                "no chunks for {}",
                record.topic
            );
        }
        // 모든 청크는 정확히 하나의 레코드에 속함
        for chunk in store.chunks() {
            assert!(store.record(&chunk.topic).is_some());
        }
    }

    #[test]
    fn test_record_lookup() {
        let store = KnowledgeStore::load().unwrap();
        assert_eq!(store.record("ubuntu").map(|r| r.name()), Some("Ubuntu"));
        assert!(store.record("atlantis").is_none());
    }

    #[test]
    fn test_malformed_definition_fails() {
        let result = KnowledgeStore::from_records(vec![tradition("griots", "")]);
        match result {
            Err(KnowledgeError::MalformedDefinition { topic, field }) => {
                assert_eq!(topic, "griots");
                assert_eq!(field, "definition");
            }
            other => panic!("expected malformed definition, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_topic_fails() {
        let result = KnowledgeStore::from_records(vec![
            tradition("griots", "A storyteller."),
            tradition("griots", "Another storyteller."),
        ]);
        assert_eq!(
            result.unwrap_err(),
            KnowledgeError::DuplicateTopic("griots".to_string())
        );
    }

    #[test]
    fn test_culture_without_items_fails() {
        let record = KnowledgeRecord::new(
            "empty_culture",
            RecordKind::Culture(Culture {
                name: "Empty",
                lists: &[("items", &[])],
                significance: None,
            }),
        );
        assert!(KnowledgeStore::from_records(vec![record]).is_err());
    }

    #[test]
    fn test_suggestions() {
        let store = KnowledgeStore::load().unwrap();
        let history = store.suggestions(Some("history"));
        assert!(history.iter().any(|s| s.contains("Mali")));

        let all = store.suggestions(None);
        assert!(all.len() > history.len());

        // 알 수 없는 영역은 전체
        assert_eq!(store.suggestions(Some("cooking")).len(), all.len());
    }

    #[test]
    fn test_stats() {
        let store = KnowledgeStore::load().unwrap();
        let stats = store.stats();
        assert_eq!(stats.record_count, store.records().len());
        assert_eq!(stats.chunk_count, store.chunks().len());
        assert_eq!(
            stats.chunks_by_category.values().sum::<usize>(),
            stats.chunk_count
        );
        assert_eq!(stats.records_by_kind.get("figure"), Some(&5));
    }
}
