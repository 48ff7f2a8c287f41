//! Chunk Builder - 레코드를 검색 가능한 청크로 분할
//!
//! 구조화된 레코드 하나를 여러 개의 평평한 텍스트 청크로 펼칩니다.
//! 각 청크는 토픽 ID, 카테고리, 키워드 집합을 가집니다.
//!
//! - 정체성 청크: 이름 + 직함 + 시대 요약
//! - 필드 청크: `"<레코드 이름> <필드 라벨>: <값>"` (목록은 ", " 로 연결)
//! - 속담 목록은 항목마다 청크 하나

use serde::Serialize;

use super::record::{Category, FieldValue, KnowledgeRecord, RecordKind};

// ============================================================================
// Chunk
// ============================================================================

/// 검색 단위 청크
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// 렌더링된 텍스트
    pub content: String,
    /// 원본 레코드 토픽 ID
    pub topic: String,
    /// 거친 분류 라벨
    pub category: Category,
    /// 소문자 키워드 (첫 번째 = 레코드 대표 이름)
    pub keywords: Vec<String>,
}

impl Chunk {
    /// 테스트/외부 테이블용 생성자 (키워드는 소문자 + 중복 제거)
    pub fn new(
        content: impl Into<String>,
        topic: impl Into<String>,
        category: Category,
        keywords: &[&str],
    ) -> Self {
        let mut set = KeywordSet::default();
        set.extend(keywords.iter().copied());
        Self {
            content: content.into(),
            topic: topic.into(),
            category,
            keywords: set.into_vec(),
        }
    }

    /// 대표 키워드 (레코드 이름)
    pub fn primary_keyword(&self) -> Option<&str> {
        self.keywords.first().map(String::as_str)
    }
}

// ============================================================================
// Keyword Set
// ============================================================================

/// 삽입 순서를 유지하는 소문자 키워드 집합
#[derive(Debug, Default)]
struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    fn push(&mut self, word: &str) {
        let word = word.trim().to_lowercase();
        if !word.is_empty() && !self.words.contains(&word) {
            self.words.push(word);
        }
    }

    fn extend<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        for word in words {
            self.push(word);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.words
    }
}

// ============================================================================
// RecordChunker
// ============================================================================

/// 레코드 → 청크 변환기
#[derive(Debug, Default, Clone)]
pub struct RecordChunker;

impl RecordChunker {
    pub fn new() -> Self {
        Self
    }

    /// 레코드 목록을 청크로 변환 (레코드 순서 → 필드 순서)
    pub fn build(&self, records: &[KnowledgeRecord]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = records.iter().flat_map(|r| self.chunk_record(r)).collect();
        tracing::debug!(
            "Built {} chunks from {} records",
            chunks.len(),
            records.len()
        );
        chunks
    }

    /// 레코드 하나를 청크로 변환
    pub fn chunk_record(&self, record: &KnowledgeRecord) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let name = record.name();

        // 1. 정체성 청크
        if let Some(identity) = record.identity() {
            chunks.push(self.make_chunk(record, identity, record.category(), "identity"));
        }

        // 2. 필드 청크
        for (label, value) in record.fields() {
            if value.is_empty() {
                continue;
            }

            let category = field_category(record, label);

            match &value {
                // 속담은 항목마다 독립 청크
                FieldValue::List(items) if splits_items(record, label) => {
                    for item in items.iter().filter(|i| !i.trim().is_empty()) {
                        let content = format!("{} {}: {}", name, label, item.trim());
                        chunks.push(self.make_chunk(record, content, category, label));
                    }
                }
                FieldValue::Map(entries) => {
                    for (sub_label, sub_value) in entries {
                        if sub_value.is_empty() {
                            continue;
                        }
                        match sub_value {
                            FieldValue::List(items) => {
                                for item in items.iter().filter(|i| !i.trim().is_empty()) {
                                    let content = format!("{} {}: {}", name, sub_label, item.trim());
                                    chunks.push(self.make_chunk(record, content, category, sub_label));
                                }
                            }
                            other => {
                                let content = format!("{} {}: {}", name, sub_label, other.render());
                                chunks.push(self.make_chunk(record, content, category, sub_label));
                            }
                        }
                    }
                }
                other => {
                    let content = format!("{} {}: {}", name, label, other.render());
                    chunks.push(self.make_chunk(record, content, category, label));
                }
            }
        }

        chunks
    }

    fn make_chunk(
        &self,
        record: &KnowledgeRecord,
        content: String,
        category: Category,
        label: &str,
    ) -> Chunk {
        let mut keywords = KeywordSet::default();
        keywords.push(record.name());
        keywords.push(record.topic);
        keywords.extend(record.aliases().iter().copied());
        keywords.extend(category.domain_words().iter().copied());
        keywords.extend(field_words(label));

        Chunk {
            content,
            topic: record.topic.to_string(),
            category,
            keywords: keywords.into_vec(),
        }
    }
}

/// 레코드 목록 → 청크 목록
pub fn build_chunks(records: &[KnowledgeRecord]) -> Vec<Chunk> {
    RecordChunker::new().build(records)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 필드별 카테고리 (철학 레코드의 속담은 `proverb`)
fn field_category(record: &KnowledgeRecord, label: &str) -> Category {
    match (&record.kind, label) {
        (RecordKind::Philosophy(_), "proverb") => Category::Proverb,
        _ => record.category(),
    }
}

/// 목록 항목마다 청크를 만드는 필드인지
fn splits_items(record: &KnowledgeRecord, label: &str) -> bool {
    matches!(
        (&record.kind, label),
        (RecordKind::Philosophy(_), "proverb")
    )
}

/// 필드 라벨별 키워드
fn field_words(label: &str) -> Vec<&str> {
    let words: &[&str] = match label {
        "identity" => &["ruler", "emperor", "president"],
        "achievements" => &["achievements", "accomplishments"],
        "legacy" => &["legacy", "impact", "influence"],
        "story" => &["story", "tale"],
        "epic" => &["epic", "griot"],
        "philosophy" => &["humanity", "community", "interconnectedness"],
        "meaning" => &["meaning", "community", "compassion", "support"],
        "proverb" => &["proverb", "humanity", "people"],
        "definition" => &["definition", "storyteller", "historian", "musician"],
        "role" => &["role", "library", "history", "genealogy"],
        "significance" => &["significance", "memory", "continuity", "generations"],
        "practices" => &["practices", "kora", "praise"],
        "capital" => &["capital", "city"],
        "location" => &["location", "located"],
        "ethnic groups" => &["tribes", "ethnic", "people"],
        "languages" | "major families" | "widely spoken" => &["language", "languages", "spoken"],
        "instruments" => &["instruments", "music", "traditional"],
        "styles" => &["styles", "music", "dance"],
        "traditions" => &["traditions", "art", "cultural"],
        "cultural significance" => &["significance", "cultural"],
        "of wisdom" => &["wisdom"],
        "of community" => &["community", "together"],
        _ => &[],
    };

    if words.is_empty() {
        // 알 수 없는 라벨은 라벨 단어 자체를 키워드로
        label.split_whitespace().collect()
    } else {
        words.to_vec()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::record::{Empire, Figure, Philosophy, Proverbs};

    fn figure() -> KnowledgeRecord {
        KnowledgeRecord::new(
            "mansa_musa",
            RecordKind::Figure(Figure {
                name: "Mansa Musa",
                title: "Emperor of Mali",
                period: "1312-1337",
                aliases: &[],
                achievements: &["Pilgrimage to Mecca", "Built mosques"],
                legacy: "Wealthy ruler.",
                story: "A long journey.",
                extra: &[("birthplace", "Niani")],
            }),
        )
    }

    #[test]
    fn test_figure_chunks() {
        let chunks = build_chunks(&[figure()]);
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();

        assert_eq!(
            contents,
            vec![
                "Mansa Musa - Emperor of Mali (1312-1337)",
                "Mansa Musa achievements: Pilgrimage to Mecca, Built mosques",
                "Mansa Musa legacy: Wealthy ruler.",
                "Mansa Musa story: A long journey.",
                "Mansa Musa birthplace: Niani",
            ]
        );

        for chunk in &chunks {
            assert_eq!(chunk.topic, "mansa_musa");
            assert_eq!(chunk.category, Category::HistoricalFigure);
            assert_eq!(chunk.primary_keyword(), Some("mansa musa"));
            assert!(chunk.keywords.contains(&"mansa_musa".to_string()));
            assert!(chunk.keywords.contains(&"leader".to_string()));
        }

        assert!(chunks[1].keywords.contains(&"achievements".to_string()));
        assert!(chunks[4].keywords.contains(&"birthplace".to_string()));
    }

    #[test]
    fn test_absent_fields_skipped() {
        let record = KnowledgeRecord::new(
            "ghana",
            RecordKind::Empire(Empire {
                name: "Ghana Empire",
                period: "300-1200",
                capital: None,
                location: None,
                achievements: &[],
                extra: &[("trade", "Gold and salt.")],
            }),
        );

        let chunks = build_chunks(&[record]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "Ghana Empire period: 300-1200");
        assert_eq!(chunks[1].content, "Ghana Empire trade: Gold and salt.");
        assert!(chunks.iter().all(|c| c.category == Category::History));
    }

    #[test]
    fn test_philosophy_proverbs_split() {
        let record = KnowledgeRecord::new(
            "ubuntu",
            RecordKind::Philosophy(Philosophy {
                name: "Ubuntu",
                motto: "I am because we are",
                definition: "Shared humanity.",
                meaning: "Open to others.",
                proverbs: &["First saying", "Second saying"],
                extra: &[],
            }),
        );

        let chunks = build_chunks(&[record]);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].content, "Ubuntu philosophy: Shared humanity.");
        assert_eq!(chunks[0].category, Category::Philosophy);
        assert_eq!(chunks[2].content, "Ubuntu proverb: First saying");
        assert_eq!(chunks[2].category, Category::Proverb);
        assert_eq!(chunks[3].content, "Ubuntu proverb: Second saying");
    }

    #[test]
    fn test_proverb_themes_one_chunk_each() {
        let record = KnowledgeRecord::new(
            "proverbs",
            RecordKind::Proverbs(Proverbs {
                name: "African proverb",
                themes: &[("of wisdom", &["A", "B"]), ("of community", &["C"])],
            }),
        );

        let chunks = build_chunks(&[record]);
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "African proverb of wisdom: A",
                "African proverb of wisdom: B",
                "African proverb of community: C",
            ]
        );
        assert!(chunks.iter().all(|c| c.category == Category::Wisdom));
        assert!(chunks[0].keywords.contains(&"proverb".to_string()));
    }

    #[test]
    fn test_emission_order_follows_records() {
        let chunks = build_chunks(&crate::knowledge::data::builtin_records());
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].topic, "mansa_musa");

        // 레코드 경계에서 토픽이 되돌아가지 않음
        let mut seen: Vec<&str> = Vec::new();
        for chunk in &chunks {
            if seen.last() != Some(&chunk.topic.as_str()) {
                assert!(!seen.contains(&chunk.topic.as_str()));
                seen.push(&chunk.topic);
            }
        }
    }

    #[test]
    fn test_chunk_new_normalizes_keywords() {
        let chunk = Chunk::new("x", "t", Category::Culture, &["Music", "music", " Drum "]);
        assert_eq!(chunk.keywords, vec!["music".to_string(), "drum".to_string()]);
    }
}
