//! 어휘 스코어러 / 랭커
//!
//! 질의 문자열과 각 청크의 키워드/부분 문자열/토큰 겹침으로 점수를 매깁니다.
//! 임베딩 없이 순수 어휘 규칙만 사용하며 결과는 결정적입니다.
//!
//! 점수 규칙 (가산):
//! 1. 이름 일치: 인물 청크의 대표 키워드가 질의에 포함 → +10
//! 2. 구문 오버라이드: 고정 구문이 질의에 있고 청크 키워드와 겹침 → +8
//! 3. 키워드 포함: 질의에 포함된 청크 키워드마다 → +2
//! 4. 토큰 겹침: 질의 단어 집합 ∩ 청크 단어 집합 크기
//! 5. 토픽 ID 포함 → +3
//! 6. 카테고리 포함 → +2

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::chunker::Chunk;

/// 이름 일치 보너스
pub const NAME_BONUS: u32 = 10;
/// 구문 오버라이드 보너스
pub const PHRASE_BONUS: u32 = 8;
/// 키워드당 보너스
pub const KEYWORD_BONUS: u32 = 2;
/// 토픽 ID 포함 보너스
pub const TOPIC_BONUS: u32 = 3;
/// 카테고리 포함 보너스
pub const CATEGORY_BONUS: u32 = 2;

/// 기본 상위 K
pub const DEFAULT_TOP_K: usize = 3;

// ============================================================================
// Types
// ============================================================================

/// 고정 고가치 구문과 연관 키워드
#[derive(Debug, Clone, Copy)]
pub struct PhraseOverride {
    pub phrase: &'static str,
    pub keywords: &'static [&'static str],
}

/// 기본 구문 오버라이드
pub const DEFAULT_PHRASES: &[PhraseOverride] = &[
    PhraseOverride { phrase: "tribes in", keywords: &["tribes", "ethnic"] },
    PhraseOverride { phrase: "ethnic groups", keywords: &["tribes", "ethnic"] },
    PhraseOverride { phrase: "languages of", keywords: &["languages"] },
    PhraseOverride { phrase: "i am because we are", keywords: &["ubuntu"] },
    PhraseOverride { phrase: "richest man", keywords: &["mansa musa"] },
    PhraseOverride { phrase: "lion king", keywords: &["sundiata"] },
    PhraseOverride { phrase: "oral tradition", keywords: &["griot"] },
    PhraseOverride { phrase: "talking drum", keywords: &["instruments"] },
];

/// 점수 내역 (규칙별)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub name: u32,
    pub phrase: u32,
    pub keyword: u32,
    pub overlap: u32,
    pub topic: u32,
    pub category: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.name + self.phrase + self.keyword + self.overlap + self.topic + self.category
    }
}

/// 점수가 매겨진 청크 (단일 스코어링 호출 안에서만 존재)
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: u32,
    /// 원래 방출 순서 (동점 판정 근거)
    pub position: usize,
    pub breakdown: ScoreBreakdown,
}

// ============================================================================
// LexicalScorer
// ============================================================================

/// 어휘 스코어러
#[derive(Debug, Clone)]
pub struct LexicalScorer {
    top_k: usize,
    phrases: &'static [PhraseOverride],
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl LexicalScorer {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            phrases: DEFAULT_PHRASES,
        }
    }

    /// 구문 오버라이드 교체
    pub fn with_phrases(mut self, phrases: &'static [PhraseOverride]) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// 상위 K 청크 반환 (점수 내림차순, 동점은 방출 순서)
    pub fn score<'a>(&self, query: &str, chunks: &'a [Chunk]) -> Vec<ScoredChunk<'a>> {
        let mut ranked = self.score_all(query, chunks);
        ranked.truncate(self.top_k);
        ranked
    }

    /// 점수 > 0 인 모든 청크 (정렬됨, 자르지 않음)
    pub fn score_all<'a>(&self, query: &str, chunks: &'a [Chunk]) -> Vec<ScoredChunk<'a>> {
        let query_lower = query.to_lowercase();
        let query_words = tokenize(&query_lower);
        let active: Vec<&PhraseOverride> = self
            .phrases
            .iter()
            .filter(|p| query_lower.contains(p.phrase))
            .collect();

        let mut ranked: Vec<ScoredChunk<'a>> = chunks
            .iter()
            .enumerate()
            .filter_map(|(position, chunk)| {
                let breakdown = score_chunk(&query_lower, &query_words, &active, chunk);
                let score = breakdown.total();
                (score > 0).then_some(ScoredChunk {
                    chunk,
                    score,
                    position,
                    breakdown,
                })
            })
            .collect();

        // 안정 정렬: 동점이면 방출 순서 유지
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!(
            "Scored query {:?}: {} of {} chunks matched",
            query,
            ranked.len(),
            chunks.len()
        );

        ranked
    }
}

/// 단일 청크 점수 계산
fn score_chunk(
    query_lower: &str,
    query_words: &HashSet<String>,
    active_phrases: &[&PhraseOverride],
    chunk: &Chunk,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    // 1. 이름 일치
    if chunk.category.is_named_entity() {
        if let Some(name) = chunk.primary_keyword() {
            if query_lower.contains(name) {
                breakdown.name = NAME_BONUS;
            }
        }
    }

    // 2. 구문 오버라이드
    for phrase in active_phrases {
        if phrase
            .keywords
            .iter()
            .any(|k| chunk.keywords.iter().any(|ck| ck == k))
        {
            breakdown.phrase += PHRASE_BONUS;
        }
    }

    // 3. 키워드 포함
    breakdown.keyword = chunk
        .keywords
        .iter()
        .filter(|k| query_lower.contains(k.as_str()))
        .count() as u32
        * KEYWORD_BONUS;

    // 4. 토큰 겹침
    let content_words = tokenize(&chunk.content.to_lowercase());
    breakdown.overlap = query_words.intersection(&content_words).count() as u32;

    // 5. 토픽 ID 포함
    if query_lower.contains(chunk.topic.as_str()) {
        breakdown.topic = TOPIC_BONUS;
    }

    // 6. 카테고리 포함
    if query_lower.contains(chunk.category.as_str()) {
        breakdown.category = CATEGORY_BONUS;
    }

    breakdown
}

// ============================================================================
// Helper Functions
// ============================================================================

fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(r"\w+").expect("word regex is valid"))
}

/// 단어 경계 토큰화 (소문자 집합)
pub fn tokenize(text: &str) -> HashSet<String> {
    word_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::record::Category;

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            Chunk::new(
                "Mansa Musa - Emperor of Mali (1312-1337)",
                "mansa_musa",
                Category::HistoricalFigure,
                &["mansa musa", "mansa_musa", "leader", "emperor"],
            ),
            Chunk::new(
                "Mali Empire period: 1235-1670",
                "mali",
                Category::History,
                &["mali empire", "mali", "empire", "history"],
            ),
            Chunk::new(
                "Kenya ethnic groups: Kikuyu, Luo",
                "kenya",
                Category::Geography,
                &["kenya", "tribes", "ethnic", "people"],
            ),
            Chunk::new(
                "Nigeria ethnic groups: Hausa, Yoruba",
                "nigeria",
                Category::Geography,
                &["nigeria", "tribes", "ethnic", "people"],
            ),
        ]
    }

    #[test]
    fn test_tokenize() {
        let words = tokenize("Who was Mansa Musa?");
        assert_eq!(words.len(), 4);
        assert!(words.contains("musa"));
        assert!(!words.contains("musa?"));
    }

    #[test]
    fn test_exact_name_bonus() {
        let chunks = sample_chunks();
        let scorer = LexicalScorer::default();

        let ranked = scorer.score("Who was Mansa Musa?", &chunks);
        assert_eq!(ranked[0].chunk.topic, "mansa_musa");
        assert_eq!(ranked[0].breakdown.name, NAME_BONUS);
        // mansa musa 키워드(+2) + 토큰 겹침 2
        assert_eq!(ranked[0].breakdown.keyword, 2);
        assert_eq!(ranked[0].breakdown.overlap, 2);
        assert_eq!(ranked[0].score, 14);
    }

    #[test]
    fn test_monotonic_name_match() {
        let chunks = sample_chunks();
        let scorer = LexicalScorer::default();

        let without = scorer
            .score_all("Tell me about the emperor", &chunks)
            .into_iter()
            .find(|s| s.chunk.topic == "mansa_musa")
            .map(|s| s.score)
            .unwrap_or(0);
        let with = scorer
            .score_all("Tell me about the emperor Mansa Musa", &chunks)
            .into_iter()
            .find(|s| s.chunk.topic == "mansa_musa")
            .map(|s| s.score)
            .unwrap_or(0);

        assert!(with > without);
        assert!(with - without >= NAME_BONUS);
    }

    #[test]
    fn test_phrase_override() {
        let chunks = sample_chunks();
        let scorer = LexicalScorer::default();

        let ranked = scorer.score("What are the tribes in Kenya?", &chunks);
        assert_eq!(ranked[0].chunk.topic, "kenya");
        assert_eq!(ranked[0].breakdown.phrase, PHRASE_BONUS);
        // nigeria 도 구문 보너스를 받지만 kenya 키워드/토픽 보너스가 없음
        assert_eq!(ranked[1].chunk.topic, "nigeria");
        assert_eq!(ranked[1].breakdown.phrase, PHRASE_BONUS);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_topic_and_category_bonus() {
        let chunks = sample_chunks();
        let scorer = LexicalScorer::default();

        let ranked = scorer.score("mali history", &chunks);
        let top = ranked[0];
        assert_eq!(top.chunk.topic, "mali");
        assert_eq!(top.breakdown.topic, TOPIC_BONUS);
        assert_eq!(top.breakdown.category, CATEGORY_BONUS);
    }

    #[test]
    fn test_no_match_is_empty() {
        let chunks = sample_chunks();
        let ranked = LexicalScorer::default().score("asdkjhasd", &chunks);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_ties_keep_emission_order() {
        let chunks = vec![
            Chunk::new("alpha", "first", Category::Culture, &["drum"]),
            Chunk::new("beta", "second", Category::Culture, &["drum"]),
            Chunk::new("gamma", "third", Category::Culture, &["drum"]),
        ];

        let ranked = LexicalScorer::new(2).score("drum", &chunks);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.topic, "first");
        assert_eq!(ranked[1].chunk.topic, "second");
        assert_eq!(ranked[0].position, 0);
    }

    #[test]
    fn test_deterministic_ranking() {
        let chunks = crate::knowledge::build_chunks(&crate::knowledge::data::builtin_records());
        let scorer = LexicalScorer::default();

        let first: Vec<_> = scorer
            .score("Tell me about griots and music", &chunks)
            .iter()
            .map(|s| (s.chunk.content.clone(), s.score))
            .collect();

        for _ in 0..5 {
            let again: Vec<_> = scorer
                .score("Tell me about griots and music", &chunks)
                .iter()
                .map(|s| (s.chunk.content.clone(), s.score))
                .collect();
            assert_eq!(first, again);
        }
        assert!(first.len() <= DEFAULT_TOP_K);
    }

    #[test]
    fn test_keyword_containment_cumulative() {
        let chunk = Chunk::new("x", "t", Category::Culture, &["kora", "drum", "dance"]);
        let ranked = LexicalScorer::default().score("kora drum dance", std::slice::from_ref(&chunk));
        assert_eq!(ranked[0].breakdown.keyword, 3 * KEYWORD_BONUS);
    }
}
