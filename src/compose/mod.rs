//! Compose 모듈 - 랭킹된 청크 → 페르소나 응답
//!
//! - 지배적 레코드의 종류별 템플릿 선택 (없으면 주제 라벨, 그다음 범용)
//! - 일치 결과가 없으면 고정 폴백 풀
//! - 완성된 응답에서 중복 문장 제거

mod templates;

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::knowledge::{KnowledgeStore, ScoredChunk, TopicLabel};

pub use templates::{Template, FALLBACK_INVITATION, FALLBACK_RESPONSES, GREETING_OPENER};

/// 폴백 응답에 덧붙이는 제안 수
const FALLBACK_SUGGESTIONS: usize = 3;

// ============================================================================
// ResponseComposer
// ============================================================================

/// 응답 작성기
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    store: Arc<KnowledgeStore>,
}

impl ResponseComposer {
    pub fn new(store: Arc<KnowledgeStore>) -> Self {
        Self { store }
    }

    /// 응답 작성
    ///
    /// `ranked` 가 비어 있으면 폴백 응답을 반환합니다.
    /// 같은 입력과 같은 시드의 rng 는 항상 같은 문자열을 만듭니다.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        query: &str,
        label: TopicLabel,
        ranked: &[ScoredChunk<'_>],
        rng: &mut R,
    ) -> String {
        if ranked.is_empty() {
            tracing::debug!("No chunks for {:?}, composing fallback", query);
            return self.fallback(rng);
        }

        let context = ranked
            .iter()
            .map(|s| s.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let template = self.select_template(label, ranked);
        tracing::debug!(
            "Composing {:?} with template {} ({} chunks)",
            query,
            template.name(),
            ranked.len()
        );

        let mut response = templates::render(&template, &context, rng);
        if label == TopicLabel::Greeting && matches!(template, Template::Record(_)) {
            response = format!("{}\n\n{}", GREETING_OPENER, response);
        }

        dedup_sentences(&response)
    }

    /// 템플릿 선택
    ///
    /// 지배적 토픽의 레코드가 있으면 종류별 템플릿, 없으면 라벨 프레이밍,
    /// 라벨이 General 이면 범용 템플릿입니다.
    pub fn select_template(&self, label: TopicLabel, ranked: &[ScoredChunk<'_>]) -> Template<'_> {
        if let Some(topic) = dominant_topic(ranked) {
            if let Some(record) = self.store.record(topic) {
                return Template::Record(record);
            }
            tracing::debug!("No record for dominant topic {}", topic);
        }

        match label {
            TopicLabel::General => Template::Generic,
            other => Template::Label(other),
        }
    }

    /// 폴백 응답: 고정 풀에서 하나 + 초대 문구 + 주제 제안
    pub fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let opening = FALLBACK_RESPONSES
            .choose(rng)
            .copied()
            .unwrap_or(FALLBACK_RESPONSES[0]);

        let suggestions = self.store.suggestions(None);
        let picked: Vec<&str> = suggestions
            .choose_multiple(rng, FALLBACK_SUGGESTIONS)
            .copied()
            .collect();

        if picked.is_empty() {
            format!("{} {}", opening, FALLBACK_INVITATION)
        } else {
            format!(
                "{} {}\n\nYou might ask me about: {}.",
                opening,
                FALLBACK_INVITATION,
                picked.join(", ")
            )
        }
    }
}

/// 랭킹에서 가장 많이 등장한 토픽. 동점이면 더 높은 순위에 먼저 나온 토픽.
pub fn dominant_topic<'a>(ranked: &'a [ScoredChunk<'_>]) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for scored in ranked {
        let topic = scored.chunk.topic.as_str();
        match counts.iter_mut().find(|(t, _)| *t == topic) {
            Some((_, count)) => *count += 1,
            None => counts.push((topic, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (topic, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((topic, count)),
        }
    }
    best.map(|(topic, _)| topic)
}

// ============================================================================
// Sentence dedup
// ============================================================================

/// 문장 종결 뒤에 올 수 있는 닫는 문자
const CLOSERS: &[char] = &['"', '\'', '*', ')', '_', '\u{201d}', '\u{2019}'];

/// 한 줄을 문장 단위로 분리
///
/// `.`, `!`, `?` 의 연속(닫는 따옴표/괄호 포함) 뒤에 공백이나 줄 끝이 오면 문장이 끝납니다.
pub fn split_sentences(line: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?') || CLOSERS.contains(&next) {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };
        if at_boundary {
            let sentence = line[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let rest = line[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

fn normalize_sentence(sentence: &str) -> String {
    sentence
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 중복 문장 제거
///
/// 정규화(소문자 + 공백 축약) 기준으로 먼저 나온 문장만 남깁니다.
/// 문장이 모두 제거된 줄은 사라지고, 연속된 빈 줄은 하나로 합쳐집니다.
pub fn dedup_sentences(text: &str) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }

        let kept: Vec<&str> = split_sentences(line)
            .into_iter()
            .filter(|s| seen.insert(normalize_sentence(s)))
            .collect();

        if !kept.is_empty() {
            lines.push(kept.join(" "));
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================
