//! Topic Classifier - 키워드 버킷 기반 주제 분류
//!
//! 어휘 스코어러와 독립적으로 동작하며, 응답 템플릿 선택에 쓰이는
//! 단일 주제 라벨을 반환합니다.

use std::fmt;

use serde::Serialize;

/// 주제 라벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicLabel {
    Greeting,
    History,
    Philosophy,
    Storytelling,
    Wisdom,
    Music,
    Art,
    Language,
    Geography,
    Religion,
    General,
}

impl TopicLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicLabel::Greeting => "greeting",
            TopicLabel::History => "history",
            TopicLabel::Philosophy => "philosophy",
            TopicLabel::Storytelling => "storytelling",
            TopicLabel::Wisdom => "wisdom",
            TopicLabel::Music => "music",
            TopicLabel::Art => "art",
            TopicLabel::Language => "language",
            TopicLabel::Geography => "geography",
            TopicLabel::Religion => "religion",
            TopicLabel::General => "general",
        }
    }
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 라벨 → 키워드 버킷
pub type TopicBucket = (TopicLabel, &'static [&'static str]);

/// 기본 버킷 (선언 순서 = 동점 우선순위)
pub const DEFAULT_BUCKETS: &[TopicBucket] = &[
    (
        TopicLabel::Greeting,
        &["hello", "jambo", "sawubona", "greetings", "good morning", "how is the family", "you are invited"],
    ),
    (
        TopicLabel::History,
        &["history", "historical", "empire", "kingdom", "ancient", "ruler", "king", "queen", "dynasty", "colonial", "independence"],
    ),
    (
        TopicLabel::Philosophy,
        &["ubuntu", "philosophy", "humanity", "community", "values", "moral"],
    ),
    (
        TopicLabel::Storytelling,
        &["griot", "story", "stories", "storyteller", "folktale", "legend", "oral tradition", "epic"],
    ),
    (
        TopicLabel::Wisdom,
        &["proverb", "wisdom", "saying", "advice", "elders", "lesson"],
    ),
    (
        TopicLabel::Music,
        &["music", "song", "dance", "drum", "kora", "balafon", "rhythm", "instrument"],
    ),
    (
        TopicLabel::Art,
        &["art", "mask", "sculpture", "carving", "textile", "kente", "pottery", "bronze"],
    ),
    (
        TopicLabel::Language,
        &["language", "swahili", "yoruba", "zulu", "translate", "speak"],
    ),
    (
        TopicLabel::Geography,
        &["country", "countries", "river", "desert", "sahara", "mountain", "capital", "tribes", "geography", "climate"],
    ),
    (
        TopicLabel::Religion,
        &["religion", "spirit", "spiritual", "ancestor", "ritual", "worship", "orisha"],
    ),
];

/// 주제 분류기
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    buckets: &'static [TopicBucket],
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKETS)
    }
}

impl TopicClassifier {
    pub fn new(buckets: &'static [TopicBucket]) -> Self {
        Self { buckets }
    }

    /// 버킷별 일치 키워드 수 (선언 순서)
    pub fn counts(&self, query: &str) -> Vec<(TopicLabel, usize)> {
        let query_lower = query.to_lowercase();
        self.buckets
            .iter()
            .map(|(label, keywords)| {
                let count = keywords
                    .iter()
                    .filter(|k| query_lower.contains(*k))
                    .count();
                (*label, count)
            })
            .collect()
    }

    /// 최다 일치 라벨. 동점이면 먼저 선언된 라벨, 모두 0 이면 General.
    pub fn classify(&self, query: &str) -> TopicLabel {
        let mut best: Option<(TopicLabel, usize)> = None;

        for (label, count) in self.counts(query) {
            if count == 0 {
                continue;
            }
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((label, count)),
            }
        }

        let label = best.map(|(label, _)| label).unwrap_or(TopicLabel::General);
        tracing::debug!("Classified {:?} as {}", query, label);
        label
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ubuntu_is_philosophy() {
        let classifier = TopicClassifier::default();
        assert_eq!(classifier.classify("Tell me about Ubuntu"), TopicLabel::Philosophy);
    }

    #[test]
    fn test_single_bucket() {
        let classifier = TopicClassifier::default();
        assert_eq!(classifier.classify("Play the kora for me"), TopicLabel::Music);
        assert_eq!(classifier.classify("Share a proverb"), TopicLabel::Wisdom);
        assert_eq!(classifier.classify("Jambo!"), TopicLabel::Greeting);
    }

    #[test]
    fn test_no_bucket_is_general() {
        let classifier = TopicClassifier::default();
        assert_eq!(classifier.classify("asdkjhasd"), TopicLabel::General);
        assert_eq!(classifier.classify(""), TopicLabel::General);
    }

    #[test]
    fn test_idempotent() {
        let classifier = TopicClassifier::default();
        for q in ["Who was Mansa Musa?", "What is a griot?", "zzz"] {
            assert_eq!(classifier.classify(q), classifier.classify(q));
        }
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let classifier = TopicClassifier::default();
        // history: "empire" 1, music: "drum" 1
        assert_eq!(
            classifier.classify("Which empire had the best drum?"),
            TopicLabel::History
        );
        assert_eq!(
            classifier.classify("Which drum did the empire prefer?"),
            TopicLabel::History
        );
    }

    #[test]
    fn test_custom_buckets_tie_order() {
        const BUCKETS: &[TopicBucket] = &[
            (TopicLabel::Music, &["drum"]),
            (TopicLabel::History, &["empire"]),
        ];
        let classifier = TopicClassifier::new(BUCKETS);
        assert_eq!(classifier.classify("empire drum"), TopicLabel::Music);
    }

    #[test]
    fn test_highest_count_wins() {
        let classifier = TopicClassifier::default();
        // music: song, dance (2) vs history: empire (1)
        assert_eq!(
            classifier.classify("songs and dance of the empire"),
            TopicLabel::Music
        );
    }

    #[test]
    fn test_label_strings() {
        assert_eq!(TopicLabel::Storytelling.to_string(), "storytelling");
        assert_eq!(TopicLabel::General.as_str(), "general");
    }
}
