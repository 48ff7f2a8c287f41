//! Knowledge Record - 정적 지식 레코드 타입
//!
//! 문자열 키 딕셔너리 대신 카테고리별 태그드 variant 로 지식을 표현합니다.
//! 템플릿이 참조하는 필드가 비어 있으면 로드 시점에 `KnowledgeError` 로 실패합니다.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// 정적 텍스트
pub type Text = &'static str;

/// 정적 텍스트 목록
pub type TextList = &'static [&'static str];

/// 추가 문자열 필드 (라벨, 값)
pub type ExtraFields = &'static [(Text, Text)];

// ============================================================================
// Errors
// ============================================================================

/// 지식 정의 오류
///
/// 정적 데이터의 프로그래밍 오류입니다. 시작 시점에 발견되며 질의 시점에는 발생하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeError {
    /// 템플릿이 참조하는 필드가 비어 있음
    #[error("malformed knowledge definition `{topic}`: missing `{field}`")]
    MalformedDefinition { topic: String, field: &'static str },

    /// 같은 토픽 ID 가 두 번 정의됨
    #[error("duplicate knowledge topic `{0}`")]
    DuplicateTopic(String),

    /// 토픽 ID 형식 오류 (소문자 snake_case 만 허용)
    #[error("invalid topic id `{0}`: expected lowercase snake_case")]
    InvalidTopicId(String),
}

// ============================================================================
// Category
// ============================================================================

/// 청크 카테고리 (거친 분류 라벨)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HistoricalFigure,
    History,
    Geography,
    Philosophy,
    Proverb,
    Tradition,
    Culture,
    Wisdom,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HistoricalFigure => "historical_figure",
            Category::History => "history",
            Category::Geography => "geography",
            Category::Philosophy => "philosophy",
            Category::Proverb => "proverb",
            Category::Tradition => "tradition",
            Category::Culture => "culture",
            Category::Wisdom => "wisdom",
        }
    }

    /// 이름 일치 보너스 대상 여부
    pub fn is_named_entity(&self) -> bool {
        matches!(self, Category::HistoricalFigure)
    }

    /// 카테고리 공통 도메인 키워드
    pub fn domain_words(&self) -> &'static [&'static str] {
        match self {
            Category::HistoricalFigure => &["leader", "founder"],
            Category::History => &["empire", "history"],
            Category::Geography => &["country", "people"],
            Category::Philosophy => &["philosophy"],
            Category::Proverb => &["proverb", "saying"],
            Category::Tradition => &["tradition", "oral"],
            Category::Culture => &["culture", "african"],
            Category::Wisdom => &["proverb", "wisdom", "african"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field View
// ============================================================================

/// 레코드 필드 값 (범용 뷰)
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Text),
    List(TextList),
    Map(Vec<(Text, FieldValue)>),
}

impl FieldValue {
    /// 비어 있는 값인지 (공백 문자열, 빈 목록)
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(t) => t.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|i| i.trim().is_empty()),
            FieldValue::Map(entries) => entries.iter().all(|(_, v)| v.is_empty()),
        }
    }

    /// 표시용 문자열 (목록은 ", " 로 연결)
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(t) => t.trim().to_string(),
            FieldValue::List(items) => items
                .iter()
                .map(|i| i.trim())
                .filter(|i| !i.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Map(entries) => entries
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{}: {}", k, v.render()))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

// ============================================================================
// Typed Records
// ============================================================================

/// 역사적 인물
#[derive(Debug, Clone)]
pub struct Figure {
    pub name: Text,
    pub title: Text,
    pub period: Text,
    /// 검색용 별칭 (소문자)
    pub aliases: TextList,
    pub achievements: TextList,
    pub legacy: Text,
    pub story: Text,
    pub extra: ExtraFields,
}

/// 제국 / 왕국
#[derive(Debug, Clone)]
pub struct Empire {
    pub name: Text,
    pub period: Text,
    pub capital: Option<Text>,
    pub location: Option<Text>,
    pub achievements: TextList,
    pub extra: ExtraFields,
}

/// 현대 국가
#[derive(Debug, Clone)]
pub struct Country {
    pub name: Text,
    pub capital: Text,
    pub region: Text,
    pub ethnic_groups: TextList,
    pub languages: TextList,
    pub extra: ExtraFields,
}

/// 철학 / 사상
#[derive(Debug, Clone)]
pub struct Philosophy {
    pub name: Text,
    /// 한 줄 요약 문구 (템플릿 인용)
    pub motto: Text,
    pub definition: Text,
    pub meaning: Text,
    pub proverbs: TextList,
    pub extra: ExtraFields,
}

/// 전통 / 관습
#[derive(Debug, Clone)]
pub struct Tradition {
    pub name: Text,
    pub definition: Text,
    pub role: Text,
    pub significance: Text,
    pub practices: TextList,
    pub extra: ExtraFields,
}

/// 속담 모음 (주제별 중첩)
#[derive(Debug, Clone)]
pub struct Proverbs {
    pub name: Text,
    pub themes: &'static [(Text, TextList)],
}

impl Proverbs {
    /// 모든 속담 (주제 순서대로)
    pub fn all(&self) -> Vec<Text> {
        self.themes
            .iter()
            .flat_map(|(_, items)| items.iter().copied())
            .filter(|p| !p.trim().is_empty())
            .collect()
    }
}

/// 문화 주제 (언어, 예술, 음악 등)
#[derive(Debug, Clone)]
pub struct Culture {
    pub name: Text,
    pub lists: &'static [(Text, TextList)],
    pub significance: Option<Text>,
}

/// 카테고리별 레코드 본문
#[derive(Debug, Clone)]
pub enum RecordKind {
    Figure(Figure),
    Empire(Empire),
    Country(Country),
    Philosophy(Philosophy),
    Tradition(Tradition),
    Proverbs(Proverbs),
    Culture(Culture),
}

/// 지식 레코드
#[derive(Debug, Clone)]
pub struct KnowledgeRecord {
    /// 안정적인 토픽 ID (소문자 snake_case)
    pub topic: Text,
    pub kind: RecordKind,
}

impl KnowledgeRecord {
    pub fn new(topic: Text, kind: RecordKind) -> Self {
        Self { topic, kind }
    }

    /// 레코드 대표 이름
    pub fn name(&self) -> Text {
        match &self.kind {
            RecordKind::Figure(r) => r.name,
            RecordKind::Empire(r) => r.name,
            RecordKind::Country(r) => r.name,
            RecordKind::Philosophy(r) => r.name,
            RecordKind::Tradition(r) => r.name,
            RecordKind::Proverbs(r) => r.name,
            RecordKind::Culture(r) => r.name,
        }
    }

    /// 레코드 기본 카테고리
    pub fn category(&self) -> Category {
        match &self.kind {
            RecordKind::Figure(_) => Category::HistoricalFigure,
            RecordKind::Empire(_) => Category::History,
            RecordKind::Country(_) => Category::Geography,
            RecordKind::Philosophy(_) => Category::Philosophy,
            RecordKind::Tradition(_) => Category::Tradition,
            RecordKind::Proverbs(_) => Category::Wisdom,
            RecordKind::Culture(_) => Category::Culture,
        }
    }

    /// 레코드 종류 이름 (진단용)
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            RecordKind::Figure(_) => "figure",
            RecordKind::Empire(_) => "empire",
            RecordKind::Country(_) => "country",
            RecordKind::Philosophy(_) => "philosophy",
            RecordKind::Tradition(_) => "tradition",
            RecordKind::Proverbs(_) => "proverbs",
            RecordKind::Culture(_) => "culture",
        }
    }

    /// 정체성 요약 (이름 + 직함 + 시대 등). 없으면 None.
    pub fn identity(&self) -> Option<String> {
        match &self.kind {
            RecordKind::Figure(r) => Some(format!("{} - {} ({})", r.name, r.title, r.period)),
            RecordKind::Empire(r) => Some(format!("{} period: {}", r.name, r.period)),
            RecordKind::Country(r) => Some(format!(
                "{} - a country in {} with its capital at {}",
                r.name, r.region, r.capital
            )),
            _ => None,
        }
    }

    /// 검색용 별칭
    pub fn aliases(&self) -> TextList {
        match &self.kind {
            RecordKind::Figure(r) => r.aliases,
            _ => &[],
        }
    }

    /// 필드 범용 뷰 (선언 순서 유지)
    ///
    /// 정체성 요약에 이미 포함된 필드(이름, 직함, 시대 등)는 제외합니다.
    pub fn fields(&self) -> Vec<(Text, FieldValue)> {
        let mut fields = Vec::new();

        match &self.kind {
            RecordKind::Figure(r) => {
                fields.push(("achievements", FieldValue::List(r.achievements)));
                fields.push(("legacy", FieldValue::Text(r.legacy)));
                fields.push(("story", FieldValue::Text(r.story)));
                push_extra(&mut fields, r.extra);
            }
            RecordKind::Empire(r) => {
                if let Some(capital) = r.capital {
                    fields.push(("capital", FieldValue::Text(capital)));
                }
                if let Some(location) = r.location {
                    fields.push(("location", FieldValue::Text(location)));
                }
                fields.push(("achievements", FieldValue::List(r.achievements)));
                push_extra(&mut fields, r.extra);
            }
            RecordKind::Country(r) => {
                fields.push(("ethnic groups", FieldValue::List(r.ethnic_groups)));
                fields.push(("languages", FieldValue::List(r.languages)));
                push_extra(&mut fields, r.extra);
            }
            RecordKind::Philosophy(r) => {
                fields.push(("philosophy", FieldValue::Text(r.definition)));
                fields.push(("meaning", FieldValue::Text(r.meaning)));
                fields.push(("proverb", FieldValue::List(r.proverbs)));
                push_extra(&mut fields, r.extra);
            }
            RecordKind::Tradition(r) => {
                fields.push(("definition", FieldValue::Text(r.definition)));
                fields.push(("role", FieldValue::Text(r.role)));
                fields.push(("significance", FieldValue::Text(r.significance)));
                fields.push(("practices", FieldValue::List(r.practices)));
                push_extra(&mut fields, r.extra);
            }
            RecordKind::Proverbs(r) => {
                let themes = r
                    .themes
                    .iter()
                    .map(|(theme, items)| (*theme, FieldValue::List(*items)))
                    .collect();
                fields.push(("themes", FieldValue::Map(themes)));
            }
            RecordKind::Culture(r) => {
                for (label, items) in r.lists {
                    fields.push((*label, FieldValue::List(*items)));
                }
                if let Some(significance) = r.significance {
                    fields.push(("cultural significance", FieldValue::Text(significance)));
                }
            }
        }

        fields
    }

    /// 템플릿 필수 필드 검증
    pub fn validate(&self) -> Result<(), KnowledgeError> {
        if !is_valid_topic_id(self.topic) {
            return Err(KnowledgeError::InvalidTopicId(self.topic.to_string()));
        }

        let missing = |field: &'static str| KnowledgeError::MalformedDefinition {
            topic: self.topic.to_string(),
            field,
        };

        require_text(self.name(), "name").map_err(missing)?;

        match &self.kind {
            RecordKind::Figure(r) => {
                require_text(r.title, "title").map_err(missing)?;
                require_text(r.period, "period").map_err(missing)?;
                require_list(r.achievements, "achievements").map_err(missing)?;
                require_text(r.legacy, "legacy").map_err(missing)?;
                require_text(r.story, "story").map_err(missing)?;
            }
            RecordKind::Empire(r) => {
                require_text(r.period, "period").map_err(missing)?;
            }
            RecordKind::Country(r) => {
                require_text(r.capital, "capital").map_err(missing)?;
                require_text(r.region, "region").map_err(missing)?;
            }
            RecordKind::Philosophy(r) => {
                require_text(r.motto, "motto").map_err(missing)?;
                require_text(r.definition, "definition").map_err(missing)?;
                require_text(r.meaning, "meaning").map_err(missing)?;
                require_list(r.proverbs, "proverbs").map_err(missing)?;
            }
            RecordKind::Tradition(r) => {
                require_text(r.definition, "definition").map_err(missing)?;
                require_text(r.role, "role").map_err(missing)?;
                require_list(r.practices, "practices").map_err(missing)?;
            }
            RecordKind::Proverbs(r) => {
                if r.all().is_empty() {
                    return Err(missing("themes"));
                }
            }
            RecordKind::Culture(r) => {
                if r.lists.iter().all(|(_, items)| require_list(*items, "").is_err()) {
                    return Err(missing("lists"));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn push_extra(fields: &mut Vec<(Text, FieldValue)>, extra: ExtraFields) {
    for (label, value) in extra {
        fields.push((*label, FieldValue::Text(*value)));
    }
}

fn require_text(value: Text, field: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        Err(field)
    } else {
        Ok(())
    }
}

fn require_list(items: TextList, field: &'static str) -> Result<(), &'static str> {
    if items.iter().any(|i| !i.trim().is_empty()) {
        Ok(())
    } else {
        Err(field)
    }
}

/// 토픽 ID 형식 검사 (소문자, 숫자, '_')
pub fn is_valid_topic_id(topic: &str) -> bool {
    !topic.is_empty()
        && !topic.starts_with('_')
        && topic
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn figure(title: Text, achievements: TextList) -> KnowledgeRecord {
        KnowledgeRecord::new(
            "test_figure",
            RecordKind::Figure(Figure {
                name: "Test Figure",
                title,
                period: "1000-1050",
                aliases: &[],
                achievements,
                legacy: "Remembered well.",
                story: "Once upon a time.",
                extra: &[("birthplace", "Somewhere")],
            }),
        )
    }

    #[test]
    fn test_validate_ok() {
        assert!(figure("Ruler", &["Built things"]).validate().is_ok());
    }

    #[test]
    fn test_validate_missing_title() {
        let err = figure("  ", &["Built things"]).validate().unwrap_err();
        assert_eq!(
            err,
            KnowledgeError::MalformedDefinition {
                topic: "test_figure".to_string(),
                field: "title",
            }
        );
    }

    #[test]
    fn test_validate_empty_achievements() {
        let err = figure("Ruler", &[""]).validate().unwrap_err();
        assert!(err.to_string().contains("achievements"));
    }

    #[test]
    fn test_invalid_topic_id() {
        assert!(is_valid_topic_id("mansa_musa"));
        assert!(!is_valid_topic_id("Mansa Musa"));
        assert!(!is_valid_topic_id(""));
        assert!(!is_valid_topic_id("_hidden"));

        let mut record = figure("Ruler", &["Built things"]);
        record.topic = "Bad-Id";
        assert_eq!(
            record.validate().unwrap_err(),
            KnowledgeError::InvalidTopicId("Bad-Id".to_string())
        );
    }

    #[test]
    fn test_fields_order_and_extra() {
        let record = figure("Ruler", &["Built things", "Wrote laws"]);
        let labels: Vec<_> = record.fields().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["achievements", "legacy", "story", "birthplace"]);
        assert_eq!(
            record.identity().as_deref(),
            Some("Test Figure - Ruler (1000-1050)")
        );
    }

    #[test]
    fn test_field_value_render() {
        assert_eq!(FieldValue::List(&["a", " ", "b"]).render(), "a, b");
        assert!(FieldValue::List(&["", " "]).is_empty());

        let map = FieldValue::Map(vec![
            ("wisdom", FieldValue::List(&["x", "y"])),
            ("empty", FieldValue::List(&[])),
        ]);
        assert_eq!(map.render(), "wisdom: x, y");
    }

    #[test]
    fn test_category_strings() {
        assert_eq!(Category::HistoricalFigure.as_str(), "historical_figure");
        assert_eq!(Category::Wisdom.to_string(), "wisdom");
        assert!(Category::HistoricalFigure.is_named_entity());
        assert!(!Category::History.is_named_entity());
    }
}
