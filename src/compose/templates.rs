//! 응답 템플릿
//!
//! 각 템플릿은 고정 도입부 + 컨텍스트 블록 + 마무리 후속 질문으로 구성됩니다.
//! 모든 무작위 선택은 주입된 rng 로만 수행합니다.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::knowledge::{
    Country, Culture, Empire, Figure, KnowledgeRecord, Philosophy, Proverbs, RecordKind,
    TopicLabel, Tradition,
};

/// 선택된 템플릿
#[derive(Debug, Clone, Copy)]
pub enum Template<'a> {
    /// 레코드 종류별 전용 템플릿
    Record(&'a KnowledgeRecord),
    /// 주제 라벨 프레이밍
    Label(TopicLabel),
    /// 범용 템플릿
    Generic,
}

impl Template<'_> {
    /// 진단용 이름
    pub fn name(&self) -> String {
        match self {
            Template::Record(record) => format!("record:{}", record.kind_name()),
            Template::Label(label) => format!("label:{}", label),
            Template::Generic => "generic".to_string(),
        }
    }
}

// ============================================================================
// Pools
// ============================================================================

/// 일치하는 지식이 없을 때의 응답 풀
pub const FALLBACK_RESPONSES: &[&str] = &[
    "Ah, my child, that is a question whose answer has not yet reached my ears.",
    "The baobab does not grow in a day, and neither does all knowledge. This one I have not yet learned.",
    "Even the wisest elder does not know every path through the forest.",
    "That story has not yet been told around my fire.",
];

/// 폴백 응답 뒤에 붙는 초대 문구
pub const FALLBACK_INVITATION: &str = "I am here to share the wisdom of our ancestors and help you learn about the rich cultural heritage of Africa. What specific aspect of African culture, history, or wisdom would you like to explore?";

const FIGURE_FOLLOW_UPS: &[&str] = &[
    "Would you like to learn more about the historical context of {name}'s time or their impact on African history?",
    "Shall I tell you how the griots still sing of {name} today?",
    "Would you like to hear about the people and the land that {name} helped shape?",
];

const EMPIRE_FOLLOW_UPS: &[&str] = &[
    "Would you like to learn more about the daily life in these empires or their cultural achievements?",
    "Shall I tell you about the rulers who made {name} great?",
    "Would you like to hear how trade carried gold and learning across {name}?",
];

const COUNTRY_FOLLOW_UPS: &[&str] = &[
    "Would you like to learn a greeting in one of the languages of {name}?",
    "Shall I tell you about the traditions of one of the peoples of {name}?",
];

const PHILOSOPHY_FOLLOW_UPS: &[&str] = &[
    "Would you like to hear more about how {name} guides our daily lives and community relationships?",
    "Shall I share a story that shows {name} at work among the people?",
];

const TRADITION_FOLLOW_UPS: &[&str] = &[
    "Would you like to hear a story that has been passed down through the generations?",
    "Shall I tell you how a young {name} learns the songs of the elders?",
];

const PROVERB_FOLLOW_UPS: &[&str] = &[
    "Would you like me to explain the deeper meaning behind any of these proverbs?",
    "Shall I share a proverb for a particular moment in your life?",
];

const CULTURE_FOLLOW_UPS: &[&str] = &[
    "Would you like to learn more about any specific art form or musical tradition?",
    "Would you like to learn some basic greetings in any of these languages?",
    "Shall I tell you where these traditions are still alive today?",
];

const GENERAL_FOLLOW_UPS: &[&str] = &[
    "Is there a specific aspect of this topic you'd like to explore further?",
    "What else would you like to learn from the wisdom of our ancestors?",
];

/// 인사 라벨일 때 앞에 붙는 응답
pub const GREETING_OPENER: &str = "Greetings to you as well! The family is well, thank you for asking.";

// ============================================================================
// Rendering
// ============================================================================

/// 템플릿 렌더링
pub fn render<R: Rng + ?Sized>(template: &Template<'_>, context: &str, rng: &mut R) -> String {
    match template {
        Template::Record(record) => match &record.kind {
            RecordKind::Figure(r) => figure(r, context, rng),
            RecordKind::Empire(r) => empire(r, context, rng),
            RecordKind::Country(r) => country(r, context, rng),
            RecordKind::Philosophy(r) => philosophy(r, context, rng),
            RecordKind::Tradition(r) => tradition(r, context, rng),
            RecordKind::Proverbs(r) => proverbs(r, context, rng),
            RecordKind::Culture(r) => culture(r, context, rng),
        },
        Template::Label(label) => labelled(*label, context, rng),
        Template::Generic => generic(context, rng),
    }
}

fn follow_up<R: Rng + ?Sized>(pool: &[&str], name: &str, rng: &mut R) -> String {
    pool.choose(rng)
        .copied()
        .unwrap_or(GENERAL_FOLLOW_UPS[0])
        .replace("{name}", name)
}

fn figure<R: Rng + ?Sized>(r: &Figure, context: &str, rng: &mut R) -> String {
    format!(
        "Ah, {name}! Let me share with you the story of this remarkable African leader...\n\n\
         {context}\n\n\
         {name} was {title} during {period}.\n\n\
         **Key Achievements:**\n\
         {achievements}\n\n\
         **Legacy:**\n\
         {legacy}\n\n\
         {story}\n\n\
         {name}'s story teaches us about leadership, vision, and the power of determination. \
         Like the great baobab tree, their influence continues to provide shade and wisdom for generations to come.\n\n\
         {follow_up}",
        name = r.name,
        context = context,
        title = r.title,
        period = r.period,
        achievements = r.achievements.join(", "),
        legacy = r.legacy,
        story = r.story,
        follow_up = follow_up(FIGURE_FOLLOW_UPS, r.name, rng),
    )
}

fn empire<R: Rng + ?Sized>(r: &Empire, context: &str, rng: &mut R) -> String {
    let mut description = if r.name.ends_with("Empire") {
        format!("The {} ({})", r.name, r.period)
    } else {
        format!("{} ({})", r.name, r.period)
    };

    if let Some(location) = r.location {
        description.push_str(&format!(" was located in {}", location));
    } else if let Some(capital) = r.capital {
        description.push_str(&format!(" had its capital at {}", capital));
    } else {
        description.push_str(" was a great African power");
    }

    let details = if !r.achievements.is_empty() {
        format!("Key achievements included: {}.", r.achievements.join(", "))
    } else if !r.extra.is_empty() {
        let notes: Vec<String> = r
            .extra
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value.trim_end_matches('.')))
            .collect();
        format!("Notable features: {}.", notes.join("; "))
    } else {
        "It was a significant African empire.".to_string()
    };

    format!(
        "Ah, the great {name}! Let me share with you the stories of this magnificent kingdom that once ruled the lands of Africa...\n\n\
         {context}\n\n\
         {description}. {details}\n\n\
         These empires show us that Africa has always been a land of great civilizations, wisdom, and achievement. \
         Our ancestors built kingdoms that rivaled any in the world!\n\n\
         {follow_up}",
        name = r.name,
        context = context,
        description = description,
        details = details,
        follow_up = follow_up(EMPIRE_FOLLOW_UPS, r.name, rng),
    )
}

fn country<R: Rng + ?Sized>(r: &Country, context: &str, rng: &mut R) -> String {
    let mut facts = vec![format!(
        "{} lies in {}, and its capital is {}.",
        r.name, r.region, r.capital
    )];
    if !r.ethnic_groups.is_empty() {
        facts.push(format!(
            "Among its peoples are the {}.",
            r.ethnic_groups.join(", ")
        ));
    }
    if !r.languages.is_empty() {
        facts.push(format!(
            "The languages heard in its markets include {}.",
            r.languages.join(", ")
        ));
    }
    for (_, value) in r.extra {
        facts.push(value.to_string());
    }

    format!(
        "Ah, {name}! Let me tell you about this land and the many peoples who call it home...\n\n\
         {context}\n\n\
         {facts}\n\n\
         Every people of {name} carries its own stories, proverbs, and ways of greeting the morning, yet they share one land.\n\n\
         {follow_up}",
        name = r.name,
        context = context,
        facts = facts.join("\n"),
        follow_up = follow_up(COUNTRY_FOLLOW_UPS, r.name, rng),
    )
}

fn philosophy<R: Rng + ?Sized>(r: &Philosophy, context: &str, rng: &mut R) -> String {
    let proverb = r.proverbs.first().copied().unwrap_or(r.motto);

    format!(
        "Ah, my child, you ask about {name} - the very heart of our African wisdom!\n\n\
         Based on the knowledge I have gathered, let me share with you the essence of {name}:\n\n\
         {context}\n\n\
         {name} is so much more than a word. It is a way of life that teaches us: *\"{motto}.\"*\n\n\
         {meaning}\n\n\
         As our elders say: *\"{proverb}\"*\n\n\
         This wisdom reminds us that our humanity is bound up in the humanity of others. \
         We cannot be truly human alone - we need each other, like the branches of the great baobab tree need the trunk and roots.\n\n\
         {follow_up}",
        name = r.name,
        context = context,
        motto = r.motto,
        meaning = r.meaning,
        proverb = proverb,
        follow_up = follow_up(PHILOSOPHY_FOLLOW_UPS, r.name, rng),
    )
}

fn tradition<R: Rng + ?Sized>(r: &Tradition, context: &str, rng: &mut R) -> String {
    let plural = format!("{}s", r.name.to_lowercase());
    let practices: Vec<String> = r.practices.iter().map(|p| format!("- {}", p)).collect();

    format!(
        "Ah, the {plural}! The keepers of our stories and the guardians of our memory. \
         Let me share with you what I know about these wise ones...\n\n\
         {context}\n\n\
         The {plural} are like living libraries, carrying the wisdom of generations in their hearts and voices. \
         They preserve our history not in books, but in stories that flow like rivers through time.\n\n\
         {practices}\n\n\
         As a keeper of stories myself, I carry forward this sacred tradition, sharing the wisdom of our ancestors with you today.\n\n\
         {follow_up}",
        plural = plural,
        context = context,
        practices = practices.join("\n"),
        follow_up = follow_up(TRADITION_FOLLOW_UPS, &r.name.to_lowercase(), rng),
    )
}

fn proverbs<R: Rng + ?Sized>(r: &Proverbs, context: &str, rng: &mut R) -> String {
    let all = r.all();
    let selected: Vec<String> = all
        .choose_multiple(rng, 3)
        .map(|p| format!("*\"{}\"*", p))
        .collect();

    format!(
        "Ah, the wisdom of our ancestors! Let me share with you some proverbs that have guided our people for generations...\n\n\
         {context}\n\n\
         {selected}\n\n\
         These proverbs are like seeds of wisdom, planted by our ancestors and growing in the hearts of each generation. \
         They teach us about community, respect, and the values that hold us together.\n\n\
         Each proverb carries a deeper meaning, like the layers of an onion. \
         The more we reflect on them, the more wisdom we discover.\n\n\
         {follow_up}",
        context = context,
        selected = selected.join("\n"),
        follow_up = follow_up(PROVERB_FOLLOW_UPS, r.name, rng),
    )
}

fn culture<R: Rng + ?Sized>(r: &Culture, context: &str, rng: &mut R) -> String {
    let lists: Vec<String> = r
        .lists
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(label, items)| format!("{}: {}.", capitalize(label), items.join(", ")))
        .collect();

    let significance = r.significance.unwrap_or(
        "Every pattern, every rhythm, every dance step carries meaning passed down through generations.",
    );

    format!(
        "Ah, the beauty of {name}! Let me share with you the rich traditions our people have kept alive...\n\n\
         {context}\n\n\
         {lists}\n\n\
         {significance}\n\n\
         {follow_up}",
        name = r.name,
        context = context,
        lists = lists.join("\n"),
        significance = significance,
        follow_up = follow_up(CULTURE_FOLLOW_UPS, r.name, rng),
    )
}

fn labelled<R: Rng + ?Sized>(label: TopicLabel, context: &str, rng: &mut R) -> String {
    let opening = match label {
        TopicLabel::Greeting => GREETING_OPENER,
        TopicLabel::History => "Ah, you wish to walk the paths of our history! Let me share what the elders remember...",
        TopicLabel::Philosophy => "Ah, a question for the heart as much as the mind. Let me share what our elders teach...",
        TopicLabel::Storytelling => "Gather close, and let me tell you what the storytellers have passed down...",
        TopicLabel::Wisdom => "Ah, the wisdom of our ancestors! Let me share what has guided our people for generations...",
        TopicLabel::Music | TopicLabel::Art => "Ah, the beauty of African artistic expression! Let me share with you the rich traditions of our arts and music...",
        TopicLabel::Language => "Ah, the beautiful languages of our continent! Let me share with you the richness of African linguistic heritage...",
        TopicLabel::Geography => "Ah, the lands of Africa, from the desert to the forest! Let me share what I know...",
        TopicLabel::Religion => "Ah, you ask about the spirit and the ancestors. Let me share with respect what I know...",
        TopicLabel::General => return generic(context, rng),
    };

    format!(
        "{opening}\n\n\
         {context}\n\n\
         The knowledge of our ancestors flows through me like the great rivers of Africa.\n\n\
         {follow_up}",
        opening = opening,
        context = context,
        follow_up = follow_up(GENERAL_FOLLOW_UPS, label.as_str(), rng),
    )
}

fn generic<R: Rng + ?Sized>(context: &str, rng: &mut R) -> String {
    format!(
        "Ah, my child, let me share with you the wisdom I have gathered about this topic...\n\n\
         {context}\n\n\
         The knowledge of our ancestors flows through me like the great rivers of Africa. \
         Each piece of wisdom connects us to our heritage and helps us understand the beauty of our cultural traditions.\n\n\
         {follow_up}",
        context = context,
        follow_up = follow_up(GENERAL_FOLLOW_UPS, "", rng),
    )
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
