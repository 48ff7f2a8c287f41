//! 정적 지식 정의
//!
//! 프로세스 시작 시 한 번만 로드됩니다. 약어 마침표("c.", "St.")는 쓰지 않습니다.
//! (응답 조합기의 문장 분할이 마침표 + 공백을 문장 경계로 취급)

use super::record::{
    Country, Culture, Empire, Figure, KnowledgeRecord, Philosophy, Proverbs, RecordKind, Tradition,
};

/// 내장 지식 레코드 (삽입 순서 = 청크 방출 순서)
pub fn builtin_records() -> Vec<KnowledgeRecord> {
    let mut records = Vec::new();
    records.extend(figures());
    records.extend(philosophies());
    records.extend(traditions());
    records.extend(empires());
    records.extend(countries());
    records.extend(cultures());
    records.push(proverbs());
    records
}

// ============================================================================
// Historical Figures
// ============================================================================

fn figures() -> Vec<KnowledgeRecord> {
    vec![
        KnowledgeRecord::new(
            "mansa_musa",
            RecordKind::Figure(Figure {
                name: "Mansa Musa",
                title: "Emperor of the Mali Empire",
                period: "1312-1337",
                aliases: &["musa keita"],
                achievements: &[
                    "Made a famous pilgrimage to Mecca in 1324 carrying vast amounts of gold",
                    "Expanded the Mali Empire to include Timbuktu and Gao",
                    "Built the Djinguereber Mosque in Timbuktu",
                    "Turned Timbuktu into a renowned centre of Islamic learning",
                ],
                legacy: "Often described as one of the wealthiest people in history, he put West Africa on the maps of the medieval world.",
                story: "When Mansa Musa passed through Cairo on his pilgrimage, he gave away so much gold that its value fell in the markets for years afterwards. The scholars and architects who returned with him helped make Timbuktu a city of books.",
                extra: &[],
            }),
        ),
        KnowledgeRecord::new(
            "sundiata",
            RecordKind::Figure(Figure {
                name: "Sundiata Keita",
                title: "Founder of the Mali Empire",
                period: "1235-1255",
                aliases: &["sundiata", "sundjata", "lion king of mali"],
                achievements: &[
                    "Defeated the Sosso king Sumanguru at the Battle of Kirina in 1235",
                    "United the Mandinka clans into the Mali Empire",
                    "Established the Kouroukan Fouga, an early charter of social rules",
                ],
                legacy: "His epic is still sung by griots across West Africa and shaped the identity of the Mandinka people.",
                story: "As a child Sundiata could not walk, and many mocked his mother. One day he pulled himself up on an iron rod and stood, and the griots say the earth trembled. He grew into the Lion of Mali who freed his people.",
                extra: &[("epic", "The Epic of Sundiata is preserved through the oral tradition of the griots.")],
            }),
        ),
        KnowledgeRecord::new(
            "queen_nzinga",
            RecordKind::Figure(Figure {
                name: "Queen Nzinga",
                title: "Queen of Ndongo and Matamba",
                period: "1624-1663",
                aliases: &["nzinga", "njinga"],
                achievements: &[
                    "Resisted Portuguese colonial expansion for four decades",
                    "Negotiated as an equal with the Portuguese governor in Luanda",
                    "Built alliances and offered refuge to escaped captives",
                ],
                legacy: "She is remembered in Angola as a symbol of resistance and diplomatic brilliance.",
                story: "When the Portuguese governor offered her no chair during negotiations, Nzinga had a servant kneel to form a seat, so that she could speak to him eye to eye.",
                extra: &[],
            }),
        ),
        KnowledgeRecord::new(
            "kwame_nkrumah",
            RecordKind::Figure(Figure {
                name: "Kwame Nkrumah",
                title: "First President of Ghana",
                period: "1957-1966",
                aliases: &["nkrumah"],
                achievements: &[
                    "Led the Gold Coast to independence as Ghana in 1957",
                    "Championed Pan-Africanism and African unity",
                    "Helped found the Organisation of African Unity in 1963",
                ],
                legacy: "His vision of a united Africa continues to inspire the Pan-African movement.",
                story: "At midnight on 6 March 1957, Nkrumah told a jubilant crowd in Accra that Ghana was free forever, and that its independence was meaningless unless linked with the liberation of the whole continent.",
                extra: &[],
            }),
        ),
        KnowledgeRecord::new(
            "nelson_mandela",
            RecordKind::Figure(Figure {
                name: "Nelson Mandela",
                title: "First democratically elected President of South Africa",
                period: "1994-1999",
                aliases: &["mandela", "madiba"],
                achievements: &[
                    "Led the struggle against apartheid",
                    "Spent 27 years in prison without abandoning his principles",
                    "Guided South Africa through a peaceful transition to democracy",
                    "Received the Nobel Peace Prize in 1993",
                ],
                legacy: "Mandela became a global symbol of reconciliation, forgiveness, and the spirit of Ubuntu.",
                story: "On leaving prison, Mandela said that if he did not leave his bitterness and hatred behind, he would still be in prison.",
                extra: &[],
            }),
        ),
    ]
}

// ============================================================================
// Philosophy & Traditions
// ============================================================================

fn philosophies() -> Vec<KnowledgeRecord> {
    vec![KnowledgeRecord::new(
        "ubuntu",
        RecordKind::Philosophy(Philosophy {
            name: "Ubuntu",
            motto: "I am because we are",
            definition: "Ubuntu is a Southern African philosophy of shared humanity, expressing the interconnectedness of all people.",
            meaning: "A person with Ubuntu is open and available to others, finds strength in community, and shows compassion and support to those in need.",
            proverbs: &[
                "Umuntu ngumuntu ngabantu - a person is a person through other people",
                "When one of us is hungry, none of us is full",
            ],
            extra: &[("origin", "The word comes from the Nguni languages, including Zulu and Xhosa.")],
        }),
    )]
}

fn traditions() -> Vec<KnowledgeRecord> {
    vec![KnowledgeRecord::new(
        "griots",
        RecordKind::Tradition(Tradition {
            name: "Griot",
            definition: "A griot is a West African storyteller, historian, praise singer, and musician.",
            role: "Griots are living libraries who keep the history and genealogy of families and kingdoms.",
            significance: "Through griots, the memory of the community passes across generations, preserving continuity without written records.",
            practices: &[
                "Reciting genealogies at naming ceremonies and weddings",
                "Singing the epics of kings such as Sundiata",
                "Playing the kora, the balafon, and the ngoni",
                "Advising rulers and mediating disputes",
            ],
            extra: &[],
        }),
    )]
}

// ============================================================================
// Empires
// ============================================================================

fn empires() -> Vec<KnowledgeRecord> {
    vec![
        KnowledgeRecord::new(
            "mali",
            RecordKind::Empire(Empire {
                name: "Mali Empire",
                period: "1235-1670",
                capital: Some("Niani"),
                location: Some("West Africa, along the upper Niger River"),
                achievements: &[
                    "Controlled the trans-Saharan gold and salt trade",
                    "Made Timbuktu a centre of scholarship",
                    "Governed through the Kouroukan Fouga charter",
                ],
                extra: &[],
            }),
        ),
        KnowledgeRecord::new(
            "ghana",
            RecordKind::Empire(Empire {
                name: "Ghana Empire",
                period: "300-1200",
                capital: Some("Koumbi Saleh"),
                location: None,
                achievements: &[],
                extra: &[
                    ("trade", "Known as the land of gold, it grew rich taxing the trans-Saharan caravans."),
                    ("people", "It was founded by the Soninke people."),
                ],
            }),
        ),
        KnowledgeRecord::new(
            "songhai",
            RecordKind::Empire(Empire {
                name: "Songhai Empire",
                period: "1464-1591",
                capital: Some("Gao"),
                location: Some("The Niger bend in West Africa"),
                achievements: &[
                    "Became one of the largest states in African history",
                    "Built a professional army and river navy",
                    "Supported the universities of Timbuktu under Askia Muhammad",
                ],
                extra: &[],
            }),
        ),
        KnowledgeRecord::new(
            "great_zimbabwe",
            RecordKind::Empire(Empire {
                name: "Great Zimbabwe",
                period: "1100-1450",
                capital: None,
                location: Some("The southeastern hills of present-day Zimbabwe"),
                achievements: &[
                    "Raised monumental dry-stone walls without mortar",
                    "Traded gold and ivory with the Swahili coast",
                ],
                extra: &[("architecture", "The Great Enclosure is the largest ancient structure south of the Sahara.")],
            }),
        ),
    ]
}

// ============================================================================
// Countries
// ============================================================================

fn countries() -> Vec<KnowledgeRecord> {
    vec![
        KnowledgeRecord::new(
            "kenya",
            RecordKind::Country(Country {
                name: "Kenya",
                capital: "Nairobi",
                region: "East Africa",
                ethnic_groups: &["Kikuyu", "Luhya", "Kalenjin", "Luo", "Kamba", "Maasai"],
                languages: &["Swahili", "English"],
                extra: &[],
            }),
        ),
        KnowledgeRecord::new(
            "nigeria",
            RecordKind::Country(Country {
                name: "Nigeria",
                capital: "Abuja",
                region: "West Africa",
                ethnic_groups: &["Hausa", "Yoruba", "Igbo", "Fulani", "Ijaw"],
                languages: &["English", "Hausa", "Yoruba", "Igbo"],
                extra: &[("population", "It is the most populous country on the continent.")],
            }),
        ),
        KnowledgeRecord::new(
            "south_africa",
            RecordKind::Country(Country {
                name: "South Africa",
                capital: "Pretoria",
                region: "Southern Africa",
                ethnic_groups: &["Zulu", "Xhosa", "Sotho", "Tswana", "Venda"],
                languages: &["Zulu", "Xhosa", "Afrikaans", "English", "Sotho"],
                extra: &[],
            }),
        ),
        KnowledgeRecord::new(
            "ethiopia",
            RecordKind::Country(Country {
                name: "Ethiopia",
                capital: "Addis Ababa",
                region: "the Horn of Africa",
                ethnic_groups: &["Oromo", "Amhara", "Somali", "Tigrayan", "Sidama"],
                languages: &["Amharic", "Oromo", "Tigrinya"],
                extra: &[("heritage", "It is home to the ancient kingdom of Aksum and its towering stone stelae.")],
            }),
        ),
    ]
}

// ============================================================================
// Culture
// ============================================================================

fn cultures() -> Vec<KnowledgeRecord> {
    vec![
        KnowledgeRecord::new(
            "languages",
            RecordKind::Culture(Culture {
                name: "African languages",
                lists: &[
                    (
                        "major families",
                        &["Niger-Congo", "Afro-Asiatic", "Nilo-Saharan", "Khoisan"],
                    ),
                    (
                        "widely spoken",
                        &["Swahili", "Hausa", "Yoruba", "Amharic", "Zulu", "Oromo"],
                    ),
                ],
                significance: Some("Africa is home to more than two thousand languages, each carrying the proverbs, songs, and identity of its people."),
            }),
        ),
        KnowledgeRecord::new(
            "art",
            RecordKind::Culture(Culture {
                name: "African art",
                lists: &[(
                    "traditions",
                    &[
                        "Benin bronze casting",
                        "Kente cloth weaving",
                        "Dogon wooden masks",
                        "Ndebele house painting",
                    ],
                )],
                significance: Some("African art often serves the community, honouring ancestors and marking the passages of life."),
            }),
        ),
        KnowledgeRecord::new(
            "music",
            RecordKind::Culture(Culture {
                name: "African music",
                lists: &[
                    (
                        "instruments",
                        &["Kora", "Djembe", "Talking drum", "Mbira", "Balafon"],
                    ),
                    ("styles", &["Highlife", "Afrobeat", "Mbalax", "Isicathamiya"]),
                ],
                significance: None,
            }),
        ),
    ]
}

// ============================================================================
// Proverbs
// ============================================================================

fn proverbs() -> KnowledgeRecord {
    KnowledgeRecord::new(
        "proverbs",
        RecordKind::Proverbs(Proverbs {
            name: "African proverb",
            themes: &[
                (
                    "of wisdom",
                    &[
                        "Wisdom is like a baobab tree; no one individual can embrace it",
                        "When the music changes, so does the dance",
                        "The fool speaks, the wise man listens",
                        "However long the night, the dawn will break",
                    ],
                ),
                (
                    "of community",
                    &[
                        "If you want to go fast, go alone; if you want to go far, go together",
                        "It takes a village to raise a child",
                        "Sticks in a bundle are unbreakable",
                    ],
                ),
            ],
        }),
    )
}

// ============================================================================
// Topic Suggestions
// ============================================================================

/// 탐색 가능한 주제 제안 (영역별)
pub const TOPIC_SUGGESTIONS: &[(&str, &[&str])] = &[
    (
        "history",
        &[
            "The Mali Empire and Mansa Musa",
            "Sundiata Keita, the Lion of Mali",
            "The Songhai Empire",
            "Great Zimbabwe",
            "Queen Nzinga's resistance",
        ],
    ),
    (
        "culture",
        &[
            "Griots and the oral tradition",
            "African music and instruments",
            "African art traditions",
            "African languages",
        ],
    ),
    (
        "philosophy",
        &["Ubuntu philosophy", "African proverbs and sayings"],
    ),
    (
        "geography",
        &[
            "The peoples of Kenya",
            "Nigeria and its languages",
            "South Africa",
            "Ethiopia",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_records_validate() {
        for record in builtin_records() {
            assert!(record.validate().is_ok(), "invalid record: {}", record.topic);
        }
    }

    #[test]
    fn test_builtin_topics_unique() {
        let records = builtin_records();
        let topics: HashSet<_> = records.iter().map(|r| r.topic).collect();
        assert_eq!(topics.len(), records.len());
    }

    #[test]
    fn test_no_abbreviation_periods() {
        // "c. 1235" 같은 약어는 문장 분할을 깨뜨림
        for record in builtin_records() {
            for (_, value) in record.fields() {
                let text = value.render();
                assert!(!text.contains(" c. "), "{}: {}", record.topic, text);
                assert!(!text.contains("St. "), "{}: {}", record.topic, text);
            }
        }
    }
}
