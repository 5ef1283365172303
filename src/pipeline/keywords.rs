//! The single keyword table shared by the safety classifier, the celebration
//! detector and the distress check.
//!
//! Phrases are stored lowercase. Matching lowercases the input and, for
//! scripts that separate words with spaces, requires the phrase to sit on word
//! boundaries. Diacritics are significant: "từ từ" (slowly) must never match
//! "tự tử" (suicide), so unaccented spellings are listed explicitly.

use super::language::{Language, is_unspaced_script};

/// Bump whenever an entry is added, removed or reworded.
pub const KEYWORD_TABLE_VERSION: &str = "2025.3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum KeywordCategory {
    SelfHarm,
    Violence,
    Sadness,
    Distress,
    Celebration,
}

impl KeywordCategory {
    /// Categories that end a celebratory thread.
    pub const BREAKS_CELEBRATION: [Self; 3] = [Self::SelfHarm, Self::Violence, Self::Sadness];
    /// Categories that call for support information outside of escalation.
    pub const EMOTIONAL_DISTRESS: [Self; 2] = [Self::Distress, Self::Sadness];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordEntry {
    pub category: KeywordCategory,
    pub language: Language,
    pub phrase: &'static str,
}

const fn kw(category: KeywordCategory, language: Language, phrase: &'static str) -> KeywordEntry {
    KeywordEntry {
        category,
        language,
        phrase,
    }
}

use KeywordCategory::{Celebration, Distress, Sadness, SelfHarm, Violence};
use Language::{En, Ja, Ko, Vi, Zh};

static ENTRIES: &[KeywordEntry] = &[
    // self-harm
    kw(SelfHarm, Vi, "tự tử"),
    kw(SelfHarm, Vi, "tự sát"),
    kw(SelfHarm, Vi, "không muốn sống"),
    kw(SelfHarm, Vi, "muốn chết"),
    kw(SelfHarm, Vi, "tự làm hại"),
    kw(SelfHarm, Vi, "rạch tay"),
    // Unaccented "tu tu" alone is just as often "từ từ" (slowly), so it only
    // counts with a verb of intent in front.
    kw(SelfHarm, Vi, "muon tu tu"),
    kw(SelfHarm, Vi, "dinh tu tu"),
    kw(SelfHarm, Vi, "nghi den tu tu"),
    kw(SelfHarm, Vi, "tu sat"),
    kw(SelfHarm, Vi, "khong muon song"),
    kw(SelfHarm, En, "kill myself"),
    kw(SelfHarm, En, "end my life"),
    kw(SelfHarm, En, "suicide"),
    kw(SelfHarm, En, "suicidal"),
    kw(SelfHarm, En, "hurt myself"),
    kw(SelfHarm, En, "want to die"),
    kw(SelfHarm, En, "self harm"),
    kw(SelfHarm, En, "self-harm"),
    kw(SelfHarm, Zh, "自杀"),
    kw(SelfHarm, Zh, "不想活"),
    kw(SelfHarm, Zh, "想死"),
    kw(SelfHarm, Ko, "자살"),
    kw(SelfHarm, Ko, "죽고 싶"),
    kw(SelfHarm, Ja, "自殺"),
    kw(SelfHarm, Ja, "死にたい"),
    // violence
    kw(Violence, Vi, "đánh em"),
    kw(Violence, Vi, "đánh tôi"),
    kw(Violence, Vi, "đánh mình"),
    kw(Violence, Vi, "bị đánh"),
    kw(Violence, Vi, "anh đánh em"),
    kw(Violence, Vi, "bạo lực"),
    kw(Violence, Vi, "bạo hành"),
    kw(Violence, Vi, "bi danh"),
    kw(Violence, Vi, "anh danh em"),
    kw(Violence, En, "hit me"),
    kw(Violence, En, "hits me"),
    kw(Violence, En, "hurt me"),
    kw(Violence, En, "hurts me"),
    kw(Violence, En, "abuse"),
    kw(Violence, En, "abused"),
    kw(Violence, En, "abusive"),
    kw(Violence, En, "violence"),
    kw(Violence, En, "beat me"),
    kw(Violence, Zh, "打我"),
    kw(Violence, Zh, "家暴"),
    kw(Violence, Ko, "때려"),
    kw(Violence, Ko, "폭력"),
    kw(Violence, Ja, "暴力"),
    kw(Violence, Ja, "殴られ"),
    // sadness and crying
    kw(Sadness, Vi, "buồn"),
    kw(Sadness, Vi, "khóc"),
    kw(Sadness, Vi, "cô đơn"),
    kw(Sadness, Vi, "tuyệt vọng"),
    kw(Sadness, Vi, "chán nản"),
    kw(Sadness, Vi, "buon qua"),
    kw(Sadness, En, "sad"),
    kw(Sadness, En, "crying"),
    kw(Sadness, En, "cried"),
    kw(Sadness, En, "lonely"),
    kw(Sadness, En, "depressed"),
    kw(Sadness, En, "hopeless"),
    kw(Sadness, En, "heartbroken"),
    kw(Sadness, Zh, "难过"),
    kw(Sadness, Zh, "伤心"),
    kw(Sadness, Zh, "哭"),
    kw(Sadness, Ko, "슬퍼"),
    kw(Sadness, Ko, "울었"),
    kw(Sadness, Ja, "悲しい"),
    kw(Sadness, Ja, "泣い"),
    // distress
    kw(Distress, Vi, "căng thẳng"),
    kw(Distress, Vi, "áp lực"),
    kw(Distress, Vi, "lo lắng"),
    kw(Distress, Vi, "mệt mỏi"),
    kw(Distress, Vi, "hoảng loạn"),
    kw(Distress, Vi, "stress"),
    kw(Distress, En, "stress"),
    kw(Distress, En, "stressed"),
    kw(Distress, En, "anxious"),
    kw(Distress, En, "anxiety"),
    kw(Distress, En, "panic"),
    kw(Distress, En, "overwhelmed"),
    kw(Distress, En, "burnt out"),
    kw(Distress, En, "burned out"),
    kw(Distress, En, "can't cope"),
    kw(Distress, Zh, "压力"),
    kw(Distress, Zh, "焦虑"),
    kw(Distress, Ko, "스트레스"),
    kw(Distress, Ko, "불안"),
    kw(Distress, Ja, "ストレス"),
    kw(Distress, Ja, "不安"),
    // celebration
    kw(Celebration, Vi, "trúng"),
    kw(Celebration, Vi, "học bổng"),
    kw(Celebration, Vi, "hoc bong"),
    kw(Celebration, Vi, "đậu"),
    kw(Celebration, Vi, "trúng số"),
    kw(Celebration, Vi, "ăn mừng"),
    kw(Celebration, Vi, "được nhận"),
    kw(Celebration, En, "pass"),
    kw(Celebration, En, "passed"),
    kw(Celebration, En, "got the job"),
    kw(Celebration, En, "scholarship"),
    kw(Celebration, En, "offer"),
    kw(Celebration, En, "accepted"),
    kw(Celebration, En, "celebrate"),
    kw(Celebration, En, "nailed it"),
    kw(Celebration, Zh, "奖学金"),
    kw(Celebration, Zh, "录取"),
    kw(Celebration, Zh, "庆祝"),
    kw(Celebration, Ko, "장학금"),
    kw(Celebration, Ko, "합격"),
    kw(Celebration, Ja, "奨学金"),
    kw(Celebration, Ja, "合格"),
];

/// Versioned, language-tagged keyword table.
#[derive(Debug)]
pub struct KeywordTable {
    version: &'static str,
    entries: &'static [KeywordEntry],
}

static DEFAULT_TABLE: KeywordTable = KeywordTable::new(KEYWORD_TABLE_VERSION, ENTRIES);

pub fn default_table() -> &'static KeywordTable {
    &DEFAULT_TABLE
}

impl KeywordTable {
    pub const fn new(version: &'static str, entries: &'static [KeywordEntry]) -> Self {
        Self { version, entries }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn entries(&self, category: KeywordCategory) -> impl Iterator<Item = &KeywordEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// First entry of `category` found in `text`, in table order.
    pub fn find(&self, category: KeywordCategory, text: &str) -> Option<&KeywordEntry> {
        let normalized = normalize(text);
        self.entries(category)
            .find(|entry| contains_phrase(&normalized, entry.phrase))
    }

    /// First match across `categories`, checked in the order given.
    pub fn find_any(&self, categories: &[KeywordCategory], text: &str) -> Option<&KeywordEntry> {
        let normalized = normalize(text);
        categories.iter().find_map(|category| {
            self.entries(*category)
                .find(|entry| contains_phrase(&normalized, entry.phrase))
        })
    }

    pub fn matches(&self, category: KeywordCategory, text: &str) -> bool {
        self.find(category, text).is_some()
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
        .replace('\u{00A0}', " ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() && !is_unspaced_script(c)
}

/// Substring search that refuses matches glued onto neighbouring letters of
/// a space-separated script. CJK, kana and Hangul phrases match anywhere.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let (Some(first), Some(last)) = (phrase.chars().next(), phrase.chars().next_back()) else {
        return false;
    };
    let check_start = is_word_char(first);
    let check_end = is_word_char(last);

    haystack.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        (!check_start || before.is_none_or(|c| !is_word_char(c)))
            && (!check_end || after.is_none_or(|c| !is_word_char(c)))
    })
}
