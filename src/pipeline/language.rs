use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Reply languages the pipeline can commit to for a turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    Vi,
    #[default]
    En,
    Zh,
    Ko,
    Ja,
    Other,
}

impl Language {
    pub const ALL: [Self; 6] = [Self::Vi, Self::En, Self::Zh, Self::Ko, Self::Ja, Self::Other];

    pub fn code(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
            Self::Zh => "zh",
            Self::Ko => "ko",
            Self::Ja => "ja",
            Self::Other => "other",
        }
    }

    /// Parse a language code or tag. Region and script subtags are ignored,
    /// so `vi-VN`, `zh_Hans` and `EN` all resolve.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "vi" | "vietnamese" => Some(Self::Vi),
            "en" | "english" => Some(Self::En),
            "zh" | "chinese" | "cn" => Some(Self::Zh),
            "ko" | "korean" | "kr" => Some(Self::Ko),
            "ja" | "japanese" | "jp" => Some(Self::Ja),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// English name, used inside prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Vi => "Vietnamese",
            Self::En => "English",
            Self::Zh => "Chinese",
            Self::Ko => "Korean",
            Self::Ja => "Japanese",
            Self::Other => "the user's own language",
        }
    }

    /// Locale used for localized fallback strings.
    pub fn locale(self) -> &'static str {
        match self {
            Self::Other => "en",
            other => other.code(),
        }
    }
}

/// Where the turn's language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LanguageSource {
    Message,
    CallerHint,
    History,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageResolution {
    pub language: Language,
    pub source: LanguageSource,
}

/// Resolves one language per turn: message, then caller hint, then recent
/// user history, then the configured default.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    default_language: Language,
}

impl LanguageDetector {
    pub fn new(default_language: Language) -> Self {
        Self { default_language }
    }

    /// `recent_user_messages` is ordered oldest first.
    pub fn resolve(
        &self,
        message: &str,
        hint: Option<Language>,
        recent_user_messages: &[&str],
    ) -> LanguageResolution {
        if let Some(language) = detect(message) {
            return LanguageResolution {
                language,
                source: LanguageSource::Message,
            };
        }
        if let Some(language) = hint {
            return LanguageResolution {
                language,
                source: LanguageSource::CallerHint,
            };
        }
        if let Some(language) = recent_user_messages.iter().rev().find_map(|m| detect(m)) {
            return LanguageResolution {
                language,
                source: LanguageSource::History,
            };
        }
        LanguageResolution {
            language: self.default_language,
            source: LanguageSource::Default,
        }
    }
}

// Letters that only appear in Vietnamese orthography among the Latin
// languages we expect (precomposed forms).
const VIETNAMESE_LETTERS: &str = "ăâđêôơưạảấầẩẫậắằẳẵặẹẻẽếềểễệỉịọỏốồổỗộớờởỡợụủứừửữựỳỵỷỹĩũ";

// Vietnamese typed without diacritics.
const VIETNAMESE_ASCII_WORDS: &[&str] = &[
    "khong", "duoc", "minh", "roi", "nhung", "vay", "nha", "hoc", "lam", "cung", "nhieu",
    "buon", "vui", "thi", "trung", "bong", "dau", "chua", "dang", "muon", "thay", "qua",
    "ko", "hok", "oi", "nhe", "ak", "nhi",
];

const ENGLISH_WORDS: &[&str] = &[
    "i", "i'm", "im", "i've", "i'll", "me", "my", "you", "your", "we", "they", "it", "it's",
    "the", "a", "an", "and", "but", "or", "so", "is", "are", "was", "were", "be", "been",
    "am", "do", "don't", "did", "didn't", "have", "has", "had", "can", "can't", "will",
    "would", "should", "not", "no", "yes", "to", "of", "in", "on", "at", "for", "with",
    "about", "just", "really", "feel", "feeling", "today", "what", "how", "why", "this",
    "that", "love", "hate", "got", "get", "want", "need", "please", "thanks", "hello", "hi",
];

#[derive(Default)]
struct ScriptCounts {
    hangul: usize,
    kana: usize,
    han: usize,
    latin: usize,
    other: usize,
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' | '\u{FF66}'..='\u{FF9D}')
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

/// Scripts written without spaces between words.
pub(crate) fn is_unspaced_script(c: char) -> bool {
    is_hangul(c) || is_kana(c) || is_han(c)
}

fn count_scripts(text: &str) -> ScriptCounts {
    let mut counts = ScriptCounts::default();
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if is_hangul(c) {
            counts.hangul += 1;
        } else if is_kana(c) {
            counts.kana += 1;
        } else if is_han(c) {
            counts.han += 1;
        } else if c.is_ascii_alphabetic()
            || matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}')
        {
            counts.latin += 1;
        } else {
            counts.other += 1;
        }
    }
    counts
}

/// Detect the dominant language of `text`, or `None` when inconclusive.
///
/// Short foreign-script fragments do not flip the result: the script with the
/// most letters wins, so a Vietnamese sentence quoting a Japanese song title
/// stays Vietnamese.
pub fn detect(text: &str) -> Option<Language> {
    let counts = count_scripts(text);
    let cjk = counts.kana + counts.han;
    let max = counts.hangul.max(cjk).max(counts.latin).max(counts.other);
    if max == 0 {
        return None;
    }

    if counts.hangul == max {
        return Some(Language::Ko);
    }
    if cjk == max {
        // Japanese mixes kana into kanji runs; pure Han is Chinese.
        return if counts.kana > 0 && counts.kana * 5 >= counts.han {
            Some(Language::Ja)
        } else {
            Some(Language::Zh)
        };
    }
    if counts.latin == max {
        return detect_latin(text);
    }
    Some(Language::Other)
}

fn detect_latin(text: &str) -> Option<Language> {
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    let mut vi_words = 0usize;
    let mut en_words = 0usize;
    let mut latin_words = 0usize;

    for word in lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty() && w.chars().any(char::is_alphabetic))
    {
        latin_words += 1;
        if word.chars().any(|c| VIETNAMESE_LETTERS.contains(c))
            || VIETNAMESE_ASCII_WORDS.contains(&word)
        {
            vi_words += 1;
        } else if ENGLISH_WORDS.contains(&word) {
            en_words += 1;
        }
    }

    match vi_words.cmp(&en_words) {
        Ordering::Greater => Some(Language::Vi),
        Ordering::Less => Some(Language::En),
        _ if vi_words > 0 => Some(Language::Vi),
        _ if latin_words >= 4 => Some(Language::Other),
        _ => None,
    }
}
