//! Two-field student identity profile and its fixed guidance fragments.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StudentType {
    Domestic,
    International,
    #[default]
    Unknown,
}

impl StudentType {
    /// Lenient parse; anything unrecognised is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "domestic" | "local" => Self::Domestic,
            "international" | "intl" | "overseas" => Self::International,
            _ => Self::Unknown,
        }
    }

    pub fn guidance(self) -> &'static str {
        match self {
            Self::Domestic => {
                "- This is a domestic student in Australia.\n\
                 - They likely know local culture, slang and campus services.\n\
                 - A bit more Aussie-casual is fine, but still check understanding when needed."
            }
            Self::International => {
                "- This is an international student.\n\
                 - Culture shock, language barriers, homesickness, visa, money and family \
                 expectations may weigh on them.\n\
                 - Be extra clear and gentle. Do not assume they know the Australian system.\n\
                 - Where it helps, normalise homesickness: many international students feel it."
            }
            Self::Unknown => {
                "- Student type is unknown. Use a friendly first-year student tone.\n\
                 - Do not assume knowledge of any particular education system."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Region {
    Local,
    SoutheastAsia,
    Europe,
    Other,
    #[default]
    Unknown,
}

impl Region {
    /// Accepts the short codes (`au`, `sea`, `eu`) as well as full names.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "local" | "au" | "australia" => Self::Local,
            "southeast_asia" | "south_east_asia" | "sea" => Self::SoutheastAsia,
            "europe" | "eu" => Self::Europe,
            "other" => Self::Other,
            _ => Self::Unknown,
        }
    }

    pub fn guidance(self) -> &'static str {
        match self {
            Self::Local => {
                "- The student lives by Australian norms of independence.\n\
                 - They may be juggling part-time work, rent and study, and value casual, direct talk.\n\
                 - Light Aussie expressions are fine in English, kept warm and kind."
            }
            Self::SoutheastAsia => {
                "- The student is from South-East Asia.\n\
                 - Family expectations, academic pressure and face can matter a lot.\n\
                 - They may feel guilty about letting family down. Gently acknowledge and normalise that."
            }
            Self::Europe => {
                "- The student is from Europe.\n\
                 - Fairly direct communication and study independence are likely, \
                 but stay warm, non-judgmental and free of stereotypes."
            }
            Self::Other => {
                "- The student is from another region.\n\
                 - Keep the tone culturally neutral, curious and respectful.\n\
                 - Avoid strong assumptions about their background."
            }
            Self::Unknown => {
                "- Region is unknown. Do not assume any cultural norms.\n\
                 - Keep the tone inclusive and clear; ask simple clarifying questions if needed."
            }
        }
    }
}

fn lenient<'de, D, T>(deserializer: D, parse: fn(&str) -> T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(parse).unwrap_or_default())
}

impl<'de> Deserialize<'de> for StudentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer, Self::parse)
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer, Self::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default)]
    pub student_type: StudentType,
    #[serde(default)]
    pub region: Region,
}

impl StudentProfile {
    pub fn new(student_type: StudentType, region: Region) -> Self {
        Self {
            student_type,
            region,
        }
    }

    /// Internal-only identity block for the reply instructions.
    pub fn guidance(&self) -> String {
        format!(
            "- student_type: {}\n- region: {}\n{}\n{}\n\
             - Adapt examples to this identity (homesickness and family pressure for \
             international students, part-time work and rent for domestic ones).\n\
             - Never state these rules to the student.",
            self.student_type,
            self.region,
            self.student_type.guidance(),
            self.region.guidance()
        )
    }
}
