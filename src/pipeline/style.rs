use super::insight::{Emotion, InsightResult};
use super::profile::StudentProfile;

const SHORT_MESSAGE_CHARS: usize = 80;
const LONG_MESSAGE_CHARS: usize = 300;

const CASUAL_MARKERS: &[&str] = &[
    "haha", "hehe", "hihi", "lol", "lmao", "omg", ":)", ":d", "=))", ":))", "xd", "nè",
    "hông", "ㅋㅋ", "ㅎㅎ", "哈哈", "笑",
];

/// Internal tone guidance. Never shown to the student.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleNote {
    pub tone: Vec<String>,
    pub cultural_guidance: String,
}

impl StyleNote {
    pub fn render_tone(&self) -> String {
        self.tone
            .iter()
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn has_emoji(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{1F300}'..='\u{1FAFF}' | '\u{2600}'..='\u{27BF}'))
}

/// Derives tone, length and formality notes from recent user turns, the
/// turn's insight and the student profile. Local and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleAdvisor;

impl StyleAdvisor {
    /// `recent_user_messages` should include the current message last.
    pub fn advise(
        &self,
        recent_user_messages: &[&str],
        insight: &InsightResult,
        profile: &StudentProfile,
    ) -> StyleNote {
        let mut tone = Vec::new();

        let count = recent_user_messages.len().max(1);
        let average_chars =
            recent_user_messages.iter().map(|m| m.chars().count()).sum::<usize>() / count;
        if average_chars <= SHORT_MESSAGE_CHARS {
            tone.push("They write briefly. Keep the reply short: two to four sentences.".to_string());
        } else if average_chars >= LONG_MESSAGE_CHARS {
            tone.push(
                "They write at length. A fuller reply is fine, but keep it under two short paragraphs."
                    .to_string(),
            );
        } else {
            tone.push("Keep the reply to one short paragraph.".to_string());
        }

        let casual = recent_user_messages.iter().any(|message| {
            let lowered = message.to_lowercase();
            has_emoji(message) || CASUAL_MARKERS.iter().any(|m| lowered.contains(m))
        });
        if casual {
            tone.push("Their tone is casual. Mirror it; an emoji or two is fine.".to_string());
        }

        tone.push(
            match insight.emotion {
                Emotion::Sadness | Emotion::Worry | Emotion::Stress => {
                    "Slow the pace. Validate how they feel before suggesting anything."
                }
                Emotion::Anger => "Stay calm and non-defensive. Do not argue or lecture.",
                Emotion::Joy => "Match their energy.",
                Emotion::Neutral => "Friendly and relaxed.",
            }
            .to_string(),
        );

        if recent_user_messages
            .last()
            .is_some_and(|m| m.trim_end().ends_with(['?', '？']))
        {
            tone.push("They asked something. Answer it directly first.".to_string());
        }

        if !insight.topics.is_empty() {
            tone.push(format!(
                "Keep examples relevant to: {}.",
                insight.topics.join(", ")
            ));
        }

        StyleNote {
            tone,
            cultural_guidance: profile.guidance(),
        }
    }
}
