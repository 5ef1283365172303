use super::language::Language;

/// Register and idiom notes for one reply language. Advisory text only; it is
/// merged into the directive bundle and never drives control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterNotes {
    pub language: Language,
    pub casual_markers: &'static str,
    pub formality: &'static str,
    pub idioms: &'static str,
}

pub fn register_notes(language: Language) -> RegisterNotes {
    match language {
        Language::Vi => RegisterNotes {
            language,
            casual_markers: "Use natural spoken Vietnamese with soft particles (nha, nhé, á, nè). \
                Mirror the pronouns the student uses for themselves (em, mình, tui) and address them to match.",
            formality: "Stay warm and peer-like. Avoid stiff written forms like \"quý bạn\" or bureaucratic phrasing.",
            idioms: "Everyday expressions such as \"cố lên\" or \"không sao đâu\" are fine. Do not mix in English unless the student does.",
        },
        Language::En => RegisterNotes {
            language,
            casual_markers: "Australian-friendly casual English is fine (\"hey mate\", \"no worries\", \"hang in there\").",
            formality: "Short sentences, plain words, no academic or clinical vocabulary.",
            idioms: "Light Aussie slang only when the student's tone is relaxed.",
        },
        Language::Zh => RegisterNotes {
            language,
            casual_markers: "Use simple, warm Simplified Chinese; light particles (呀, 呢, 啦) are fine when the tone is casual.",
            formality: "Avoid formal written register and four-character idiom chains.",
            idioms: "Keep vocabulary everyday and easy to read.",
        },
        Language::Ko => RegisterNotes {
            language,
            casual_markers: "Use polite-casual 해요체 by default; switch to 반말 only if the student does first.",
            formality: "Avoid stiff 합니다체 and counselling jargon.",
            idioms: "Simple encouraging phrases like \"힘내요\" are fine.",
        },
        Language::Ja => RegisterNotes {
            language,
            casual_markers: "Use gentle です/ます form by default; mirror casual speech if the student uses it.",
            formality: "Avoid keigo-heavy or business phrasing.",
            idioms: "Short, soft expressions like \"大丈夫だよ\" fit a friendly tone.",
        },
        Language::Other => RegisterNotes {
            language,
            casual_markers: "Reply in the same language and script the student wrote in.",
            formality: "Keep the wording simple and friendly.",
            idioms: "Avoid idioms that may not translate.",
        },
    }
}

impl RegisterNotes {
    pub fn render(&self) -> String {
        format!(
            "- {}\n- {}\n- {}",
            self.casual_markers, self.formality, self.idioms
        )
    }
}
