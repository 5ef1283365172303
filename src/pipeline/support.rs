/// Crisis and contact information. Reproduced byte-for-byte, never translated.
pub const SUPPORT_BLOCK: &str = "\
-------------------------------------
University of Adelaide \u{2013} Student Wellbeing Support

\u{2022} Counselling Support (free for all students)
  https://www.adelaide.edu.au/counselling/

\u{2022} After-hours Crisis Line
  5pm\u{2013}9am weekdays, 24/7 weekends & holidays
  Phone: 1300 167 654
  Text: 0488 884 197

\u{2022} International Student Support
  https://international.adelaide.edu.au/student-support

\u{2022} Student Life & Wellbeing
  https://www.adelaide.edu.au/student/wellbeing

\u{2022} Emergency (Australia-wide): Call 000
-------------------------------------";

/// Append the support block after the reply. The block is attached here and
/// only here, so its bytes never pass through the generation collaborator.
pub fn append_support_block(reply: &str) -> String {
    let reply = reply.trim_end();
    if reply.contains(SUPPORT_BLOCK) {
        return reply.to_string();
    }
    if reply.is_empty() {
        return SUPPORT_BLOCK.to_string();
    }
    format!("{reply}\n\n{SUPPORT_BLOCK}")
}
