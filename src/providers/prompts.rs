//! Prompt construction shared by all providers.
//!
//! Prompts are deliberately compact: every token sent upstream costs
//! money and latency, so instructions are terse and output constraints
//! explicit (word limits, JSON-only).

/// System prompt for free-text educational responses.
pub(crate) const EDUCATOR: &str =
    "You are a friendly tutor for children. Be accurate, age-appropriate and encouraging.";

/// System prompt for quiz generation.
pub(crate) const QUIZ_GENERATOR: &str =
    "You generate multiple-choice quiz questions. Output strictly valid JSON, nothing else.";

/// System prompt for hints.
pub(crate) const HINT_PROVIDER: &str =
    "You give hints that guide a student toward the answer without revealing it.";

/// System prompt for subject classification.
pub(crate) const CLASSIFIER: &str =
    "You classify student questions into a single school subject. Answer with one word.";

/// Free-text educational response for a query.
pub(crate) fn educational(query: &str, age: u8, subject: &str) -> String {
    format!("Age {age}. {subject}. Explain: {query}\nConcise, clear, <150 words.")
}

/// Quiz request constrained to a bare JSON array so the reply parses
/// without prose stripping in the common case.
pub(crate) fn quiz(topic: &str, subject: &str, count: u8, difficulty: &str) -> String {
    format!(
        "{count} MCQs on '{topic}' ({subject}, {difficulty} level).\n\
         JSON only:\n\
         [{{\"question\":\"What is 2+2?\",\"options\":[\"3\",\"4\",\"5\",\"6\"],\"correctIndex\":1,\"explanation\":\"2+2=4\"}}]\n\
         4 real answer options each (not A,B,C,D)."
    )
}

/// Hint that must not contain the answer.
pub(crate) fn hint(query: &str, subject: &str, age: u8) -> String {
    format!("Age {age}, {subject}. Hint (not answer) for: {query}\n<40 words.")
}

/// One-word subject classification.
pub(crate) fn subject(query: &str) -> String {
    format!(
        "Subject (1 word): {query}\n\
         Options: Math, Science, English, History, Geography, CS, Art, Music, General"
    )
}
