//! Tolerant parsing of model replies.
//!
//! Models routinely wrap JSON in markdown code fences or lead-in prose
//! despite being told not to. Parsing first isolates the JSON array,
//! then deserializes it. A structurally invalid reply is a
//! [`Parse`](crate::TutorHiveError::Parse) error, which is retryable: a
//! fresh generation often produces valid output where the previous one
//! did not.

use serde::Deserialize;

use crate::types::Question;
use crate::{Result, TutorHiveError};

/// Wire shape of one quiz question as models emit it.
#[derive(Debug, Deserialize)]
struct WireQuestion {
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctIndex")]
    correct_index: usize,
    #[serde(default)]
    explanation: String,
}

/// Parse a model reply into quiz questions.
///
/// Accepts a bare JSON array, a fenced array, or an array embedded in
/// surrounding commentary. Returns `EmptyResponse` for an empty array
/// and `Parse` for anything structurally invalid.
pub(crate) fn parse_questions(raw: &str) -> Result<Vec<Question>> {
    let json = extract_json_array(raw)
        .ok_or_else(|| TutorHiveError::Parse("no JSON array in model reply".to_string()))?;

    let wire: Vec<WireQuestion> =
        serde_json::from_str(json).map_err(|e| TutorHiveError::Parse(e.to_string()))?;

    if wire.is_empty() {
        return Err(TutorHiveError::EmptyResponse);
    }

    let mut questions = Vec::with_capacity(wire.len());
    for q in wire {
        if q.options.is_empty() || q.correct_index >= q.options.len() {
            return Err(TutorHiveError::Parse(format!(
                "correctIndex {} out of range for {} options",
                q.correct_index,
                q.options.len()
            )));
        }
        questions.push(Question {
            text: q.question,
            options: q.options,
            correct_option_index: q.correct_index,
            explanation: q.explanation,
        });
    }
    Ok(questions)
}

/// Locate the outermost JSON array in a reply, tolerating code fences
/// and commentary on either side.
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"[{"question":"What is 2+2?","options":["3","4","5","6"],"correctIndex":1,"explanation":"2+2=4"}]"#;

    #[test]
    fn parses_bare_array() {
        let qs = parse_questions(BARE).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].text, "What is 2+2?");
        assert_eq!(qs[0].correct_option_index, 1);
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{BARE}\n```");
        let qs = parse_questions(&fenced).unwrap();
        assert_eq!(qs.len(), 1);
    }

    #[test]
    fn ignores_surrounding_commentary() {
        let chatty = format!("Sure! Here are your questions:\n{BARE}\nLet me know if you need more.");
        let qs = parse_questions(&chatty).unwrap();
        assert_eq!(qs[0].options.len(), 4);
    }

    #[test]
    fn empty_array_is_empty_response() {
        assert!(matches!(
            parse_questions("[]"),
            Err(TutorHiveError::EmptyResponse)
        ));
    }

    #[test]
    fn prose_without_json_is_parse_error() {
        assert!(matches!(
            parse_questions("I cannot generate questions about that."),
            Err(TutorHiveError::Parse(_))
        ));
    }

    #[test]
    fn out_of_range_index_is_parse_error() {
        let bad = r#"[{"question":"q","options":["a","b"],"correctIndex":5,"explanation":""}]"#;
        assert!(matches!(
            parse_questions(bad),
            Err(TutorHiveError::Parse(_))
        ));
    }

    #[test]
    fn missing_explanation_defaults_to_empty() {
        let minimal = r#"[{"question":"q","options":["a","b"],"correctIndex":0}]"#;
        let qs = parse_questions(minimal).unwrap();
        assert_eq!(qs[0].explanation, "");
    }
}
