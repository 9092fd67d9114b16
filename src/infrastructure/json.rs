//! Tolerant JSON extraction for model output
//!
//! Models asked for strict JSON still wrap it in prose or markdown fences
//! often enough that every adapter parsing verdicts or scores goes through
//! this helper first.

/// Extract the outermost JSON object from a string
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if start < end {
                return Some(&text[start..=end]);
            }
        }
    }

    None
}
