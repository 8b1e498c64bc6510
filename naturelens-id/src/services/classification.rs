//! First-stage fauna classification
//!
//! Decides whether a labeled image goes to the vision-LLM zoologist (birds
//! and insects, where generic labelers are weakest) or to the taxonomy
//! lookup by label name. Keyword match, not a learned classifier.

use naturelens_common::Label;

/// Label substrings that route fauna to the vision-LLM provider
pub const POLLINATOR_OR_BIRD_KEYWORDS: [&str; 6] =
    ["bird", "insect", "butterfly", "bee", "wasp", "moth"];

/// True if any label name contains a keyword (case-insensitive substring)
pub fn is_pollinator_or_bird(labels: &[Label]) -> bool {
    labels.iter().any(|label| {
        let name = label.name.to_lowercase();
        POLLINATOR_OR_BIRD_KEYWORDS
            .iter()
            .any(|keyword| name.contains(keyword))
    })
}
