use crate::domain::analysis::ConsultantAnalysis;
use crate::domain::contract::LlmConsultantAnalysis;
use anyhow::Context;

/// The outermost `{ ... }` of a model reply.
///
/// JSON mode normally returns the object alone; anything the model wraps around
/// it (a fence, a sentence) lies outside the first `{` and the last `}`.
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Model reply text into a validated analysis.
pub fn parse_analysis(text: &str) -> anyhow::Result<ConsultantAnalysis> {
    let text = text.trim();
    anyhow::ensure!(!text.is_empty(), "model output is empty");
    let object = object_span(text).context("model output contains no JSON object")?;
    let parsed = serde_json::from_str::<LlmConsultantAnalysis>(object)
        .with_context(|| format!("model output does not match the analysis schema: {object}"))?;
    parsed.validate_and_into_analysis()
}
