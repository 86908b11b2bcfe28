use crate::llm::Provider;
use std::fmt;

/// Shown to the user for every analysis failure, whatever its kind.
pub const USER_MESSAGE: &str =
    "AI分析中にエラーが発生しました。APIキーを確認するか、もう一度お試しください。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    /// No credential. Raised before any network I/O.
    Configuration,
    /// Transport failure, timeout, non-2xx status or a refusal from the service.
    Service,
    /// The service answered but the payload is empty or not the expected shape.
    Parse,
}

impl fmt::Display for AnalysisErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisErrorKind::Configuration => "configuration",
            AnalysisErrorKind::Service => "service",
            AnalysisErrorKind::Parse => "parse",
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisError {
    pub kind: AnalysisErrorKind,
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl AnalysisError {
    pub fn configuration(provider: Provider, detail: impl Into<String>) -> Self {
        Self {
            kind: AnalysisErrorKind::Configuration,
            provider,
            stage: "config",
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn service(provider: Provider, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind: AnalysisErrorKind::Service,
            provider,
            stage,
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn parse(provider: Provider, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind: AnalysisErrorKind::Parse,
            provider,
            stage,
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }

    pub fn user_message(&self) -> &'static str {
        USER_MESSAGE
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "analysis {} error (provider={:?}, stage={}): {}",
            self.kind, self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_kind_and_stage() {
        let err = AnalysisError::service(Provider::Gemini, "http", "status=503");
        assert_eq!(
            err.to_string(),
            "analysis service error (provider=Gemini, stage=http): status=503"
        );
    }

    #[test]
    fn survives_anyhow_downcast() {
        let err: anyhow::Error =
            AnalysisError::configuration(Provider::Gemini, "GEMINI_API_KEY is required").into();
        let back = err.downcast_ref::<AnalysisError>().unwrap();
        assert_eq!(back.kind, AnalysisErrorKind::Configuration);
        assert_eq!(back.user_message(), USER_MESSAGE);
    }
}
