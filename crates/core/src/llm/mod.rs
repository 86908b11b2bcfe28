pub mod error;
pub mod gemini;
pub mod json;
pub mod prompt;

use crate::domain::analysis::ConsultantAnalysis;
use crate::domain::financial::FinancialInput;
use crate::llm::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
}

/// One call is one attempt: implementations do not retry, and two calls with the
/// same input may return different analyses.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn analyze(&self, input: &FinancialInput) -> Result<ConsultantAnalysis, AnalysisError>;
}
