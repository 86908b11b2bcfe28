use crate::domain::analysis::{
    BusinessChallenge, ConsultantAnalysis, InsuranceRecommendation, ScoreSection,
};
use crate::domain::catalog;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

pub const EXPECTED_RECOMMENDATIONS: usize = 3;

/// Response shape requested from the model. Every key is required; a missing key
/// fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConsultantAnalysis {
    pub profitability: LlmScoreSection,
    pub safety: LlmScoreSection,
    pub growth: LlmScoreSection,
    pub overall_summary: String,
    pub business_challenges: Vec<LlmBusinessChallenge>,
    pub recommendations: Vec<LlmRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmScoreSection {
    pub score: f64,
    pub title: String,
    pub summary: String,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmBusinessChallenge {
    pub title: String,
    pub description: String,
    pub basis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRecommendation {
    pub product_name: String,
    pub reasoning: String,
    pub sales_talk: String,
}

impl LlmConsultantAnalysis {
    pub fn validate_and_into_analysis(self) -> anyhow::Result<ConsultantAnalysis> {
        let profitability = self.profitability.validate_and_into_section("profitability")?;
        let safety = self.safety.validate_and_into_section("safety")?;
        let growth = self.growth.validate_and_into_section("growth")?;

        let mut business_challenges = Vec::with_capacity(self.business_challenges.len());
        for challenge in self.business_challenges {
            let title = challenge.title.trim().to_string();
            ensure!(!title.is_empty(), "business challenge title must be non-empty");
            business_challenges.push(BusinessChallenge {
                title,
                description: challenge.description.trim().to_string(),
                basis: challenge.basis.trim().to_string(),
            });
        }

        if self.recommendations.len() != EXPECTED_RECOMMENDATIONS {
            tracing::warn!(
                expected = EXPECTED_RECOMMENDATIONS,
                got = self.recommendations.len(),
                "LLM returned an unexpected number of recommendations"
            );
        }

        let mut recommendations = Vec::with_capacity(self.recommendations.len());
        for rec in self.recommendations {
            let product_name = rec.product_name.trim().to_string();
            ensure!(!product_name.is_empty(), "productName must be non-empty");
            if catalog::find_product(&product_name).is_none() {
                tracing::warn!(
                    %product_name,
                    catalog_version = catalog::CATALOG_VERSION,
                    "recommended product is not in the catalog"
                );
            }
            recommendations.push(InsuranceRecommendation {
                product_name,
                reasoning: rec.reasoning.trim().to_string(),
                sales_talk: rec.sales_talk.trim().to_string(),
            });
        }

        Ok(ConsultantAnalysis {
            profitability,
            safety,
            growth,
            overall_summary: self.overall_summary.trim().to_string(),
            business_challenges,
            recommendations,
        })
    }
}

impl LlmScoreSection {
    fn validate_and_into_section(self, pillar: &'static str) -> anyhow::Result<ScoreSection> {
        ensure!(
            self.score.is_finite(),
            "{pillar}.score must be a finite number (got {})",
            self.score
        );

        let rounded = self.score.round();
        let clamped = rounded.clamp(0.0, 100.0);
        if clamped != rounded {
            tracing::warn!(pillar, score = self.score, "LLM score outside 0..=100; clamped");
        }

        let title = self.title.trim().to_string();
        ensure!(!title.is_empty(), "{pillar}.title must be non-empty");

        Ok(ScoreSection {
            score: clamped as u8,
            title,
            summary: self.summary.trim().to_string(),
            details: self.details.trim().to_string(),
        })
    }
}
