use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSection {
    pub score: u8,
    pub title: String,
    pub summary: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessChallenge {
    pub title: String,
    pub description: String,
    pub basis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceRecommendation {
    pub product_name: String,
    pub reasoning: String,
    pub sales_talk: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantAnalysis {
    pub profitability: ScoreSection,
    pub safety: ScoreSection,
    pub growth: ScoreSection,
    pub overall_summary: String,
    pub business_challenges: Vec<BusinessChallenge>,
    pub recommendations: Vec<InsuranceRecommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pillar {
    Profitability,
    Safety,
    Growth,
}

impl Pillar {
    pub const ALL: [Pillar; 3] = [Pillar::Profitability, Pillar::Safety, Pillar::Growth];

    pub fn label(self) -> &'static str {
        match self {
            Pillar::Profitability => "収益性",
            Pillar::Safety => "安全性",
            Pillar::Growth => "成長性",
        }
    }
}

impl ConsultantAnalysis {
    pub fn section(&self, pillar: Pillar) -> &ScoreSection {
        match pillar {
            Pillar::Profitability => &self.profitability,
            Pillar::Safety => &self.safety,
            Pillar::Growth => &self.growth,
        }
    }
}
