//! Input form: raw posted fields into a [`FinancialInput`].
//!
//! Validation is deliberately thin. A company name and a known industry are
//! required; figures may be left blank (undisclosed) and negative values pass.

use crate::domain::financial::{FinancialInput, Industry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields exactly as an HTML form posts them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSubmission {
    pub company_name: String,
    pub industry: String,
    pub revenue: String,
    pub prev_revenue: String,
    pub operating_profit: String,
    pub net_income: String,
    pub current_assets: String,
    pub current_liabilities: String,
    pub total_assets: String,
    pub total_equity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingCompanyName,
    MissingIndustry,
    UnknownIndustry(String),
    InvalidNumber { field: &'static str, value: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingCompanyName => f.write_str("企業名を入力してください。"),
            FormError::MissingIndustry => f.write_str("業種を選択してください。"),
            FormError::UnknownIndustry(s) => write!(f, "業種が不正です: {s}"),
            FormError::InvalidNumber { field, value } => {
                write!(f, "{field}には数値を入力してください（入力値: {value}）。")
            }
        }
    }
}

impl std::error::Error for FormError {}

impl FormSubmission {
    pub fn parse(&self) -> Result<FinancialInput, FormError> {
        let company_name = self.company_name.trim().to_string();
        if company_name.is_empty() {
            return Err(FormError::MissingCompanyName);
        }

        let industry = self.industry.trim();
        if industry.is_empty() {
            return Err(FormError::MissingIndustry);
        }
        let industry = industry
            .parse::<Industry>()
            .map_err(|_| FormError::UnknownIndustry(industry.to_string()))?;

        Ok(FinancialInput {
            company_name,
            industry,
            revenue: parse_figure("売上高", &self.revenue)?,
            prev_revenue: parse_figure("前期売上高", &self.prev_revenue)?,
            operating_profit: parse_figure("営業利益", &self.operating_profit)?,
            net_income: parse_figure("当期純利益", &self.net_income)?,
            current_assets: parse_figure("流動資産", &self.current_assets)?,
            current_liabilities: parse_figure("流動負債", &self.current_liabilities)?,
            total_assets: parse_figure("総資産", &self.total_assets)?,
            total_equity: parse_figure("純資産 (自己資本)", &self.total_equity)?,
        })
    }

    /// Pre-fills the form from an existing input, e.g. for the demo button.
    pub fn from_input(input: &FinancialInput) -> Self {
        let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        Self {
            company_name: input.company_name.clone(),
            industry: input.industry.label().to_string(),
            revenue: fmt(input.revenue),
            prev_revenue: fmt(input.prev_revenue),
            operating_profit: fmt(input.operating_profit),
            net_income: fmt(input.net_income),
            current_assets: fmt(input.current_assets),
            current_liabilities: fmt(input.current_liabilities),
            total_assets: fmt(input.total_assets),
            total_equity: fmt(input.total_equity),
        }
    }
}

fn parse_figure(field: &'static str, raw: &str) -> Result<Option<f64>, FormError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '，')
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(FormError::InvalidNumber {
            field,
            value: raw.trim().to_string(),
        }),
    }
}

pub fn demo_input() -> FinancialInput {
    FinancialInput {
        company_name: "株式会社 サンプルテック".to_string(),
        industry: Industry::ItSoftware,
        revenue: Some(50000.0),
        prev_revenue: Some(42000.0),
        operating_profit: Some(2500.0),
        net_income: Some(1500.0),
        current_assets: Some(12000.0),
        current_liabilities: Some(15000.0),
        total_assets: Some(30000.0),
        total_equity: Some(8000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> FormSubmission {
        FormSubmission {
            company_name: " 株式会社テスト ".to_string(),
            industry: "製造業".to_string(),
            revenue: "52,000".to_string(),
            operating_profit: "3500".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_figures_stay_undisclosed() {
        let input = submission().parse().unwrap();
        assert_eq!(input.company_name, "株式会社テスト");
        assert_eq!(input.industry, Industry::Manufacturing);
        assert_eq!(input.revenue, Some(52000.0));
        assert_eq!(input.operating_profit, Some(3500.0));
        assert_eq!(input.prev_revenue, None);
        assert_eq!(input.total_equity, None);
    }

    #[test]
    fn company_name_is_required() {
        let form = FormSubmission {
            company_name: "   ".to_string(),
            ..submission()
        };
        assert_eq!(form.parse(), Err(FormError::MissingCompanyName));
    }

    #[test]
    fn blank_industry_is_rejected() {
        let form = FormSubmission {
            industry: " ".to_string(),
            ..submission()
        };
        assert_eq!(form.parse(), Err(FormError::MissingIndustry));
    }

    #[test]
    fn unknown_industry_is_rejected() {
        let form = FormSubmission {
            industry: "農業".to_string(),
            ..submission()
        };
        assert!(matches!(form.parse(), Err(FormError::UnknownIndustry(_))));
    }

    #[test]
    fn negative_values_pass_and_garbage_fails() {
        let form = FormSubmission {
            operating_profit: "-1200".to_string(),
            ..submission()
        };
        assert_eq!(form.parse().unwrap().operating_profit, Some(-1200.0));

        let form = FormSubmission {
            total_assets: "abc".to_string(),
            ..submission()
        };
        let err = form.parse().unwrap_err();
        assert!(err.to_string().contains("総資産"));
    }

    #[test]
    fn demo_input_survives_the_form() {
        let demo = demo_input();
        assert_eq!(FormSubmission::from_input(&demo).parse().unwrap(), demo);
    }
}
