//! Reference scoring from raw statement figures.
//!
//! These scores are informational: the analysis shown to the user carries the
//! model's own scores, and nothing here overrides them.

use crate::domain::financial::FinancialInput;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRatios {
    /// Operating profit / revenue, in percent.
    pub operating_margin: f64,
    /// Total equity / total assets, in percent.
    pub equity_ratio: f64,
    /// Current assets / current liabilities, in percent.
    pub current_ratio: f64,
    /// Revenue / prior-period revenue, in percent. 100 when the prior period is unknown.
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceScores {
    pub profitability: u8,
    pub safety: u8,
    pub growth: u8,
    pub ratios: FinancialRatios,
}

pub fn calculate(input: &FinancialInput) -> ReferenceScores {
    let operating_margin = percent(input.operating_profit, input.revenue);
    let equity_ratio = percent(input.total_equity, input.total_assets);
    let current_ratio = percent(input.current_assets, input.current_liabilities);
    let growth_rate = match input.prev_revenue {
        Some(prev) if prev > 0.0 => input.revenue.unwrap_or(0.0) / prev * 100.0,
        _ => 100.0,
    };

    ReferenceScores {
        profitability: to_score(operating_margin * 10.0),
        safety: to_score(equity_ratio * 1.5 + current_ratio * 0.1),
        growth: to_score((growth_rate - 90.0) * 3.5),
        ratios: FinancialRatios {
            operating_margin,
            equity_ratio,
            current_ratio,
            growth_rate,
        },
    }
}

fn percent(numerator: Option<f64>, denominator: Option<f64>) -> f64 {
    match denominator {
        Some(d) if d > 0.0 => numerator.unwrap_or(0.0) / d * 100.0,
        _ => 0.0,
    }
}

// Clamp first, then truncate toward zero.
fn to_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).trunc() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> FinancialInput {
        FinancialInput {
            company_name: "株式会社テスト".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn profitability_from_operating_margin() {
        let scores = calculate(&FinancialInput {
            revenue: Some(52000.0),
            operating_profit: Some(3500.0),
            ..input()
        });
        assert!((scores.ratios.operating_margin - 6.73).abs() < 0.01);
        assert_eq!(scores.profitability, 67);
    }

    #[test]
    fn profitability_is_zero_without_positive_revenue() {
        for revenue in [None, Some(0.0), Some(-500.0)] {
            let scores = calculate(&FinancialInput {
                revenue,
                operating_profit: Some(3500.0),
                ..input()
            });
            assert_eq!(scores.profitability, 0, "revenue={revenue:?}");
            assert_eq!(scores.ratios.operating_margin, 0.0);
        }
    }

    #[test]
    fn safety_combines_equity_and_current_ratio() {
        let scores = calculate(&FinancialInput {
            total_equity: Some(8000.0),
            total_assets: Some(30000.0),
            current_assets: Some(12000.0),
            current_liabilities: Some(15000.0),
            ..input()
        });
        assert!((scores.ratios.equity_ratio - 26.67).abs() < 0.01);
        assert_eq!(scores.ratios.current_ratio, 80.0);
        assert_eq!(scores.safety, 48);
    }

    #[test]
    fn current_ratio_counts_without_total_assets() {
        let scores = calculate(&FinancialInput {
            total_equity: Some(8000.0),
            total_assets: Some(0.0),
            current_assets: Some(30000.0),
            current_liabilities: Some(10000.0),
            ..input()
        });
        assert_eq!(scores.ratios.equity_ratio, 0.0);
        assert_eq!(scores.ratios.current_ratio, 300.0);
        assert_eq!(scores.safety, 30);
    }

    #[test]
    fn growth_is_capped_at_100() {
        let scores = calculate(&FinancialInput {
            revenue: Some(50000.0),
            prev_revenue: Some(42000.0),
            ..input()
        });
        assert!((scores.ratios.growth_rate - 119.05).abs() < 0.01);
        assert_eq!(scores.growth, 100);
    }

    #[test]
    fn unknown_prior_period_counts_as_flat_growth() {
        let scores = calculate(&FinancialInput {
            revenue: Some(50000.0),
            prev_revenue: None,
            ..input()
        });
        assert_eq!(scores.ratios.growth_rate, 100.0);
        assert_eq!(scores.growth, 35);
    }

    #[test]
    fn shrinking_revenue_scores_zero_growth() {
        let scores = calculate(&FinancialInput {
            revenue: Some(40000.0),
            prev_revenue: Some(50000.0),
            ..input()
        });
        assert_eq!(scores.growth, 0);
    }

    #[test]
    fn empty_input_scores_are_well_defined() {
        let scores = calculate(&input());
        assert_eq!(scores.profitability, 0);
        assert_eq!(scores.safety, 0);
        assert_eq!(scores.growth, 35);
    }

    #[test]
    fn calculation_is_pure() {
        let input = FinancialInput {
            revenue: Some(50000.0),
            prev_revenue: Some(42000.0),
            operating_profit: Some(2500.0),
            current_assets: Some(12000.0),
            current_liabilities: Some(15000.0),
            total_assets: Some(30000.0),
            total_equity: Some(8000.0),
            ..input()
        };
        assert_eq!(calculate(&input), calculate(&input));
        assert_eq!(calculate(&input).profitability, 50);
    }
}
