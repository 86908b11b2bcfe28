//! Presentation model for the result dashboard.
//!
//! Everything here is derived from a [`ConsultantAnalysis`] and the input it was
//! produced from; nothing is recomputed except the reference scores and chart
//! geometry.

use crate::dashboard::cover::{self, Cover};
use crate::domain::analysis::{ConsultantAnalysis, Pillar};
use crate::domain::financial::{format_figure, FinancialInput};
use crate::ratios::{self, ReferenceScores};

pub const CHART_SIZE: f64 = 300.0;
const CHART_RADIUS: f64 = 110.0;
const GRID_STEPS: [f64; 4] = [25.0, 50.0, 75.0, 100.0];

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub pillar: Pillar,
    pub score: u8,
    pub title: String,
    pub summary: String,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarAxis {
    pub label: &'static str,
    pub score: u8,
    /// Outer end of the axis (score 100).
    pub end: Point,
    /// Vertex of the score polygon on this axis.
    pub vertex: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    pub center: Point,
    pub axes: Vec<RadarAxis>,
    /// One closed ring per grid step, same vertex order as `axes`.
    pub grid: Vec<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeCard {
    pub number: usize,
    pub title: String,
    pub description: String,
    pub basis: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCard {
    pub number: usize,
    pub product_name: String,
    pub reasoning: String,
    pub sales_talk: String,
    pub cover: Cover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub company_name: String,
    pub industry: &'static str,
    pub overall_summary: String,
    pub score_cards: Vec<ScoreCard>,
    pub radar: RadarChart,
    pub challenges: Vec<ChallengeCard>,
    pub recommendations: Vec<RecommendationCard>,
    /// (label, formatted value) in form order; undisclosed figures say so.
    pub figures: Vec<(&'static str, String)>,
    pub reference: ReferenceScores,
}

impl DashboardView {
    pub fn build(analysis: &ConsultantAnalysis, input: &FinancialInput) -> Self {
        let score_cards = Pillar::ALL
            .iter()
            .map(|&pillar| {
                let section = analysis.section(pillar);
                ScoreCard {
                    pillar,
                    score: section.score,
                    title: section.title.clone(),
                    summary: section.summary.clone(),
                    details: section.details.clone(),
                }
            })
            .collect();

        let challenges = analysis
            .business_challenges
            .iter()
            .enumerate()
            .map(|(i, c)| ChallengeCard {
                number: i + 1,
                title: c.title.clone(),
                description: c.description.clone(),
                basis: c.basis.clone(),
            })
            .collect();

        let recommendations = analysis
            .recommendations
            .iter()
            .enumerate()
            .map(|(i, r)| RecommendationCard {
                number: i + 1,
                product_name: r.product_name.clone(),
                reasoning: r.reasoning.clone(),
                sales_talk: r.sales_talk.clone(),
                cover: cover::resolve(&r.product_name),
            })
            .collect();

        Self {
            company_name: input.company_name.clone(),
            industry: input.industry.label(),
            overall_summary: analysis.overall_summary.clone(),
            score_cards,
            radar: RadarChart::build(analysis),
            challenges,
            recommendations,
            figures: input
                .figures()
                .iter()
                .map(|(label, value)| (*label, format_figure(*value)))
                .collect(),
            reference: ratios::calculate(input),
        }
    }
}

impl RadarChart {
    pub fn build(analysis: &ConsultantAnalysis) -> Self {
        let center = Point {
            x: CHART_SIZE / 2.0,
            y: CHART_SIZE / 2.0,
        };

        let axes = Pillar::ALL
            .iter()
            .enumerate()
            .map(|(i, &pillar)| {
                let score = analysis.section(pillar).score;
                RadarAxis {
                    label: pillar.label(),
                    score,
                    end: polar(center, i, 100.0),
                    vertex: polar(center, i, f64::from(score.min(100))),
                }
            })
            .collect();

        let grid = GRID_STEPS
            .iter()
            .map(|&step| (0..Pillar::ALL.len()).map(|i| polar(center, i, step)).collect())
            .collect();

        Self { center, axes, grid }
    }

    /// SVG `points` attribute for the score polygon.
    pub fn polygon_points(&self) -> String {
        svg_points(self.axes.iter().map(|a| a.vertex))
    }
}

pub fn svg_points(points: impl IntoIterator<Item = Point>) -> String {
    points
        .into_iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

// Axis 0 points straight up; the others follow clockwise at equal spacing.
fn polar(center: Point, axis: usize, value: f64) -> Point {
    let count = Pillar::ALL.len() as f64;
    let angle = -std::f64::consts::FRAC_PI_2 + std::f64::consts::TAU * axis as f64 / count;
    let r = CHART_RADIUS * value / 100.0;
    Point {
        x: center.x + r * angle.cos(),
        y: center.y + r * angle.sin(),
    }
}
