//! Proposal deck layout: title, score summary, one slide per recommendation,
//! closing. Positions are in inches on a 13.333 x 7.5 (16:9) slide.

use crate::domain::analysis::{ConsultantAnalysis, InsuranceRecommendation, Pillar};
use crate::domain::financial::FinancialInput;
use chrono::NaiveDate;

pub const SLIDE_WIDTH: f64 = 13.333;
pub const SLIDE_HEIGHT: f64 = 7.5;

const PRIMARY: Color = Color("0052CC");
const ACCENT: Color = Color("00A388");
const GROWTH: Color = Color("F5A623");
const LIGHT_BG: Color = Color("F4F5F7");
const WHITE: Color = Color("FFFFFF");
const DARK: Color = Color("333333");
const GRAY: Color = Color("666666");
const SOFT_GRAY: Color = Color("999999");

const ISSUER: &str = "日新火災海上保険株式会社";
const AUTHOR: &str = "InsureConsult AI";

/// RGB hex without the leading '#'.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub &'static str);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

const fn frame(x: f64, y: f64, w: f64, h: f64) -> Frame {
    Frame { x, y, w, h }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    RoundRect,
    Oval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub frame: Frame,
    pub fill: Color,
    pub line: Option<(Color, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    pub text: String,
    pub size_pt: u32,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Shape(Shape),
    Text(TextBox),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slide {
    pub background: Option<Color>,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub title: String,
    pub author: &'static str,
    pub company: &'static str,
    pub slides: Vec<Slide>,
}

impl Slide {
    fn shape(&mut self, kind: ShapeKind, frame: Frame, fill: Color, line: Option<(Color, f64)>) {
        self.elements.push(Element::Shape(Shape {
            kind,
            frame,
            fill,
            line,
        }));
    }

    fn rect(&mut self, frame: Frame, fill: Color) {
        self.shape(ShapeKind::Rect, frame, fill, None);
    }

    fn text(&mut self, frame: Frame, text: impl Into<String>, size_pt: u32, color: Color) -> &mut TextBox {
        self.elements.push(Element::Text(TextBox {
            frame,
            text: text.into(),
            size_pt,
            color,
            bold: false,
            italic: false,
            align: Align::Left,
        }));
        match self.elements.last_mut() {
            Some(Element::Text(t)) => t,
            _ => unreachable!("text box was just pushed"),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextBox> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            Element::Shape(_) => None,
        })
    }
}

impl TextBox {
    fn bold(&mut self) -> &mut Self {
        self.bold = true;
        self
    }

    fn italic(&mut self) -> &mut Self {
        self.italic = true;
        self
    }

    fn align(&mut self, align: Align) -> &mut Self {
        self.align = align;
        self
    }
}

pub fn build_deck(
    analysis: &ConsultantAnalysis,
    input: &FinancialInput,
    proposal_date: NaiveDate,
) -> Deck {
    let mut slides = Vec::with_capacity(analysis.recommendations.len() + 3);
    slides.push(title_slide(input, proposal_date));
    slides.push(summary_slide(analysis));
    for (i, rec) in analysis.recommendations.iter().enumerate() {
        slides.push(recommendation_slide(i + 1, rec));
    }
    slides.push(closing_slide());

    Deck {
        title: format!("{}様 経営分析・保険提案書", input.company_name),
        author: AUTHOR,
        company: ISSUER,
        slides,
    }
}

/// Download name for the deck. Same company name, same file name.
pub fn file_name(company_name: &str) -> String {
    let cleaned: String = company_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if cleaned.is_empty() { "proposal" } else { cleaned.as_str() };
    format!("{stem}_保険提案書.pptx")
}

fn title_slide(input: &FinancialInput, proposal_date: NaiveDate) -> Slide {
    let mut s = Slide {
        background: Some(WHITE),
        ..Default::default()
    };
    s.rect(frame(0.0, 0.0, SLIDE_WIDTH, 0.15), PRIMARY);
    s.rect(frame(0.0, 0.15, SLIDE_WIDTH * 0.4, 0.15), ACCENT);

    s.text(frame(0.5, 2.0, 12.0, 0.5), "経営財務分析 & 保険コンサルティング提案書", 18, GRAY);
    s.text(frame(0.5, 2.5, 12.0, 1.0), format!("{} 御中", input.company_name), 44, DARK)
        .bold();
    s.text(
        frame(0.5, 5.0, 12.0, 0.4),
        format!("ご提案日: {}", proposal_date.format("%Y/%m/%d")),
        16,
        GRAY,
    );
    s.text(frame(0.5, 6.0, 12.0, 0.4), ISSUER, 20, PRIMARY).bold();
    s.text(frame(0.5, 6.4, 12.0, 0.3), "Tokio Marine Group", 12, GRAY);
    s
}

fn pillar_color(pillar: Pillar) -> Color {
    match pillar {
        Pillar::Profitability => PRIMARY,
        Pillar::Safety => ACCENT,
        Pillar::Growth => GROWTH,
    }
}

fn summary_slide(analysis: &ConsultantAnalysis) -> Slide {
    let mut s = Slide::default();
    s.rect(frame(0.0, 0.0, SLIDE_WIDTH, 0.8), PRIMARY);
    s.text(frame(0.3, 0.15, 8.0, 0.5), "財務分析診断結果", 24, WHITE).bold();

    for (i, pillar) in Pillar::ALL.into_iter().enumerate() {
        let section = analysis.section(pillar);
        let x = 0.6 + i as f64 * 4.1;
        s.shape(
            ShapeKind::Rect,
            frame(x, 1.2, 3.9, 4.0),
            LIGHT_BG,
            Some((Color("DDDDDD"), 1.0)),
        );
        s.rect(frame(x, 1.2, 3.9, 0.6), pillar_color(pillar));
        s.text(frame(x, 1.25, 3.9, 0.5), pillar.label(), 16, WHITE)
            .bold()
            .align(Align::Center);
        s.text(frame(x, 1.9, 3.9, 0.7), section.score.to_string(), 40, DARK)
            .bold()
            .align(Align::Center);
        s.text(frame(x, 2.6, 3.9, 0.3), "点 / 100", 12, GRAY)
            .align(Align::Center);
        s.text(frame(x + 0.15, 3.0, 3.6, 2.1), section.details.clone(), 11, DARK);
    }

    s.shape(
        ShapeKind::Rect,
        frame(0.6, 5.5, 12.1, 1.6),
        Color("E6F4F1"),
        Some((ACCENT, 1.0)),
    );
    s.text(frame(0.7, 5.55, 6.0, 0.3), "総合コンサルティング要約", 12, ACCENT)
        .bold();
    s.text(frame(0.7, 5.9, 11.9, 1.1), analysis.overall_summary.clone(), 11, DARK);
    s
}

fn recommendation_slide(number: usize, rec: &InsuranceRecommendation) -> Slide {
    let mut s = Slide::default();
    s.rect(frame(0.0, 0.75, SLIDE_WIDTH, 0.05), Color("CCCCCC"));

    s.shape(ShapeKind::Oval, frame(0.3, 0.15, 0.5, 0.5), PRIMARY, None);
    s.text(frame(0.3, 0.15, 0.5, 0.5), number.to_string(), 18, WHITE)
        .bold()
        .align(Align::Center);
    s.text(
        frame(0.9, 0.15, 12.0, 0.5),
        format!("ご提案: {}", rec.product_name),
        24,
        PRIMARY,
    )
    .bold();

    s.text(frame(0.5, 1.1, 8.0, 0.4), "■ 財務データに基づく提案理由", 16, DARK)
        .bold();
    s.shape(
        ShapeKind::RoundRect,
        frame(0.5, 1.6, 12.3, 2.0),
        Color("F0F4FF"),
        Some((Color("D0D7E2"), 1.0)),
    );
    s.text(frame(0.7, 1.7, 11.9, 1.8), rec.reasoning.clone(), 14, DARK);

    s.text(frame(0.5, 3.9, 8.0, 0.4), "■ 具体的なアプローチ・効果", 16, DARK)
        .bold();
    s.shape(
        ShapeKind::RoundRect,
        frame(0.5, 4.4, 12.3, 2.2),
        WHITE,
        Some((ACCENT, 2.0)),
    );
    s.text(frame(0.7, 4.5, 11.9, 2.0), rec.sales_talk.clone(), 14, DARK)
        .italic();

    s.text(frame(9.8, 6.95, 3.2, 0.3), "InsureConsult AI Analysis", 10, SOFT_GRAY)
        .align(Align::Right);
    s
}

fn closing_slide() -> Slide {
    let mut s = Slide {
        background: Some(DARK),
        ..Default::default()
    };
    s.text(
        frame(0.0, 2.8, SLIDE_WIDTH, 0.8),
        "ご検討のほど、よろしくお願い申し上げます。",
        28,
        WHITE,
    )
    .align(Align::Center);
    s.text(
        frame(0.0, 6.5, SLIDE_WIDTH, 0.4),
        "本資料はAIによる財務分析に基づき作成された参考資料です。",
        12,
        SOFT_GRAY,
    )
    .align(Align::Center);
    s
}
