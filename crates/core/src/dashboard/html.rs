//! Server-rendered pages. All user and model text goes through `text`/`attr`.

use crate::dashboard::view::{svg_points, DashboardView, RecommendationCard, CHART_SIZE};
use crate::domain::analysis::Pillar;
use crate::domain::financial::Industry;
use crate::form::FormSubmission;
use std::fmt::Write as _;

const STYLE: &str = r#"
body{margin:0;font-family:"Meiryo UI","Hiragino Sans",sans-serif;background:#f8fafc;color:#0f172a}
header{background:#fff;box-shadow:0 1px 2px #0001;padding:18px 32px;display:flex;justify-content:space-between;align-items:center}
header h1{margin:0;font-size:20px}header h1 span{color:#2563eb}
main{max-width:1100px;margin:0 auto;padding:32px 16px}
.card{background:#fff;border:1px solid #e2e8f0;border-radius:12px;padding:20px;margin-bottom:16px}
.error{background:#fef2f2;border:1px solid #fecaca;color:#b91c1c;padding:14px;border-radius:8px;margin-bottom:20px}
.grid{display:grid;gap:16px}.g2{grid-template-columns:repeat(2,1fr)}.g3{grid-template-columns:repeat(3,1fr)}.g4{grid-template-columns:repeat(4,1fr)}
label{display:block;font-size:11px;font-weight:bold;color:#64748b;margin-bottom:4px}
input,select{width:100%;box-sizing:border-box;padding:8px;border:1px solid #cbd5e1;border-radius:6px}
button,.button{background:#2563eb;color:#fff;border:0;border-radius:8px;padding:10px 18px;font-weight:bold;cursor:pointer;text-decoration:none;display:inline-block}
.secondary{background:#334155}
.score{font-size:40px;font-weight:bold}
.challenge{border-left:4px solid #f59e0b}
.num{display:inline-block;min-width:24px;height:24px;border-radius:12px;background:#fef3c7;color:#b45309;text-align:center;font-size:12px;line-height:24px;font-weight:bold;margin-right:8px}
.rec{display:grid;grid-template-columns:180px 1fr;gap:20px}
.cover{aspect-ratio:210/297;border-radius:2px 8px 8px 2px;border-left:4px solid #cbd5e1;overflow:hidden;display:flex;flex-direction:column;box-shadow:0 2px 6px #0002;color:inherit;text-decoration:none}
.cover .band{height:40px;display:flex;align-items:center;justify-content:space-between;padding:0 10px;color:#fff;font-size:10px}
.cover .body{flex:1;display:flex;flex-direction:column;align-items:center;justify-content:center;text-align:center;padding:10px}
.cover .icon{font-size:40px;margin-bottom:10px}
.cover .cat{font-size:10px;font-weight:bold;color:#64748b;background:#e2e8f080;padding:3px 6px;border-radius:4px}
.talk{background:#f0fdf4;border-left:4px solid #10b981;padding:12px;font-style:italic}
.muted{color:#64748b;font-size:13px}
.spinner{width:80px;height:80px;border:6px solid #dbeafe;border-top-color:#2563eb;border-radius:50%;animation:spin 1s linear infinite;margin:40px auto}
@keyframes spin{to{transform:rotate(360deg)}}
"#;

fn text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

fn attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).into_owned()
}

fn page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">{head_extra}\
<title>{title}</title><style>{STYLE}</style></head><body>\
<header><h1>InsureConsult <span>AI</span></h1><div class=\"muted\">経営コンサル型保険営業支援ツール</div></header>\
<main>{body}</main></body></html>",
        title = text(title),
    )
}

const FIGURE_FIELDS: [(&str, &str); 8] = [
    ("revenue", "売上高"),
    ("prevRevenue", "前期売上高"),
    ("operatingProfit", "営業利益"),
    ("netIncome", "当期純利益"),
    ("currentAssets", "流動資産"),
    ("currentLiabilities", "流動負債"),
    ("totalAssets", "総資産"),
    ("totalEquity", "純資産 (自己資本)"),
];

fn figure_value<'a>(form: &'a FormSubmission, name: &str) -> &'a str {
    match name {
        "revenue" => &form.revenue,
        "prevRevenue" => &form.prev_revenue,
        "operatingProfit" => &form.operating_profit,
        "netIncome" => &form.net_income,
        "currentAssets" => &form.current_assets,
        "currentLiabilities" => &form.current_liabilities,
        "totalAssets" => &form.total_assets,
        "totalEquity" => &form.total_equity,
        _ => "",
    }
}

pub fn render_input_page(form: &FormSubmission, error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(err) = error {
        let _ = write!(body, "<div class=\"error\" role=\"alert\">{}</div>", text(err));
    }

    body.push_str(
        "<div class=\"card\"><h2>財務データ入力</h2>\
<p class=\"muted\">顧客企業の決算書（P/L、B/S）の数値を入力してください。未開示の項目は空欄のままで構いません。</p>\
<p><a class=\"button secondary\" href=\"/demo\">デモデータを入力</a></p>\
<form method=\"post\" action=\"/analyze\"><div class=\"grid g2\">",
    );

    let _ = write!(
        body,
        "<div><label for=\"companyName\">企業名 *</label>\
<input id=\"companyName\" name=\"companyName\" required value=\"{}\"></div>",
        attr(&form.company_name)
    );

    body.push_str("<div><label for=\"industry\">業種 *</label><select id=\"industry\" name=\"industry\">");
    for industry in Industry::ALL {
        let selected = if form.industry == industry.label()
            || (form.industry.is_empty() && industry == Industry::default())
        {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            body,
            "<option value=\"{v}\"{selected}>{v}</option>",
            v = attr(industry.label())
        );
    }
    body.push_str("</select></div></div><h3>財務数値</h3><div class=\"grid g4\">");

    for (name, label) in FIGURE_FIELDS {
        let _ = write!(
            body,
            "<div><label for=\"{name}\">{label}</label>\
<input id=\"{name}\" name=\"{name}\" inputmode=\"decimal\" value=\"{}\" placeholder=\"未開示なら空欄\"></div>",
            attr(figure_value(form, name))
        );
    }

    body.push_str("</div><p><button type=\"submit\">AI分析を実行する</button></p></form></div>");
    page("財務データ入力", "", &body)
}

pub fn render_analyzing_page() -> String {
    page(
        "財務分析を実行中",
        "<meta http-equiv=\"refresh\" content=\"3\">",
        "<div class=\"spinner\"></div><h2 style=\"text-align:center\">財務分析を実行中...</h2>\
<p class=\"muted\" style=\"text-align:center\">経営シナリオと照合し、最適な保険商品を検討しています。</p>",
    )
}

fn render_radar(view: &DashboardView) -> String {
    let radar = &view.radar;
    let mut svg = format!(
        "<svg viewBox=\"0 0 {size} {size}\" width=\"{size}\" height=\"{size}\" role=\"img\" aria-label=\"レーダーチャート\">",
        size = CHART_SIZE
    );
    for ring in &radar.grid {
        let _ = write!(
            svg,
            "<polygon points=\"{}\" fill=\"none\" stroke=\"#e2e8f0\"/>",
            svg_points(ring.iter().copied())
        );
    }
    for axis in &radar.axes {
        let _ = write!(
            svg,
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#cbd5e1\"/>\
<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\" fill=\"#64748b\">{}</text>",
            radar.center.x,
            radar.center.y,
            axis.end.x,
            axis.end.y,
            axis.end.x,
            if axis.end.y < radar.center.y { axis.end.y - 8.0 } else { axis.end.y + 16.0 },
            text(axis.label)
        );
    }
    let _ = write!(
        svg,
        "<polygon points=\"{}\" fill=\"#2563eb\" fill-opacity=\"0.5\" stroke=\"#2563eb\" stroke-width=\"2\"/></svg>",
        radar.polygon_points()
    );
    svg
}

fn render_cover(card: &RecommendationCard) -> String {
    let style = card.cover.style;
    let inner = format!(
        "<div class=\"band\" style=\"background:{header}\"><b>N</b><span>日新火災</span></div>\
<div class=\"body\"><div class=\"icon\">{icon}</div>\
<div style=\"color:{title};font-weight:bold;margin-bottom:8px\">{name}</div>\
<span class=\"cat\">{category}</span></div>",
        header = style.header,
        icon = style.icon.glyph(),
        title = style.title,
        name = text(&card.product_name),
        category = text(style.category),
    );
    match &card.cover.brochure_url {
        Some(url) => format!(
            "<a class=\"cover\" style=\"background:{}\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" title=\"PDFパンフレットを開く\">{inner}</a>",
            style.background,
            attr(url)
        ),
        None => format!(
            "<div class=\"cover\" style=\"background:{}\">{inner}</div>",
            style.background
        ),
    }
}

fn pillar_color(pillar: Pillar) -> &'static str {
    match pillar {
        Pillar::Profitability => "#2563eb",
        Pillar::Safety => "#10b981",
        Pillar::Growth => "#f59e0b",
    }
}

pub fn render_result_page(view: &DashboardView) -> String {
    let mut body = format!(
        "<div class=\"card\" style=\"display:flex;justify-content:space-between;align-items:center\">\
<div><h2 style=\"margin:0\">{company} 様 分析レポート</h2><span class=\"muted\">業種: {industry}</span></div>\
<div><a class=\"button\" href=\"/export\">提案書をダウンロード (PPTX)</a> \
<form method=\"post\" action=\"/reset\" style=\"display:inline\"><button class=\"secondary\" type=\"submit\">新規分析</button></form></div></div>",
        company = text(&view.company_name),
        industry = text(view.industry),
    );

    let _ = write!(
        body,
        "<div class=\"grid g2\"><div class=\"card\"><h3>エグゼクティブサマリー</h3><p>{}</p></div>\
<div class=\"card\" style=\"text-align:center\">{}</div></div>",
        text(&view.overall_summary),
        render_radar(view)
    );

    body.push_str("<div class=\"grid g3\">");
    for card in &view.score_cards {
        let _ = write!(
            body,
            "<div class=\"card\"><h3 style=\"color:{color}\">{label}</h3>\
<div><span class=\"score\" style=\"color:{color}\">{score}</span> <span class=\"muted\">/ 100</span></div>\
<p><b>{title}</b></p><p class=\"muted\">{summary}</p><p>{details}</p></div>",
            color = pillar_color(card.pillar),
            label = card.pillar.label(),
            score = card.score,
            title = text(&card.title),
            summary = text(&card.summary),
            details = text(&card.details),
        );
    }
    body.push_str("</div>");

    if !view.challenges.is_empty() {
        body.push_str("<h2>経営課題</h2><div class=\"grid g3\">");
        for c in &view.challenges {
            let _ = write!(
                body,
                "<div class=\"card challenge\"><h4><span class=\"num\">{}</span>{}</h4><p>{}</p>\
<p class=\"muted\">根拠: {}</p></div>",
                c.number,
                text(&c.title),
                text(&c.description),
                text(&c.basis)
            );
        }
        body.push_str("</div>");
    }

    body.push_str("<h2>保険商品のご提案</h2>");
    for rec in &view.recommendations {
        let _ = write!(
            body,
            "<div class=\"card rec\">{cover}<div><h3>提案 {n}: {name}</h3>\
<h4>財務データに基づく提案理由</h4><p>{reasoning}</p>\
<h4>セールストーク</h4><p class=\"talk\">{talk}</p></div></div>",
            cover = render_cover(rec),
            n = rec.number,
            name = text(&rec.product_name),
            reasoning = text(&rec.reasoning),
            talk = text(&rec.sales_talk),
        );
    }

    let r = &view.reference;
    body.push_str("<div class=\"card\"><h3>入力データと参考指標</h3><div class=\"grid g2\"><table>");
    for (label, value) in &view.figures {
        let _ = write!(body, "<tr><th align=\"left\">{}</th><td>{}</td></tr>", text(label), text(value));
    }
    let _ = write!(
        body,
        "</table><table>\
<tr><th align=\"left\">営業利益率</th><td>{:.1}%</td></tr>\
<tr><th align=\"left\">自己資本比率</th><td>{:.1}%</td></tr>\
<tr><th align=\"left\">流動比率</th><td>{:.1}%</td></tr>\
<tr><th align=\"left\">増収率（前期比）</th><td>{:.1}%</td></tr>\
<tr><th align=\"left\">参考スコア（収益性/安全性/成長性）</th><td>{} / {} / {}</td></tr>\
</table></div><p class=\"muted\">参考スコアは入力値から機械的に算出した目安であり、AIによる評価とは一致しない場合があります。</p></div>",
        r.ratios.operating_margin,
        r.ratios.equity_ratio,
        r.ratios.current_ratio,
        r.ratios.growth_rate,
        r.profitability,
        r.safety,
        r.growth,
    );

    page(&format!("{} 様 分析レポート", view.company_name), "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{
        BusinessChallenge, ConsultantAnalysis, InsuranceRecommendation, ScoreSection,
    };
    use crate::domain::financial::FinancialInput;

    fn analysis() -> ConsultantAnalysis {
        let section = |score| ScoreSection {
            score,
            title: "<b>title</b>".to_string(),
            summary: "s".to_string(),
            details: "d".to_string(),
        };
        ConsultantAnalysis {
            profitability: section(67),
            safety: section(48),
            growth: section(100),
            overall_summary: "a & b".to_string(),
            business_challenges: vec![BusinessChallenge {
                title: "運転資金".to_string(),
                description: "d".to_string(),
                basis: "流動比率80%".to_string(),
            }],
            recommendations: vec![InsuranceRecommendation {
                product_name: "サイバー・情報漏えい保険".to_string(),
                reasoning: "r".to_string(),
                sales_talk: "s".to_string(),
            }],
        }
    }

    #[test]
    fn input_page_shows_error_and_escapes_values() {
        let form = FormSubmission {
            company_name: "\"><script>".to_string(),
            ..Default::default()
        };
        let html = render_input_page(&form, Some("エラー"));
        assert!(html.contains("<div class=\"error\" role=\"alert\">エラー</div>"));
        assert!(!html.contains("\"><script>"));
        assert!(html.contains("<option value=\"製造業\" selected>"));
    }

    #[test]
    fn result_page_escapes_model_text_and_links_brochure() {
        let input = FinancialInput {
            company_name: "株式会社テスト".to_string(),
            ..Default::default()
        };
        let view = DashboardView::build(&analysis(), &input);
        let html = render_result_page(&view);

        assert!(html.contains("&lt;b&gt;title&lt;/b&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("https://www.nisshinfire.co.jp/service/pdf/cyber2601.pdf"));
        assert!(html.contains("根拠: 流動比率80%"));
        assert!(html.contains(crate::domain::financial::UNDISCLOSED));
        assert!(html.contains(&view.radar.polygon_points()));
    }

    #[test]
    fn analyzing_page_refreshes() {
        assert!(render_analyzing_page().contains("http-equiv=\"refresh\""));
    }
}
