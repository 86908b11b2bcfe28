use crate::domain::catalog::PRODUCTS;
use crate::domain::financial::{format_figure, FinancialInput};

pub fn build_prompt(input: &FinancialInput) -> String {
    let figures = input
        .figures()
        .iter()
        .map(|(label, value)| format!("- {label}: {}", format_figure(*value)))
        .collect::<Vec<_>>()
        .join("\n");

    let catalog = PRODUCTS
        .iter()
        .map(|p| format!("- {}", p.name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "あなたはトップクラスの経営コンサルタントであり、損害保険会社の熟練した営業担当者です。\n\
以下の「{industry}」業界の企業「{company}」の財務データを分析してください。\n\
「{undisclosed_hint}」と記載された項目は開示されていない数値です。0として扱わないでください。\n\n\
財務データ:\n{figures}\n\n\
【タスク】\n\
1. 主要な財務指標を計算し、「収益性」「安全性」「成長性」を0-100の整数でスコアリングし、それぞれにタイトル・一行の要約・詳細な根拠を付けてください。\n\
2. 財務データに基づき、この企業が直面している「経営課題」を優先度の高い順に3つ特定し、根拠となる財務数値を明記してください。\n\
3. 以下の【取扱商品リスト】の中から、この企業に最適な保険商品をちょうど3つ選定し、商品名はリストの表記のまま記載し、財務データに基づく提案理由と具体的なセールストークを付けてください。\n\n\
【取扱商品リスト】\n{catalog}\n\n\
出力は指定されたJSONスキーマに厳密に従い、すべて日本語で記述してください。",
        industry = input.industry.label(),
        company = input.company_name,
        undisclosed_hint = crate::domain::financial::UNDISCLOSED,
    )
}

/// `responseSchema` for Gemini structured output. Every key is required.
pub fn response_schema() -> serde_json::Value {
    let section = serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "score": {"type": "NUMBER", "description": "0-100のスコア"},
            "title": {"type": "STRING"},
            "summary": {"type": "STRING"},
            "details": {"type": "STRING"}
        },
        "required": ["score", "title", "summary", "details"]
    });

    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "profitability": section.clone(),
            "safety": section.clone(),
            "growth": section,
            "overallSummary": {"type": "STRING"},
            "businessChallenges": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": {"type": "STRING"},
                        "description": {"type": "STRING"},
                        "basis": {"type": "STRING"}
                    },
                    "required": ["title", "description", "basis"]
                }
            },
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "productName": {"type": "STRING"},
                        "reasoning": {"type": "STRING"},
                        "salesTalk": {"type": "STRING"}
                    },
                    "required": ["productName", "reasoning", "salesTalk"]
                }
            }
        },
        "required": [
            "profitability",
            "safety",
            "growth",
            "overallSummary",
            "businessChallenges",
            "recommendations"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::financial::{Industry, UNDISCLOSED};

    fn partial_input() -> FinancialInput {
        FinancialInput {
            company_name: "株式会社テスト".to_string(),
            industry: Industry::Construction,
            revenue: Some(52000.0),
            operating_profit: Some(0.0),
            ..Default::default()
        }
    }

    #[test]
    fn undisclosed_figures_render_as_marker_not_zero() {
        let prompt = build_prompt(&partial_input());
        assert!(prompt.contains("- 売上高: 52000"));
        assert!(prompt.contains(&format!("- 前期売上高: {UNDISCLOSED}")));
        assert!(prompt.contains(&format!("- 総資産: {UNDISCLOSED}")));
        // A disclosed zero stays zero.
        assert!(prompt.contains("- 営業利益: 0\n"));
        assert!(!prompt.contains("- 総資産: 0"));
        assert!(!prompt.contains("- 総資産: \n"));
    }

    #[test]
    fn every_figure_line_is_present() {
        let prompt = build_prompt(&partial_input());
        for (label, _) in partial_input().figures() {
            assert!(prompt.contains(&format!("- {label}: ")), "missing {label}");
        }
    }

    #[test]
    fn prompt_lists_whole_catalog_and_context() {
        let prompt = build_prompt(&partial_input());
        assert!(prompt.contains("「建設業」"));
        assert!(prompt.contains("株式会社テスト"));
        for product in PRODUCTS {
            assert!(prompt.contains(product.name), "missing {}", product.name);
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt(&partial_input()), build_prompt(&partial_input()));
    }

    #[test]
    fn schema_requires_every_top_level_key() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            [
                "profitability",
                "safety",
                "growth",
                "overallSummary",
                "businessChallenges",
                "recommendations"
            ]
        );
        assert_eq!(schema["properties"]["safety"]["properties"]["score"]["type"], "NUMBER");
    }
}
