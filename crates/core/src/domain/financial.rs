use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendered in place of any financial figure the company did not disclose.
pub const UNDISCLOSED: &str = "不明（開示なし）";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Industry {
    #[default]
    #[serde(rename = "製造業")]
    Manufacturing,
    #[serde(rename = "運送業")]
    Transportation,
    #[serde(rename = "学校法人")]
    SchoolCorporation,
    #[serde(rename = "マンション管理組合")]
    CondominiumAssociation,
    #[serde(rename = "建設業")]
    Construction,
    #[serde(rename = "小売・卸売")]
    RetailWholesale,
    #[serde(rename = "サービス業")]
    Services,
    #[serde(rename = "IT・ソフトウェア")]
    ItSoftware,
    #[serde(rename = "不動産")]
    RealEstate,
    #[serde(rename = "医療・福祉")]
    MedicalWelfare,
    #[serde(rename = "その他")]
    Other,
}

impl Industry {
    pub const ALL: [Industry; 11] = [
        Industry::Manufacturing,
        Industry::Transportation,
        Industry::SchoolCorporation,
        Industry::CondominiumAssociation,
        Industry::Construction,
        Industry::RetailWholesale,
        Industry::Services,
        Industry::ItSoftware,
        Industry::RealEstate,
        Industry::MedicalWelfare,
        Industry::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Industry::Manufacturing => "製造業",
            Industry::Transportation => "運送業",
            Industry::SchoolCorporation => "学校法人",
            Industry::CondominiumAssociation => "マンション管理組合",
            Industry::Construction => "建設業",
            Industry::RetailWholesale => "小売・卸売",
            Industry::Services => "サービス業",
            Industry::ItSoftware => "IT・ソフトウェア",
            Industry::RealEstate => "不動産",
            Industry::MedicalWelfare => "医療・福祉",
            Industry::Other => "その他",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Industry {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Industry::ALL
            .into_iter()
            .find(|industry| industry.label() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown industry: {s}"))
    }
}

/// Figures as entered on the form. `None` means the figure was not disclosed,
/// which is not the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInput {
    pub company_name: String,
    pub industry: Industry,

    // P/L
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub prev_revenue: Option<f64>,
    #[serde(default)]
    pub operating_profit: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,

    // B/S
    #[serde(default)]
    pub current_assets: Option<f64>,
    #[serde(default)]
    pub current_liabilities: Option<f64>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub total_equity: Option<f64>,
}

impl FinancialInput {
    /// Label/value pairs in display order, shared by the prompt and the dashboard.
    pub fn figures(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("売上高", self.revenue),
            ("前期売上高", self.prev_revenue),
            ("営業利益", self.operating_profit),
            ("当期純利益", self.net_income),
            ("流動資産", self.current_assets),
            ("流動負債", self.current_liabilities),
            ("総資産", self.total_assets),
            ("純資産 (自己資本)", self.total_equity),
        ]
    }
}

pub fn format_figure(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{v}"),
        None => UNDISCLOSED.to_string(),
    }
}
