//! Decorative brochure covers for recommendation cards.
//!
//! Both tables are evaluated top to bottom and the first entry whose keyword
//! occurs in the product name wins. A name carrying several keywords resolves
//! to whichever entry is declared first, not the most specific one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverIcon {
    Book,
    Car,
    Activity,
    Bike,
    Home,
    Building,
    Factory,
    HardHat,
    Briefcase,
    Shield,
    Lock,
    Wrench,
    Stethoscope,
    Plane,
}

impl CoverIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            CoverIcon::Book => "📘",
            CoverIcon::Car => "🚗",
            CoverIcon::Activity => "📈",
            CoverIcon::Bike => "🏍",
            CoverIcon::Home => "🏠",
            CoverIcon::Building => "🏢",
            CoverIcon::Factory => "🏭",
            CoverIcon::HardHat => "⛑",
            CoverIcon::Briefcase => "💼",
            CoverIcon::Shield => "🛡",
            CoverIcon::Lock => "🔒",
            CoverIcon::Wrench => "🔧",
            CoverIcon::Stethoscope => "🩺",
            CoverIcon::Plane => "✈",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverStyle {
    pub category: &'static str,
    pub icon: CoverIcon,
    /// Card background, CSS color.
    pub background: &'static str,
    /// Header band, CSS color.
    pub header: &'static str,
    /// Product title, CSS color.
    pub title: &'static str,
}

pub const PLACEHOLDER: CoverStyle = CoverStyle {
    category: "保険商品",
    icon: CoverIcon::Book,
    background: "#ffffff",
    header: "#e2e8f0",
    title: "#1e293b",
};

const fn style(
    category: &'static str,
    icon: CoverIcon,
    background: &'static str,
    header: &'static str,
    title: &'static str,
) -> CoverStyle {
    CoverStyle {
        category,
        icon,
        background,
        header,
        title,
    }
}

/// (keywords, style). Any keyword matching selects the style.
const STYLES: &[(&[&str], CoverStyle)] = &[
    (&["ユーサイド"], style("自動車保険", CoverIcon::Car, "#eff6ff", "#2563eb", "#1d4ed8")),
    (&["ドライビング"], style("ドラレコ特約", CoverIcon::Activity, "#ffffff", "#10b981", "#047857")),
    (&["バイク"], style("バイク保険", CoverIcon::Bike, "#f8fafc", "#3b82f6", "#1e40af")),
    (&["自賠責"], style("自賠責", CoverIcon::Car, "#fefce8", "#eab308", "#854d0e")),
    (&["住宅安心", "お家ドクター"], style("火災保険", CoverIcon::Home, "#eff6ff", "#06b6d4", "#155e75")),
    (&["借りる", "賃貸"], style("家財保険", CoverIcon::Home, "#f0fdf4", "#22c55e", "#166534")),
    (&["マンション"], style("マンション管理", CoverIcon::Building, "#ffffff", "#ef4444", "#dc2626")),
    (&["ビジネスプロパティ"], style("企業財産総合保険", CoverIcon::Factory, "#f0f9ff", "#0369a1", "#0c4a6e")),
    (&["労災あんしん"], style("業務災害補償", CoverIcon::HardHat, "#f7fee7", "#65a30d", "#3f6212")),
    (&["Mono"], style("財産補償", CoverIcon::Briefcase, "#ffffff", "#f97316", "#9a3412")),
    (&["ビジサポ"], style("賠償責任保険", CoverIcon::Shield, "#ffffff", "#f97316", "#ea580c")),
    (&["サイバー"], style("情報漏えい", CoverIcon::Lock, "#0f172a", "#6366f1", "#a5b4fc")),
    (&["工事"], style("工事保険", CoverIcon::Wrench, "#fefce8", "#eab308", "#854d0e")),
    (&["働けない"], style("所得補償", CoverIcon::Stethoscope, "#fdf2f8", "#ec4899", "#be185d")),
    (&["ジョイエ", "傷害", "キズ"], style("傷害保険", CoverIcon::Activity, "#f0fdfa", "#14b8a6", "#0f766e")),
    (&["地震"], style("地震保険", CoverIcon::Activity, "#fff7ed", "#fb923c", "#9a3412")),
    (&["旅行"], style("旅行保険", CoverIcon::Plane, "#f0f9ff", "#0ea5e9", "#075985")),
];

const BROCHURE_BASE: &str = "https://www.nisshinfire.co.jp/service/pdf/";

/// (keyword, brochure file under [`BROCHURE_BASE`]).
const BROCHURES: &[(&str, &str)] = &[
    ("ユーサイド", "YOUSIDE2601.pdf"),
    ("ドライビング", "ds24plus2101.pdf"),
    ("バイク", "bike1901.pdf"),
    ("自賠責", "jibaiseki.pdf"),
    ("住宅安心", "jutaku2410.pdf"),
    ("お家ドクター", "ouchidr2410.pdf"),
    ("お部屋を借りる", "oheya_01.pdf"),
    ("マンション", "mandoku2410.pdf"),
    ("地震", "jishin2210.pdf"),
    ("自転車", "joyesj2310.pdf"),
    ("スポーツ", "joyess2410.pdf"),
    ("キッズ", "joyekids2410.pdf"),
    ("ジョイエ", "joye2410.pdf"),
    ("日常生活傷害", "nichijo2410.pdf"),
    ("キズいえ～る", "kizu2310.pdf"),
    ("働けない", "hatarakenaitoki2301.pdf"),
    ("海外旅行", "kaigai2310.pdf"),
    ("国内旅行", "kokunai2106.pdf"),
    ("ビジネスプロパティ", "businessproperty2410.pdf"),
    ("労災あんしん", "rousaianshin2509.pdf"),
    ("Mono", "mono2310.pdf"),
    ("ビジサポ", "busisup2601.pdf"),
    ("サイバー", "cyber2601.pdf"),
    ("工事", "kouji2506.pdf"),
];

pub fn cover_style(product_name: &str) -> &'static CoverStyle {
    STYLES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| product_name.contains(k)))
        .map(|(_, style)| style)
        .unwrap_or(&PLACEHOLDER)
}

pub fn brochure_url(product_name: &str) -> Option<String> {
    BROCHURES
        .iter()
        .find(|(keyword, _)| product_name.contains(keyword))
        .map(|(_, file)| format!("{BROCHURE_BASE}{file}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub style: &'static CoverStyle,
    pub brochure_url: Option<String>,
}

pub fn resolve(product_name: &str) -> Cover {
    Cover {
        style: cover_style(product_name),
        brochure_url: brochure_url(product_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::PRODUCTS;

    #[test]
    fn every_catalog_product_gets_a_styled_cover_and_brochure() {
        for product in PRODUCTS {
            let cover = resolve(product.name);
            assert_ne!(cover.style, &PLACEHOLDER, "{}", product.name);
            assert!(cover.brochure_url.is_some(), "{}", product.name);
        }
    }

    #[test]
    fn unknown_product_falls_back_to_placeholder() {
        let cover = resolve("ペット保険");
        assert_eq!(cover.style, &PLACEHOLDER);
        assert_eq!(cover.style.category, "保険商品");
        assert_eq!(cover.brochure_url, None);
    }

    #[test]
    fn first_declared_keyword_wins() {
        // "マンション" is declared before "地震", whatever the name order.
        assert_eq!(cover_style("地震保険付きマンションドクター").category, "マンション管理");
        // "住宅安心" precedes "お家ドクター" in the brochure table.
        assert_eq!(
            brochure_url("住宅安心保険 / お家ドクター火災保険").as_deref(),
            Some("https://www.nisshinfire.co.jp/service/pdf/jutaku2410.pdf")
        );
    }

    #[test]
    fn any_keyword_of_an_entry_matches() {
        assert_eq!(cover_style("キズいえ～る").category, "傷害保険");
        assert_eq!(cover_style("賃貸住宅の家財保険").category, "家財保険");
    }
}
