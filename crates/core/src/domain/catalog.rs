//! Insurance products the analysis may recommend.
//!
//! The list is fixed per release; bump [`CATALOG_VERSION`] whenever it changes so
//! logs can tell which catalog an analysis was produced against.

pub const CATALOG_VERSION: &str = "2024-10";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    pub category: &'static str,
}

pub const PRODUCTS: [Product; 12] = [
    Product { name: "ビジネスプロパティ（企業財産総合保険）", category: "企業財産総合保険" },
    Product { name: "労災あんしん保険（業務災害総合保険）", category: "業務災害補償" },
    Product { name: "Mono保険（財産補償保険）", category: "財産補償" },
    Product { name: "ビジサポ（統合賠償責任保険）", category: "賠償責任保険" },
    Product { name: "サイバー・情報漏えい保険", category: "情報漏えい" },
    Product { name: "工事の保険", category: "工事保険" },
    Product { name: "ユーサイド（新総合自動車保険）", category: "自動車保険" },
    Product { name: "ドライビングサポート２４プラス", category: "ドラレコ特約" },
    Product { name: "働けないときの保険（所得補償保険）", category: "所得補償" },
    Product { name: "ジョイエ傷害保険", category: "傷害保険" },
    Product { name: "住宅安心保険 / お家ドクター火災保険", category: "火災保険" },
    Product { name: "マンションドクター火災保険", category: "マンション管理" },
];

/// Resolves a model-written product name to a catalog entry.
///
/// Models often shorten the name ("ビジサポ") or drop the bracketed subtitle, so a
/// match is an exact name, or the catalog name's leading segment (before any
/// bracket or slash) appearing in the given name.
pub fn find_product(name: &str) -> Option<&'static Product> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    PRODUCTS
        .iter()
        .find(|p| p.name == name)
        .or_else(|| PRODUCTS.iter().find(|p| name.contains(short_name(p.name))))
}

fn short_name(full: &str) -> &str {
    full.split(['（', '(', '/'])
        .next()
        .map(str::trim)
        .unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_product_accepts_exact_and_shortened_names() {
        assert_eq!(
            find_product("サイバー・情報漏えい保険").map(|p| p.category),
            Some("情報漏えい")
        );
        assert_eq!(
            find_product("ビジサポ（統合賠償責任保険）").map(|p| p.category),
            Some("賠償責任保険")
        );
        assert_eq!(
            find_product("労災あんしん保険").map(|p| p.category),
            Some("業務災害補償")
        );
    }

    #[test]
    fn find_product_rejects_unknown_names() {
        assert!(find_product("海外旅行保険").is_none());
        assert!(find_product("   ").is_none());
    }

    #[test]
    fn short_name_strips_subtitles() {
        assert_eq!(short_name("Mono保険（財産補償保険）"), "Mono保険");
        assert_eq!(short_name("住宅安心保険 / お家ドクター火災保険"), "住宅安心保険");
        assert_eq!(short_name("工事の保険"), "工事の保険");
    }
}
