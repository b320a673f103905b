//! Built-in rule table.
//!
//! Used when no rule file is supplied. Covers the common actives found in
//! drugstore and derm-brand products plus the usual routine categories.

use crate::routine::Product;

use super::table::{
    ActiveTags, CategoryRule, IngredientProfile, RuleTable, RuleTableBuilder, SUNSCREEN_CATEGORY, SUNSCREEN_STEP,
    TimeOfDay,
};

/// Keyword aliases: lowercase substring -> canonical key.
const KEYWORDS: &[(&str, &str)] = &[
    ("retinol", "retinol"),
    ("retinal", "retinol"),
    ("retinyl", "retinol"),
    ("adapalene", "retinol"),
    ("bakuchiol", "bakuchiol"),
    ("ascorbic", "vitamin_c"),
    ("ascorbyl", "vitamin_c"),
    ("vitamin c", "vitamin_c"),
    ("glycolic", "aha"),
    ("lactic acid", "aha"),
    ("mandelic", "aha"),
    ("salicylic", "bha"),
    ("benzoyl peroxide", "benzoyl_peroxide"),
    ("niacinamide", "niacinamide"),
    ("hyaluronic", "hyaluronic_acid"),
    ("sodium hyaluronate", "hyaluronic_acid"),
    ("ceramide", "ceramides"),
    ("peptide", "peptides"),
    ("tocopherol", "vitamin_e"),
    ("vitamin e", "vitamin_e"),
    ("zinc oxide", "zinc_oxide"),
    ("centella", "centella"),
    ("cica", "centella"),
];

/// The default rule table.
pub fn table() -> RuleTable {
    builder().finish().0
}

fn builder() -> RuleTableBuilder {
    let builder = RuleTable::builder()
        .profile(
            IngredientProfile::new("retinol", "Retinol")
                .kind("retinoid")
                .conflicts_with(["vitamin_c", "aha", "bha", "benzoyl_peroxide"])
                .pairs_well_with(["niacinamide", "hyaluronic_acid", "ceramides", "peptides"])
                .tagged(ActiveTags::PHOTOSENSITIZING)
                .best_time("PM")
                .description("Vitamin A derivative that speeds up cell turnover.")
                .warning("Increases sun sensitivity; always follow with SPF the next morning.")
                .concerns(["fine_lines", "acne", "texture"]),
        )
        .profile(
            IngredientProfile::new("bakuchiol", "Bakuchiol")
                .kind("plant_extract")
                .pairs_well_with(["niacinamide", "hyaluronic_acid"])
                .best_time("AM / PM")
                .description("Plant-derived retinol alternative that does not sensitise skin to sunlight.")
                .concerns(["fine_lines", "texture"]),
        )
        .profile(
            IngredientProfile::new("vitamin_c", "Vitamin C")
                .kind("antioxidant")
                .conflicts_with(["benzoyl_peroxide", "aha"])
                .pairs_well_with(["vitamin_e", "hyaluronic_acid"])
                .tagged(ActiveTags::ANTIOXIDANT_ACID)
                .best_time("AM")
                .description("Antioxidant that brightens and protects against free radicals.")
                .concerns(["dullness", "hyperpigmentation"]),
        )
        .profile(
            IngredientProfile::new("aha", "AHA (Glycolic/Lactic Acid)")
                .kind("exfoliant")
                .pairs_well_with(["hyaluronic_acid"])
                .best_time("PM")
                .description("Water-soluble acids that dissolve the bonds between dead skin cells.")
                .warning("Can cause irritation when layered with other exfoliants.")
                .concerns(["texture", "dullness", "hyperpigmentation"]),
        )
        .profile(
            IngredientProfile::new("bha", "BHA (Salicylic Acid)")
                .kind("exfoliant")
                .conflicts_with(["retinol"])
                .pairs_well_with(["niacinamide"])
                .best_time("AM / PM")
                .description("Oil-soluble acid that clears congestion inside pores.")
                .concerns(["acne", "blackheads", "oiliness"]),
        )
        .profile(
            IngredientProfile::new("benzoyl_peroxide", "Benzoyl Peroxide")
                .kind("antibacterial")
                .best_time("AM / PM")
                .description("Kills acne-causing bacteria.")
                .warning("Oxidises vitamin C and retinoids; use at a different time of day.")
                .concerns(["acne"]),
        )
        .profile(
            IngredientProfile::new("niacinamide", "Niacinamide")
                .kind("vitamin")
                .pairs_well_with(["hyaluronic_acid", "ceramides", "zinc_oxide"])
                .best_time("AM / PM")
                .description("Vitamin B3; strengthens the barrier and regulates oil.")
                .concerns(["oiliness", "redness", "hyperpigmentation"]),
        )
        .profile(
            IngredientProfile::new("hyaluronic_acid", "Hyaluronic Acid")
                .kind("humectant")
                .best_time("AM / PM")
                .description("Humectant that draws water into the skin.")
                .concerns(["dehydration"]),
        )
        .profile(
            IngredientProfile::new("ceramides", "Ceramides")
                .kind("barrier_lipid")
                .best_time("AM / PM")
                .description("Lipids that rebuild and seal the skin barrier.")
                .concerns(["dryness", "sensitivity"]),
        )
        .profile(
            IngredientProfile::new("peptides", "Peptides")
                .kind("protein_fragment")
                .best_time("AM / PM")
                .description("Short amino-acid chains that support firmness.")
                .concerns(["fine_lines", "firmness"]),
        )
        .profile(
            IngredientProfile::new("vitamin_e", "Vitamin E")
                .kind("antioxidant")
                .best_time("AM / PM")
                .description("Fat-soluble antioxidant that stabilises vitamin C.")
                .concerns(["dryness"]),
        )
        .profile(
            IngredientProfile::new("zinc_oxide", "Zinc Oxide")
                .kind("uv_filter")
                .best_time("AM")
                .description("Mineral UV filter with broad-spectrum coverage.")
                .concerns(["sun_protection", "redness"]),
        )
        .profile(
            IngredientProfile::new("centella", "Centella Asiatica")
                .kind("plant_extract")
                .pairs_well_with(["niacinamide", "ceramides"])
                .best_time("AM / PM")
                .description("Soothing extract that calms redness.")
                .concerns(["redness", "sensitivity"]),
        )
        .category("cleanser", CategoryRule::new(1, TimeOfDay::Both).essential())
        .category("toner", CategoryRule::new(2, TimeOfDay::Both))
        .category("mask", CategoryRule::new(3, TimeOfDay::Pm))
        .category("serum", CategoryRule::new(4, TimeOfDay::Both))
        .category("treatment", CategoryRule::new(5, TimeOfDay::Pm))
        .category("eye cream", CategoryRule::new(6, TimeOfDay::Both))
        .category("moisturizer", CategoryRule::new(7, TimeOfDay::Both).essential())
        .category("face oil", CategoryRule::new(8, TimeOfDay::Pm))
        .category(SUNSCREEN_CATEGORY, CategoryRule::new(SUNSCREEN_STEP, TimeOfDay::Am).essential());

    KEYWORDS.iter().fold(builder, |b, (keyword, key)| b.keyword(keyword, key))
}

/// A small example routine for demos and smoke tests.
pub fn sample_routine() -> Vec<Product> {
    vec![
        Product::new(
            "Pond's Bright Beauty De-Tan Facewash",
            "Pond's",
            "cleanser",
            &["Myristic Acid", "Glycerin", "Water", "Niacinamide"],
        ),
        Product::new("The Ordinary Retinol 0.5% in Squalane", "The Ordinary", "serum", &["Squalane", "Retinol"]),
        Product::new(
            "Minimalist 10% Vitamin C Serum",
            "Minimalist",
            "serum",
            &["Aqua", "Ethyl Ascorbic Acid", "Sodium Hyaluronate"],
        ),
        Product::new(
            "Dr. Sheth's Ceramide & Vitamin C Sunscreen",
            "Dr. Sheth's",
            "sunscreen",
            &["Aqua", "Ceramide", "Vitamin C"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_internally_consistent() {
        let (table, issues) = builder().finish();
        assert!(issues.is_empty(), "{issues:?}");

        for (keyword, key) in table.keywords() {
            assert!(table.profile(key).is_some(), "keyword '{keyword}' maps to missing '{key}'");
        }
        for profile in table.profiles() {
            for other in profile.conflicts_with.iter().chain(&profile.pairs_well_with) {
                assert!(table.profile(other).is_some(), "'{}' references missing '{other}'", profile.key);
            }
        }
    }

    #[test]
    fn essentials_are_cleanser_moisturizer_and_sunscreen() {
        let table = table();
        let essentials: Vec<&str> =
            table.categories().iter().filter(|(_, r)| r.essential).map(|(n, _)| n.as_str()).collect();
        assert_eq!(essentials, vec!["cleanser", "moisturizer", "sunscreen"]);
    }

    #[test]
    fn only_retinoids_are_photosensitizing() {
        let table = table();
        let tagged: Vec<&str> = table
            .profiles()
            .filter(|p| p.tags.contains(ActiveTags::PHOTOSENSITIZING))
            .map(|p| p.key.as_str())
            .collect();
        assert_eq!(tagged, vec!["retinol"]);

        let toner = vec![Product::new("Glow Toner", "", "toner", &["Glycolic Acid"])];
        let out = crate::analyze_with(&toner, &table);
        assert_eq!(out.am_routine, "Glow Toner");
        assert_eq!(out.pm_routine, "Glow Toner");
    }

    #[test]
    fn sample_routine_has_categories() {
        assert!(sample_routine().iter().all(|p| p.category.is_some()));
    }
}
