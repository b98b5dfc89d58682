//! Shared fixtures for analysis unit tests.

use crate::domain::catalog::{
    CatalogSnapshot, ConflictRule, ConflictType, EvidenceLevel, Ingredient, PhRange, Product,
    ProductCategory, ProductIngredientEntry, ProductRecord, SensitivityLevel, SkinSensitivity,
};
use crate::domain::foundation::{IngredientId, ProductId, Severity, TimeOfDay};
use crate::domain::profile::{SkinType, UserProfile};
use crate::domain::rule_graph::RuleGraph;

use super::{AnalysisPolicy, AnalysisResult, DecomposedProduct, Fingerprint, RoutineAnalyzer, RoutineRequest};

pub const RETINOL: i64 = 1;
pub const VITAMIN_C: i64 = 2;
pub const SALICYLIC_ACID: i64 = 3;
pub const NIACINAMIDE: i64 = 4;
pub const GLYCOLIC_ACID: i64 = 5;
pub const HYALURONIC_ACID: i64 = 6;
pub const FRAGRANCE: i64 = 7;
/// No pH data in the catalog.
pub const BAKUCHIOL: i64 = 8;

pub fn ing(v: i64) -> IngredientId {
    IngredientId::new(v).unwrap()
}

pub fn pid(v: i64) -> ProductId {
    ProductId::new(v).unwrap()
}

fn ph(min: f64, max: f64) -> PhRange {
    PhRange::new(min, max).unwrap()
}

fn rule(
    a: i64,
    b: i64,
    severity: Severity,
    conflict_type: ConflictType,
    hours: Option<u32>,
    evidence: EvidenceLevel,
) -> ConflictRule {
    ConflictRule {
        ingredient1: ing(a),
        ingredient2: ing(b),
        severity,
        conflict_type,
        ph_dependent: false,
        concentration_dependent: false,
        separation_hours: hours,
        evidence_level: evidence,
        rationale: String::new(),
        is_active: true,
    }
}

pub fn snapshot() -> CatalogSnapshot {
    let ingredients = vec![
        Ingredient::new(ing(RETINOL), "Retinol").with_ph_range(ph(5.5, 6.5)).photosensitive(),
        Ingredient::new(ing(VITAMIN_C), "Vitamin C").with_ph_range(ph(2.5, 3.5)),
        Ingredient::new(ing(SALICYLIC_ACID), "Salicylic Acid").with_ph_range(ph(3.0, 4.0)).photosensitive(),
        Ingredient::new(ing(NIACINAMIDE), "Niacinamide").with_ph_range(ph(5.0, 7.0)),
        Ingredient::new(ing(GLYCOLIC_ACID), "Glycolic Acid").with_ph_range(ph(3.0, 4.0)).photosensitive(),
        Ingredient::new(ing(HYALURONIC_ACID), "Hyaluronic Acid"),
        Ingredient::new(ing(FRAGRANCE), "Fragrance"),
        Ingredient::new(ing(BAKUCHIOL), "Bakuchiol"),
    ];

    let mut retinol_vitamin_c = rule(
        RETINOL,
        VITAMIN_C,
        Severity::Medium,
        ConflictType::Effectiveness,
        Some(12),
        EvidenceLevel::Moderate,
    );
    retinol_vitamin_c.ph_dependent = true;
    retinol_vitamin_c.rationale = "Vitamin C needs a low pH that destabilises retinol".into();

    let mut retinol_bha = rule(
        SALICYLIC_ACID,
        RETINOL,
        Severity::High,
        ConflictType::Chemical,
        Some(24),
        EvidenceLevel::High,
    );
    retinol_bha.concentration_dependent = true;
    retinol_bha.rationale = "Combined exfoliation causes irritation".into();

    let retinol_aha = rule(
        RETINOL,
        GLYCOLIC_ACID,
        Severity::High,
        ConflictType::Chemical,
        None,
        EvidenceLevel::Proven,
    );

    let mut bakuchiol_vitamin_c = rule(
        BAKUCHIOL,
        VITAMIN_C,
        Severity::Medium,
        ConflictType::Effectiveness,
        Some(12),
        EvidenceLevel::Moderate,
    );
    bakuchiol_vitamin_c.ph_dependent = true;
    bakuchiol_vitamin_c.concentration_dependent = true;

    let sensitivities = vec![
        SkinSensitivity {
            ingredient_id: ing(FRAGRANCE),
            skin_type: SkinType::Sensitive,
            level: SensitivityLevel::Avoid,
            recommended_max_concentration: None,
            patch_test_required: true,
            description: Some("Common irritant".into()),
        },
        SkinSensitivity {
            ingredient_id: ing(SALICYLIC_ACID),
            skin_type: SkinType::Dry,
            level: SensitivityLevel::High,
            recommended_max_concentration: Some(1.0),
            patch_test_required: true,
            description: None,
        },
        SkinSensitivity {
            ingredient_id: ing(NIACINAMIDE),
            skin_type: SkinType::Oily,
            level: SensitivityLevel::Low,
            recommended_max_concentration: None,
            patch_test_required: false,
            description: None,
        },
    ];

    CatalogSnapshot {
        ingredients,
        rules: vec![retinol_vitamin_c, retinol_bha, retinol_aha, bakuchiol_vitamin_c],
        sensitivities,
    }
}

pub fn graph() -> RuleGraph {
    RuleGraph::build(snapshot()).unwrap()
}

/// Builds a decomposed product with `(ingredient, concentration)` entries in
/// label order.
pub fn product(
    id: i64,
    name: &str,
    category: ProductCategory,
    time_of_day: TimeOfDay,
    ingredients: &[(i64, Option<f64>)],
) -> DecomposedProduct {
    let graph = graph();
    let entries: Vec<_> = ingredients
        .iter()
        .enumerate()
        .map(|(rank, (ingredient, pct))| ProductIngredientEntry {
            product_id: pid(id),
            ingredient_id: ing(*ingredient),
            concentration_pct: *pct,
            order_rank: rank as u32 + 1,
        })
        .collect();
    let photosensitive = entries.iter().any(|e| {
        graph
            .ingredient(e.ingredient_id)
            .map(|i| i.is_photosensitive)
            .unwrap_or(false)
    });
    DecomposedProduct::new(
        Product {
            id: pid(id),
            name: name.into(),
            brand: None,
            category,
            is_active: true,
        },
        time_of_day,
        entries,
    )
    .with_photosensitive(photosensitive)
}

pub fn retinol_serum(time_of_day: TimeOfDay) -> DecomposedProduct {
    product(10, "Retinol Night Serum", ProductCategory::Serum, time_of_day, &[(RETINOL, None)])
}

pub fn vitamin_c_serum(time_of_day: TimeOfDay) -> DecomposedProduct {
    product(20, "Vitamin C Serum", ProductCategory::Serum, time_of_day, &[(VITAMIN_C, Some(15.0))])
}

pub fn bha_toner(time_of_day: TimeOfDay) -> DecomposedProduct {
    product(30, "BHA Toner", ProductCategory::Toner, time_of_day, &[(SALICYLIC_ACID, Some(2.0))])
}

pub fn niacinamide_cream(time_of_day: TimeOfDay) -> DecomposedProduct {
    product(
        40,
        "Niacinamide Cream",
        ProductCategory::Moisturizer,
        time_of_day,
        &[(NIACINAMIDE, Some(5.0)), (HYALURONIC_ACID, None)],
    )
}

pub fn glycolic_toner(time_of_day: TimeOfDay) -> DecomposedProduct {
    product(50, "Glycolic Toner", ProductCategory::Toner, time_of_day, &[(GLYCOLIC_ACID, Some(7.0))])
}

pub fn perfumed_cream(time_of_day: TimeOfDay) -> DecomposedProduct {
    product(
        60,
        "Perfumed Cream",
        ProductCategory::Moisturizer,
        time_of_day,
        &[(HYALURONIC_ACID, None), (FRAGRANCE, None)],
    )
}

pub fn bakuchiol_oil(time_of_day: TimeOfDay) -> DecomposedProduct {
    product(80, "Bakuchiol Oil", ProductCategory::Oil, time_of_day, &[(BAKUCHIOL, None)])
}

pub fn profile() -> UserProfile {
    UserProfile::new(SkinType::Normal)
}

/// A computed result for an evening retinol + vitamin C routine.
pub fn sample_result() -> (Fingerprint, AnalysisResult) {
    let graph = graph();
    let policy = AnalysisPolicy::default();
    let request = RoutineRequest::new(profile())
        .with_product(pid(10), TimeOfDay::Evening)
        .with_product(pid(20), TimeOfDay::Evening);
    let fingerprint = request.fingerprint().unwrap();
    let products = vec![retinol_serum(TimeOfDay::Evening), vitamin_c_serum(TimeOfDay::Evening)];
    let result = RoutineAnalyzer::new(&graph, &policy).analyze(&request, fingerprint.clone(), &products, Vec::new());
    (fingerprint, result)
}

/// Catalog records for every fixture product.
pub fn records() -> Vec<ProductRecord> {
    [
        retinol_serum(TimeOfDay::Both),
        vitamin_c_serum(TimeOfDay::Both),
        bha_toner(TimeOfDay::Both),
        niacinamide_cream(TimeOfDay::Both),
        glycolic_toner(TimeOfDay::Both),
        perfumed_cream(TimeOfDay::Both),
    ]
    .into_iter()
    .map(|p| ProductRecord {
        product: p.product,
        entries: p.entries,
    })
    .collect()
}
