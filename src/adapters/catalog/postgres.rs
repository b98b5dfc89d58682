//! PostgreSQL implementation of CatalogReader.
//!
//! Reads the curated catalog tables (`ingredients`, `conflict_rules`,
//! `skin_sensitivities`, `brands`, `products`, `product_ingredients`).
//! Only rows flagged `is_active` are part of a snapshot; products are
//! returned regardless so the decomposer can report them as unavailable.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::str::FromStr;

use crate::domain::catalog::{
    CatalogSnapshot, ConcentrationRange, ConflictRule, ConflictType, EvidenceLevel, Ingredient, PhRange, Product,
    ProductCategory, ProductIngredientEntry, ProductRecord, SensitivityLevel, SkinSensitivity,
};
use crate::domain::foundation::{IngredientId, ProductId, Severity};
use crate::domain::profile::SkinType;
use crate::ports::{CatalogError, CatalogReader};

/// PostgreSQL implementation of CatalogReader.
#[derive(Clone)]
pub struct PostgresCatalogReader {
    pool: PgPool,
}

impl PostgresCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| CatalogError::Unavailable(format!("Failed to connect to catalog database: {}", e)))?;
        Ok(Self::new(pool))
    }

    async fn load_ingredients(&self) -> Result<Vec<Ingredient>, CatalogError> {
        let rows = sqlx::query(
            r#"
            SELECT ingredient_id, name, inci_name, category, function_type,
                   ph_range_min::float8 AS ph_range_min,
                   ph_range_max::float8 AS ph_range_max,
                   concentration_range_min::float8 AS concentration_range_min,
                   concentration_range_max::float8 AS concentration_range_max,
                   is_photosensitive
            FROM ingredients
            WHERE is_active = TRUE
            ORDER BY ingredient_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Query(format!("Failed to load ingredients: {}", e)))?;

        rows.into_iter().map(row_to_ingredient).collect()
    }

    async fn load_rules(&self) -> Result<Vec<ConflictRule>, CatalogError> {
        let rows = sqlx::query(
            r#"
            SELECT ingredient1_id, ingredient2_id, severity, conflict_type, ph_conflict,
                   concentration_dependent, time_separation_hours, evidence_level, description
            FROM conflict_rules
            WHERE is_active = TRUE
            ORDER BY ingredient1_id, ingredient2_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Query(format!("Failed to load conflict rules: {}", e)))?;

        rows.into_iter().map(row_to_rule).collect()
    }

    async fn load_sensitivities(&self) -> Result<Vec<SkinSensitivity>, CatalogError> {
        let rows = sqlx::query(
            r#"
            SELECT ingredient_id, skin_type, sensitivity_level,
                   recommended_max_concentration::float8 AS recommended_max_concentration,
                   patch_test_required, description
            FROM skin_sensitivities
            ORDER BY ingredient_id, skin_type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Query(format!("Failed to load skin sensitivities: {}", e)))?;

        rows.into_iter().map(row_to_sensitivity).collect()
    }
}

#[async_trait]
impl CatalogReader for PostgresCatalogReader {
    async fn load_snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        let (ingredients, rules, sensitivities) =
            tokio::try_join!(self.load_ingredients(), self.load_rules(), self.load_sensitivities())?;

        Ok(CatalogSnapshot {
            ingredients,
            rules,
            sensitivities,
        })
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, CatalogError> {
        let row = sqlx::query(
            r#"
            SELECT p.product_id, p.name, p.category, p.subcategory, p.is_active, b.name AS brand
            FROM products p
            LEFT JOIN brands b ON b.brand_id = p.brand_id
            WHERE p.product_id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::Query(format!("Failed to find product: {}", e)))?;

        let product = match row {
            Some(row) => row_to_product(row)?,
            None => return Ok(None),
        };

        let entry_rows = sqlx::query(
            r#"
            SELECT ingredient_id, concentration::float8 AS concentration, ingredient_order
            FROM product_ingredients
            WHERE product_id = $1 AND is_active = TRUE
            ORDER BY ingredient_order NULLS LAST, ingredient_id
            "#,
        )
        .bind(id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Query(format!("Failed to load product ingredients: {}", e)))?;

        let entries = entry_rows
            .into_iter()
            .enumerate()
            .map(|(position, row)| row_to_entry(id, position, row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ProductRecord { product, entries }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Row mapping
// ════════════════════════════════════════════════════════════════════════════

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, CatalogError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| CatalogError::InvalidData(format!("Failed to get {}: {}", name, e)))
}

fn ingredient_id(raw: i64) -> Result<IngredientId, CatalogError> {
    IngredientId::new(raw).map_err(|e| CatalogError::InvalidData(format!("Invalid ingredient id: {}", e)))
}

fn row_to_ingredient(row: PgRow) -> Result<Ingredient, CatalogError> {
    let id = ingredient_id(column(&row, "ingredient_id")?)?;
    let name: String = column(&row, "name")?;

    let ph_range = match (
        column::<Option<f64>>(&row, "ph_range_min")?,
        column::<Option<f64>>(&row, "ph_range_max")?,
    ) {
        (Some(min), Some(max)) => Some(
            PhRange::new(min, max)
                .map_err(|e| CatalogError::InvalidData(format!("Ingredient {}: {}", id, e)))?,
        ),
        _ => None,
    };

    let recommended_concentration = match (
        column::<Option<f64>>(&row, "concentration_range_min")?,
        column::<Option<f64>>(&row, "concentration_range_max")?,
    ) {
        (Some(min_pct), Some(max_pct)) => Some(ConcentrationRange { min_pct, max_pct }),
        _ => None,
    };

    Ok(Ingredient {
        id,
        name,
        inci_name: column(&row, "inci_name")?,
        category: column(&row, "category")?,
        functional_class: column(&row, "function_type")?,
        ph_range,
        recommended_concentration,
        is_photosensitive: column::<Option<bool>>(&row, "is_photosensitive")?.unwrap_or(false),
    })
}

fn row_to_rule(row: PgRow) -> Result<ConflictRule, CatalogError> {
    let severity: String = column(&row, "severity")?;
    let conflict_type: String = column(&row, "conflict_type")?;
    let evidence_level: Option<String> = column(&row, "evidence_level")?;
    let hours: Option<i32> = column(&row, "time_separation_hours")?;

    let separation_hours = hours
        .map(|h| {
            u32::try_from(h)
                .map_err(|_| CatalogError::InvalidData(format!("Negative separation hours: {}", h)))
        })
        .transpose()?;

    Ok(ConflictRule {
        ingredient1: ingredient_id(column(&row, "ingredient1_id")?)?,
        ingredient2: ingredient_id(column(&row, "ingredient2_id")?)?,
        severity: Severity::from_str(&severity)
            .map_err(|e| CatalogError::InvalidData(format!("Invalid rule severity: {}", e)))?,
        conflict_type: str_to_conflict_type(&conflict_type)?,
        ph_dependent: column::<Option<bool>>(&row, "ph_conflict")?.unwrap_or(false),
        concentration_dependent: column::<Option<bool>>(&row, "concentration_dependent")?.unwrap_or(false),
        separation_hours,
        evidence_level: evidence_level
            .as_deref()
            .map(str_to_evidence_level)
            .transpose()?
            .unwrap_or(EvidenceLevel::Moderate),
        rationale: column(&row, "description")?,
        is_active: true,
    })
}

fn row_to_sensitivity(row: PgRow) -> Result<SkinSensitivity, CatalogError> {
    let skin_type: String = column(&row, "skin_type")?;
    let level: String = column(&row, "sensitivity_level")?;

    Ok(SkinSensitivity {
        ingredient_id: ingredient_id(column(&row, "ingredient_id")?)?,
        skin_type: SkinType::from_str(&skin_type)
            .map_err(|e| CatalogError::InvalidData(format!("Invalid skin type: {}", e)))?,
        level: str_to_sensitivity_level(&level)?,
        recommended_max_concentration: column(&row, "recommended_max_concentration")?,
        patch_test_required: column::<Option<bool>>(&row, "patch_test_required")?.unwrap_or(false),
        description: column(&row, "description")?,
    })
}

fn row_to_product(row: PgRow) -> Result<Product, CatalogError> {
    let raw_id: i64 = column(&row, "product_id")?;
    let id = ProductId::new(raw_id).map_err(|e| CatalogError::InvalidData(format!("Invalid product id: {}", e)))?;
    let category: String = column(&row, "category")?;
    let subcategory: Option<String> = column(&row, "subcategory")?;

    Ok(Product {
        id,
        name: column(&row, "name")?,
        brand: column(&row, "brand")?,
        category: classify_product(&category, subcategory.as_deref()),
        is_active: column::<Option<bool>>(&row, "is_active")?.unwrap_or(true),
    })
}

fn row_to_entry(product_id: ProductId, position: usize, row: PgRow) -> Result<ProductIngredientEntry, CatalogError> {
    let order: Option<i32> = column(&row, "ingredient_order")?;
    let order_rank = order
        .and_then(|o| u32::try_from(o).ok())
        .unwrap_or(position as u32 + 1);

    Ok(ProductIngredientEntry {
        product_id,
        ingredient_id: ingredient_id(column(&row, "ingredient_id")?)?,
        concentration_pct: column(&row, "concentration")?,
        order_rank,
    })
}

/// The stored category is coarse; the subcategory refines it when present.
fn classify_product(category: &str, subcategory: Option<&str>) -> ProductCategory {
    match subcategory {
        Some(sub) if !sub.trim().is_empty() => ProductCategory::classify(&format!("{} {}", sub, category)),
        _ => ProductCategory::classify(category),
    }
}

fn str_to_conflict_type(s: &str) -> Result<ConflictType, CatalogError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "chemical" => Ok(ConflictType::Chemical),
        "physical" => Ok(ConflictType::Physical),
        "effectiveness" => Ok(ConflictType::Effectiveness),
        _ => Err(CatalogError::InvalidData(format!("Invalid conflict type: {}", s))),
    }
}

fn str_to_evidence_level(s: &str) -> Result<EvidenceLevel, CatalogError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(EvidenceLevel::Low),
        "moderate" => Ok(EvidenceLevel::Moderate),
        "high" => Ok(EvidenceLevel::High),
        "proven" => Ok(EvidenceLevel::Proven),
        _ => Err(CatalogError::InvalidData(format!("Invalid evidence level: {}", s))),
    }
}

fn str_to_sensitivity_level(s: &str) -> Result<SensitivityLevel, CatalogError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(SensitivityLevel::Low),
        "medium" => Ok(SensitivityLevel::Medium),
        "high" => Ok(SensitivityLevel::High),
        "avoid" => Ok(SensitivityLevel::Avoid),
        _ => Err(CatalogError::InvalidData(format!("Invalid sensitivity level: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_type_parsing_accepts_stored_values() {
        assert_eq!(str_to_conflict_type("chemical").unwrap(), ConflictType::Chemical);
        assert_eq!(str_to_conflict_type("Physical").unwrap(), ConflictType::Physical);
        assert_eq!(str_to_conflict_type(" effectiveness ").unwrap(), ConflictType::Effectiveness);
        assert!(str_to_conflict_type("unknown").is_err());
    }

    #[test]
    fn evidence_level_parsing_rejects_invalid() {
        assert_eq!(str_to_evidence_level("proven").unwrap(), EvidenceLevel::Proven);
        assert!(matches!(str_to_evidence_level("anecdotal"), Err(CatalogError::InvalidData(_))));
    }

    #[test]
    fn sensitivity_level_parsing() {
        assert_eq!(str_to_sensitivity_level("AVOID").unwrap(), SensitivityLevel::Avoid);
        assert_eq!(str_to_sensitivity_level("low").unwrap(), SensitivityLevel::Low);
        assert!(str_to_sensitivity_level("severe").is_err());
    }

    #[test]
    fn subcategory_refines_product_category() {
        assert_eq!(classify_product("skincare", Some("Gel Cleanser")), ProductCategory::Cleanser);
        assert_eq!(classify_product("sunscreen", None), ProductCategory::Sunscreen);
        assert_eq!(classify_product("moisturizer", Some("  ")), ProductCategory::Moisturizer);
    }

    #[test]
    fn rejects_non_positive_ingredient_ids() {
        assert!(ingredient_id(0).is_err());
        assert!(ingredient_id(12).is_ok());
    }
}
