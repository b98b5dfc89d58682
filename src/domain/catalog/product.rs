//! Products, their categories and their ingredient lists.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{IngredientId, ProductId};

/// Product category. Drives application order within a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Cleanser,
    Toner,
    Essence,
    Serum,
    Treatment,
    EyeCream,
    Moisturizer,
    Sunscreen,
    Oil,
}

/// Keyword table used to classify free-form product types, checked in order.
const CATEGORY_KEYWORDS: &[(ProductCategory, &[&str])] = &[
    (ProductCategory::EyeCream, &["eye cream", "eye serum", "eye gel"]),
    (ProductCategory::Cleanser, &["cleanser", "cleansing", "face wash", "foam"]),
    (ProductCategory::Toner, &["toner", "tonic", "astringent"]),
    (ProductCategory::Essence, &["essence"]),
    (ProductCategory::Serum, &["serum", "ampoule", "concentrate", "booster"]),
    (ProductCategory::Treatment, &["treatment", "spot"]),
    (ProductCategory::Sunscreen, &["sunscreen", "spf", "sun protection", "uv"]),
    (ProductCategory::Oil, &["facial oil", "face oil", "oil"]),
    (ProductCategory::Moisturizer, &["moisturizer", "cream", "lotion", "hydrator", "mask"]),
];

impl ProductCategory {
    /// Position in the application order. Equal ranks share a tier.
    ///
    /// cleanser → toner → essence → serum/treatment → eye cream →
    /// moisturizer → sunscreen/oil
    pub fn precedence(&self) -> u8 {
        match self {
            ProductCategory::Cleanser => 0,
            ProductCategory::Toner => 1,
            ProductCategory::Essence => 2,
            ProductCategory::Serum | ProductCategory::Treatment => 3,
            ProductCategory::EyeCream => 4,
            ProductCategory::Moisturizer => 5,
            ProductCategory::Sunscreen | ProductCategory::Oil => 6,
        }
    }

    /// Classifies a catalog product type string. Unrecognised types are
    /// treated as serums.
    pub fn classify(product_type: &str) -> Self {
        let lowered = product_type.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(ProductCategory::Serum)
    }

    /// Short application instruction for a step of this category.
    pub fn application_hint(&self) -> &'static str {
        match self {
            ProductCategory::Cleanser => "Massage onto damp skin, rinse with lukewarm water",
            ProductCategory::Toner => "Pat onto clean skin or apply with a cotton pad",
            ProductCategory::Essence => "Pat gently into skin until absorbed",
            ProductCategory::Serum => "Apply 2-3 drops to face and neck, pat until absorbed",
            ProductCategory::Treatment => "Apply a thin layer to affected areas only",
            ProductCategory::EyeCream => "Tap a small amount around the orbital bone",
            ProductCategory::Moisturizer => "Spread evenly over face and neck",
            ProductCategory::Sunscreen => "Apply generously as the last step, reapply every 2 hours outdoors",
            ProductCategory::Oil => "Warm 2-3 drops between palms and press into skin",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Cleanser => "cleanser",
            ProductCategory::Toner => "toner",
            ProductCategory::Essence => "essence",
            ProductCategory::Serum => "serum",
            ProductCategory::Treatment => "treatment",
            ProductCategory::EyeCream => "eye_cream",
            ProductCategory::Moisturizer => "moisturizer",
            ProductCategory::Sunscreen => "sunscreen",
            ProductCategory::Oil => "oil",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: ProductCategory,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// One line of a product's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductIngredientEntry {
    pub product_id: ProductId,
    pub ingredient_id: IngredientId,
    /// Percentage when disclosed.
    #[serde(default)]
    pub concentration_pct: Option<f64>,
    /// Position in the label list; lower means listed earlier.
    pub order_rank: u32,
}

/// A product together with its raw ingredient list, as read from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product: Product,
    #[serde(default)]
    pub entries: Vec<ProductIngredientEntry>,
}
