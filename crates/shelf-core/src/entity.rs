//! Catalog entities held in the cache.
//!
//! Entities are cached as full JSON snapshots: every write replaces the whole
//! value, so the types only need to round-trip through `serde`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{EntityId, EntityKind};

/// A catalog entity that can be cached.
///
/// Implementors are plain data snapshots. The associated [`Entity::KIND`]
/// selects the key namespace and the source-of-record accessor.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind of this entity.
    const KIND: EntityKind;

    /// Identifier of this snapshot.
    fn id(&self) -> EntityId;
}

/// Catalog-specific product fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductCustomFields {
    /// Identifier of the product in the legacy catalog.
    pub source_id: Option<i64>,
    pub packaging: Option<String>,
    pub matter: Option<String>,
    pub measure_unit_for_packaging: Option<String>,
    pub measure_unit_for_price_per_unit: Option<String>,
    pub brand_id: Option<i64>,
    pub brand_name: Option<String>,
    pub origin_id: Option<i64>,
    pub origin_country: Option<String>,
    pub market_id: Option<i64>,
    pub market_name: Option<String>,
    pub market_address: Option<String>,
    pub ean: Option<String>,
}

/// A catalog product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub variant_ids: Vec<EntityId>,
    #[serde(default)]
    pub custom_fields: ProductCustomFields,
}

impl Product {
    /// Creates an enabled product with no variants.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            slug: slugify(&name),
            name,
            description: String::new(),
            enabled: true,
            variant_ids: Vec::new(),
            custom_fields: ProductCustomFields::default(),
        }
    }
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Catalog-specific variant fields (nutrition facts omitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantCustomFields {
    pub availability: Option<bool>,
    pub on_discount: Option<bool>,
    pub certification: Option<String>,
    pub format: Option<String>,
    pub ingredients: Option<String>,
    pub price_per_packaging: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub weight_per_packaging: Option<f64>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: EntityId,
    pub product_id: EntityId,
    pub name: String,
    pub sku: String,
    /// Price in minor currency units.
    pub price: i64,
    pub currency_code: String,
    #[serde(default)]
    pub stock_on_hand: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub custom_fields: VariantCustomFields,
}

impl ProductVariant {
    /// Creates an enabled variant with no stock.
    pub fn new(
        id: impl Into<EntityId>,
        product_id: impl Into<EntityId>,
        sku: impl Into<String>,
        price: i64,
    ) -> Self {
        let sku = sku.into();
        Self {
            id: id.into(),
            product_id: product_id.into(),
            name: sku.clone(),
            sku,
            price,
            currency_code: "EUR".to_string(),
            stock_on_hand: 0,
            enabled: true,
            custom_fields: VariantCustomFields::default(),
        }
    }
}

impl Entity for ProductVariant {
    const KIND: EntityKind = EntityKind::ProductVariant;

    fn id(&self) -> EntityId {
        self.id
    }
}

fn default_enabled() -> bool {
    true
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_new() {
        let product = Product::new(42, "Huile d'olive  Extra Vierge");
        assert_eq!(product.id(), EntityId::new(42));
        assert_eq!(product.slug, "huile-d-olive-extra-vierge");
        assert!(product.enabled);
        assert_eq!(Product::KIND, EntityKind::Product);
    }

    #[test]
    fn test_variant_kind() {
        let variant = ProductVariant::new(7, 42, "OLIVE-1L", 899);
        assert_eq!(variant.id(), EntityId::new(7));
        assert_eq!(variant.product_id, EntityId::new(42));
        assert_eq!(ProductVariant::KIND, EntityKind::ProductVariant);
    }

    #[test]
    fn test_product_deserialize_with_defaults() {
        let json = r#"{"id": 3, "name": "Tea", "slug": "tea"}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert!(product.enabled);
        assert!(product.variant_ids.is_empty());
        assert_eq!(product.custom_fields, ProductCustomFields::default());
    }

    #[test]
    fn test_variant_custom_fields_camel_case() {
        let mut variant = ProductVariant::new(1, 1, "SKU", 100);
        variant.custom_fields.on_discount = Some(true);

        let json = serde_json::to_value(&variant).unwrap();
        assert_eq!(json["productId"], 1);
        assert_eq!(json["customFields"]["onDiscount"], true);
    }
}
