//! Catalog products and their variants.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::deserialize_category_ref;
use super::id::{CategoryId, ProductId};
use super::image::{Image, resolve_display_url};
use super::price::Price;

/// Label used when a product defines no variants.
pub const DEFAULT_VARIANT_LABEL: &str = "Default";

const fn default_true() -> bool {
    true
}

/// A purchasable variation of a product (colour / flavour).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Colour or flavour name shown to shoppers.
    pub color: String,
    /// Swatch colour, usually `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_code: Option<String>,
    /// Units in stock. Display-only; the cart never enforces it.
    #[serde(default)]
    pub stock: u32,
    /// Variant-specific images.
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Display badges derived from product tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Bestseller,
    New,
}

impl Badge {
    fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("bestseller") {
            Some(Self::Bestseller)
        } else if tag.eq_ignore_ascii_case("new") {
            Some(Self::New)
        } else {
            None
        }
    }
}

/// A product in the catalog.
///
/// Wire format is the API's camelCase JSON. `_id` is accepted for `id`, and
/// `category` may be either a category id or an embedded category object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Selling price.
    pub price: Price,
    /// Suggested retail price. Expected to be `>= price`, not enforced.
    #[serde(default)]
    pub mrp: Price,
    /// Informational discount shown on the card. Never derived from `mrp`.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    #[serde(deserialize_with = "deserialize_category_ref")]
    pub category: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Label of the variant shown in the cart and order message.
    ///
    /// The first variant's colour, or `"Default"` when there is none.
    #[must_use]
    pub fn variant_label(&self) -> &str {
        self.variants
            .first()
            .map(|v| v.color.trim())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_VARIANT_LABEL)
    }

    /// The variant to display, synthesizing a default one if none exist.
    #[must_use]
    pub fn display_variant(&self) -> Cow<'_, ProductVariant> {
        self.variants.first().map_or_else(
            || {
                Cow::Owned(ProductVariant {
                    color: DEFAULT_VARIANT_LABEL.to_owned(),
                    color_code: None,
                    stock: 0,
                    images: self.images.clone(),
                    sku: None,
                    is_available: self.is_active,
                })
            },
            Cow::Borrowed,
        )
    }

    /// Main image URL, falling back to variant images, then the placeholder.
    #[must_use]
    pub fn display_image(&self) -> &str {
        if self.images.iter().any(|img| img.display_url().is_some()) {
            return resolve_display_url(&self.images);
        }
        self.variants
            .iter()
            .find(|v| v.images.iter().any(|img| img.display_url().is_some()))
            .map_or_else(
                || resolve_display_url(&[]),
                |v| resolve_display_url(&v.images),
            )
    }

    /// Badges recognised among the product's tags, in tag order.
    #[must_use]
    pub fn badges(&self) -> Vec<Badge> {
        let mut badges = Vec::new();
        for badge in self.tags.iter().filter_map(|t| Badge::from_tag(t)) {
            if !badges.contains(&badge) {
                badges.push(badge);
            }
        }
        badges
    }

    /// Total units in stock across all variants.
    #[must_use]
    pub fn total_stock(&self) -> u32 {
        self.variants.iter().map(|v| v.stock).sum()
    }

    /// Apply a partial update, leaving unspecified fields untouched.
    pub fn apply(&mut self, patch: ProductPatch) {
        let ProductPatch {
            name,
            description,
            mrp,
            price,
            discount_percent,
            category,
            brand,
            images,
            variants,
            specifications,
            tags,
            is_active,
        } = patch;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = mrp {
            self.mrp = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = discount_percent {
            self.discount_percent = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = brand {
            self.brand = Some(v);
        }
        if let Some(v) = images {
            self.images = v;
        }
        if let Some(v) = variants {
            self.variants = v;
        }
        if let Some(v) = specifications {
            self.specifications = v;
        }
        if let Some(v) = tags {
            self.tags = v;
        }
        if let Some(v) = is_active {
            self.is_active = v;
        }
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mrp: Price,
    pub price: Price,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount_percent: Option<Decimal>,
    pub category: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductInput {
    /// Turn the input into a product with the given id and timestamps.
    #[must_use]
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            mrp: self.mrp,
            discount_percent: self.discount_percent.unwrap_or_default(),
            category: self.category,
            brand: self.brand,
            images: self.images,
            variants: self.variants,
            specifications: self.specifications,
            tags: self.tags,
            is_active: self.is_active.unwrap_or(true),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Partial product update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrp: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<ProductVariant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::image::PLACEHOLDER_IMAGE;

    fn whey() -> Product {
        serde_json::from_value(json!({
            "_id": "clean-whey-mango",
            "name": "Clean Whey",
            "description": "24g protein per serving",
            "mrp": 7499,
            "price": 6229,
            "discountPercent": 17,
            "category": "protein",
            "brand": "ShapeShift",
            "images": ["https://cdn.example/whey.jpg"],
            "variants": [{"color": "Mango Twist", "colorCode": "#FFB347", "stock": 50, "images": [], "sku": "CW-MNG-001", "isAvailable": true}],
            "specifications": {"weight": "900g"},
            "tags": ["bestseller", "protein"],
            "isActive": true,
            "createdAt": "2024-06-01T10:00:00.000Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_api_product() {
        let p = whey();
        assert_eq!(p.id.as_str(), "clean-whey-mango");
        assert_eq!(p.price, Price::from_units(6229));
        assert_eq!(p.category.as_str(), "protein");
        assert_eq!(p.discount_percent, Decimal::from(17));
        assert!(p.created_at.is_some());
        assert!(p.updated_at.is_none());
    }

    #[test]
    fn test_embedded_category_object() {
        let p: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Primer",
            "price": 650,
            "category": {"_id": "skincare", "name": "skincare", "displayName": "Skincare"}
        }))
        .unwrap();
        assert_eq!(p.category.as_str(), "skincare");
        assert!(p.is_active);
        assert!(p.variants.is_empty());
    }

    #[test]
    fn test_variant_label_defaults() {
        let mut p = whey();
        assert_eq!(p.variant_label(), "Mango Twist");

        p.variants.clear();
        assert_eq!(p.variant_label(), DEFAULT_VARIANT_LABEL);
        assert_eq!(p.display_variant().color, DEFAULT_VARIANT_LABEL);
    }

    #[test]
    fn test_badges_from_tags() {
        let mut p = whey();
        p.tags = vec!["New".into(), "sale".into(), "bestseller".into(), "new".into()];
        assert_eq!(p.badges(), vec![Badge::New, Badge::Bestseller]);
    }

    #[test]
    fn test_display_image_fallbacks() {
        let mut p = whey();
        assert_eq!(p.display_image(), "https://cdn.example/whey.jpg");

        p.images.clear();
        assert_eq!(p.display_image(), PLACEHOLDER_IMAGE);

        if let Some(v) = p.variants.first_mut() {
            v.images.push(Image::from("variant.jpg"));
        }
        assert_eq!(p.display_image(), "variant.jpg");
    }

    #[test]
    fn test_apply_patch_only_touches_given_fields() {
        let mut p = whey();
        p.apply(ProductPatch {
            price: Some(Price::from_units(5999)),
            is_active: Some(false),
            ..ProductPatch::default()
        });
        assert_eq!(p.price, Price::from_units(5999));
        assert!(!p.is_active);
        assert_eq!(p.name, "Clean Whey");
        assert_eq!(p.mrp, Price::from_units(7499));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = ProductPatch {
            name: Some("Renamed".into()),
            ..ProductPatch::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"name": "Renamed"}));
    }
}
