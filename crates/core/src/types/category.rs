//! Catalog categories.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::CategoryId;
use super::image::Image;

const fn default_true() -> bool {
    true
}

/// A category reference as the API sends it: a bare id or an embedded object.
///
/// Populated objects may carry `_id`, `id`, or both.
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryRef {
    Id(String),
    Embedded {
        #[serde(default, rename = "_id")]
        mongo_id: Option<String>,
        #[serde(default)]
        id: Option<String>,
    },
}

impl CategoryRef {
    fn into_id(self) -> Option<CategoryId> {
        match self {
            Self::Id(id) => Some(CategoryId::new(id)),
            Self::Embedded { mongo_id, id } => mongo_id.or(id).map(CategoryId::new),
        }
    }
}

/// Deserialize a required category reference.
pub(crate) fn deserialize_category_ref<'de, D>(deserializer: D) -> Result<CategoryId, D::Error>
where
    D: Deserializer<'de>,
{
    CategoryRef::deserialize(deserializer)?
        .into_id()
        .ok_or_else(|| D::Error::custom("category reference has no id"))
}

/// Deserialize a nullable parent reference (`null`, id, or embedded object).
fn deserialize_parent_ref<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<CategoryRef>::deserialize(deserializer)?.and_then(CategoryRef::into_id))
}

/// A product category.
///
/// The wildcard [`CategoryId::ALL`] is synthetic: it is never stored
/// upstream, always listed first, and cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    /// Internal name (slug-like).
    #[serde(default)]
    pub name: String,
    /// Name shown to shoppers. Locally stored categories call this `label`.
    #[serde(default, alias = "label")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Parent category; `None` for top-level categories.
    #[serde(default, deserialize_with = "deserialize_parent_ref")]
    pub parent_category: Option<CategoryId>,
    /// Nesting depth, 0 for top-level.
    #[serde(default)]
    pub level: u32,
    /// Display order among siblings.
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u32>,
    /// Child categories. Deeper nesting is kept but only one level is shown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Self>,
}

impl Category {
    /// A top-level category with only an id and display name.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, display_name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.as_str().to_owned(),
            id,
            display_name: display_name.into(),
            slug: None,
            description: None,
            image: None,
            icon: None,
            parent_category: None,
            level: 0,
            order: 0,
            is_active: true,
            product_count: None,
            subcategories: Vec::new(),
        }
    }

    /// The synthetic "All Products" wildcard category.
    #[must_use]
    pub fn all() -> Self {
        Self::new(CategoryId::all(), "All Products")
    }

    /// Whether this is the wildcard category.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.id.is_all()
    }

    /// Whether the category has any child categories.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.subcategories.is_empty()
    }

    /// Whether the category belongs in the top row of the category filter.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.has_children() || self.level == 0 || self.parent_category.is_none()
    }

    /// Best available label: display name, then internal name, then id.
    #[must_use]
    pub fn label(&self) -> &str {
        [self.display_name.as_str(), self.name.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Payload for creating or updating a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Parent id; serialized as `null` for top-level categories.
    #[serde(default)]
    pub parent_category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Normalize free-form admin input into a category id: lowercase, with
/// runs of whitespace replaced by a single `-`.
#[must_use]
pub fn slugify(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_api_category_with_children() {
        let cat: Category = serde_json::from_value(json!({
            "_id": "665f",
            "name": "supplements",
            "displayName": "Supplements",
            "parentCategory": null,
            "level": 0,
            "order": 1,
            "isActive": true,
            "productCount": 12,
            "subcategories": [
                {"_id": "666a", "name": "protein", "displayName": "Protein",
                 "parentCategory": {"_id": "665f", "name": "supplements", "displayName": "Supplements"},
                 "level": 1}
            ]
        }))
        .unwrap();

        assert_eq!(cat.id.as_str(), "665f");
        assert!(cat.is_top_level());
        assert!(cat.has_children());

        let child = cat.subcategories.first().unwrap();
        assert_eq!(child.parent_category.as_ref().unwrap().as_str(), "665f");
        assert_eq!(child.level, 1);
        assert!(!child.is_top_level());
    }

    #[test]
    fn test_embedded_reference_with_both_ids() {
        let cat: Category = serde_json::from_value(json!({
            "id": "whey",
            "parentCategory": {"_id": "665f", "id": "665f", "name": "supplements"}
        }))
        .unwrap();
        assert_eq!(cat.parent_category, Some(CategoryId::from("665f")));
    }

    #[test]
    fn test_parent_as_plain_id() {
        let cat: Category = serde_json::from_value(json!({
            "id": "whey", "name": "whey", "parentCategory": "protein", "level": 1
        }))
        .unwrap();
        assert_eq!(cat.parent_category, Some(CategoryId::from("protein")));
    }

    #[test]
    fn test_local_label_alias() {
        let cat: Category =
            serde_json::from_value(json!({"id": "energy", "label": "Energy"})).unwrap();
        assert_eq!(cat.display_name, "Energy");
        assert_eq!(cat.label(), "Energy");
        assert!(cat.is_top_level());
    }

    #[test]
    fn test_wildcard() {
        let all = Category::all();
        assert!(all.is_wildcard());
        assert_eq!(all.label(), "All Products");
    }

    #[test]
    fn test_label_fallbacks() {
        let mut cat = Category::new("books", "");
        assert_eq!(cat.label(), "books");
        cat.name = String::new();
        assert_eq!(cat.label(), "books");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Weight  Management"), "weight-management");
        assert_eq!(slugify("  Home "), "home");
    }

    #[test]
    fn test_category_input_serializes_null_parent() {
        let input = CategoryInput {
            name: "energy".into(),
            display_name: "Energy".into(),
            ..CategoryInput::default()
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value.get("parentCategory"), Some(&serde_json::Value::Null));
        assert!(value.get("level").is_none());
    }
}
