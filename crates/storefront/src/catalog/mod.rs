//! Product and category state, and the shopper-facing catalog filter.
//!
//! A [`CatalogStore`] runs in one of two modes:
//!
//! - **server-backed** ([`CatalogStore::new`]): contents are replaced wholesale
//!   from upstream responses and never persisted locally.
//! - **local** ([`CatalogStore::load_local`]): contents live in the key-value
//!   store and are edited through the admin operations. An empty or
//!   unreadable store is seeded with the built-in catalog.
//!
//! Either way the wildcard category is always present and listed first.

mod seed;

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use shapeshift_core::{Category, CategoryId, Product, ProductId, ProductInput, ProductPatch};

pub use seed::{default_categories, default_products};

use crate::storage::{KeyValueStore, keys, load_json, save_json};

/// Errors from catalog administration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The wildcard category cannot be removed.
    #[error("the \"all\" category cannot be deleted")]
    WildcardCategory,
}

/// Whether `product` passes the shopper filter.
///
/// The search term matches, case-insensitively, as a substring of the name,
/// description, brand or any tag; an empty term matches everything. The
/// category matches when it is the product's own or the wildcard.
#[must_use]
pub fn matches(product: &Product, search: &str, category: &CategoryId) -> bool {
    let category_ok = category.is_all() || &product.category == category;
    category_ok && matches_search(product, search)
}

fn matches_search(product: &Product, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&product.name)
        || hit(&product.description)
        || product.brand.as_deref().is_some_and(hit)
        || product.tags.iter().any(|tag| hit(tag))
}

/// Products and categories.
pub struct CatalogStore {
    products: IndexMap<ProductId, Product>,
    categories: IndexMap<CategoryId, Category>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("products", &self.products.len())
            .field("categories", &self.categories.len())
            .field("local", &self.store.is_some())
            .finish()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// An empty server-backed catalog holding only the wildcard category.
    #[must_use]
    pub fn new() -> Self {
        let mut catalog = Self {
            products: IndexMap::new(),
            categories: IndexMap::new(),
            store: None,
        };
        catalog.replace_categories(Vec::new());
        catalog
    }

    /// A locally persisted catalog, seeded with the built-in data when the
    /// store has nothing usable.
    pub fn load_local(store: Arc<dyn KeyValueStore>) -> Self {
        let products: Vec<Product> = load_json(store.as_ref(), keys::PRODUCTS)
            .unwrap_or_else(|| default_products(Utc::now()));
        let categories: Vec<Category> =
            load_json(store.as_ref(), keys::CATEGORIES).unwrap_or_else(default_categories);

        let mut catalog = Self::new();
        catalog.replace_products(products);
        catalog.replace_categories(categories);
        catalog.store = Some(store);
        catalog.persist_products();
        catalog.persist_categories();
        catalog
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All products, active or not.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Products with `is_active` set.
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.values().filter(|p| p.is_active)
    }

    /// Active products passing [`matches`].
    #[must_use]
    pub fn filter(&self, search: &str, category: &CategoryId) -> Vec<&Product> {
        self.active_products()
            .filter(|p| matches(p, search, category))
            .collect()
    }

    /// All categories, wildcard first.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Categories for the top row of the filter, wildcard first.
    #[must_use]
    pub fn top_level_categories(&self) -> Vec<&Category> {
        self.categories
            .values()
            .filter(|c| c.is_active && c.is_top_level())
            .collect()
    }

    /// Direct children of `id`: its embedded subcategories, or failing that
    /// the categories naming it as parent.
    #[must_use]
    pub fn subcategories(&self, id: &CategoryId) -> Vec<&Category> {
        if let Some(parent) = self.categories.get(id)
            && parent.has_children()
        {
            return parent.subcategories.iter().filter(|c| c.is_active).collect();
        }
        self.categories
            .values()
            .filter(|c| c.is_active && c.parent_category.as_ref() == Some(id))
            .collect()
    }

    // =========================================================================
    // Upstream refresh
    // =========================================================================

    /// Replace every product. Later duplicates of an id win.
    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        self.persist_products();
    }

    /// Replace every category, keeping the wildcard first.
    pub fn replace_categories(&mut self, categories: Vec<Category>) {
        let mut map = IndexMap::with_capacity(categories.len() + 1);
        let all = Category::all();
        map.insert(all.id.clone(), all);
        for category in categories.into_iter().filter(|c| !c.is_wildcard()) {
            map.insert(category.id.clone(), category);
        }
        self.categories = map;
        self.persist_categories();
    }

    // =========================================================================
    // Local administration
    // =========================================================================

    /// Add a product with a generated `prod-<unix-millis>` id.
    pub fn add_product(&mut self, input: ProductInput) -> Product {
        let now = Utc::now();
        let mut millis = now.timestamp_millis();
        let id = loop {
            let candidate = ProductId::new(format!("prod-{millis}"));
            if !self.products.contains_key(&candidate) {
                break candidate;
            }
            millis += 1;
        };

        let product = input.into_product(id.clone(), now);
        tracing::info!(product_id = %id, "Added product");
        self.products.insert(id, product.clone());
        self.persist_products();
        product
    }

    /// Apply `patch` to a product and bump its `updated_at`.
    ///
    /// Returns `None` when no product has that id.
    pub fn update_product(&mut self, id: &ProductId, patch: ProductPatch) -> Option<&Product> {
        let product = self.products.get_mut(id)?;
        product.apply(patch);
        product.updated_at = Some(Utc::now());
        self.persist_products();
        self.products.get(id)
    }

    /// Remove a product. Returns whether it existed.
    pub fn delete_product(&mut self, id: &ProductId) -> bool {
        let removed = self.products.shift_remove(id).is_some();
        if removed {
            self.persist_products();
        }
        removed
    }

    /// Append a category. An id that already exists is ignored and `false`
    /// returned.
    pub fn add_category(&mut self, category: Category) -> bool {
        if self.categories.contains_key(&category.id) {
            return false;
        }
        self.categories.insert(category.id.clone(), category);
        self.persist_categories();
        true
    }

    /// Remove a category. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::WildcardCategory`] for the wildcard.
    pub fn delete_category(&mut self, id: &CategoryId) -> Result<bool, CatalogError> {
        if id.is_all() {
            return Err(CatalogError::WildcardCategory);
        }
        let removed = self.categories.shift_remove(id).is_some();
        if removed {
            self.persist_categories();
        }
        Ok(removed)
    }

    fn persist_products(&self) {
        if let Some(store) = &self.store {
            let list: Vec<&Product> = self.products.values().collect();
            save_json(store.as_ref(), keys::PRODUCTS, &list);
        }
    }

    fn persist_categories(&self) {
        if let Some(store) = &self.store {
            let list: Vec<&Category> = self.categories.values().collect();
            save_json(store.as_ref(), keys::CATEGORIES, &list);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use shapeshift_core::Price;

    use super::*;
    use crate::storage::MemoryStore;

    fn product(value: serde_json::Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    fn sale_item() -> Product {
        product(json!({
            "id": "p1",
            "name": "Shaker",
            "description": "Leak-proof bottle",
            "price": 299,
            "category": "sports",
            "brand": "ShapeShift",
            "tags": ["sale"]
        }))
    }

    #[test]
    fn test_tag_match_with_wildcard_category() {
        let p = sale_item();
        assert!(matches(&p, "sal", &CategoryId::all()));
        assert!(!matches(&p, "sal", &CategoryId::from("protein")));
        assert!(matches(&p, "sal", &CategoryId::from("sports")));
    }

    #[test]
    fn test_search_fields_are_case_insensitive() {
        let p = sale_item();
        let all = CategoryId::all();
        assert!(matches(&p, "SHAKER", &all));
        assert!(matches(&p, "leak", &all));
        assert!(matches(&p, "shapeshift", &all));
        assert!(!matches(&p, "whey", &all));
    }

    #[test]
    fn test_empty_search_matches_everything() {
        assert!(matches(&sale_item(), "", &CategoryId::all()));
    }

    #[test]
    fn test_filter_skips_inactive() {
        let mut catalog = CatalogStore::new();
        let mut hidden = sale_item();
        hidden.id = "p2".into();
        hidden.is_active = false;
        catalog.replace_products(vec![sale_item(), hidden]);

        let found = catalog.filter("", &CategoryId::all());
        assert_eq!(found.len(), 1);
        assert_eq!(catalog.products().count(), 2);
    }

    #[test]
    fn test_wildcard_always_first_and_undeletable() {
        let mut catalog = CatalogStore::new();
        catalog.replace_categories(vec![
            Category::new("protein", "Protein"),
            Category::new("all", "Everything"),
        ]);

        let ids: Vec<_> = catalog.categories().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["all", "protein"]);
        assert_eq!(catalog.categories().next().unwrap().label(), "All Products");

        assert_eq!(
            catalog.delete_category(&CategoryId::all()),
            Err(CatalogError::WildcardCategory)
        );
        assert_eq!(catalog.delete_category(&"protein".into()), Ok(true));
        assert_eq!(catalog.delete_category(&"protein".into()), Ok(false));
    }

    #[test]
    fn test_add_category_ignores_duplicates() {
        let mut catalog = CatalogStore::new();
        assert!(catalog.add_category(Category::new("energy", "Energy")));
        assert!(!catalog.add_category(Category::new("energy", "Renamed")));
        assert_eq!(
            catalog.category(&"energy".into()).unwrap().display_name,
            "Energy"
        );
    }

    #[test]
    fn test_local_catalog_seeds_defaults() {
        let store = Arc::new(MemoryStore::new());
        let catalog = CatalogStore::load_local(store.clone());

        assert_eq!(catalog.products().count(), 3);
        assert_eq!(catalog.categories().count(), 17);
        let whey = catalog.product(&"clean-whey-mango".into()).unwrap();
        assert_eq!(whey.price, Price::from_units(6229));
        assert_eq!(whey.variant_label(), "Mango Twist");

        // Seeds were written back, so a second load sees the same data.
        assert!(store.get(keys::PRODUCTS).is_some());
        assert_eq!(CatalogStore::load_local(store).products().count(), 3);
    }

    #[test]
    fn test_local_admin_operations_persist() {
        let store = Arc::new(MemoryStore::new());
        let mut catalog = CatalogStore::load_local(store.clone());

        let input: ProductInput = serde_json::from_value(json!({
            "name": "Creatine",
            "mrp": 999,
            "price": 899,
            "category": "recovery"
        }))
        .unwrap();
        let id = catalog.add_product(input).id;
        assert!(id.as_str().starts_with("prod-"));

        let updated = catalog
            .update_product(
                &id,
                ProductPatch {
                    is_active: Some(false),
                    ..ProductPatch::default()
                },
            )
            .unwrap();
        assert!(!updated.is_active);
        assert!(updated.updated_at >= updated.created_at);

        assert!(catalog.delete_product(&"uc-cc-cream".into()));
        assert!(catalog.update_product(&"missing".into(), ProductPatch::default()).is_none());

        let reloaded = CatalogStore::load_local(store);
        assert_eq!(reloaded.products().count(), 3);
        assert_eq!(reloaded.active_products().count(), 2);
        assert!(reloaded.product(&"uc-cc-cream".into()).is_none());
    }

    #[test]
    fn test_generated_ids_do_not_collide() {
        let mut catalog = CatalogStore::new();
        let input: ProductInput = serde_json::from_value(json!({
            "name": "X", "mrp": 1, "price": 1, "category": "other"
        }))
        .unwrap();
        let a = catalog.add_product(input.clone()).id;
        let b = catalog.add_product(input).id;
        assert_ne!(a, b);
    }

    #[test]
    fn test_category_tree() {
        let mut catalog = CatalogStore::new();
        let parent: Category = serde_json::from_value(json!({
            "id": "supplements",
            "displayName": "Supplements",
            "subcategories": [
                {"id": "whey", "displayName": "Whey", "parentCategory": "supplements", "level": 1}
            ]
        }))
        .unwrap();
        let orphan_child: Category = serde_json::from_value(json!({
            "id": "vegan", "parentCategory": "protein", "level": 1
        }))
        .unwrap();
        catalog.replace_categories(vec![
            parent,
            Category::new("protein", "Protein"),
            orphan_child,
        ]);

        let top: Vec<_> = catalog
            .top_level_categories()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(top, ["all", "supplements", "protein"]);

        let whey: Vec<_> = catalog
            .subcategories(&"supplements".into())
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(whey, ["whey"]);

        let vegan: Vec<_> = catalog
            .subcategories(&"protein".into())
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(vegan, ["vegan"]);
    }
}
