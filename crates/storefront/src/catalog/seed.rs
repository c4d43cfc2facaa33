//! Built-in catalog used when no local catalog has been saved yet.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shapeshift_core::{Category, Image, Price, Product, ProductVariant};

/// `(id, label)` of the built-in categories, wildcard first.
const CATEGORIES: [(&str, &str); 17] = [
    ("all", "All Products"),
    ("protein", "Protein"),
    ("energy", "Energy"),
    ("recovery", "Recovery"),
    ("weight-management", "Weight Management"),
    ("skincare", "Skincare"),
    ("makeup", "Makeup"),
    ("electronics", "Electronics"),
    ("clothing", "Clothing"),
    ("food", "Food"),
    ("books", "Books"),
    ("toys", "Toys"),
    ("sports", "Sports"),
    ("home", "Home"),
    ("beauty", "Beauty"),
    ("automotive", "Automotive"),
    ("other", "Other"),
];

pub fn default_categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|(id, label)| Category::new(*id, *label))
        .collect()
}

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    mrp: i64,
    price: i64,
    discount: i64,
    category: &'static str,
    brand: &'static str,
    image: &'static str,
    variant: (&'static str, &'static str, u32, &'static str),
    specs: &'static [(&'static str, &'static str)],
    tags: &'static [&'static str],
}

const PRODUCTS: [Seed; 3] = [
    Seed {
        id: "clean-whey-mango",
        name: "Clean Whey",
        description: "Crafted with premium protein from grass-fed cows. 24g protein, 4.6g BCAAs, 9g EAAs per serving.",
        mrp: 7499,
        price: 6229,
        discount: 17,
        category: "protein",
        brand: "ShapeShift",
        image: "https://images.unsplash.com/photo-1593095948071-474c5cc2989d?w=400&h=400&fit=crop",
        variant: ("Mango Twist", "#FFB347", 50, "CW-MNG-001"),
        specs: &[("weight", "900g"), ("servings", "30")],
        tags: &["bestseller", "protein"],
    },
    Seed {
        id: "uc-hydra-veil-primer",
        name: "Hydra Veil Matte Primer",
        description: "The best base for a flawless, airbrushed look. Smooths skin texture, blurs pores and fine lines.",
        mrp: 850,
        price: 650,
        discount: 24,
        category: "skincare",
        brand: "Urban Color",
        image: "https://images.unsplash.com/photo-1596462502278-27bfdc403348?w=400&h=400&fit=crop",
        variant: ("Universal", "#F5F5DC", 100, "UC-HVP-001"),
        specs: &[("weight", "30ml")],
        tags: &["new", "skincare"],
    },
    Seed {
        id: "uc-cc-cream",
        name: "All-In-One CC Cream SPF 20",
        description: "Color-correcting pigments that balance and brighten your complexion with SPF 20 protection.",
        mrp: 999,
        price: 799,
        discount: 20,
        category: "makeup",
        brand: "Urban Color",
        image: "https://images.unsplash.com/photo-1631214540553-ff44137c6168?w=400&h=400&fit=crop",
        variant: ("Rose", "#FFB6C1", 75, "UC-CC-001"),
        specs: &[("weight", "30g"), ("spf", "20")],
        tags: &["makeup", "spf"],
    },
];

pub fn default_products(now: DateTime<Utc>) -> Vec<Product> {
    PRODUCTS.iter().map(|seed| seed.to_product(now)).collect()
}

impl Seed {
    fn to_product(&self, now: DateTime<Utc>) -> Product {
        let (color, color_code, stock, sku) = self.variant;
        Product {
            id: self.id.into(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            price: Price::from_units(self.price),
            mrp: Price::from_units(self.mrp),
            discount_percent: Decimal::from(self.discount),
            category: self.category.into(),
            brand: Some(self.brand.to_owned()),
            images: vec![Image::from(self.image)],
            variants: vec![ProductVariant {
                color: color.to_owned(),
                color_code: Some(color_code.to_owned()),
                stock,
                images: Vec::new(),
                sku: Some(sku.to_owned()),
                is_available: true,
            }],
            specifications: self
                .specs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<BTreeMap<_, _>>(),
            tags: self.tags.iter().map(|t| (*t).to_owned()).collect(),
            is_active: true,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
