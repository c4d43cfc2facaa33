//! Terminal output.
//!
//! Command results go to stdout so they can be piped; diagnostics go
//! through `tracing` to stderr.

#![allow(clippy::print_stdout)]

use serde::Serialize;
use shapeshift_core::{Category, IndianLocaleFormatter, PriceFormatter, Product};

use crate::commands::CliError;

/// Print `value` as pretty JSON.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one line.
pub fn line(text: &str) {
    println!("{text}");
}

/// One-line product summary: id, name, price, stock, category, status.
#[must_use]
pub fn product_row(product: &Product) -> String {
    let formatter = IndianLocaleFormatter::default();
    format!(
        "{:<28} {:<36} {:>10} {:>6}  {}{}",
        product.id.as_str(),
        product.name,
        formatter.format(product.price),
        product.total_stock(),
        product.category,
        if product.is_active { "" } else { "  (inactive)" },
    )
}

/// One-line category summary, children indented.
#[must_use]
pub fn category_rows(category: &Category) -> Vec<String> {
    let mut rows = vec![format!("{:<28} {}", category.id.as_str(), category.label())];
    rows.extend(
        category
            .subcategories
            .iter()
            .map(|child| format!("  {:<26} {}", child.id.as_str(), child.label())),
    );
    rows
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use shapeshift_core::Category;

    use super::*;

    #[test]
    fn test_category_rows_indent_children() {
        let mut parent = Category::new("supplements", "Supplements");
        parent.subcategories = vec![Category::new("protein", "Protein")];

        let rows = category_rows(&parent);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("supplements"));
        assert!(rows[1].starts_with("  protein"));
        assert!(rows[1].ends_with("Protein"));
    }
}
