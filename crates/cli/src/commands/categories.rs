//! Category commands.
//!
//! # Usage
//!
//! ```bash
//! shapeshift-cli categories list
//! shapeshift-cli categories show protein
//! shapeshift-cli categories create "Pre Workout" --parent supplements
//! shapeshift-cli categories delete pre-workout
//! ```

use shapeshift_core::{CategoryId, CategoryInput, slugify};
use shapeshift_storefront::catalog::CatalogError;
use tracing::info;

use super::{CliError, client};
use crate::output;

/// List categories with their children.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn list(json: bool) -> Result<(), CliError> {
    let categories = client()?.list_categories().await?;
    if json {
        return output::json(&categories);
    }
    for category in &categories {
        for row in output::category_rows(category) {
            output::line(&row);
        }
    }
    Ok(())
}

/// Show one category as JSON.
///
/// # Errors
///
/// Returns an error if the category does not exist or the request fails.
pub async fn show(id: &str) -> Result<(), CliError> {
    let category = client()?.get_category(&CategoryId::from(id)).await?;
    output::json(&category)
}

/// Build the payload for a new category named `display_name`.
///
/// # Errors
///
/// Returns an error for a blank name or one that slugs to the wildcard.
fn new_category(
    display_name: &str,
    parent: Option<&str>,
    description: Option<String>,
) -> Result<CategoryInput, CliError> {
    let name = slugify(display_name);
    if name.is_empty() {
        return Err(CliError::Invalid("category name is required".to_string()));
    }
    if name == CategoryId::ALL {
        return Err(CliError::Invalid(format!("\"{name}\" is reserved")));
    }

    Ok(CategoryInput {
        name,
        display_name: display_name.trim().to_owned(),
        description,
        parent_category: parent.map(CategoryId::from),
        level: Some(u32::from(parent.is_some())),
        is_active: Some(true),
        ..CategoryInput::default()
    })
}

/// Create a category.
///
/// # Errors
///
/// Returns an error for an invalid name or if the API rejects the category.
pub async fn create(
    display_name: &str,
    parent: Option<&str>,
    description: Option<String>,
) -> Result<(), CliError> {
    let input = new_category(display_name, parent, description)?;
    let category = client()?.create_category(&input).await?;
    info!(id = %category.id, name = %category.label(), "Category created");
    output::line(category.id.as_str());
    Ok(())
}

/// Delete a category. The wildcard cannot be deleted.
///
/// # Errors
///
/// Returns an error for the wildcard or if the request fails.
pub async fn delete(id: &str) -> Result<(), CliError> {
    let id = CategoryId::from(id);
    if id.is_all() {
        return Err(CliError::Invalid(CatalogError::WildcardCategory.to_string()));
    }
    client()?.delete_category(&id).await?;
    info!(id = %id, "Category deleted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category_slugs_name() {
        let input = new_category(" Pre  Workout ", Some("supplements"), None).unwrap();
        assert_eq!(input.name, "pre-workout");
        assert_eq!(input.display_name, "Pre  Workout");
        assert_eq!(input.parent_category, Some(CategoryId::from("supplements")));
        assert_eq!(input.level, Some(1));
    }

    #[test]
    fn test_new_category_rejects_blank_and_wildcard() {
        assert!(matches!(new_category("   ", None, None), Err(CliError::Invalid(_))));
        assert!(matches!(new_category("All", None, None), Err(CliError::Invalid(_))));
    }
}
