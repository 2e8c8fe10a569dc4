//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - product_name: USB-C cable
//!     price: 100
//!     rating: 4
//!     image: https://cdn.example.com/cable.png
//! ```
//!
//! Every entry is validated before the database is touched; one bad entry
//! aborts the whole run.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, info};

use ecom_cart_core::{NewProduct, ProductError};
use ecom_cart_server::db::{self, PgStore};
use ecom_cart_server::services::CatalogService;

/// Deadline for each insert.
const INSERT_TIMEOUT: Duration = Duration::from_secs(10);

/// Top-level layout of a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<NewProduct>,
}

/// Check every entry, returning one message per invalid product.
fn validate(catalog: &CatalogFile) -> Vec<String> {
    catalog
        .products
        .iter()
        .enumerate()
        .filter_map(|(index, product)| {
            product
                .clone()
                .into_product()
                .err()
                .map(|e: ProductError| {
                    format!("products[{index}] ({:?}): {e}", product.product_name)
                })
        })
        .collect()
}

/// Insert products from a YAML catalog file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `dry_run` - Parse and validate only
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the file cannot be read or
/// parsed, any entry is invalid, or an insert fails.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;
    info!(products = catalog.products.len(), "Parsed catalog");

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }
    info!("Catalog validated successfully");

    if dry_run {
        info!("Dry run, nothing inserted");
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let store = PgStore::new(pool);
    let catalog_service = CatalogService::new(&store, INSERT_TIMEOUT);

    let mut inserted = 0_usize;
    for product in catalog.products {
        let product = catalog_service.add_product(product).await?;
        info!(
            product_id = %product.product_id,
            name = %product.product_name,
            price = %product.price,
            "Inserted"
        );
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    Ok(())
}
