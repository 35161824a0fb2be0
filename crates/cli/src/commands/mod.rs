//! CLI command implementations.

pub mod seed;
pub mod stats;

use antenka_store::{RestStore, RestStoreConfig};
use secrecy::SecretString;

/// Build a document API client from environment variables.
///
/// # Errors
///
/// Returns an error if any of the `DOC_API_*` variables is missing.
pub fn store_from_env() -> Result<RestStore, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("DOC_API_URL").map_err(|_| "DOC_API_URL not set")?;
    let project_id = std::env::var("DOC_API_PROJECT").map_err(|_| "DOC_API_PROJECT not set")?;
    let api_key = std::env::var("DOC_API_KEY")
        .map(SecretString::from)
        .map_err(|_| "DOC_API_KEY not set")?;

    Ok(RestStore::new(&RestStoreConfig {
        base_url,
        project_id,
        api_key,
    }))
}
