pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str, resolve_base_url};
pub use schema::{
    ClientConfig, API_KEY_ENV, CREDBUZZ_API_URL_ENV, DEFAULT_BASE_URL, TRENDSAGE_API_URL_ENV,
};
