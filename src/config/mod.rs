//! Configuration module

mod site;

pub use site::BackendConfig;
pub use site::SiteConfig;
pub use site::{ENV_ADMIN_PASSWORD, ENV_BACKEND_KEY, ENV_BACKEND_URL};
