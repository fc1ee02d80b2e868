//! Configuration types and loading
mod loader;
mod types;

pub use loader::{
    CONFIG_FILE_NAME,
    load_from_dir,
};
pub use types::{
    ConfigError,
    ConfigRoutes,
    ConfigTranslations,
    I18nConfig,
    LoadDirective,
    TrailingSlash,
    ValidationError,
};
