//! Test utilities
//!
//! Fixture helpers shared by several test modules.
#![cfg(test)]

use crate::config::{
    ConfigRoutes,
    ConfigTranslations,
};

/// Builds translation config from JSON
///
/// # Arguments
/// * `value` - JSON shaped `{ namespace: { locale: tree } }`
#[allow(clippy::unwrap_used)]
pub(crate) fn translations(value: serde_json::Value) -> ConfigTranslations {
    serde_json::from_value(value).unwrap()
}

/// Builds segment config from JSON
///
/// # Arguments
/// * `value` - JSON shaped `{ locale: { segment: translated } }`
#[allow(clippy::unwrap_used)]
pub(crate) fn routes(value: serde_json::Value) -> ConfigRoutes {
    serde_json::from_value(value).unwrap()
}
