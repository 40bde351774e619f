//! Sport rule catalog loading.
//!
//! The shipped rule sets are embedded at compile time and parsed once on
//! first access.
//!
//! ## Usage
//!
//! ```rust
//! use ob_core::data::rules::get_sport_rules;
//!
//! let football = get_sport_rules("football").unwrap();
//! assert_eq!(football.points.unwrap().win, 3);
//! ```

use std::sync::OnceLock;

use serde::Deserialize;

use crate::models::SportRuleSet;

/// Sport rule catalog YAML (compile-time embedded)
pub const SPORT_RULES_YAML: &str = include_str!("../../../../data/rules/sport_rules.yaml");

#[derive(Debug, Deserialize)]
struct SportCatalog {
    sports: Vec<SportRuleSet>,
}

static SPORT_RULES: OnceLock<Vec<SportRuleSet>> = OnceLock::new();

/// All shipped sport rule sets.
///
/// # Panics
///
/// Panics if the embedded YAML fails to parse (cannot happen on a normal
/// build since the data is embedded at compile time).
pub fn sport_catalog() -> &'static [SportRuleSet] {
    SPORT_RULES.get_or_init(|| {
        let catalog: SportCatalog =
            serde_yaml::from_str(SPORT_RULES_YAML).expect("Failed to parse sport_rules.yaml");
        catalog.sports
    })
}

/// Look up a rule set by sport code.
pub fn get_sport_rules(code: &str) -> Option<&'static SportRuleSet> {
    sport_catalog().iter().find(|s| s.code == code)
}
