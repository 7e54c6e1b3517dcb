//! Category registry: configured groupings of specs

use crate::registry::{Counter, RegistryError, Tally, UNKNOWN};
use eyre::{Result, WrapErr};
use facet::Facet;
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the synthetic row that counts every spec exactly once.
pub const TOTAL: &str = "Total";

/// One entry of the categories JSON file.
#[derive(Debug, Clone, Default, Facet)]
pub struct CategoryConfig {
    /// Spec prefixes in this category (e.g. `0001-MKTF`)
    #[facet(default)]
    pub specs: Vec<String>,
}

/// Categories JSON: category name to its configuration.
pub type CategoriesConfig = BTreeMap<String, CategoryConfig>;

/// A configured category and its running counters.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub specs: Vec<String>,
    pub tally: Tally,
}

/// Caller-owned category registry.
///
/// A fresh registry is *unset*: every query fails with
/// [`RegistryError::CategoriesNotSet`]. After [`CategoryRegistry::set`] (even
/// with an empty configuration) lookups fall back to the `Unknown` category.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    categories: Option<Vec<Category>>,
}

impl CategoryRegistry {
    /// An unset registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry set from an already-parsed configuration
    pub fn from_config(config: CategoriesConfig) -> Self {
        let mut registry = Self::new();
        registry.set(config);
        registry
    }

    /// Parse a categories JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CategoriesConfig =
            facet_json::from_str(json).wrap_err("Failed to parse categories JSON")?;
        Ok(Self::from_config(config))
    }

    /// Load a categories JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read categories from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse categories from {}", path.display()))
    }

    /// Store the category membership, with zeroed counters.
    ///
    /// Categories are kept in name order with `Unknown` last; an empty
    /// `Unknown` is injected when the configuration lacks one. A configured
    /// category named `Total` is dropped, since the synthetic total row
    /// replaces it.
    pub fn set(&mut self, config: CategoriesConfig) {
        let mut unknown = None;
        let mut categories = Vec::with_capacity(config.len() + 1);

        for (name, entry) in config {
            if name == TOTAL {
                tracing::warn!("Ignoring configured '{}' category", TOTAL);
                continue;
            }
            let category = Category {
                name,
                specs: entry.specs,
                tally: Tally::default(),
            };
            if category.name == UNKNOWN {
                unknown = Some(category);
            } else {
                categories.push(category);
            }
        }

        categories.push(unknown.unwrap_or_else(|| Category {
            name: UNKNOWN.to_string(),
            specs: Vec::new(),
            tally: Tally::default(),
        }));

        self.categories = Some(categories);
    }

    pub fn is_set(&self) -> bool {
        self.categories.is_some()
    }

    fn all(&self) -> Result<&[Category], RegistryError> {
        self.categories
            .as_deref()
            .ok_or(RegistryError::CategoriesNotSet)
    }

    /// Every category whose membership list contains `prefix`, or
    /// `["Unknown"]` when none does.
    pub fn categories_for_spec(&self, prefix: &str) -> Result<Vec<String>, RegistryError> {
        let matching: Vec<String> = self
            .all()?
            .iter()
            .filter(|category| category.specs.iter().any(|spec| spec == prefix))
            .map(|category| category.name.clone())
            .collect();

        if matching.is_empty() {
            Ok(vec![UNKNOWN.to_string()])
        } else {
            Ok(matching)
        }
    }

    /// Increase one counter of a category.
    pub fn increase(
        &mut self,
        category: &str,
        counter: Counter,
        amount: usize,
    ) -> Result<(), RegistryError> {
        let categories = self
            .categories
            .as_mut()
            .ok_or(RegistryError::CategoriesNotSet)?;
        let entry = categories
            .iter_mut()
            .find(|c| c.name == category)
            .ok_or_else(|| RegistryError::UnknownCategory(category.to_string()))?;
        entry.tally.increase(counter, amount);
        Ok(())
    }

    /// Increase the same counter for every category in `names`.
    pub fn increase_all(
        &mut self,
        names: &[String],
        counter: Counter,
        amount: usize,
    ) -> Result<(), RegistryError> {
        for name in names {
            self.increase(name, counter, amount)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.as_ref()?.iter().find(|c| c.name == name)
    }

    /// Categories in report order (name order, `Unknown` last)
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.categories.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset_counters(&mut self) {
        for category in self.categories.iter_mut().flatten() {
            category.tally = Tally::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markets_and_governance() -> CategoryRegistry {
        CategoryRegistry::from_json(
            r#"{
                "Markets": { "specs": ["0001-MKTF", "0002-STTL"] },
                "Governance": { "specs": ["0028-GOVE", "0002-STTL"] }
            }"#,
        )
        .expect("valid categories")
    }

    #[test]
    fn unset_registry_errors() {
        let registry = CategoryRegistry::new();
        assert_eq!(
            registry.categories_for_spec("0001-MKTF"),
            Err(RegistryError::CategoriesNotSet)
        );
        let mut registry = registry;
        assert_eq!(
            registry.increase("Markets", Counter::Codes, 1),
            Err(RegistryError::CategoriesNotSet)
        );
    }

    #[test]
    fn empty_registry_falls_back_to_unknown() {
        let registry = CategoryRegistry::from_json("{}").unwrap();
        assert!(registry.is_set());
        assert_eq!(
            registry.categories_for_spec("0001-MKTF").unwrap(),
            vec![UNKNOWN.to_string()]
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn spec_in_several_categories() {
        let registry = markets_and_governance();
        assert_eq!(
            registry.categories_for_spec("0002-STTL").unwrap(),
            vec!["Governance".to_string(), "Markets".to_string()]
        );
        assert_eq!(
            registry.categories_for_spec("0001-MKTF").unwrap(),
            vec!["Markets".to_string()]
        );
        assert_eq!(
            registry.categories_for_spec("0099-NONE").unwrap(),
            vec![UNKNOWN.to_string()]
        );
    }

    #[test]
    fn unknown_is_last_and_not_duplicated() {
        let registry = CategoryRegistry::from_json(
            r#"{ "Unknown": { "specs": [] }, "Alpha": { "specs": ["0001-AAAA"] } }"#,
        )
        .unwrap();
        let names: Vec<&str> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", UNKNOWN]);
    }

    #[test]
    fn configured_total_is_dropped() {
        let registry = CategoryRegistry::from_json(
            r#"{ "Total": { "specs": ["0001-AAAA"] }, "Alpha": { "specs": ["0001-AAAA"] } }"#,
        )
        .unwrap();
        assert!(registry.get(TOTAL).is_none());
        assert_eq!(
            registry.categories_for_spec("0001-AAAA").unwrap(),
            vec!["Alpha".to_string()]
        );
    }

    #[test]
    fn counters_accumulate_per_category() {
        let mut registry = markets_and_governance();
        registry
            .increase_all(
                &["Markets".to_string(), "Governance".to_string()],
                Counter::Codes,
                3,
            )
            .unwrap();
        registry.increase("Markets", Counter::Codes, 2).unwrap();
        assert_eq!(registry.get("Markets").unwrap().tally.get(Counter::Codes), 5);
        assert_eq!(
            registry.get("Governance").unwrap().tally.get(Counter::Codes),
            3
        );
        assert_eq!(
            registry.increase("Nope", Counter::Codes, 1),
            Err(RegistryError::UnknownCategory("Nope".to_string()))
        );

        registry.reset_counters();
        assert!(!registry.get("Markets").unwrap().tally.is_touched(Counter::Codes));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CategoryRegistry::from_json("{ not json").is_err());
    }
}
