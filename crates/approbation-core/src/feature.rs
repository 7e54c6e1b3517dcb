//! Feature registry: configured groupings of acceptance criteria
//!
//! Features map individual ACs, possibly from many specs, into one unit of
//! work tied to a milestone. There is no wildcard matching: every AC is
//! listed by hand in the features JSON file.

use crate::registry::{Counter, RegistryError, Tally, UNKNOWN, find_duplicate_acs};
use eyre::{Result, WrapErr};
use facet::Facet;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Milestone label given to the implicit `Unknown` feature.
pub const UNKNOWN_MILESTONE: &str = "-";

/// One entry of the features JSON file.
#[derive(Debug, Clone, Default, Facet)]
pub struct FeatureConfig {
    /// AC codes in this feature
    #[facet(default)]
    pub acs: Vec<String>,
    /// Milestone the feature is scheduled for
    #[facet(default)]
    pub milestone: String,
}

/// Features JSON: feature name to its configuration.
pub type FeaturesConfig = BTreeMap<String, FeatureConfig>;

/// Why a feature was rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureDefect {
    MissingName,
    NoAcs,
    NoMilestone,
}

impl FeatureDefect {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureDefect::MissingName => "feature has no name",
            FeatureDefect::NoAcs => "feature lists no acceptance criteria",
            FeatureDefect::NoMilestone => "feature has no milestone",
        }
    }
}

impl std::fmt::Display for FeatureDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feature that failed validation and was left out of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFeature {
    pub name: String,
    pub defect: FeatureDefect,
}

/// Check that a feature has a name, at least one AC and a milestone.
pub fn validate_feature(name: &str, feature: &FeatureConfig) -> Result<(), FeatureDefect> {
    if name.is_empty() {
        return Err(FeatureDefect::MissingName);
    }
    if feature.acs.is_empty() {
        return Err(FeatureDefect::NoAcs);
    }
    if feature.milestone.is_empty() {
        return Err(FeatureDefect::NoMilestone);
    }
    Ok(())
}

pub fn is_valid_feature(name: &str, feature: &FeatureConfig) -> bool {
    validate_feature(name, feature).is_ok()
}

/// A configured feature and its running counters.
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub acs: Vec<String>,
    pub milestone: String,
    pub tally: Tally,
    /// ACs of this feature that no test references
    pub uncovered_acs: BTreeSet<String>,
}

impl Feature {
    fn new(name: impl Into<String>, acs: Vec<String>, milestone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            acs,
            milestone: milestone.into(),
            tally: Tally::default(),
            uncovered_acs: BTreeSet::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN
    }
}

/// Problems found with one feature's AC list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureIssues {
    pub feature: String,
    pub milestone: String,
    /// ACs listed more than once
    pub duplicate_acs: Vec<String>,
    /// ACs listed in the feature but declared by no spec
    pub mystery_acs: Vec<String>,
    /// ACs no test references (populated during aggregation)
    pub uncovered_acs: Vec<String>,
}

impl FeatureIssues {
    pub fn is_empty(&self) -> bool {
        self.duplicate_acs.is_empty() && self.mystery_acs.is_empty() && self.uncovered_acs.is_empty()
    }
}

/// Caller-owned feature registry.
///
/// A fresh registry is *unset*; lookups fail with
/// [`RegistryError::FeaturesNotSet`]. Features are optional for a run, so
/// callers check [`FeatureRegistry::is_set`] before aggregating into it.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    features: Option<Vec<Feature>>,
    ac_index: HashMap<String, Vec<usize>>,
    rejected: Vec<RejectedFeature>,
}

impl FeatureRegistry {
    /// An unset registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: FeaturesConfig) -> Self {
        let mut registry = Self::new();
        registry.set(config);
        registry
    }

    /// Parse a features JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FeaturesConfig =
            facet_json::from_str(json).wrap_err("Failed to parse features JSON")?;
        Ok(Self::from_config(config))
    }

    /// Load a features JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read features from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse features from {}", path.display()))
    }

    /// Store the features and build the AC to feature index.
    ///
    /// Malformed features are rejected here and listed by
    /// [`FeatureRegistry::rejected`]; their ACs fall into `Unknown`. An empty
    /// `Unknown` feature is injected last when not configured.
    pub fn set(&mut self, config: FeaturesConfig) -> &[RejectedFeature] {
        let mut features = Vec::with_capacity(config.len() + 1);
        let mut unknown = None;
        self.rejected.clear();
        self.ac_index.clear();

        for (name, entry) in config {
            if name == UNKNOWN {
                unknown = Some(Feature::new(name, entry.acs, entry.milestone));
                continue;
            }
            if let Err(defect) = validate_feature(&name, &entry) {
                tracing::warn!("Rejecting feature '{}': {}", name, defect);
                self.rejected.push(RejectedFeature { name, defect });
                continue;
            }
            features.push(Feature::new(name, entry.acs, entry.milestone));
        }

        features.push(
            unknown.unwrap_or_else(|| Feature::new(UNKNOWN, Vec::new(), UNKNOWN_MILESTONE)),
        );

        for (index, feature) in features.iter().enumerate() {
            for ac in &feature.acs {
                let owners = self.ac_index.entry(ac.clone()).or_default();
                if !owners.contains(&index) {
                    owners.push(index);
                }
            }
        }

        self.features = Some(features);
        &self.rejected
    }

    pub fn is_set(&self) -> bool {
        self.features.is_some()
    }

    /// Features rejected by the last [`FeatureRegistry::set`]
    pub fn rejected(&self) -> &[RejectedFeature] {
        &self.rejected
    }

    fn owners(&self, ac: &str) -> Result<Vec<usize>, RegistryError> {
        let features = self.features.as_ref().ok_or(RegistryError::FeaturesNotSet)?;
        match self.ac_index.get(ac) {
            Some(owners) if !owners.is_empty() => Ok(owners.clone()),
            _ => Ok(features
                .iter()
                .position(Feature::is_unknown)
                .into_iter()
                .collect()),
        }
    }

    /// Every feature listing `ac`, or `["Unknown"]` when none does.
    pub fn features_for_ac(&self, ac: &str) -> Result<Vec<String>, RegistryError> {
        let owners = self.owners(ac)?;
        let features = self.features.as_ref().ok_or(RegistryError::FeaturesNotSet)?;
        Ok(owners
            .into_iter()
            .map(|index| features[index].name.clone())
            .collect())
    }

    /// Increase a counter for every feature owning `ac`.
    pub fn increase_for_ac(
        &mut self,
        ac: &str,
        counter: Counter,
        amount: usize,
    ) -> Result<(), RegistryError> {
        let owners = self.owners(ac)?;
        let features = self.features.as_mut().ok_or(RegistryError::FeaturesNotSet)?;
        for index in owners {
            features[index].tally.increase(counter, amount);
        }
        Ok(())
    }

    /// Count `ac` as uncovered for every feature owning it.
    pub fn record_uncovered(&mut self, ac: &str) -> Result<(), RegistryError> {
        let owners = self.owners(ac)?;
        let features = self.features.as_mut().ok_or(RegistryError::FeaturesNotSet)?;
        for index in owners {
            let feature = &mut features[index];
            feature.tally.increase(Counter::Uncovered, 1);
            feature.uncovered_acs.insert(ac.to_string());
        }
        Ok(())
    }

    /// Increase a counter of a feature by name.
    pub fn increase(
        &mut self,
        feature: &str,
        counter: Counter,
        amount: usize,
    ) -> Result<(), RegistryError> {
        let features = self.features.as_mut().ok_or(RegistryError::FeaturesNotSet)?;
        let entry = features
            .iter_mut()
            .find(|f| f.name == feature)
            .ok_or_else(|| RegistryError::UnknownFeature(feature.to_string()))?;
        entry.tally.increase(counter, amount);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.features.as_ref()?.iter().find(|f| f.name == name)
    }

    /// Features in report order (name order, `Unknown` last)
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().flatten()
    }

    /// Configured features grouped by milestone, milestones in order of first
    /// appearance. `Unknown` is left out.
    pub fn by_milestone(&self) -> Vec<(String, Vec<&Feature>)> {
        let mut groups: Vec<(String, Vec<&Feature>)> = Vec::new();
        for feature in self.iter().filter(|f| !f.is_unknown()) {
            match groups.iter_mut().find(|(m, _)| *m == feature.milestone) {
                Some((_, members)) => members.push(feature),
                None => groups.push((feature.milestone.clone(), vec![feature])),
            }
        }
        groups
    }

    /// Duplicate, mystery and uncovered ACs for every configured feature
    /// that has at least one problem. `declared` holds every AC code found in
    /// the scanned specs.
    pub fn audit(&self, declared: &HashSet<&str>) -> Vec<FeatureIssues> {
        self.iter()
            .filter(|feature| !feature.is_unknown())
            .map(|feature| FeatureIssues {
                feature: feature.name.clone(),
                milestone: feature.milestone.clone(),
                duplicate_acs: find_duplicate_acs(&feature.acs),
                mystery_acs: feature
                    .acs
                    .iter()
                    .filter(|ac| !declared.contains(ac.as_str()))
                    .cloned()
                    .collect(),
                uncovered_acs: feature.uncovered_acs.iter().cloned().collect(),
            })
            .filter(|issues| !issues.is_empty())
            .collect()
    }

    pub fn reset_counters(&mut self) {
        for feature in self.features.iter_mut().flatten() {
            feature.tally = Tally::default();
            feature.uncovered_acs.clear();
        }
    }
}
