//! Priced resource catalog.
//!
//! The catalog is reference data: loaded once at start-up, never mutated, and
//! passed by reference to whatever needs prices. The default table is embedded
//! in the binary; a JSON file with the same record layout can replace it.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{CaptureMode, Namespace};
use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("catalog.json");

/// One purchasable product, e.g. `raster:Vert`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCatalogEntry {
    pub key: String,
    pub namespace: Namespace,
    /// Credits per 1,000 m² (or per request, whichever is less), latest capture only.
    pub credits_per_single_survey: f64,
    /// Credits per 1,000 m² across all captures.
    pub credits_per_all_survey_data: f64,
    pub matched_content_type: String,
}

impl ResourceCatalogEntry {
    pub fn unit_cost(&self, mode: CaptureMode) -> f64 {
        match mode {
            CaptureMode::Single => self.credits_per_single_survey,
            CaptureMode::All => self.credits_per_all_survey_data,
        }
    }

    /// Product name after the namespace prefix.
    pub fn product(&self) -> &str {
        self.key.split_once(':').map(|(_, p)| p).unwrap_or(self.key.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    key: String,
    namespace: String,
    credits_per_single_survey: f64,
    credits_per_all_survey_data: f64,
    #[serde(default)]
    matched_content_type: String,
}

/// Immutable, ordered set of catalog entries with lookup by key.
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    entries: Vec<ResourceCatalogEntry>,
    index: HashMap<String, usize>,
}

impl ResourceCatalog {
    /// The catalog shipped with the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawEntry> = serde_json::from_str(text)?;
        let catalog = Self::from_entries(raw.into_iter().map(validate).collect::<Result<Vec<_>, _>>()?)?;
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn from_entries(entries: Vec<ResourceCatalogEntry>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.key.clone(), i).is_some() {
                return Err(CatalogError::DuplicateKey(entry.key.clone()));
            }
            if entry.credits_per_all_survey_data < entry.credits_per_single_survey {
                tracing::warn!(
                    key = %entry.key,
                    single = entry.credits_per_single_survey,
                    all = entry.credits_per_all_survey_data,
                    "all-survey price is below single-survey price"
                );
            }
        }
        Ok(Self { entries, index })
    }

    pub fn get(&self, key: &str) -> Option<&ResourceCatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> &[ResourceCatalogEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Namespaces present in the catalog, in first-seen order.
    pub fn namespaces(&self) -> Vec<Namespace> {
        let mut out = Vec::new();
        for entry in &self.entries {
            if !out.contains(&entry.namespace) {
                out.push(entry.namespace);
            }
        }
        out
    }

    /// Entries in one namespace, in catalog order.
    pub fn entries_in(&self, namespace: Namespace) -> impl Iterator<Item = &ResourceCatalogEntry> {
        self.entries.iter().filter(move |e| e.namespace == namespace)
    }

    /// Selected keys that are not in the catalog.
    pub fn unknown_keys<'a>(&self, keys: &'a [String]) -> Vec<&'a str> {
        keys.iter()
            .map(String::as_str)
            .filter(|k| !self.contains(k))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate(raw: RawEntry) -> Result<ResourceCatalogEntry, CatalogError> {
    let namespace = Namespace::parse(&raw.namespace).ok_or_else(|| CatalogError::UnknownNamespace {
        key: raw.key.clone(),
    })?;
    if Namespace::from_key(&raw.key) != Some(namespace) {
        return Err(CatalogError::NamespaceMismatch {
            key: raw.key,
            namespace: raw.namespace,
        });
    }
    let prices = [raw.credits_per_single_survey, raw.credits_per_all_survey_data];
    if prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(CatalogError::NegativeCredits(raw.key));
    }
    Ok(ResourceCatalogEntry {
        key: raw.key,
        namespace,
        credits_per_single_survey: raw.credits_per_single_survey,
        credits_per_all_survey_data: raw.credits_per_all_survey_data,
        matched_content_type: raw.matched_content_type,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = ResourceCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 27);
        assert_eq!(
            catalog.namespaces(),
            vec![
                Namespace::Raster,
                Namespace::AiPacks,
                Namespace::TrueOrthoAiPacks,
                Namespace::AiImpactAssessment
            ]
        );
        assert_eq!(catalog.entries_in(Namespace::AiPacks).count(), 16);

        let vert = catalog.get("raster:Vert").unwrap();
        assert_eq!(vert.unit_cost(CaptureMode::Single), 10.0);
        assert_eq!(vert.unit_cost(CaptureMode::All), 15.0);
        assert_eq!(vert.matched_content_type, "Vertical");
        assert_eq!(vert.product(), "Vert");
    }

    #[test]
    fn builtin_all_survey_price_is_one_and_a_half_times_single() {
        let catalog = ResourceCatalog::builtin().unwrap();
        for entry in catalog.entries() {
            assert!(
                (entry.credits_per_all_survey_data - 1.5 * entry.credits_per_single_survey).abs() < 1e-9,
                "{}",
                entry.key
            );
        }
    }

    #[test]
    fn unknown_keys_are_reported() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let keys = vec!["raster:Vert".to_string(), "raster:Oblique".to_string()];
        assert_eq!(catalog.unknown_keys(&keys), vec!["raster:Oblique"]);
    }

    #[test]
    fn rejects_inconsistent_records() {
        let mismatch = r#"[{"key":"raster:Vert","namespace":"aiPacks","creditsPerSingleSurvey":1,"creditsPerAllSurveyData":1}]"#;
        assert_matches!(
            ResourceCatalog::from_json_str(mismatch),
            Err(CatalogError::NamespaceMismatch { .. })
        );

        let unknown = r#"[{"key":"vector:roads","namespace":"vector","creditsPerSingleSurvey":1,"creditsPerAllSurveyData":1}]"#;
        assert_matches!(
            ResourceCatalog::from_json_str(unknown),
            Err(CatalogError::UnknownNamespace { .. })
        );

        let negative = r#"[{"key":"raster:Vert","namespace":"raster","creditsPerSingleSurvey":-1,"creditsPerAllSurveyData":1}]"#;
        assert_matches!(
            ResourceCatalog::from_json_str(negative),
            Err(CatalogError::NegativeCredits(_))
        );

        let duplicate = r#"[
            {"key":"raster:Vert","namespace":"raster","creditsPerSingleSurvey":1,"creditsPerAllSurveyData":1},
            {"key":"raster:Vert","namespace":"raster","creditsPerSingleSurvey":2,"creditsPerAllSurveyData":3}
        ]"#;
        assert_matches!(
            ResourceCatalog::from_json_str(duplicate),
            Err(CatalogError::DuplicateKey(k)) if k == "raster:Vert"
        );

        assert_matches!(ResourceCatalog::from_json_str("{}"), Err(CatalogError::Parse(_)));
        assert_matches!(ResourceCatalog::from_json_str("[]"), Err(CatalogError::Empty));
    }
}
