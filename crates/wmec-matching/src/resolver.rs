// ABOUTME: Mapping Resolver (C4) - layered, short-circuiting exercise name resolution
// ABOUTME: User override -> crowd popularity -> curated rules -> fuzzy -> canonical -> fallback

use crate::canonical::classify_canonical;
use crate::catalog::CatalogStore;
use crate::fuzzy;
use crate::normalize::normalize_name;
use async_trait::async_trait;
use wmec_core::domain::{MappingResolution, Provenance};
use wmec_core::WmecResult;

/// Confidence floor below which a fallback resolution is considered unmapped (§4.4, §4.12).
pub const FALLBACK_CONFIDENCE_FLOOR: f64 = 0.40;

/// Read access to a caller's saved exercise-name overrides (§3: User Mapping).
#[async_trait]
pub trait UserMappingLookup: Send + Sync {
    /// Return the caller's saved catalog display name for `normalized_name`, if any.
    async fn get_user_mapping(&self, normalized_name: &str) -> WmecResult<Option<String>>;
}

/// Read access to the crowd-popularity table (§3: Popularity Counter).
#[async_trait]
pub trait PopularityLookup: Send + Sync {
    /// Return the single most popular `(catalog display name, count)` for
    /// `normalized_name`, if any mapping has ever been recorded.
    async fn most_popular(&self, normalized_name: &str) -> WmecResult<Option<(String, u32)>>;
}

/// A curated exact/substring rule consulted before fuzzy matching (§4.4 step 3).
#[derive(Debug, Clone)]
pub struct CuratedRule {
    /// Match kind: exact normalized-name match, or substring.
    pub pattern: String,
    /// The catalog display name this rule resolves to.
    pub target: String,
}

/// Resolve an exercise name through the layered pipeline (C4).
pub struct MappingResolver<'a> {
    catalog: &'a CatalogStore,
    curated_rules: &'a [CuratedRule],
}

impl<'a> MappingResolver<'a> {
    /// Build a resolver over a catalog and an ordered (longest/most-specific-first) curated rule list.
    #[must_use]
    pub fn new(catalog: &'a CatalogStore, curated_rules: &'a [CuratedRule]) -> Self {
        Self {
            catalog,
            curated_rules,
        }
    }

    /// Resolve `raw_name`, consulting `user_mappings` and `popularity` for the
    /// first two layers (§4.4). Always returns a resolution — the final layer
    /// never fails, only falls back with low confidence.
    pub async fn resolve(
        &self,
        raw_name: &str,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
    ) -> WmecResult<MappingResolution> {
        let normalized = normalize_name(raw_name);

        // 1. User override.
        if let Some(display_name) = user_mappings.get_user_mapping(&normalized).await? {
            return Ok(self.finish(raw_name, &normalized, display_name, 1.0, Provenance::User, None));
        }

        // 2. Crowd popularity.
        if let Some((display_name, count)) = popularity.most_popular(&normalized).await? {
            let confidence = (0.70 + 0.05 * f64::from(count)).min(0.95);
            return Ok(self.finish(
                raw_name,
                &normalized,
                display_name,
                confidence,
                Provenance::Popular,
                Some(count),
            ));
        }

        // 3. Curated rules: exact match first, then longest substring (rules
        // are supplied ordered longest-first so the first substring hit wins).
        if let Some(rule) = self.curated_rules.iter().find(|r| r.pattern == normalized) {
            return Ok(self.finish(raw_name, &normalized, rule.target.clone(), 1.0, Provenance::Curated, None));
        }
        if let Some(rule) = self
            .curated_rules
            .iter()
            .find(|r| normalized.contains(r.pattern.as_str()))
        {
            return Ok(self.finish(raw_name, &normalized, rule.target.clone(), 0.95, Provenance::Curated, None));
        }

        // 4. Catalog fuzzy match, threshold 0.40.
        if let Some(best) = fuzzy::best_candidate(&normalized, self.catalog.exercise_keys(), 0.40) {
            return Ok(self.finish(
                raw_name,
                &normalized,
                best.candidate,
                best.adjusted_score,
                Provenance::Fuzzy,
                None,
            ));
        }

        // 5. Canonical classifier.
        if let Some(canonical) = classify_canonical(&normalized) {
            return Ok(self.finish(raw_name, &normalized, canonical, 0.75, Provenance::Canonical, None));
        }

        // 6. Fallback: title-case the normalized name.
        let title_cased = title_case(&normalized);
        Ok(self.finish(raw_name, &normalized, title_cased, 0.0, Provenance::Fallback, None))
    }

    fn finish(
        &self,
        raw_name: &str,
        normalized: &str,
        display_name: String,
        confidence: f64,
        provenance: Provenance,
        popularity_count: Option<u32>,
    ) -> MappingResolution {
        let catalog_match = self.catalog.lookup(&display_name);
        let reason = MappingResolution::reason_for(provenance, popularity_count);
        MappingResolution {
            original_name: raw_name.to_owned(),
            normalized_name: normalized.to_owned(),
            display_name,
            category_id: catalog_match.category_id,
            fit_exercise_name_id: catalog_match.fit_exercise_name_id,
            confidence,
            provenance,
            popularity_count,
            reason,
        }
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeUserMappings(HashMap<String, String>);

    #[async_trait]
    impl UserMappingLookup for FakeUserMappings {
        async fn get_user_mapping(&self, normalized_name: &str) -> WmecResult<Option<String>> {
            Ok(self.0.get(normalized_name).cloned())
        }
    }

    struct FakePopularity(Mutex<HashMap<String, (String, u32)>>);

    #[async_trait]
    impl PopularityLookup for FakePopularity {
        async fn most_popular(&self, normalized_name: &str) -> WmecResult<Option<(String, u32)>> {
            Ok(self.0.lock().expect("lock").get(normalized_name).cloned())
        }
    }

    #[tokio::test]
    async fn user_override_short_circuits_everything() {
        let catalog = CatalogStore::embedded_default();
        let rules = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let users = FakeUserMappings(HashMap::from([(
            "push up".to_owned(),
            "My Custom Push Up".to_owned(),
        )]));
        let popularity = FakePopularity(Mutex::new(HashMap::new()));

        let result = resolver.resolve("Push Up", &users, &popularity).await.expect("resolves");
        assert_eq!(result.provenance, Provenance::User);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.display_name, "My Custom Push Up");
    }

    #[tokio::test]
    async fn popularity_confidence_is_bounded() {
        let catalog = CatalogStore::embedded_default();
        let rules = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let users = FakeUserMappings(HashMap::new());
        let popularity = FakePopularity(Mutex::new(HashMap::from([(
            "goblet squat".to_owned(),
            ("Goblet Squat".to_owned(), 100u32),
        )])));

        let result = resolver
            .resolve("goblet squat", &users, &popularity)
            .await
            .expect("resolves");
        assert_eq!(result.provenance, Provenance::Popular);
        assert!((result.confidence - 0.95).abs() < 1e-9);
        assert_eq!(result.reason, "chosen as popular choice by 100 users");
    }

    #[tokio::test]
    async fn unmatched_name_falls_back_with_zero_confidence() {
        let catalog = CatalogStore::embedded_default();
        let rules = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let users = FakeUserMappings(HashMap::new());
        let popularity = FakePopularity(Mutex::new(HashMap::new()));

        let result = resolver
            .resolve("zzz totally unknown zzz", &users, &popularity)
            .await
            .expect("resolves");
        assert_eq!(result.provenance, Provenance::Fallback);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.display_name, "Zzz Totally Unknown Zzz");
    }
}
