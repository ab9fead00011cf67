use std::collections::HashMap;

use super::profiles::builtin_profiles;
use super::CleaningProfile;
use crate::error::{EtlError, Result};
use crate::types::RecordSet;

/// Registry of cleaning profiles keyed by name
pub struct ProfileRegistry {
    profiles: HashMap<String, CleaningProfile>,
}

impl ProfileRegistry {
    /// Create a registry preloaded with the built-in profiles
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for profile in builtin_profiles() {
            registry.register(profile);
        }
        registry
    }

    pub fn empty() -> Self {
        Self { profiles: HashMap::new() }
    }

    /// Register a profile, replacing any profile with the same name
    pub fn register(&mut self, profile: CleaningProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    pub fn get(&self, name: &str) -> Option<&CleaningProfile> {
        self.profiles.get(name)
    }

    /// Clean a record set with the named profile
    pub fn clean(&self, name: &str, set: RecordSet) -> Result<RecordSet> {
        let profile = self
            .get(name)
            .ok_or_else(|| EtlError::UnknownProfile(name.to_string()))?;
        Ok(profile.apply(set))
    }

    /// All registered profile names, sorted
    pub fn list_profiles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::pipeline::processing::normalize::ColumnRule;

    #[test]
    fn test_registry_has_built_in_profiles() {
        let registry = ProfileRegistry::new();

        let names = registry.list_profiles();
        for expected in [
            USERS_PROFILE,
            CARDS_PROFILE,
            STORES_PROFILE,
            PRODUCTS_PROFILE,
            ORDERS_PROFILE,
            DATE_TIMES_PROFILE,
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_registry_returns_error_for_unknown_profile() {
        let registry = ProfileRegistry::new();
        let result = registry.clean("unknown_source", RecordSet::default());
        assert!(matches!(result, Err(EtlError::UnknownProfile(name)) if name == "unknown_source"));
    }

    #[test]
    fn test_register_overrides_built_in() {
        let mut registry = ProfileRegistry::new();
        registry.register(CleaningProfile::new(
            ORDERS_PROFILE,
            "keep names",
            vec![ColumnRule::drop_columns(&["1"])],
        ));

        let profile = registry.get(ORDERS_PROFILE).unwrap();
        assert_eq!(profile.description, "keep names");
        assert_eq!(profile.rules.len(), 1);
    }
}
