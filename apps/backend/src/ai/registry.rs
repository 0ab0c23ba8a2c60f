//! Statically registered decision providers.
//!
//! Providers that need external configuration (the LLM provider) are built
//! from config instead, see [`crate::ai::provider_for`].

use std::sync::Arc;

use crate::ai::{DecisionProvider, RandomProvider, ScriptedProvider};

pub struct ProviderFactory {
    pub name: &'static str,
    pub version: &'static str,
    pub make: fn(seed: Option<u64>) -> Arc<dyn DecisionProvider>,
}

static PROVIDER_FACTORIES: &[ProviderFactory] = &[
    ProviderFactory {
        name: RandomProvider::NAME,
        version: RandomProvider::VERSION,
        make: make_random,
    },
    ProviderFactory {
        name: ScriptedProvider::NAME,
        version: ScriptedProvider::VERSION,
        make: make_scripted,
    },
];

pub fn registered_providers() -> &'static [ProviderFactory] {
    PROVIDER_FACTORIES
}

pub fn by_name(name: &str) -> Option<&'static ProviderFactory> {
    registered_providers()
        .iter()
        .find(|factory| factory.name.eq_ignore_ascii_case(name))
}

fn make_random(seed: Option<u64>) -> Arc<dyn DecisionProvider> {
    Arc::new(RandomProvider::new(seed))
}

/// An empty script: every decision falls through to the controller's fallback.
fn make_scripted(_seed: Option<u64>) -> Arc<dyn DecisionProvider> {
    Arc::new(ScriptedProvider::new())
}

#[cfg(test)]
mod provider_registry_smoke {
    use super::*;

    #[test]
    fn enumerates_registered_providers() {
        let names: Vec<_> = registered_providers().iter().map(|f| f.name).collect();
        assert!(names.contains(&RandomProvider::NAME));
        assert!(names.contains(&ScriptedProvider::NAME));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let factory = by_name("RANDOM").expect("random provider is registered");
        let provider = (factory.make)(Some(5));
        assert_eq!(provider.name(), RandomProvider::NAME);
        assert!(by_name("NotARealProvider").is_none());
    }
}
