//! Name → constructor table for selection strategies

use super::{
    DefaultStrategy, EliminationStrategy, RotationStrategy, SelectionStrategy, StrategyParams,
    TopKStrategy,
};
use crate::core::error::DomainError;
use std::collections::BTreeMap;

/// Builds a fresh strategy instance from its parameters
pub type StrategyConstructor = fn(&StrategyParams) -> Result<Box<dyn SelectionStrategy>, DomainError>;

/// Registered strategies
///
/// [`builtin`](Self::builtin) knows `default`, `top_k`, `elimination` and
/// `rotation`. Custom strategies are added with an explicit
/// [`register`](Self::register) call.
///
/// ```
/// use consortium_domain::{StrategyParams, StrategyRegistry};
///
/// let registry = StrategyRegistry::builtin();
/// let strategy = registry.create("top_k", &StrategyParams::new()).unwrap();
/// assert_eq!(strategy.name(), "top_k");
/// assert!(registry.create("tournament", &StrategyParams::new()).is_err());
/// ```
#[derive(Clone)]
pub struct StrategyRegistry {
    constructors: BTreeMap<String, StrategyConstructor>,
}

impl StrategyRegistry {
    /// A registry with no strategies
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register(DefaultStrategy::NAME, build_default)
            .register(TopKStrategy::NAME, build_top_k)
            .register(EliminationStrategy::NAME, build_elimination)
            .register(RotationStrategy::NAME, build_rotation);
        registry
    }

    /// Add or replace a strategy under `name`
    pub fn register(&mut self, name: &str, constructor: StrategyConstructor) -> &mut Self {
        self.constructors.insert(normalize(name), constructor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&normalize(name))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Build a new instance of the named strategy.
    ///
    /// Unknown names and invalid parameters are configuration errors.
    pub fn create(
        &self,
        name: &str,
        params: &StrategyParams,
    ) -> Result<Box<dyn SelectionStrategy>, DomainError> {
        let constructor =
            self.constructors
                .get(&normalize(name))
                .ok_or_else(|| DomainError::UnknownStrategy {
                    name: name.to_string(),
                    available: self.names().join(", "),
                })?;
        constructor(params)
    }

    /// Check that `name` exists and accepts `params`
    pub fn validate(&self, name: &str, params: &StrategyParams) -> Result<(), DomainError> {
        self.create(name, params).map(|_| ())
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn build_default(_: &StrategyParams) -> Result<Box<dyn SelectionStrategy>, DomainError> {
    Ok(Box::new(DefaultStrategy))
}

fn build_top_k(params: &StrategyParams) -> Result<Box<dyn SelectionStrategy>, DomainError> {
    Ok(Box::new(TopKStrategy::from_params(params)?))
}

fn build_elimination(params: &StrategyParams) -> Result<Box<dyn SelectionStrategy>, DomainError> {
    Ok(Box::new(EliminationStrategy::from_params(params)?))
}

fn build_rotation(params: &StrategyParams) -> Result<Box<dyn SelectionStrategy>, DomainError> {
    Ok(Box::new(RotationStrategy::from_params(params)?))
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consortium::history::IterationRecord;
    use crate::consortium::response::ParsedResponse;
    use crate::core::agent::AgentPanel;

    struct SilentStrategy;

    impl SelectionStrategy for SilentStrategy {
        fn name(&self) -> &str {
            "silent"
        }
        fn initialize_state(&mut self) {}
        fn select_models(&mut self, _: &AgentPanel, _: &str, _: usize) -> AgentPanel {
            AgentPanel::new()
        }
        fn process_responses(&mut self, _: Vec<ParsedResponse>, _: usize) -> Vec<ParsedResponse> {
            Vec::new()
        }
        fn update_state(&mut self, _: &IterationRecord) {}
    }

    fn build_silent(_: &StrategyParams) -> Result<Box<dyn SelectionStrategy>, DomainError> {
        Ok(Box::new(SilentStrategy))
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            StrategyRegistry::builtin().names(),
            vec!["default", "elimination", "rotation", "top_k"]
        );
    }

    #[test]
    fn test_create_normalizes_name() {
        let registry = StrategyRegistry::builtin();
        assert_eq!(
            registry.create("Top-K", &StrategyParams::new()).unwrap().name(),
            "top_k"
        );
    }

    #[test]
    fn test_unknown_strategy() {
        let err = StrategyRegistry::builtin()
            .create("tournament", &StrategyParams::new())
            .err()
            .unwrap();
        assert_eq!(
            err,
            DomainError::UnknownStrategy {
                name: "tournament".to_string(),
                available: "default, elimination, rotation, top_k".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_params_surface() {
        let params = StrategyParams::new().with("k", "many");
        let err = StrategyRegistry::builtin().validate("top_k", &params).unwrap_err();
        assert!(err.is_strategy_error());
    }

    #[test]
    fn test_register_custom() {
        let mut registry = StrategyRegistry::builtin();
        registry.register("silent", build_silent);
        assert!(registry.contains("silent"));
        assert_eq!(
            registry.create("silent", &StrategyParams::new()).unwrap().name(),
            "silent"
        );
    }
}
