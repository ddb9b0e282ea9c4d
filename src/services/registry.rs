//! Source registry.

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::services::{HtmlBoardAdapter, SourceAdapter, WorkdayAdapter};

/// Ordered table of source name to adapter.
///
/// Fetch order is registration order, which is configuration order.
#[derive(Default)]
pub struct SourceRegistry {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configured sources.
    ///
    /// With an empty `only`, every enabled source is registered. Otherwise
    /// exactly the named sources are registered (case-insensitive), enabled
    /// or not; a name matching no configured source is an error.
    pub fn from_config(sources: &[SourceConfig], only: &[String]) -> Result<Self> {
        for name in only {
            if !sources.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
                return Err(AppError::config(format!("Unknown source '{name}'")));
            }
        }

        let mut registry = Self::new();
        for source in sources {
            let selected = if only.is_empty() {
                source.enabled
            } else {
                only.iter().any(|name| source.name.eq_ignore_ascii_case(name))
            };
            if selected {
                registry.register(Self::build_adapter(source)?)?;
            }
        }
        Ok(registry)
    }

    /// Add an adapter. Names must be unique.
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) -> Result<()> {
        if self.get(adapter.name()).is_some() {
            return Err(AppError::config(format!(
                "Source '{}' registered twice",
                adapter.name()
            )));
        }
        self.adapters.push(adapter);
        Ok(())
    }

    /// Look up an adapter by source name.
    pub fn get(&self, name: &str) -> Option<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| &**a)
    }

    /// Registered adapters in fetch order.
    pub fn adapters(&self) -> &[Box<dyn SourceAdapter>] {
        &self.adapters
    }

    /// Registered source names in fetch order.
    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    fn build_adapter(source: &SourceConfig) -> Result<Box<dyn SourceAdapter>> {
        match (&source.html, &source.workday) {
            (Some(board), None) => Ok(Box::new(HtmlBoardAdapter::new(
                &source.name,
                board.clone(),
            ))),
            (None, Some(board)) => Ok(Box::new(WorkdayAdapter::new(
                &source.name,
                board.clone(),
            ))),
            _ => Err(AppError::config(format!(
                "Source '{}' must define exactly one of [html] or [workday]",
                source.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_sources;

    #[test]
    fn test_from_config_keeps_order() {
        let registry = SourceRegistry::from_config(&default_sources(), &[]).unwrap();
        assert_eq!(
            registry.names(),
            vec!["Nvidia", "AMD", "Google", "RBC", "TD Bank", "BMO", "Scotiabank", "CIBC"]
        );
    }

    #[test]
    fn test_disabled_sources_skipped() {
        let mut sources = default_sources();
        sources[0].enabled = false;
        let registry = SourceRegistry::from_config(&sources, &[]).unwrap();
        assert_eq!(registry.len(), 7);
        assert!(registry.get("Nvidia").is_none());
    }

    #[test]
    fn test_explicit_selection() {
        let only = vec!["cibc".to_string(), "amd".to_string()];
        let registry = SourceRegistry::from_config(&default_sources(), &only).unwrap();
        assert_eq!(registry.names(), vec!["AMD", "CIBC"]);
    }

    #[test]
    fn test_unknown_source_rejected() {
        let only = vec!["Initech".to_string()];
        assert!(SourceRegistry::from_config(&default_sources(), &only).is_err());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = SourceRegistry::from_config(&default_sources(), &[]).unwrap();
        let source = &default_sources()[1];
        let duplicate = HtmlBoardAdapter::new(&source.name, source.html.clone().unwrap());
        assert!(registry.register(Box::new(duplicate)).is_err());
    }
}
