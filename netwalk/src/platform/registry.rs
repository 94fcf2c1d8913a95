//! Registry of device families, keyed by type tag.

use indexmap::IndexMap;

use super::definition::PlatformDefinition;
use super::vendors;

/// Known device families.
///
/// Registration order matters: it is the "unique type" order used to break
/// detection ties, and later registrations win ties.
#[derive(Debug, Default, Clone)]
pub struct PlatformRegistry {
    platforms: IndexMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self {
            platforms: IndexMap::new(),
        }
    }

    /// Registry holding the built-in families: scs, then scr.
    pub fn builtin() -> Result<Self, regex::Error> {
        let mut registry = Self::new();
        registry.register(vendors::alu_omniswitch::platform()?);
        registry.register(vendors::alu_sar::platform()?);
        Ok(registry)
    }

    /// Register a platform definition, replacing one with the same type tag.
    pub fn register(&mut self, platform: PlatformDefinition) {
        self.platforms.insert(platform.typestring.clone(), platform);
    }

    /// Get a platform by type tag.
    pub fn get(&self, typestring: &str) -> Option<&PlatformDefinition> {
        self.platforms.get(typestring)
    }

    /// Check if a type tag is registered.
    pub fn contains(&self, typestring: &str) -> bool {
        self.platforms.contains_key(typestring)
    }

    /// Type tags in registration order.
    pub fn typestrings(&self) -> impl Iterator<Item = &String> {
        self.platforms.keys()
    }

    /// Platforms in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PlatformDefinition> {
        self.platforms.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = PlatformRegistry::builtin().unwrap();
        let order: Vec<_> = registry.typestrings().cloned().collect();
        assert_eq!(order, vec!["scs", "scr"]);
        assert!(registry.contains("scs"));
        assert!(registry.get("metrocell").is_none());
    }
}
