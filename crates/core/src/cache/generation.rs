//! Versioned cache generation naming.
//!
//! A generation is one logical snapshot of cached assets, identified by a
//! label of the form `{app}-{kind}-{version}` (for example
//! `app-static-v1.0.0`). Exactly one generation is current for static
//! assets and one for dynamic assets at any time; activation purges every
//! label outside that pair.

use std::fmt;

/// Which of the two live caches a generation denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    /// Precached assets, populated at install time.
    Static,
    /// Runtime-fetched content, populated by the resolver's write-through.
    Dynamic,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Static => "static",
            GenerationKind::Dynamic => "dynamic",
        }
    }
}

/// A versioned, named snapshot of cached entries.
///
/// Generations are superseded wholesale: deploying a new version means new
/// labels, and the next activation deletes every label that is not current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeneration {
    app: String,
    kind: GenerationKind,
    version: String,
}

impl CacheGeneration {
    pub fn new(app: impl Into<String>, kind: GenerationKind, version: impl Into<String>) -> Self {
        Self { app: app.into(), kind, version: version.into() }
    }

    /// The cache name this generation stores entries under.
    pub fn label(&self) -> String {
        format!("{}-{}-{}", self.app, self.kind.as_str(), self.version)
    }

    pub fn kind(&self) -> GenerationKind {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_format() {
        let generation = CacheGeneration::new("app", GenerationKind::Static, "v1.0.0");
        assert_eq!(generation.label(), "app-static-v1.0.0");
    }

    #[test]
    fn test_kinds_produce_distinct_labels() {
        let stat = CacheGeneration::new("app", GenerationKind::Static, "v1.0.0");
        let dynamic = CacheGeneration::new("app", GenerationKind::Dynamic, "v1.0.0");
        assert_ne!(stat.label(), dynamic.label());
    }

    #[test]
    fn test_versions_produce_distinct_labels() {
        let v1 = CacheGeneration::new("app", GenerationKind::Static, "v1.0.0");
        let v2 = CacheGeneration::new("app", GenerationKind::Static, "v1.0.1");
        assert_ne!(v1.label(), v2.label());
    }
}
