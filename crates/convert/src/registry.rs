use std::collections::HashMap;
use std::sync::Arc;

use fragments_core::normalize;

use crate::converter::Converter;
use crate::markdown::MarkdownToHtml;

/// Maps `(source media type, target extension)` to a converter.
///
/// Built once at startup and then shared behind an `Arc`; it is not meant to
/// be mutated concurrently.
pub struct ConversionRegistry {
    converters: HashMap<(String, String), Arc<dyn Converter>>,
}

impl ConversionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Registry holding every built-in conversion.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownToHtml));
        registry
    }

    /// Register a converter under its own source type and extension.
    ///
    /// An existing entry for the same pair is replaced.
    pub fn register(&mut self, converter: Arc<dyn Converter>) {
        let key = (
            normalize(converter.source_type()),
            normalize_extension(converter.extension()),
        );
        self.converters.insert(key, converter);
    }

    /// Look up the converter for a source type and target extension.
    pub fn get(&self, source_type: &str, extension: &str) -> Option<Arc<dyn Converter>> {
        self.converters
            .get(&(normalize(source_type), normalize_extension(extension)))
            .cloned()
    }

    /// Return `true` if any conversion starts from `source_type`.
    pub fn supports_source(&self, source_type: &str) -> bool {
        let source_type = normalize(source_type);
        self.converters.keys().any(|(source, _)| *source == source_type)
    }

    /// Sorted `(source type, extension)` pairs.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .converters
            .keys()
            .map(|(source, ext)| (source.as_str(), ext.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("conversions", &self.list())
            .finish()
    }
}

/// Lower-case an extension and drop one leading `.`.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    trimmed
        .strip_prefix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}
