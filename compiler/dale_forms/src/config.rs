//! Session configuration.

use dale_diagnostic::DiagnosticConfig;

/// Configuration for one compile session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    /// Errors recorded before processing stops (0 = unlimited).
    pub error_limit: usize,
    /// Nested macro expansions allowed before `MacroExpansionTooDeep`.
    pub max_expansion_depth: usize,
    /// Nested `include`s allowed before the innermost one is refused.
    pub max_include_depth: usize,
    /// Report `StructContainsPadding` warnings.
    pub warn_on_padding: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            error_limit: 64,
            max_expansion_depth: 256,
            max_include_depth: 64,
            warn_on_padding: true,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_expansion_depth(mut self, depth: usize) -> Self {
        self.max_expansion_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    #[must_use]
    pub fn with_warn_on_padding(mut self, warn: bool) -> Self {
        self.warn_on_padding = warn;
        self
    }

    /// Queue configuration derived from this session configuration.
    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.error_limit,
            ..DiagnosticConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.error_limit, 64);
        assert_eq!(config.max_expansion_depth, 256);
        assert_eq!(config.max_include_depth, 64);
        assert!(config.warn_on_padding);
    }

    #[test]
    fn builders_chain() {
        let config = SessionConfig::default()
            .with_error_limit(0)
            .with_max_expansion_depth(8)
            .with_max_include_depth(2)
            .with_warn_on_padding(false);
        assert_eq!(config.diagnostic_config().error_limit, 0);
        assert!(config.diagnostic_config().deduplicate);
        assert_eq!(config.max_expansion_depth, 8);
        assert_eq!(config.max_include_depth, 2);
        assert!(!config.warn_on_padding);
    }
}
