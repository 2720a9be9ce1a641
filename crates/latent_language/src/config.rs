//! Compiler configuration.

/// Settings shared by the lexer, parser, and lowering pass.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Identifier prefixes that always lex as keywords.
    pub privileged_prefixes: Vec<String>,

    /// Maximum expression/statement nesting before the parser gives up.
    pub max_depth: usize,

    /// Tag given to `collapse`/`lazy` when the source names none.
    pub default_tag: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            privileged_prefixes: vec!["ls.".to_string(), "sys.".to_string()],
            max_depth: 128,
            default_tag: "value".to_string(),
        }
    }
}

impl CompilerConfig {
    /// Creates a configuration with a tight nesting limit, for untrusted input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_depth: 64,
            ..Self::default()
        }
    }

    /// Builder method to add a privileged prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.privileged_prefixes.push(prefix.into());
        self
    }

    /// Builder method to set the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder method to set the default collapse tag.
    #[must_use]
    pub fn with_default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = tag.into();
        self
    }

    /// Returns true if `word` starts with a privileged prefix.
    #[must_use]
    pub fn is_privileged(&self, word: &str) -> bool {
        self.privileged_prefixes
            .iter()
            .any(|prefix| word.starts_with(prefix.as_str()))
    }
}
