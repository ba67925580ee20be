//! Engine configuration tables
//!
//! The tag sets that steer the post-processing pass are small, explicit
//! tables rather than something inferred from the schema. Their membership
//! changes which elements acquire identifiers, so they live in one place.

/// Default total identifier length (random part, or prefix + separator + random part)
pub const DEFAULT_ID_LENGTH: usize = 7;

/// Configuration shared by every engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Attribute holding element identifiers
    pub id_attribute: String,
    /// Target identifier length handed to the generator
    pub id_length: usize,
    /// Elements left untouched together with their entire subtree
    pub skip_subtree: Vec<String>,
    /// Elements that never receive an id but whose children are still visited
    pub skip_self: Vec<String>,
    /// Elements whose own id becomes the prefix of generated descendant ids
    pub prefix_defining: Vec<String>,
    /// Authorial note element
    pub note_tag: String,
    /// Attribute carrying the authorial note marker
    pub note_marker_attribute: String,
    /// Inline comment marker element
    pub comment_tag: String,
    /// Element whose content the table of contents describes
    pub toc_root_tag: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_attribute: "id".to_string(),
            id_length: DEFAULT_ID_LENGTH,
            skip_subtree: vec!["meta".to_string()],
            skip_self: vec![
                "akomaNtoso".to_string(),
                "bill".to_string(),
                "doc".to_string(),
            ],
            prefix_defining: vec![
                "article".to_string(),
                "citations".to_string(),
                "recitals".to_string(),
            ],
            note_tag: "authorialNote".to_string(),
            note_marker_attribute: "marker".to_string(),
            comment_tag: "popup".to_string(),
            toc_root_tag: "body".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    pub fn with_id_length(mut self, length: usize) -> Self {
        self.id_length = length;
        self
    }

    pub fn with_skip_subtree<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_subtree = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_self<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_self = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_prefix_defining<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_defining = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment_tag(mut self, tag: impl Into<String>) -> Self {
        self.comment_tag = tag.into();
        self
    }

    #[inline]
    pub fn skips_subtree(&self, tag: &str) -> bool {
        self.skip_subtree.iter().any(|t| t == tag)
    }

    #[inline]
    pub fn skips_self(&self, tag: &str) -> bool {
        self.skip_self.iter().any(|t| t == tag)
    }

    #[inline]
    pub fn defines_prefix(&self, tag: &str) -> bool {
        self.prefix_defining.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let config = EngineConfig::default();
        assert!(config.skips_subtree("meta"));
        assert!(config.skips_self("akomaNtoso"));
        assert!(!config.skips_self("article"));
        assert!(config.defines_prefix("article"));
        assert!(config.defines_prefix("recitals"));
        assert!(!config.defines_prefix("paragraph"));
        assert_eq!(config.id_length, DEFAULT_ID_LENGTH);
    }

    #[test]
    fn test_builder_setters() {
        let config = EngineConfig::default()
            .with_id_attribute("xml:id")
            .with_skip_subtree(["meta", "coverPage"])
            .with_prefix_defining(Vec::<String>::new());
        assert_eq!(config.id_attribute, "xml:id");
        assert!(config.skips_subtree("coverPage"));
        assert!(!config.defines_prefix("article"));
    }
}
