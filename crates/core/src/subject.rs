//! Subjects: the people whose résumés are indexed.

use serde::{Deserialize, Serialize};

/// A known person about whom documents exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Key into the retrieval collaborator (e.g., "cv-claudio-barril")
    pub namespace_id: String,

    /// Name used to label this subject's context block
    pub display_name: String,

    /// Words that identify a mention (first name, surname, ...)
    pub match_patterns: Vec<String>,
}

impl Subject {
    pub fn new<I, S>(namespace_id: impl Into<String>, display_name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace_id: namespace_id.into(),
            display_name: display_name.into(),
            match_patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Name of the search capability bound to this subject.
    pub fn capability_name(&self) -> String {
        capability_name(&self.namespace_id)
    }
}

/// `search_` followed by `namespace`, with every character that is not an
/// ASCII letter or digit replaced by `_`.
///
/// Derived from the namespace, never the display name: two people may share
/// a first name but never a namespace.
pub fn capability_name(namespace: &str) -> String {
    let slug: String = namespace
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("search_{slug}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_str_patterns() {
        let subject = Subject::new("cv-victoria-teran", "Victoria", ["victoria", "terán"]);
        assert_eq!(subject.match_patterns, vec!["victoria".to_string(), "terán".to_string()]);
    }

    #[test]
    fn capability_name_follows_namespace() {
        let subject = Subject::new("cv-claudio-barril", "Claudio", ["claudio"]);
        assert_eq!(subject.capability_name(), "search_cv_claudio_barril");
        assert_eq!(capability_name("cv-maría.josé"), "search_cv_mar_a_jos_");
    }

    #[test]
    fn shared_display_name_keeps_capabilities_apart() {
        let garcia = Subject::new("cv-ana-garcia", "Ana", ["ana", "garcía"]);
        let lopez = Subject::new("cv-ana-lopez", "Ana", ["ana", "lópez"]);
        assert_ne!(garcia.capability_name(), lopez.capability_name());
    }

    #[test]
    fn deserializes_from_json() {
        let subject: Subject = serde_json::from_value(serde_json::json!({
            "namespace_id": "cv-lara-rosenberg",
            "display_name": "Lara",
            "match_patterns": ["lara", "rosenberg"],
        }))
        .unwrap();
        assert_eq!(subject.display_name, "Lara");
    }
}
