//! Subject resolution: which résumé(s) is a question about?
//!
//! Input and patterns are both normalized (lowercase, canonical decomposition
//! with combining marks dropped), so "Terán", "TERAN" and "teran" are the same
//! word. Patterns only match whole words: "lara" never matches inside "clara".
//!
//! When nothing matches, the question goes to the configured default subject.

use cvagent_core::error::{Error, Result};
use cvagent_core::subject::Subject;
use regex_lite::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercase `text` and strip diacritics.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

struct CompiledSubject {
    subject: Subject,
    pattern: Regex,
}

/// Maps free text to the subjects it mentions.
pub struct SubjectResolver {
    subjects: Vec<CompiledSubject>,
    default_index: usize,
}

impl SubjectResolver {
    /// Compile the patterns of every subject.
    ///
    /// Fails when a subject has no usable pattern, two subjects share a
    /// namespace or a capability name, or `default_subject` names no
    /// configured subject.
    pub fn new(subjects: Vec<Subject>, default_subject: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut capabilities = HashSet::new();
        let mut compiled = Vec::with_capacity(subjects.len());

        for subject in subjects {
            if !seen.insert(subject.namespace_id.clone()) {
                return Err(Error::config(format!(
                    "duplicate subject namespace '{}'",
                    subject.namespace_id
                )));
            }
            let capability = subject.capability_name();
            if !capabilities.insert(capability.clone()) {
                return Err(Error::config(format!(
                    "subject '{}' maps to capability '{capability}', already used by another subject",
                    subject.namespace_id
                )));
            }
            let pattern = compile_patterns(&subject)?;
            compiled.push(CompiledSubject { subject, pattern });
        }

        let default_index = compiled
            .iter()
            .position(|c| c.subject.namespace_id == default_subject)
            .ok_or_else(|| {
                Error::config(format!("default subject '{default_subject}' is not configured"))
            })?;

        Ok(Self {
            subjects: compiled,
            default_index,
        })
    }

    /// Namespaces mentioned in `text`, in subject configuration order.
    ///
    /// Never empty: falls back to the default subject.
    pub fn resolve(&self, text: &str) -> Vec<String> {
        self.resolve_subjects(text)
            .into_iter()
            .map(|s| s.namespace_id.clone())
            .collect()
    }

    /// Like [`resolve`](Self::resolve), returning the subjects themselves.
    pub fn resolve_subjects(&self, text: &str) -> Vec<&Subject> {
        let normalized = normalize(text);
        let matched: Vec<&Subject> = self
            .subjects
            .iter()
            .filter(|c| c.pattern.is_match(&normalized))
            .map(|c| &c.subject)
            .collect();

        if matched.is_empty() {
            vec![self.default_subject()]
        } else {
            matched
        }
    }

    pub fn default_subject(&self) -> &Subject {
        &self.subjects[self.default_index].subject
    }

    /// Look up a subject by namespace.
    pub fn subject(&self, namespace: &str) -> Option<&Subject> {
        self.subjects
            .iter()
            .map(|c| &c.subject)
            .find(|s| s.namespace_id == namespace)
    }

    /// All subjects, in configuration order.
    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter().map(|c| &c.subject)
    }
}

/// Build `\b(?:p1|p2|...)\b` from the normalized, escaped patterns.
fn compile_patterns(subject: &Subject) -> Result<Regex> {
    let alternatives: Vec<String> = subject
        .match_patterns
        .iter()
        .map(|p| normalize(p.trim()))
        .filter(|p| !p.is_empty())
        .map(|p| regex_lite::escape(&p))
        .collect();

    if alternatives.is_empty() {
        return Err(Error::config(format!(
            "subject '{}' has no match patterns",
            subject.namespace_id
        )));
    }

    let source = format!(r"\b(?:{})\b", alternatives.join("|"));
    Regex::new(&source).map_err(|e| {
        Error::config(format!(
            "invalid pattern for subject '{}': {e}",
            subject.namespace_id
        ))
    })
}
