use crate::document::FxomDocument;
use std::collections::HashSet;

const RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

/// Whether `id` may be used as an fx:id (a controller field name).
pub fn is_valid_fx_id(id: &str) -> bool {
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !RESERVED_WORDS.contains(&id)
}

/// Issues fx:ids that do not collide with the ones already in use.
#[derive(Clone, Debug, Default)]
pub struct FxIdGenerator {
    in_use: HashSet<String>,
}

impl FxIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator seeded with every fx:id in the arena, detached objects
    /// included so undo never resurrects a clash.
    pub fn from_document(document: &FxomDocument) -> Self {
        let in_use = document
            .objects
            .values()
            .filter_map(|object| object.fx_id().map(str::to_string))
            .collect();
        Self { in_use }
    }

    pub fn is_used(&self, id: &str) -> bool {
        self.in_use.contains(id)
    }

    /// Marks `id` as taken. Returns false when it already was.
    pub fn reserve(&mut self, id: impl Into<String>) -> bool {
        self.in_use.insert(id.into())
    }

    /// `base` with its trailing number replaced by the smallest free suffix
    /// (`ok`, `ok1`, `ok2` ...). The result is reserved.
    pub fn next_id(&mut self, base: &str) -> String {
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        let stem = if stem.is_empty() { "id" } else { stem };

        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}{}", stem, suffix);
            if self.reserve(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_fx_ids() {
        assert!(is_valid_fx_id("okButton"));
        assert!(is_valid_fx_id("_row2"));
        assert!(!is_valid_fx_id(""));
        assert!(!is_valid_fx_id("2fast"));
        assert!(!is_valid_fx_id("ok-button"));
        assert!(!is_valid_fx_id("class"));
    }

    #[test]
    fn test_next_id_strips_trailing_number() {
        let mut gen = FxIdGenerator::new();
        gen.reserve("ok");
        gen.reserve("ok1");

        assert_eq!(gen.next_id("ok"), "ok2");
        assert_eq!(gen.next_id("ok7"), "ok3");
        assert!(gen.is_used("ok3"));
    }

    #[test]
    fn test_next_id_for_numeric_base() {
        let mut gen = FxIdGenerator::new();
        assert_eq!(gen.next_id("42"), "id1");
    }
}
