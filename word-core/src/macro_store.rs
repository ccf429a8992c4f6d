use std::collections::HashMap;

use regex::Regex;

use crate::error::ErrorKind;

/// Name-keyed text replacement table. Populated by `#CONST`/`#DEFINE`
/// directives and by `VAR` allocations (which register a bracketed address
/// substitution rather than a bare one — see the `VAR` note in
/// `opcode_table`). Expansion is whole-word, mirroring the original system's
/// per-name `\bname\b` substitutors.
#[derive(Debug, Default)]
pub struct MacroStore {
    substitutions: HashMap<String, String>,
}

impl MacroStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.substitutions.contains_key(name)
    }

    pub fn create(&mut self, name: &str, substitution: impl Into<String>) -> Result<(), ErrorKind> {
        if self.substitutions.contains_key(name) {
            return Err(ErrorKind::DuplicateMacro {
                name: name.to_string(),
            });
        }
        self.substitutions.insert(name.to_string(), substitution.into());
        Ok(())
    }

    /// Replace every whole-word occurrence of a defined name in `text` with
    /// its substitution. A name with no defined macro is left untouched; it
    /// falls through to become an `undefined` operand at classification.
    pub fn expand(&self, text: &str) -> String {
        let mut expanded = text.to_string();
        for (name, substitution) in &self.substitutions {
            let pattern = format!(r"\b{}\b", regex::escape(name));
            // Each substitutor is a distinct, cheaply-recompiled regex; the
            // table is small (one entry per macro/variable in a program).
            let re = Regex::new(&pattern).expect("word-boundary pattern is always valid");
            expanded = re.replace_all(&expanded, substitution.as_str()).into_owned();
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_whole_word_only() {
        let mut store = MacroStore::new();
        store.create("foo", "200").unwrap();
        assert_eq!(store.expand("foo"), "200");
        assert_eq!(store.expand("foobar"), "foobar");
    }

    #[test]
    fn duplicate_create_errors() {
        let mut store = MacroStore::new();
        store.create("foo", "1").unwrap();
        assert!(store.create("foo", "2").is_err());
    }

    #[test]
    fn undefined_name_passes_through() {
        let store = MacroStore::new();
        assert_eq!(store.expand("nowhere"), "nowhere");
    }

    #[test]
    fn bracketed_substitution_for_var() {
        let mut store = MacroStore::new();
        store.create("foo", "[16]").unwrap();
        assert_eq!(store.expand("foo"), "[16]");
    }
}
