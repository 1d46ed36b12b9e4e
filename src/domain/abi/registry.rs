//! Parser registry - calldata parsers indexed by selector

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Selector;
use thiserror::Error;

use super::{canonical_declaration, selector_from_declaration, CalldataParser, WantedField};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("selector {selector} registered twice: {existing} and {incoming}")]
    DuplicateSelector {
        selector: Selector,
        existing: String,
        incoming: String,
    },

    #[error("invalid argument schema for {declaration}: {reason}")]
    InvalidSchema { declaration: String, reason: String },

    #[error("invalid selector {0:?}")]
    InvalidSelector(String),
}

/// A configuration defect that lookups cannot detect on their own.
///
/// Each of these turns into silent unknown-selector outcomes or meaningless
/// decoded values at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryIssue {
    /// The key does not match the selector hashed from the declaration
    SelectorMismatch {
        key: Selector,
        declaration: String,
        computed: Selector,
    },
    /// The declaration text is not what the compiler hashes
    NonCanonicalDeclaration {
        key: Selector,
        declaration: String,
        canonical: Option<String>,
    },
    /// Argument names and schema slots disagree in number
    ArityMismatch {
        key: Selector,
        declaration: String,
        names: usize,
        arity: usize,
    },
    /// A wanted field names no argument
    UnknownWantedField {
        key: Selector,
        declaration: String,
        name: String,
    },
}

impl fmt::Display for RegistryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectorMismatch { key, declaration, computed } => write!(
                f,
                "{key}: {declaration} hashes to {computed}"
            ),
            Self::NonCanonicalDeclaration { key, declaration, canonical } => match canonical {
                Some(canonical) => write!(f, "{key}: {declaration} should read {canonical}"),
                None => write!(f, "{key}: {declaration} is not a function signature"),
            },
            Self::ArityMismatch { key, declaration, names, arity } => write!(
                f,
                "{key}: {declaration} has {arity} arguments but {names} names"
            ),
            Self::UnknownWantedField { key, declaration, name } => write!(
                f,
                "{key}: {declaration} has no argument named {name}"
            ),
        }
    }
}

/// Registry of calldata parsers indexed by selector
#[derive(Default)]
pub struct ParserRegistry {
    parsers: HashMap<Selector, Box<dyn CalldataParser>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `parser` under an explicit selector key.
    ///
    /// The key is trusted as given; [`ParserRegistry::check`] reports keys
    /// that disagree with their declaration.
    pub fn insert(
        &mut self,
        selector: Selector,
        parser: impl CalldataParser + 'static,
    ) -> Result<(), RegistryError> {
        self.insert_boxed(selector, Box::new(parser))
    }

    /// Register `parser` under the selector of its own declaration
    pub fn register(&mut self, parser: impl CalldataParser + 'static) -> Result<(), RegistryError> {
        let selector = parser.selector();
        self.insert(selector, parser)
    }

    fn insert_boxed(
        &mut self,
        selector: Selector,
        parser: Box<dyn CalldataParser>,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.parsers.get(&selector) {
            return Err(RegistryError::DuplicateSelector {
                selector,
                existing: existing.declaration().to_string(),
                incoming: parser.declaration().to_string(),
            });
        }
        self.parsers.insert(selector, parser);
        Ok(())
    }

    /// Look up a parser by selector
    pub fn lookup(&self, selector: Selector) -> Option<&dyn CalldataParser> {
        self.parsers.get(&selector).map(|parser| parser.as_ref())
    }

    /// Look up a parser by selector hex string (e.g., "0x77f61403")
    pub fn lookup_hex(&self, selector_hex: &str) -> Option<&dyn CalldataParser> {
        let selector = parse_selector(selector_hex).ok()?;
        self.lookup(selector)
    }

    /// Get the number of registered parsers
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Merge another registry into this one, rejecting selector collisions
    pub fn merge(&mut self, other: Self) -> Result<(), RegistryError> {
        for (selector, parser) in other.parsers {
            self.insert_boxed(selector, parser)?;
        }
        Ok(())
    }

    /// Entries sorted by selector
    pub fn entries(&self) -> Vec<(Selector, &dyn CalldataParser)> {
        let mut entries: Vec<_> = self
            .parsers
            .iter()
            .map(|(selector, parser)| (*selector, parser.as_ref()))
            .collect();
        entries.sort_by_key(|(selector, _)| *selector);
        entries
    }

    /// Find configuration defects in every entry
    pub fn check(&self) -> Vec<RegistryIssue> {
        let mut issues = Vec::new();

        for (key, parser) in self.entries() {
            let declaration = parser.declaration().to_string();

            let computed = selector_from_declaration(&declaration);
            if computed != key {
                issues.push(RegistryIssue::SelectorMismatch {
                    key,
                    declaration: declaration.clone(),
                    computed,
                });
            }

            let canonical = canonical_declaration(&declaration);
            if canonical.as_deref() != Some(declaration.as_str()) {
                issues.push(RegistryIssue::NonCanonicalDeclaration {
                    key,
                    declaration: declaration.clone(),
                    canonical,
                });
            }

            let names = parser.argument_names();
            if names.len() != parser.arity() {
                issues.push(RegistryIssue::ArityMismatch {
                    key,
                    declaration: declaration.clone(),
                    names: names.len(),
                    arity: parser.arity(),
                });
            }

            for wanted in parser.wanted() {
                if let WantedField::Calldata(name) = wanted {
                    if !names.contains(name) {
                        issues.push(RegistryIssue::UnknownWantedField {
                            key,
                            declaration: declaration.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
        }

        issues
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries()
                    .into_iter()
                    .map(|(selector, parser)| (selector, parser.declaration().to_string())),
            )
            .finish()
    }
}

/// Parse a `0x`-prefixed (or bare) 8-digit hex selector
pub fn parse_selector(selector_hex: &str) -> Result<Selector, RegistryError> {
    let invalid = || RegistryError::InvalidSelector(selector_hex.to_string());
    let normalized = selector_hex
        .strip_prefix("0x")
        .or_else(|| selector_hex.strip_prefix("0X"))
        .unwrap_or(selector_hex);

    if normalized.len() != 8 {
        return Err(invalid());
    }

    let bytes = hex::decode(normalized).map_err(|_| invalid())?;
    Ok(Selector::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{Calldata, DecodeError, FieldValue};

    struct StubParser {
        declaration: String,
        names: Vec<String>,
        arity: usize,
        wanted: Vec<WantedField>,
    }

    impl StubParser {
        fn new(declaration: &str, names: &[&str], wanted: Vec<WantedField>) -> Self {
            Self {
                declaration: declaration.to_string(),
                names: names.iter().map(|n| n.to_string()).collect(),
                arity: names.len(),
                wanted,
            }
        }
    }

    impl CalldataParser for StubParser {
        fn declaration(&self) -> &str {
            &self.declaration
        }

        fn selector(&self) -> Selector {
            selector_from_declaration(&self.declaration)
        }

        fn argument_names(&self) -> &[String] {
            &self.names
        }

        fn arity(&self) -> usize {
            self.arity
        }

        fn wanted(&self) -> &[WantedField] {
            &self.wanted
        }

        fn is_meta_transaction(&self) -> bool {
            false
        }

        fn decode(&self, _calldata: Calldata<'_>) -> Result<Vec<FieldValue>, DecodeError> {
            Ok(vec![FieldValue::Missing; self.wanted.len()])
        }
    }

    fn transfer() -> StubParser {
        StubParser::new(
            "transfer(address,uint256)",
            &["to", "amount"],
            vec![WantedField::calldata("to"), WantedField::calldata("amount")],
        )
    }

    #[test]
    fn test_registry_register_lookup() {
        let mut registry = ParserRegistry::new();
        registry.register(transfer()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(Selector::from([0xa9, 0x05, 0x9c, 0xbb])).is_some());
        assert!(registry.lookup_hex("0xa9059cbb").is_some());
        assert!(registry.lookup_hex("0xdeadbeef").is_none());
        assert!(registry.lookup_hex("0xa9059c").is_none());
    }

    #[test]
    fn test_duplicate_selector_rejected() {
        let mut registry = ParserRegistry::new();
        registry.register(transfer()).unwrap();

        let err = registry.register(transfer()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSelector { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_merge_rejects_collision() {
        let mut first = ParserRegistry::new();
        first.register(transfer()).unwrap();
        let mut second = ParserRegistry::new();
        second.register(transfer()).unwrap();

        assert!(first.merge(second).is_err());
    }

    #[test]
    fn test_check_clean_registry() {
        let mut registry = ParserRegistry::new();
        registry.register(transfer()).unwrap();
        assert!(registry.check().is_empty());
    }

    #[test]
    fn test_check_reports_wrong_key() {
        let mut registry = ParserRegistry::new();
        let key = parse_selector("0xdeadbeef").unwrap();
        registry.insert(key, transfer()).unwrap();

        let issues = registry.check();
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], RegistryIssue::SelectorMismatch { .. }));
    }

    #[test]
    fn test_check_reports_non_canonical_declaration() {
        let mut registry = ParserRegistry::new();
        registry
            .register(StubParser::new(
                "transfer(address, uint256)",
                &["to", "amount"],
                vec![WantedField::calldata("to"), WantedField::calldata("amount")],
            ))
            .unwrap();

        let issues = registry.check();
        assert_eq!(
            issues,
            vec![RegistryIssue::NonCanonicalDeclaration {
                key: selector_from_declaration("transfer(address, uint256)"),
                declaration: "transfer(address, uint256)".to_string(),
                canonical: Some("transfer(address,uint256)".to_string()),
            }]
        );
    }

    #[test]
    fn test_check_reports_arity_and_wanted_typos() {
        let mut parser = StubParser::new(
            "transfer(address,uint256)",
            &["to"],
            vec![WantedField::calldata("to"), WantedField::calldata("amonut")],
        );
        parser.arity = 2;

        let mut registry = ParserRegistry::new();
        registry.register(parser).unwrap();

        let issues = registry.check();
        assert!(issues
            .iter()
            .any(|issue| matches!(issue, RegistryIssue::ArityMismatch { names: 1, arity: 2, .. })));
        assert!(issues.iter().any(
            |issue| matches!(issue, RegistryIssue::UnknownWantedField { name, .. } if name == "amonut")
        ));
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!(
            parse_selector("0x77f61403").unwrap(),
            Selector::from([0x77, 0xf6, 0x14, 0x03])
        );
        assert_eq!(
            parse_selector("77F61403").unwrap(),
            Selector::from([0x77, 0xf6, 0x14, 0x03])
        );
        assert!(parse_selector("0x77f614").is_err());
        assert!(parse_selector("0xzzf61403").is_err());
    }
}
