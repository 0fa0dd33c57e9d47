//! Conversion rules keyed by (source, target) format pairs.

use std::collections::BTreeMap;

use crate::config::ConverterConfig;
use crate::convert::{self, TabularData};
use crate::error::Result;
use crate::format::Format;

/// Reads file contents into a table.
pub type DecodeFn = fn(&str) -> Result<TabularData>;

/// Renders a table into file contents.
pub type EncodeFn = fn(&TabularData, &ConverterConfig) -> Result<String>;

/// The decode/encode pair used for one conversion.
#[derive(Clone, Copy)]
pub struct ConversionRule {
    /// Reader for the source format.
    pub decode: DecodeFn,
    /// Writer for the target format.
    pub encode: EncodeFn,
}

impl ConversionRule {
    /// Create a rule from a reader and a writer.
    pub fn new(decode: DecodeFn, encode: EncodeFn) -> Self {
        Self { decode, encode }
    }
}

impl std::fmt::Debug for ConversionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRule").finish_non_exhaustive()
    }
}

/// The set of supported conversions.
///
/// A lookup either finds exactly one rule for a pair or nothing.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<(Format, Format), ConversionRule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in conversions between CSV, XML, JSON and Markdown.
    pub fn standard() -> Self {
        let table: [(Format, Format, DecodeFn, EncodeFn); 8] = [
            (Format::Csv, Format::Xml, convert::parse_csv, convert::write_xml),
            (Format::Xml, Format::Csv, convert::parse_xml, convert::write_csv),
            (Format::Csv, Format::Markdown, convert::parse_csv, convert::write_markdown),
            (Format::Xml, Format::Markdown, convert::parse_xml, convert::write_markdown),
            (Format::Csv, Format::Json, convert::parse_csv, convert::write_json),
            (Format::Xml, Format::Json, convert::parse_xml, convert::write_json),
            (Format::Json, Format::Csv, convert::parse_json, convert::write_csv),
            (Format::Json, Format::Xml, convert::parse_json, convert::write_xml),
        ];

        let mut rules = Self::new();
        for (from, to, decode, encode) in table {
            rules.register(from, to, ConversionRule::new(decode, encode));
        }
        rules
    }

    /// Register a rule, returning the one it replaces.
    pub fn register(
        &mut self,
        from: Format,
        to: Format,
        rule: ConversionRule,
    ) -> Option<ConversionRule> {
        self.rules.insert((from, to), rule)
    }

    /// Find the rule for a pair.
    pub fn lookup(&self, from: Format, to: Format) -> Option<&ConversionRule> {
        self.rules.get(&(from, to))
    }

    /// A reader for `format`, taken from any rule whose source it is.
    pub fn decoder_for(&self, format: Format) -> Option<DecodeFn> {
        self.rules
            .iter()
            .find(|((from, _), _)| *from == format)
            .map(|(_, rule)| rule.decode)
    }

    /// All registered pairs, ordered by source then target.
    pub fn pairs(&self) -> impl Iterator<Item = (Format, Format)> + '_ {
        self.rules.keys().copied()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_pairs() {
        let rules = RuleSet::standard();
        assert_eq!(rules.len(), 8);
        let pairs: Vec<_> = rules.pairs().collect();
        assert_eq!(
            pairs,
            vec![
                (Format::Csv, Format::Xml),
                (Format::Csv, Format::Json),
                (Format::Csv, Format::Markdown),
                (Format::Xml, Format::Csv),
                (Format::Xml, Format::Json),
                (Format::Xml, Format::Markdown),
                (Format::Json, Format::Csv),
                (Format::Json, Format::Xml),
            ]
        );
    }

    #[test]
    fn test_lookup_missing_pairs() {
        let rules = RuleSet::standard();
        assert!(rules.lookup(Format::Markdown, Format::Csv).is_none());
        assert!(rules.lookup(Format::Csv, Format::Csv).is_none());
        assert!(rules.lookup(Format::Json, Format::Markdown).is_none());
    }

    #[test]
    fn test_decoder_for() {
        let rules = RuleSet::standard();
        assert!(rules.decoder_for(Format::Csv).is_some());
        assert!(rules.decoder_for(Format::Json).is_some());
        assert!(rules.decoder_for(Format::Markdown).is_none());
    }

    #[test]
    fn test_register_extends_and_replaces() {
        let mut rules = RuleSet::standard();
        let rule = ConversionRule::new(convert::parse_json, convert::write_markdown);
        assert!(rules.register(Format::Json, Format::Markdown, rule).is_none());
        assert!(rules.lookup(Format::Json, Format::Markdown).is_some());
        assert!(rules.register(Format::Json, Format::Markdown, rule).is_some());
        assert_eq!(rules.len(), 9);
    }

    #[test]
    fn test_rule_round_trip() {
        let rules = RuleSet::standard();
        let rule = rules.lookup(Format::Csv, Format::Json).unwrap();
        let data = (rule.decode)("id,name\n1,Alice\n").unwrap();
        let out = (rule.encode)(&data, &ConverterConfig::default()).unwrap();
        assert_eq!(out, r#"[{"id":1,"name":"Alice"}]"#);
    }
}
