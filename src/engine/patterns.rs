//! Pattern Store - compiles configured rule descriptors into a `RuleSet`.
//!
//! A `RuleSet` is built once per provider instantiation and is immutable
//! afterwards; reconfiguration means loading a new one. Rule order in the
//! configuration document is preserved and is the application order.

use regex::Regex;

use crate::config::RuleSpec;
use crate::error::{ShieldError, ShieldResult};

/// Maximum pattern length used when deriving a label.
const LABEL_MAX_CHARS: usize = 32;

/// A compiled redaction rule.
#[derive(Debug, Clone)]
pub struct RedactionRule {
    /// Compiled search pattern.
    pub(crate) regex: Regex,
    /// Replacement template with `$n`/`${n}` capture-group references.
    pub(crate) replacement: String,
    /// Identifier used in match reports and logs.
    pub label: String,
}

impl RedactionRule {
    fn compile(spec: &RuleSpec, position: usize) -> ShieldResult<Self> {
        let regex = Regex::new(&spec.pattern)
            .map_err(|source| ShieldError::PatternCompile { position, source })?;

        let label = spec
            .label
            .clone()
            .unwrap_or_else(|| derive_label(&spec.pattern));

        validate_replacement(&regex, &spec.replacement, &label)?;

        Ok(Self {
            regex,
            replacement: spec.replacement.clone(),
            label,
        })
    }
}

/// Ordered, immutable set of compiled redaction rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RedactionRule>,
}

impl RuleSet {
    /// Compile an ordered list of rule descriptors.
    ///
    /// An empty descriptor list is a configuration error. Descriptors whose
    /// pattern fails to compile either abort the load
    /// (`fail_on_pattern_error = true`) or are skipped with a warning; the
    /// relative order of surviving rules is preserved. Replacement templates
    /// referencing a capture group the pattern does not define are rejected
    /// at load time, so apply-time substitution never sees a dangling
    /// reference.
    pub fn load(specs: &[RuleSpec], fail_on_pattern_error: bool) -> ShieldResult<Self> {
        if specs.is_empty() {
            return Err(ShieldError::Configuration(
                "redaction shield requires at least one rule".to_string(),
            ));
        }

        let mut rules = Vec::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            match RedactionRule::compile(spec, position) {
                Ok(rule) => rules.push(rule),
                // Only pattern-compile failures are skippable; a dangling
                // replacement reference is fatal in either mode.
                Err(e @ ShieldError::PatternCompile { .. }) if !fail_on_pattern_error => {
                    tracing::warn!(
                        position,
                        error = %e,
                        "Skipping redaction rule that failed to compile"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self { rules })
    }

    /// An empty rule set; applying it is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in application order.
    pub fn iter(&self) -> impl Iterator<Item = &RedactionRule> {
        self.rules.iter()
    }
}

/// Derive a report label from the pattern text.
fn derive_label(pattern: &str) -> String {
    if pattern.chars().count() <= LABEL_MAX_CHARS {
        pattern.to_string()
    } else {
        let truncated: String = pattern.chars().take(LABEL_MAX_CHARS).collect();
        format!("{truncated}...")
    }
}

/// Statically validate the capture-group references in a replacement
/// template against the compiled pattern.
///
/// Group references are 1-based; `$0` (the whole match) is always valid and
/// `$$` is a literal dollar. An empty braced reference (`${}`) is rejected.
/// A `$` that does not introduce a reference is left to the regex engine's
/// literal handling.
fn validate_replacement(regex: &Regex, template: &str, label: &str) -> ShieldResult<()> {
    let group_count = regex.captures_len(); // includes group 0
    let named: Vec<&str> = regex.capture_names().flatten().collect();

    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            continue;
        }
        match chars.peek() {
            // Escaped dollar
            Some('$') => {
                chars.next();
            }
            // Braced reference: ${1} or ${name}
            Some('{') => {
                chars.next();
                let mut name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                }
                check_reference(&name, group_count, &named, label)?;
            }
            // Bare reference: $1 or $name
            Some(c) if c.is_ascii_alphanumeric() || *c == '_' => {
                let mut name = String::new();
                while let Some(c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || *c == '_' {
                        name.push(*c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                check_reference(&name, group_count, &named, label)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_reference(
    name: &str,
    group_count: usize,
    named: &[&str],
    label: &str,
) -> ShieldResult<()> {
    if name.is_empty() {
        return Err(ShieldError::Replacement {
            label: label.to_string(),
            reason: "empty capture group reference '${}'".to_string(),
        });
    }
    if let Ok(index) = name.parse::<usize>() {
        if index >= group_count {
            return Err(ShieldError::Replacement {
                label: label.to_string(),
                reason: format!(
                    "references capture group {index} but the pattern defines {}",
                    group_count - 1
                ),
            });
        }
    } else if !named.contains(&name) {
        return Err(ShieldError::Replacement {
            label: label.to_string(),
            reason: format!("references unknown capture group '{name}'"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_preserves_order() {
        let specs = vec![
            RuleSpec::new("a", "x").with_label("first"),
            RuleSpec::new("b", "y").with_label("second"),
            RuleSpec::new("c", "z").with_label("third"),
        ];

        let rules = RuleSet::load(&specs, true).unwrap();
        let labels: Vec<&str> = rules.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_load_empty_specs_is_configuration_error() {
        let result = RuleSet::load(&[], false);
        assert!(matches!(result, Err(ShieldError::Configuration(_))));
    }

    #[test]
    fn test_invalid_pattern_skipped_when_tolerant() {
        let specs = vec![
            RuleSpec::new("valid", "x").with_label("ok"),
            RuleSpec::new("(unclosed", "y").with_label("broken"),
            RuleSpec::new("also_valid", "z").with_label("ok_too"),
        ];

        let rules = RuleSet::load(&specs, false).unwrap();
        assert_eq!(rules.len(), 2);
        let labels: Vec<&str> = rules.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["ok", "ok_too"]);
    }

    #[test]
    fn test_invalid_pattern_aborts_when_strict() {
        let specs = vec![
            RuleSpec::new("valid", "x"),
            RuleSpec::new("(unclosed", "y"),
        ];

        let result = RuleSet::load(&specs, true);
        match result {
            Err(ShieldError::PatternCompile { position, .. }) => assert_eq!(position, 1),
            other => panic!("expected PatternCompile error, got {other:?}"),
        }
    }

    #[test]
    fn test_label_defaults_to_truncated_pattern() {
        let short = RuleSet::load(&[RuleSpec::new(r"\d+", "[NUM]")], true).unwrap();
        assert_eq!(short.iter().next().unwrap().label, r"\d+");

        let long_pattern = "a".repeat(50);
        let long = RuleSet::load(&[RuleSpec::new(long_pattern.clone(), "x")], true).unwrap();
        let label = &long.iter().next().unwrap().label;
        assert!(label.ends_with("..."));
        assert!(label.len() < long_pattern.len());
    }

    #[test]
    fn test_load_rejects_out_of_range_group_ref() {
        let specs = vec![RuleSpec::new(r"(\d{3})-\d{4}", "${1}-${2}").with_label("phone")];
        let result = RuleSet::load(&specs, false);
        match result {
            Err(ShieldError::Replacement { label, .. }) => assert_eq!(label, "phone"),
            other => panic!("expected Replacement error, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_group_ref_fatal_even_when_tolerant() {
        // Tolerant mode only forgives patterns that fail to compile; a
        // replacement referencing a group the pattern lacks must not be
        // silently dropped.
        let specs = vec![
            RuleSpec::new("valid", "x").with_label("ok"),
            RuleSpec::new(r"(\d{3})-\d{4}", "${1}-${2}").with_label("phone"),
        ];

        let result = RuleSet::load(&specs, false);
        match result {
            Err(ShieldError::Replacement { label, .. }) => assert_eq!(label, "phone"),
            other => panic!("expected Replacement error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_braced_group_ref_rejected() {
        let specs = vec![RuleSpec::new(r"\d+", "${}").with_label("empty_ref")];
        assert!(matches!(
            RuleSet::load(&specs, true),
            Err(ShieldError::Replacement { .. })
        ));
        assert!(matches!(
            RuleSet::load(&specs, false),
            Err(ShieldError::Replacement { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unknown_named_group_ref() {
        let specs = vec![RuleSpec::new(r"(?P<user>\w+)@", "$name@")];
        assert!(matches!(
            RuleSet::load(&specs, false),
            Err(ShieldError::Replacement { .. })
        ));
    }

    #[test]
    fn test_valid_group_refs_accepted() {
        let specs = vec![
            RuleSpec::new(r"(\d{3})-(\d{2})-\d{4}", "${1}-${2}-XXXX"),
            RuleSpec::new(r"(?P<user>\w+)@example\.com", "${user}@[REDACTED]"),
            RuleSpec::new(r"\d+", "costs $$5"),
        ];
        assert!(RuleSet::load(&specs, true).is_ok());
    }

    #[test]
    fn test_load_is_deterministic() {
        let specs = vec![
            RuleSpec::new(r"(?i)secret", "[S]"),
            RuleSpec::new(r"\d+", "[N]"),
        ];

        let a = RuleSet::load(&specs, true).unwrap();
        let b = RuleSet::load(&specs, true).unwrap();

        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.label, rb.label);
            assert_eq!(ra.regex.as_str(), rb.regex.as_str());
            assert_eq!(ra.replacement, rb.replacement);
        }
    }
}
