//! Blocklist rules and the evaluation engine.
//!
//! A rule is a pattern (glob or regex) tested against a candidate DNS
//! mutation's name and/or content, optionally scoped to one record
//! type. Evaluation walks the supplied rule list in order and returns
//! the first match; the caller controls the order, so precedence reads
//! like a firewall rule list.
//!
//! Matching contract (load-bearing, do not "fix"):
//!
//! - glob patterns (`*` = any run, `?` = one char) are anchored to the
//!   full field value;
//! - regex patterns match anywhere in the field value (substring);
//! - both are case-insensitive;
//! - a rule whose regex fails to compile never matches anything. One
//!   bad rule must not block all traffic or take the service down.

use crate::RecordType;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Which candidate field(s) a rule is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleField {
    /// Test the record name only
    Name,
    /// Test the record content only
    Content,
    /// Test either field (logical OR)
    Both,
}

impl FromStr for RuleField {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "name" => Ok(Self::Name),
            "content" => Ok(Self::Content),
            "both" => Ok(Self::Both),
            other => Err(crate::CoreError::UnknownRuleField(other.to_string())),
        }
    }
}

/// Record-type scope of a rule: every type, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeFilter {
    /// Rule applies to every record type
    Any,
    /// Rule applies only to this record type (exact tag match)
    Only(RecordType),
}

impl TypeFilter {
    /// The all-types filter; also serde's default for rule payloads.
    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    /// Does this filter admit the given record type?
    #[must_use]
    pub fn admits(self, record_type: RecordType) -> bool {
        match self {
            Self::Any => true,
            Self::Only(t) => t == record_type,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("ANY"),
            Self::Only(t) => f.write_str(t.as_str()),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s == "ANY" {
            Ok(Self::Any)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl TryFrom<String> for TypeFilter {
    type Error = crate::CoreError;

    fn try_from(s: String) -> crate::Result<Self> {
        s.parse()
    }
}

impl From<TypeFilter> for String {
    fn from(filter: TypeFilter) -> Self {
        filter.to_string()
    }
}

/// Administrator-defined pattern that blocks matching DNS mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlocklistRule {
    /// Storage id
    pub id: i64,

    /// Which candidate field(s) the pattern is tested against
    pub field: RuleField,

    /// Glob or regex pattern; must be non-empty
    pub pattern: String,

    /// Whether `pattern` is a regular expression (otherwise a glob)
    pub is_regex: bool,

    /// Record-type scope (`ANY` or one type tag)
    #[serde(rename = "type")]
    pub types: TypeFilter,

    /// Human explanation shown to the requester on rejection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// User id of the rule's creator
    #[serde(default)]
    pub created_by: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl BlocklistRule {
    /// Build a rule with no description or creator attribution.
    #[must_use]
    pub fn new(
        id: i64,
        field: RuleField,
        pattern: impl Into<String>,
        is_regex: bool,
        types: TypeFilter,
    ) -> Self {
        Self {
            id,
            field,
            pattern: pattern.into(),
            is_regex,
            types,
            description: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Does this rule block the candidate?
    ///
    /// Compiles the pattern on every call; use [`CompiledRules`] when
    /// evaluating a whole snapshot repeatedly.
    #[must_use]
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if !self.types.admits(candidate.record_type) {
            return false;
        }
        compile_pattern(&self.pattern, self.is_regex)
            .is_some_and(|re| self.matches_fields(&re, candidate))
    }

    fn matches_fields(&self, re: &Regex, candidate: &Candidate) -> bool {
        match self.field {
            RuleField::Name => re.is_match(&candidate.name),
            RuleField::Content => re.is_match(&candidate.content),
            RuleField::Both => re.is_match(&candidate.name) || re.is_match(&candidate.content),
        }
    }
}

/// Proposed DNS mutation, as seen by the evaluator.
///
/// Ephemeral: built by the caller from a validated create/update
/// payload, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Record type tag
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Record name
    pub name: String,
    /// Record content
    pub content: String,
}

impl Candidate {
    /// Build a candidate mutation.
    #[must_use]
    pub fn new(record_type: RecordType, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Evaluate a candidate against an ordered rule list.
///
/// Returns the first rule (in list order) whose type scope and pattern
/// match, or `None` when nothing blocks the mutation. Rules with
/// malformed regex patterns are skipped.
#[must_use]
pub fn evaluate<'a>(candidate: &Candidate, rules: &'a [BlocklistRule]) -> Option<&'a BlocklistRule> {
    rules.iter().find(|rule| rule.matches(candidate))
}

/// Outcome of a blocklist evaluation, in caller-facing form.
///
/// Serializes as `{"blocked": false}` or
/// `{"blocked": true, "rule": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// No rule matched
    Allowed,
    /// The first matching rule, cloned out of the snapshot
    Blocked {
        /// Offending rule
        rule: BlocklistRule,
    },
}

impl Verdict {
    /// Run [`evaluate`] and clone the winning rule, if any.
    #[must_use]
    pub fn check(candidate: &Candidate, rules: &[BlocklistRule]) -> Self {
        evaluate(candidate, rules).map_or(Self::Allowed, |rule| Self::Blocked { rule: rule.clone() })
    }

    /// True when a rule matched.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// The offending rule, if blocked.
    #[must_use]
    pub const fn rule(&self) -> Option<&BlocklistRule> {
        match self {
            Self::Allowed => None,
            Self::Blocked { rule } => Some(rule),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Allowed => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("blocked", &false)?;
                map.end()
            }
            Self::Blocked { rule } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("blocked", &true)?;
                map.serialize_entry("rule", rule)?;
                map.end()
            }
        }
    }
}

/// Rule snapshot with patterns compiled once.
///
/// Semantics are identical to [`evaluate`]; this only trades the
/// per-call compilation for an up-front pass. Rebuild the snapshot
/// whenever the rule set changes; staleness is the caller's problem,
/// exactly as with the raw list.
#[derive(Debug)]
pub struct CompiledRules {
    rules: Vec<BlocklistRule>,
    // One entry per rule; None marks a pattern that failed to compile
    // and therefore never matches.
    compiled: Vec<Option<Regex>>,
}

impl CompiledRules {
    /// Compile every rule's pattern. Order is preserved.
    #[must_use]
    pub fn compile(rules: Vec<BlocklistRule>) -> Self {
        let compiled = rules
            .iter()
            .map(|rule| compile_pattern(&rule.pattern, rule.is_regex))
            .collect();
        Self { rules, compiled }
    }

    /// First-match evaluation over the compiled snapshot.
    #[must_use]
    pub fn evaluate(&self, candidate: &Candidate) -> Option<&BlocklistRule> {
        self.rules
            .iter()
            .zip(&self.compiled)
            .find(|(rule, re)| {
                rule.types.admits(candidate.record_type)
                    && re.as_ref().is_some_and(|re| rule.matches_fields(re, candidate))
            })
            .map(|(rule, _)| rule)
    }

    /// Number of rules in the snapshot (including never-match ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the snapshot holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[BlocklistRule] {
        &self.rules
    }
}

/// Validate a pattern the way the evaluator will interpret it.
///
/// Used at rule-creation time so malformed regexes are rejected up
/// front instead of silently never matching.
pub fn check_pattern(pattern: &str, is_regex: bool) -> Result<(), String> {
    if pattern.is_empty() {
        return Err("pattern must not be empty".to_string());
    }
    if is_regex {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(|_| ())
            .map_err(|e| e.to_string())
    } else {
        Ok(())
    }
}

/// Compile a rule pattern, or `None` if it is malformed.
fn compile_pattern(pattern: &str, is_regex: bool) -> Option<Regex> {
    let source = if is_regex {
        pattern.to_string()
    } else {
        glob_to_regex(pattern)
    };

    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(pattern, %err, "skipping rule with malformed pattern");
            None
        }
    }
}

/// Translate a glob into an anchored regex source.
///
/// `*` becomes `.*`, `?` becomes `.`, everything else is escaped as a
/// literal. The `^…$` anchors are what make glob matching full-string.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(&ch.to_string())),
        }
    }
    out.push('$');
    out
}
