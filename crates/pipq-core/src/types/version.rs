//! Structured version parsing, ordering and constraint matching.
//!
//! Provides the `Version` grammar used by Python package indexes (epoch,
//! release segments, pre/post/dev qualifiers, local segments), a legacy
//! fallback for strings that do not conform, and the comparison operators
//! used when matching versions against dependency constraints.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PipqError, PipqResult};

/// Pre-release phase, ordered `a < b < rc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PreTag {
    Alpha,
    Beta,
    Rc,
}

impl fmt::Display for PreTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreTag::Alpha => write!(f, "a"),
            PreTag::Beta => write!(f, "b"),
            PreTag::Rc => write!(f, "rc"),
        }
    }
}

/// One segment of a local version suffix.
///
/// Numeric segments compare numerically and sort below alphanumeric
/// segments at the same position (the variant order carries the ordering).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocalSegment {
    Num(u64),
    Alpha(String),
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSegment::Num(n) => write!(f, "{}", n),
            LocalSegment::Alpha(s) => write!(f, "{}", s),
        }
    }
}

/// Structured version value
///
/// `raw` keeps the original source text and takes no part in equality,
/// ordering or hashing; two versions that spell the same point on the
/// ordering differently (`1.0` vs `1.0.0`) compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreTag, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Option<Vec<LocalSegment>>,
    pub raw: String,
}

/// Version string that does not conform to the structured grammar
///
/// Legacy versions sort below every structured version and among
/// themselves by plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LegacyVersion {
    pub raw: String,
}

impl fmt::Display for LegacyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Any parsed version, plus the two range-bounding sentinels.
///
/// The derived ordering runs `Floor < Legacy < Structured < Ceiling`:
/// `Floor` sorts below every real version and `Ceiling` above, which is
/// what release-list traversals use for open bounds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnyVersion {
    Floor,
    Legacy(LegacyVersion),
    Structured(Version),
    Ceiling,
}

/// Comparison operator in a version constraint clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintOp {
    Equal,
    NotEqual,
    LessEq,
    GreaterEq,
    Less,
    Greater,
    Compatible,
    ArbitraryEqual,
}

impl ConstraintOp {
    /// Operator spelling as it appears in requirement strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintOp::Equal => "==",
            ConstraintOp::NotEqual => "!=",
            ConstraintOp::LessEq => "<=",
            ConstraintOp::GreaterEq => ">=",
            ConstraintOp::Less => "<",
            ConstraintOp::Greater => ">",
            ConstraintOp::Compatible => "~=",
            ConstraintOp::ArbitraryEqual => "===",
        }
    }
}

/// One parsed version constraint clause, e.g. `>=2.0` or `==1.4.*`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub op: ConstraintOp,
    pub version: String,
    /// True when the target carried a trailing `.*` (only valid on `==`/`!=`)
    pub wildcard: bool,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)?;
        if self.wildcard {
            write!(f, ".*")?;
        }
        Ok(())
    }
}

// ---- parsing ----

fn take_sep(s: &str) -> &str {
    match s.as_bytes().first() {
        Some(b'-') | Some(b'_') | Some(b'.') => &s[1..],
        _ => s,
    }
}

fn take_number(s: &str) -> (Option<u64>, &str) {
    let end = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        (None, s)
    } else {
        match s[..end].parse() {
            Ok(n) => (Some(n), &s[end..]),
            Err(_) => (None, s),
        }
    }
}

/// Pre-release phase spellings, longest first so `alpha` wins over `a`
const PRE_WORDS: [(&str, PreTag); 8] = [
    ("preview", PreTag::Rc),
    ("alpha", PreTag::Alpha),
    ("beta", PreTag::Beta),
    ("pre", PreTag::Rc),
    ("rc", PreTag::Rc),
    ("a", PreTag::Alpha),
    ("b", PreTag::Beta),
    ("c", PreTag::Rc),
];

const POST_WORDS: [&str; 3] = ["post", "rev", "r"];

fn take_pre(s: &str) -> (Option<(PreTag, u64)>, &str) {
    let t = take_sep(s);
    for (word, tag) in PRE_WORDS {
        if let Some(rest) = t.strip_prefix(word) {
            let (n, rest) = take_number(take_sep(rest));
            return (Some((tag, n.unwrap_or(0))), rest);
        }
    }
    (None, s)
}

fn take_post(s: &str) -> (Option<u64>, &str) {
    // bare `-N` shorthand
    if let Some(rest) = s.strip_prefix('-') {
        if let (Some(n), rest) = take_number(rest) {
            return (Some(n), rest);
        }
    }
    let t = take_sep(s);
    for word in POST_WORDS {
        if let Some(rest) = t.strip_prefix(word) {
            let (n, rest) = take_number(take_sep(rest));
            return (Some(n.unwrap_or(0)), rest);
        }
    }
    (None, s)
}

fn take_dev(s: &str) -> (Option<u64>, &str) {
    let t = take_sep(s);
    if let Some(rest) = t.strip_prefix("dev") {
        let (n, rest) = take_number(take_sep(rest));
        return (Some(n.unwrap_or(0)), rest);
    }
    (None, s)
}

fn parse_local(s: &str) -> Option<Vec<LocalSegment>> {
    let mut segments = Vec::new();
    for seg in s.split(['.', '-', '_']) {
        if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        if seg.bytes().all(|b| b.is_ascii_digit()) {
            match seg.parse() {
                Ok(n) => segments.push(LocalSegment::Num(n)),
                Err(_) => segments.push(LocalSegment::Alpha(seg.to_string())),
            }
        } else {
            segments.push(LocalSegment::Alpha(seg.to_string()));
        }
    }
    Some(segments)
}

fn parse_structured(raw: &str) -> Option<Version> {
    let lowered = raw.trim().to_ascii_lowercase();
    let s = lowered.strip_prefix('v').unwrap_or(lowered.as_str());
    if s.is_empty() {
        return None;
    }

    let (main, local_text) = match s.split_once('+') {
        Some((m, l)) => (m, Some(l)),
        None => (s, None),
    };
    let local = match local_text {
        Some(text) => Some(parse_local(text)?),
        None => None,
    };

    let (epoch, rest) = match main.split_once('!') {
        Some((e, r)) => (e.parse().ok()?, r),
        None => (0, main),
    };

    // release: N(.N)*
    let bytes = rest.as_bytes();
    let mut release = Vec::new();
    let mut i = 0;
    loop {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if start == i {
            return None;
        }
        release.push(rest[start..i].parse().ok()?);
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
        } else {
            break;
        }
    }

    let tail = &rest[i..];
    let (pre, tail) = take_pre(tail);
    let (post, tail) = take_post(tail);
    let (dev, tail) = take_dev(tail);
    if !tail.is_empty() {
        return None;
    }

    Some(Version {
        epoch,
        release,
        pre,
        post,
        dev,
        local,
        raw: raw.trim().to_string(),
    })
}

impl AnyVersion {
    /// Parse a version string; never fails.
    ///
    /// Text that does not fit the structured grammar degrades to the
    /// legacy ordered form instead of erroring.
    pub fn parse(text: &str) -> AnyVersion {
        match parse_structured(text) {
            Some(v) => AnyVersion::Structured(v),
            None => AnyVersion::Legacy(LegacyVersion {
                raw: text.trim().to_string(),
            }),
        }
    }

    /// Original source text (empty for the sentinels)
    pub fn raw(&self) -> &str {
        match self {
            AnyVersion::Structured(v) => &v.raw,
            AnyVersion::Legacy(l) => &l.raw,
            AnyVersion::Floor | AnyVersion::Ceiling => "",
        }
    }

    /// True when this is a pre-release or dev-release
    pub fn is_prerelease(&self) -> bool {
        match self {
            AnyVersion::Structured(v) => v.is_prerelease(),
            _ => false,
        }
    }

    /// Check this version against every clause in a constraint set (AND).
    ///
    /// Matching a legacy version with anything other than `===` is an
    /// `IncompatibleVersionComparison` error, surfaced rather than folded
    /// into `false` so callers can decide how strict to be.
    pub fn fits_constraints(&self, constraints: &[Constraint]) -> PipqResult<bool> {
        match self {
            AnyVersion::Structured(v) => v.fits_constraints(constraints),
            AnyVersion::Legacy(l) => {
                for c in constraints {
                    let ok = match c.op {
                        ConstraintOp::ArbitraryEqual => l.raw == c.version,
                        _ => {
                            return Err(PipqError::IncompatibleVersionComparison {
                                left: l.raw.clone(),
                                right: c.to_string(),
                            })
                        },
                    };
                    if !ok {
                        return Ok(false);
                    }
                }
                Ok(true)
            },
            AnyVersion::Floor | AnyVersion::Ceiling => {
                Err(PipqError::IncompatibleVersionComparison {
                    left: self.to_string(),
                    right: constraints
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(","),
                })
            },
        }
    }
}

impl fmt::Display for AnyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyVersion::Floor => write!(f, "-inf"),
            AnyVersion::Legacy(l) => write!(f, "{}", l),
            AnyVersion::Structured(v) => write!(f, "{}", v),
            AnyVersion::Ceiling => write!(f, "+inf"),
        }
    }
}

impl FromStr for Version {
    type Err = PipqError;

    /// Strict parse: fails where `AnyVersion::parse` would degrade to legacy
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_structured(s).ok_or_else(|| PipqError::InvalidVersion {
            text: s.to_string(),
        })
    }
}

// ---- ordering ----

/// Rank of the pre/dev qualifiers for a fixed release: a bare dev release
/// sorts below every pre-release, and a final release above both.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PreRank {
    ImplicitDev,
    Pre(PreTag, u64),
    Final,
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {},
            ord => return ord,
        }
    }
    Ordering::Equal
}

impl Version {
    fn pre_rank(&self) -> PreRank {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreRank::ImplicitDev,
            (None, _, _) => PreRank::Final,
            (Some((tag, n)), _, _) => PreRank::Pre(tag, n),
        }
    }

    // dev absent must sort above any dev number
    fn dev_rank(&self) -> (u8, u64) {
        match self.dev {
            Some(n) => (0, n),
            None => (1, 0),
        }
    }

    /// True when this is a pre-release or dev-release
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segments with trailing zeros removed (the equality form)
    fn trimmed_release(&self) -> &[u64] {
        let mut end = self.release.len();
        while end > 1 && self.release[end - 1] == 0 {
            end -= 1;
        }
        &self.release[..end]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.pre_rank().cmp(&other.pre_rank()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_rank().cmp(&other.dev_rank()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.trimmed_release().hash(state);
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for Version {
    /// Canonical form: lowercased qualifiers, dot-joined local segments
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((tag, n)) = self.pre {
            write!(f, "{}{}", tag, n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if let Some(local) = &self.local {
            let segs: Vec<String> = local.iter().map(LocalSegment::to_string).collect();
            write!(f, "+{}", segs.join("."))?;
        }
        Ok(())
    }
}

// ---- constraint matching ----

impl Constraint {
    /// Parse one constraint clause, cleaning parentheses, quotes and
    /// whitespace before looking for the operator prefix.
    pub fn parse(clause: &str) -> PipqResult<Self> {
        let cleaned: String = clause
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | '"' | '\'') && !c.is_whitespace())
            .collect();

        const OPS: [(&str, ConstraintOp); 8] = [
            ("===", ConstraintOp::ArbitraryEqual),
            ("==", ConstraintOp::Equal),
            ("!=", ConstraintOp::NotEqual),
            ("<=", ConstraintOp::LessEq),
            (">=", ConstraintOp::GreaterEq),
            ("~=", ConstraintOp::Compatible),
            ("<", ConstraintOp::Less),
            (">", ConstraintOp::Greater),
        ];

        for (text, op) in OPS {
            if let Some(rest) = cleaned.strip_prefix(text) {
                let mut version = rest.to_string();
                let mut wildcard = false;
                if let Some(stripped) = version.strip_suffix(".*") {
                    if !matches!(op, ConstraintOp::Equal | ConstraintOp::NotEqual) {
                        return Err(PipqError::InvalidConstraint {
                            clause: clause.trim().to_string(),
                        });
                    }
                    version = stripped.to_string();
                    wildcard = true;
                }
                if version.is_empty() {
                    return Err(PipqError::InvalidConstraint {
                        clause: clause.trim().to_string(),
                    });
                }
                return Ok(Constraint {
                    op,
                    version,
                    wildcard,
                });
            }
        }
        Err(PipqError::InvalidConstraint {
            clause: clause.trim().to_string(),
        })
    }

    /// Parse a comma-separated constraint list
    pub fn parse_set(text: &str) -> PipqResult<Vec<Constraint>> {
        text.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Constraint::parse)
            .collect()
    }
}

/// Candidate release prefix equality against `prefix`, zero-padding the
/// candidate where it is shorter
fn release_prefix_eq(candidate: &[u64], prefix: &[u64]) -> bool {
    prefix
        .iter()
        .enumerate()
        .all(|(i, &p)| candidate.get(i).copied().unwrap_or(0) == p)
}

impl Version {
    fn matches_equal(&self, target: &Version) -> bool {
        // a target without a local segment matches candidates regardless
        // of theirs
        if target.local.is_none() && self.local.is_some() {
            let mut bare = self.clone();
            bare.local = None;
            bare.cmp(target) == Ordering::Equal
        } else {
            self.cmp(target) == Ordering::Equal
        }
    }

    /// Check this version against a single constraint clause
    pub fn fits_constraint(&self, c: &Constraint) -> PipqResult<bool> {
        if c.op == ConstraintOp::ArbitraryEqual {
            return Ok(self.raw == c.version);
        }

        let target = match AnyVersion::parse(&c.version) {
            AnyVersion::Structured(t) => t,
            _ => {
                return Err(PipqError::IncompatibleVersionComparison {
                    left: self.to_string(),
                    right: c.to_string(),
                })
            },
        };

        if c.wildcard {
            let hit =
                self.epoch == target.epoch && release_prefix_eq(&self.release, &target.release);
            return Ok(match c.op {
                ConstraintOp::Equal => hit,
                ConstraintOp::NotEqual => !hit,
                _ => unreachable!("wildcard is rejected for other operators at parse time"),
            });
        }

        match c.op {
            ConstraintOp::Equal => Ok(self.matches_equal(&target)),
            ConstraintOp::NotEqual => Ok(!self.matches_equal(&target)),
            ConstraintOp::LessEq => Ok(self <= &target),
            ConstraintOp::GreaterEq => Ok(self >= &target),
            ConstraintOp::Less => Ok(self < &target),
            ConstraintOp::Greater => Ok(self > &target),
            ConstraintOp::Compatible => {
                if target.release.len() < 2 {
                    return Err(PipqError::InvalidConstraint {
                        clause: c.to_string(),
                    });
                }
                let prefix = &target.release[..target.release.len() - 1];
                Ok(self.epoch == target.epoch
                    && release_prefix_eq(&self.release, prefix)
                    && self >= &target)
            },
            ConstraintOp::ArbitraryEqual => unreachable!("handled above"),
        }
    }

    /// Check this version against every clause in a constraint set (AND)
    pub fn fits_constraints(&self, constraints: &[Constraint]) -> PipqResult<bool> {
        for c in constraints {
            if !self.fits_constraint(c)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::from_str(text).unwrap()
    }

    fn cs(text: &str) -> Vec<Constraint> {
        Constraint::parse_set(text).unwrap()
    }

    #[test]
    fn test_parse_plain_release() {
        let parsed = v("1.2.0");
        assert_eq!(parsed.epoch, 0);
        assert_eq!(parsed.release, vec![1, 2, 0]);
        assert_eq!(parsed.pre, None);
        assert_eq!(parsed.post, None);
        assert_eq!(parsed.dev, None);
        assert_eq!(parsed.local, None);
    }

    #[test]
    fn test_parse_qualifiers() {
        assert_eq!(v("1.0a1").pre, Some((PreTag::Alpha, 1)));
        assert_eq!(v("1.0.alpha.1").pre, Some((PreTag::Alpha, 1)));
        assert_eq!(v("1.0-beta2").pre, Some((PreTag::Beta, 2)));
        assert_eq!(v("1.0preview3").pre, Some((PreTag::Rc, 3)));
        assert_eq!(v("1.0c4").pre, Some((PreTag::Rc, 4)));
        assert_eq!(v("1.0.post2").post, Some(2));
        assert_eq!(v("1.0rev3").post, Some(3));
        assert_eq!(v("1.0-7").post, Some(7));
        assert_eq!(v("1.0.dev5").dev, Some(5));
        assert_eq!(v("2!1.0").epoch, 2);
        assert_eq!(v("V1.0").release, vec![1, 0]);
    }

    #[test]
    fn test_parse_local_segments() {
        let parsed = v("1.0+ubuntu.2");
        assert_eq!(
            parsed.local,
            Some(vec![
                LocalSegment::Alpha("ubuntu".to_string()),
                LocalSegment::Num(2)
            ])
        );
    }

    #[test]
    fn test_nonconforming_degrades_to_legacy() {
        assert!(matches!(AnyVersion::parse("not-a-version"), AnyVersion::Legacy(_)));
        assert!(matches!(AnyVersion::parse("1.0.whatever"), AnyVersion::Legacy(_)));
        assert!(matches!(AnyVersion::parse(""), AnyVersion::Legacy(_)));
        assert!(matches!(AnyVersion::parse("2.0.0"), AnyVersion::Structured(_)));
    }

    #[test]
    fn test_trailing_zero_padding() {
        assert_eq!(v("1.0.0"), v("1.0"));
        assert_eq!(v("1"), v("1.0.0.0"));
        assert!(v("1.0.1") > v("1.0"));
    }

    #[test]
    fn test_qualifier_ordering() {
        assert!(v("1.0.0.dev1") < v("1.0.0a1"));
        assert!(v("1.0.0a1") < v("1.0.0"));
        assert!(v("1.0.0") < v("1.0.0.post1"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b1") < v("1.0rc1"));
        // a dev of a pre sorts below the plain pre
        assert!(v("1.0a1.dev1") < v("1.0a1"));
        assert!(v("1.0.dev1") < v("1.0a1.dev1"));
        // post-release dev
        assert!(v("1.0.post1.dev1") < v("1.0.post1"));
        assert!(v("1.0") < v("1.0.post1.dev1"));
    }

    #[test]
    fn test_epoch_dominates() {
        assert!(v("1!1.0") > v("99.0"));
        assert!(v("2!0.1") > v("1!99.0"));
    }

    #[test]
    fn test_local_ordering() {
        assert!(v("1.0+abc") > v("1.0"));
        // numeric segments sort below alphanumeric segments
        assert!(v("1.0+1") < v("1.0+abc"));
        assert!(v("1.0+ubuntu.1") < v("1.0+ubuntu.2"));
        // a prefix sorts below its extension
        assert!(v("1.0+ubuntu") < v("1.0+ubuntu.1"));
    }

    #[test]
    fn test_legacy_sorts_below_structured() {
        let legacy = AnyVersion::parse("2013b");
        let structured = AnyVersion::parse("0.0.1");
        assert!(legacy < structured);
        assert!(AnyVersion::parse("apple") < AnyVersion::parse("banana"));
    }

    #[test]
    fn test_sentinels_bound_everything() {
        let versions = [
            AnyVersion::parse("0.0.0"),
            AnyVersion::parse("weird"),
            AnyVersion::parse("99!99"),
        ];
        for version in &versions {
            assert!(AnyVersion::Floor < *version);
            assert!(*version < AnyVersion::Ceiling);
        }
    }

    #[test]
    fn test_fits_constraint_ranges() {
        assert!(v("1.5.0").fits_constraints(&cs(">=1.0,<2.0")).unwrap());
        assert!(!v("2.0.0").fits_constraints(&cs(">=1.0,<2.0")).unwrap());
        assert!(v("1.0.0").fits_constraints(&cs(">=1.0")).unwrap());
        assert!(!v("0.9").fits_constraints(&cs(">0.9")).unwrap());
    }

    #[test]
    fn test_fits_compatible_release() {
        assert!(v("2.3.1").fits_constraints(&cs("~=2.2")).unwrap());
        assert!(!v("3.0.0").fits_constraints(&cs("~=2.2")).unwrap());
        assert!(v("2.2.5").fits_constraints(&cs("~=2.2.3")).unwrap());
        assert!(!v("2.3.0").fits_constraints(&cs("~=2.2.3")).unwrap());
        assert!(!v("2.2.2").fits_constraints(&cs("~=2.2.3")).unwrap());
    }

    #[test]
    fn test_fits_wildcard() {
        assert!(v("1.4.5").fits_constraints(&cs("==1.4.*")).unwrap());
        assert!(v("1.4").fits_constraints(&cs("==1.4.*")).unwrap());
        assert!(!v("1.5.0").fits_constraints(&cs("==1.4.*")).unwrap());
        assert!(v("1.5.0").fits_constraints(&cs("!=1.4.*")).unwrap());
    }

    #[test]
    fn test_fits_equality_ignores_candidate_local() {
        assert!(v("1.0+build.7").fits_constraints(&cs("==1.0")).unwrap());
        assert!(!v("1.0+build.7").fits_constraints(&cs("==1.0+other")).unwrap());
        assert!(v("1.0+build.7").fits_constraints(&cs("==1.0+build.7")).unwrap());
    }

    #[test]
    fn test_fits_arbitrary_equality() {
        assert!(v("1.0").fits_constraints(&cs("===1.0")).unwrap());
        assert!(!v("1.0.0").fits_constraints(&cs("===1.0")).unwrap());
    }

    #[test]
    fn test_fits_cleans_decoration() {
        assert!(v("1.5.0").fits_constraints(&cs("(>=1.0)")).unwrap());
        assert!(v("1.5.0").fits_constraints(&cs("'>= 1.0'")).unwrap());
    }

    #[test]
    fn test_legacy_constraint_comparison_is_an_error() {
        let legacy = AnyVersion::parse("2013b");
        let err = legacy.fits_constraints(&cs(">=1.0")).unwrap_err();
        assert!(matches!(
            err,
            PipqError::IncompatibleVersionComparison { .. }
        ));
        // arbitrary equality still works on raw text
        assert!(legacy.fits_constraints(&cs("===2013b")).unwrap());
    }

    #[test]
    fn test_structured_vs_legacy_target_is_an_error() {
        let err = v("1.0").fits_constraints(&cs(">=not.a.version.!")).unwrap_err();
        assert!(matches!(
            err,
            PipqError::IncompatibleVersionComparison { .. }
        ));
    }

    #[test]
    fn test_invalid_constraint_clauses() {
        assert!(Constraint::parse("1.0").is_err());
        assert!(Constraint::parse("~=1.*").is_err());
        assert!(Constraint::parse(">=").is_err());
    }

    #[test]
    fn test_canonical_display() {
        assert_eq!(v("1.0.0RC1").to_string(), "1.0.0rc1");
        assert_eq!(v("1.0-post2").to_string(), "1.0.post2");
        assert_eq!(v("2!1.0.dev3").to_string(), "2!1.0.dev3");
        assert_eq!(v("1.0+Ubuntu-1").to_string(), "1.0+ubuntu.1");
    }

    #[test]
    fn test_is_prerelease() {
        assert!(v("1.0a1").is_prerelease());
        assert!(v("1.0.dev1").is_prerelease());
        assert!(!v("1.0.post1").is_prerelease());
        assert!(!v("1.0").is_prerelease());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn version_strategy() -> impl Strategy<Value = String> {
        (
            0u64..3,
            prop::collection::vec(0u64..50, 1..4),
            prop::option::of((0usize..3, 0u64..20)),
            prop::option::of(0u64..20),
            prop::option::of(0u64..20),
            prop::option::of(prop::collection::vec("[a-z0-9]{1,4}", 1..3)),
        )
            .prop_map(|(epoch, release, pre, post, dev, local)| {
                let mut s = String::new();
                if epoch != 0 {
                    s.push_str(&format!("{}!", epoch));
                }
                s.push_str(
                    &release
                        .iter()
                        .map(u64::to_string)
                        .collect::<Vec<_>>()
                        .join("."),
                );
                if let Some((tag, n)) = pre {
                    let tag = ["a", "b", "rc"][tag];
                    s.push_str(&format!("{}{}", tag, n));
                }
                if let Some(n) = post {
                    s.push_str(&format!(".post{}", n));
                }
                if let Some(n) = dev {
                    s.push_str(&format!(".dev{}", n));
                }
                if let Some(segs) = local {
                    s.push_str(&format!("+{}", segs.join(".")));
                }
                s
            })
    }

    proptest! {
        // parse∘format is idempotent after canonicalization
        #[test]
        fn canonical_round_trip(text in version_strategy()) {
            let first = Version::from_str(&text).unwrap();
            let reparsed = Version::from_str(&first.to_string()).unwrap();
            prop_assert_eq!(&first, &reparsed);
            prop_assert_eq!(first.to_string(), reparsed.to_string());
        }
    }

    proptest! {
        #[test]
        fn ordering_is_transitive(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            let a = Version::from_str(&a).unwrap();
            let b = Version::from_str(&b).unwrap();
            let c = Version::from_str(&c).unwrap();

            if a < b && b < c {
                prop_assert!(a < c);
            }
            if a > b && b > c {
                prop_assert!(a > c);
            }
        }
    }

    proptest! {
        // equality from zero-padding must agree in both directions
        #[test]
        fn padding_symmetry(release in prop::collection::vec(0u64..20, 1..4), pad in 0usize..3) {
            let short = release
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(".");
            let padded = format!("{}{}", short, ".0".repeat(pad));
            let a = Version::from_str(&short).unwrap();
            let b = Version::from_str(&padded).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
