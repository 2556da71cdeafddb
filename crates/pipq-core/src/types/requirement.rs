//! Dependency requirement parsing.
//!
//! Turns a raw requirement line (`requests[security]>=2.0,<3.0;
//! python_version >= '3.6' and extra == 'dev'`) into a structured record:
//! package name, requested extras, version constraints, activation extras
//! and environment marker clauses.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::version::Constraint;
use crate::error::{PipqError, PipqResult};

/// Comparison operator inside an environment marker clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerOp {
    Equal,
    NotEqual,
    LessEq,
    GreaterEq,
    Less,
    Greater,
}

impl MarkerOp {
    /// Operator spelling as it appears in requirement strings
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerOp::Equal => "==",
            MarkerOp::NotEqual => "!=",
            MarkerOp::LessEq => "<=",
            MarkerOp::GreaterEq => ">=",
            MarkerOp::Less => "<",
            MarkerOp::Greater => ">",
        }
    }

    /// True for the equality-class operators accepted on string-typed keys
    pub fn is_equality(&self) -> bool {
        matches!(self, MarkerOp::Equal | MarkerOp::NotEqual)
    }
}

/// One `key OP value` marker clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerClause {
    pub key: String,
    pub op: MarkerOp,
    pub value: String,
}

impl fmt::Display for MarkerClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.key, self.op.as_str(), self.value)
    }
}

/// One conjunct of a marker expression: a disjunction of alternatives.
///
/// A group holds when any alternative holds; groups are AND'd together.
/// Alternatives are kept rather than overwritten so OR keeps proper union
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerGroup {
    pub any_of: Vec<MarkerClause>,
}

impl fmt::Display for MarkerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.any_of.iter().map(MarkerClause::to_string).collect();
        write!(f, "{}", parts.join(" or "))
    }
}

/// Parsed dependency requirement line
///
/// A requirement with no constraints and no markers always applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name exactly as written
    pub name: String,
    /// Extras requested on the dependency itself (`requests[security]`)
    pub extras: Vec<String>,
    /// Extras the *requesting* package must have active for this
    /// requirement to apply, collected from `extra == '...'` clauses
    pub activation_extras: BTreeSet<String>,
    /// Version constraint clauses, AND'd together
    pub constraints: Vec<Constraint>,
    /// Environment marker conjuncts
    pub markers: Vec<MarkerGroup>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Split a line on the first `;` that sits outside quotes
fn split_qualifier(line: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {},
            None => match c {
                '\'' | '"' => quote = Some(c),
                ';' => return (&line[..i], Some(&line[i + 1..])),
                _ => {},
            },
        }
    }
    (line, None)
}

/// Tokenize one `key OP value` alternative; `None` when the text does not
/// fit the shape (the caller ignores it, mirroring the permissive handling
/// of oddball qualifiers in published metadata)
fn parse_marker_clause(text: &str) -> Option<MarkerClause> {
    let trimmed = text.trim();
    let idx = trimmed.find(['=', '!', '<', '>'])?;
    let (key_part, rest) = trimmed.split_at(idx);

    let (op, op_len) = if rest.starts_with("==") {
        (MarkerOp::Equal, 2)
    } else if rest.starts_with("!=") {
        (MarkerOp::NotEqual, 2)
    } else if rest.starts_with("<=") {
        (MarkerOp::LessEq, 2)
    } else if rest.starts_with(">=") {
        (MarkerOp::GreaterEq, 2)
    } else if rest.starts_with('<') {
        (MarkerOp::Less, 1)
    } else if rest.starts_with('>') {
        (MarkerOp::Greater, 1)
    } else {
        return None;
    };

    let key = key_part.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let value: String = rest[op_len..]
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '"' | '\'') && !c.is_whitespace())
        .collect();
    if value.is_empty() {
        return None;
    }

    Some(MarkerClause {
        key: key.to_string(),
        op,
        value,
    })
}

impl Requirement {
    /// Parse a single requirement line.
    ///
    /// An empty package clause is a `MalformedRequirement` error; a
    /// qualifier conjunct that does not tokenize is skipped, not fatal.
    pub fn parse(line: &str) -> PipqResult<Self> {
        let (package_clause, qualifier) = split_qualifier(line);
        let package_clause = package_clause.trim();

        let name: String = package_clause.chars().take_while(|&c| is_name_char(c)).collect();
        if name.is_empty() {
            return Err(PipqError::MalformedRequirement {
                line: line.trim().to_string(),
            });
        }
        let mut rest = package_clause[name.len()..].trim_start();

        let mut extras = Vec::new();
        if let Some(after_bracket) = rest.strip_prefix('[') {
            match after_bracket.find(']') {
                Some(end) => {
                    extras = after_bracket[..end]
                        .split(',')
                        .map(str::trim)
                        .filter(|e| !e.is_empty())
                        .map(str::to_string)
                        .collect();
                    rest = after_bracket[end + 1..].trim_start();
                },
                None => {
                    return Err(PipqError::MalformedRequirement {
                        line: line.trim().to_string(),
                    })
                },
            }
        }

        let constraints = Constraint::parse_set(rest)?;

        let mut activation_extras = BTreeSet::new();
        let mut markers = Vec::new();
        if let Some(qualifier) = qualifier {
            for conjunct in qualifier.split(" and ") {
                let mut any_of = Vec::new();
                for alternative in conjunct.split(" or ") {
                    let Some(clause) = parse_marker_clause(alternative) else {
                        continue;
                    };
                    if clause.key == "extra" {
                        activation_extras.insert(clause.value);
                    } else {
                        any_of.push(clause);
                    }
                }
                if !any_of.is_empty() {
                    markers.push(MarkerGroup { any_of });
                }
            }
        }

        Ok(Requirement {
            name,
            extras,
            activation_extras,
            constraints,
            markers,
        })
    }

    /// True when no constraint or marker could ever exclude this requirement
    pub fn always_applies(&self) -> bool {
        self.constraints.is_empty() && self.markers.is_empty() && self.activation_extras.is_empty()
    }

    /// All marker clauses recorded under `key`, across groups
    pub fn marker_clauses<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a MarkerClause> {
        self.markers
            .iter()
            .flat_map(|g| g.any_of.iter())
            .filter(move |c| c.key == key)
    }
}

impl FromStr for Requirement {
    type Err = PipqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let constraints: Vec<String> = self.constraints.iter().map(Constraint::to_string).collect();
        write!(f, "{}", constraints.join(","))?;
        if !self.markers.is_empty() || !self.activation_extras.is_empty() {
            let mut parts: Vec<String> = self.markers.iter().map(MarkerGroup::to_string).collect();
            parts.extend(
                self.activation_extras
                    .iter()
                    .map(|e| format!("extra == '{}'", e)),
            );
            write!(f, "; {}", parts.join(" and "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::version::ConstraintOp;

    #[test]
    fn test_parse_bare_name() {
        let req = Requirement::parse("requests").unwrap();
        assert_eq!(req.name, "requests");
        assert!(req.extras.is_empty());
        assert!(req.constraints.is_empty());
        assert!(req.markers.is_empty());
        assert!(req.always_applies());
    }

    #[test]
    fn test_parse_full_line() {
        let req = Requirement::parse(
            "requests[security]>=2.0,<3.0; python_version>='3.6' and extra=='dev'",
        )
        .unwrap();
        assert_eq!(req.name, "requests");
        assert_eq!(req.extras, vec!["security"]);
        assert_eq!(req.constraints.len(), 2);
        assert_eq!(req.constraints[0].op, ConstraintOp::GreaterEq);
        assert_eq!(req.constraints[0].version, "2.0");
        assert_eq!(req.constraints[1].op, ConstraintOp::Less);
        assert_eq!(req.constraints[1].version, "3.0");

        let clauses: Vec<_> = req.marker_clauses("python_version").collect();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].op, MarkerOp::GreaterEq);
        assert_eq!(clauses[0].value, "3.6");

        assert!(req.activation_extras.contains("dev"));
    }

    #[test]
    fn test_parse_parenthesized_constraints() {
        let req = Requirement::parse("idna (>=2.5,<3)").unwrap();
        assert_eq!(req.name, "idna");
        assert_eq!(req.constraints.len(), 2);
        assert_eq!(req.constraints[1].version, "3");
    }

    #[test]
    fn test_parse_multiple_extras() {
        let req = Requirement::parse("celery[redis, msgpack]>=5.0").unwrap();
        assert_eq!(req.extras, vec!["redis", "msgpack"]);
    }

    #[test]
    fn test_or_groups_keep_union_semantics() {
        // both alternatives must survive under the same key rather than the
        // later one overwriting the earlier one
        let req = Requirement::parse(
            "tool; sys_platform == 'darwin' or sys_platform == 'linux'",
        )
        .unwrap();
        assert_eq!(req.markers.len(), 1);
        assert_eq!(req.markers[0].any_of.len(), 2);
        assert_eq!(req.markers[0].any_of[0].value, "darwin");
        assert_eq!(req.markers[0].any_of[1].value, "linux");
    }

    #[test]
    fn test_and_conjuncts_become_separate_groups() {
        let req = Requirement::parse(
            "tool; python_version >= '3.6' and python_version < '4.0'",
        )
        .unwrap();
        assert_eq!(req.markers.len(), 2);
        let clauses: Vec<_> = req.marker_clauses("python_version").collect();
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn test_or_extras_all_activate() {
        let req = Requirement::parse("tool; extra == 'docs' or extra == 'tests'").unwrap();
        assert!(req.activation_extras.contains("docs"));
        assert!(req.activation_extras.contains("tests"));
        assert!(req.markers.is_empty());
    }

    #[test]
    fn test_semicolon_inside_quotes_is_not_a_split() {
        let req = Requirement::parse("tool; platform_release == 'a;b'").unwrap();
        assert_eq!(req.name, "tool");
        let clauses: Vec<_> = req.marker_clauses("platform_release").collect();
        assert_eq!(clauses[0].value, "a;b");
    }

    #[test]
    fn test_unparseable_conjunct_is_ignored() {
        let req = Requirement::parse("tool; what even is this").unwrap();
        assert!(req.markers.is_empty());
        assert!(req.always_applies());
    }

    #[test]
    fn test_empty_package_clause_is_malformed() {
        assert!(matches!(
            Requirement::parse("; python_version >= '3.6'"),
            Err(PipqError::MalformedRequirement { .. })
        ));
        assert!(matches!(
            Requirement::parse("   "),
            Err(PipqError::MalformedRequirement { .. })
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let line = "requests[security]>=2.0,<3.0; python_version >= '3.6'";
        let req = Requirement::parse(line).unwrap();
        let reparsed = Requirement::parse(&req.to_string()).unwrap();
        assert_eq!(req, reparsed);
    }
}
