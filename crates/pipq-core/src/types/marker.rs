//! Environment markers and dependency applicability.
//!
//! `MarkerEnvironment` is an immutable snapshot of the facts markers are
//! evaluated against (interpreter version, platform, OS, implementation).
//! It is built once at startup and passed explicitly to the evaluator so
//! tests can run against synthetic environments.

use std::collections::BTreeSet;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::requirement::{MarkerClause, MarkerGroup, MarkerOp, Requirement};
use super::version::{Constraint, Version};
use crate::error::{PipqError, PipqResult};

/// Immutable snapshot of the current environment's marker values.
///
/// The three version-typed keys are stored parsed so they compose with
/// constraint matching; every other key is an exact string compared with
/// plain equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEnvironment {
    pub os_name: String,
    pub sys_platform: String,
    pub platform_machine: String,
    pub platform_python_implementation: String,
    pub platform_release: String,
    pub platform_system: String,
    pub platform_version: String,
    pub python_version: Version,
    pub python_full_version: Version,
    pub implementation_name: String,
    pub implementation_version: Version,
}

impl MarkerEnvironment {
    /// Build an environment from the host platform and a target interpreter
    /// version string such as `"3.11.9"`.
    ///
    /// OS facts come from the running platform; `platform_release` and
    /// `platform_version` are kernel strings the standard library cannot
    /// see, so they stay empty and only ever match an explicit empty
    /// comparison.
    pub fn host(python_full_version: &str) -> PipqResult<Self> {
        let full = Version::from_str(python_full_version)?;
        let mut short = full.clone();
        short.release.truncate(2);
        short.raw = short.to_string();

        let (os_name, sys_platform, platform_system) = match std::env::consts::OS {
            "linux" => ("posix", "linux", "Linux"),
            "macos" => ("posix", "darwin", "Darwin"),
            "windows" => ("nt", "win32", "Windows"),
            other => ("posix", other, other),
        };

        Ok(MarkerEnvironment {
            os_name: os_name.to_string(),
            sys_platform: sys_platform.to_string(),
            platform_machine: std::env::consts::ARCH.to_string(),
            platform_python_implementation: "CPython".to_string(),
            platform_release: String::new(),
            platform_system: platform_system.to_string(),
            platform_version: String::new(),
            python_version: short,
            python_full_version: full.clone(),
            implementation_name: "cpython".to_string(),
            implementation_version: full,
        })
    }
}

/// Decides which requirements apply to a given environment and extras set
#[derive(Debug, Clone)]
pub struct DependencyEvaluator<'a> {
    env: &'a MarkerEnvironment,
}

impl<'a> DependencyEvaluator<'a> {
    /// Create an evaluator over a marker environment
    pub fn new(env: &'a MarkerEnvironment) -> Self {
        Self { env }
    }

    fn version_clause(&self, value: &Version, clause: &MarkerClause) -> PipqResult<bool> {
        let constraint = Constraint::parse(&format!("{}{}", clause.op.as_str(), clause.value))?;
        value.fits_constraint(&constraint)
    }

    fn string_clause(&self, value: &str, clause: &MarkerClause) -> PipqResult<bool> {
        match clause.op {
            MarkerOp::Equal => Ok(value == clause.value),
            MarkerOp::NotEqual => Ok(value != clause.value),
            op => Err(PipqError::UnknownMarkerOperator {
                key: clause.key.clone(),
                op: op.as_str().to_string(),
            }),
        }
    }

    fn clause_holds(&self, clause: &MarkerClause) -> PipqResult<bool> {
        match clause.key.as_str() {
            "python_version" => self.version_clause(&self.env.python_version, clause),
            "python_full_version" => self.version_clause(&self.env.python_full_version, clause),
            "implementation_version" => {
                self.version_clause(&self.env.implementation_version, clause)
            },
            "os_name" => self.string_clause(&self.env.os_name, clause),
            "sys_platform" => self.string_clause(&self.env.sys_platform, clause),
            "platform_machine" => self.string_clause(&self.env.platform_machine, clause),
            "platform_python_implementation" => {
                self.string_clause(&self.env.platform_python_implementation, clause)
            },
            "platform_release" => self.string_clause(&self.env.platform_release, clause),
            "platform_system" => self.string_clause(&self.env.platform_system, clause),
            "platform_version" => self.string_clause(&self.env.platform_version, clause),
            "implementation_name" => self.string_clause(&self.env.implementation_name, clause),
            other => Err(PipqError::UnknownMarkerKey {
                key: other.to_string(),
            }),
        }
    }

    fn group_holds(&self, group: &MarkerGroup) -> PipqResult<bool> {
        for clause in &group.any_of {
            if self.clause_holds(clause)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Decide whether a requirement applies under this environment and the
    /// requesting package's active extras.
    pub fn applies(
        &self,
        requirement: &Requirement,
        active_extras: &BTreeSet<String>,
    ) -> PipqResult<bool> {
        if !requirement.activation_extras.is_empty()
            && requirement.activation_extras.is_disjoint(active_extras)
        {
            return Ok(false);
        }
        for group in &requirement.markers {
            if !self.group_holds(group)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Parse a batch of requirement lines and keep the ones that apply.
    ///
    /// Lines that fail to parse are skipped with a warning rather than
    /// aborting their siblings. Later surviving entries shadow earlier
    /// ones under the same name; iteration order stays deterministic.
    pub fn filter_dependencies<I>(
        &self,
        lines: I,
        active_extras: &BTreeSet<String>,
    ) -> PipqResult<IndexMap<String, Requirement>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut applicable = IndexMap::new();
        for line in lines {
            let line = line.as_ref();
            let requirement = match Requirement::parse(line) {
                Ok(requirement) => requirement,
                Err(err) => {
                    warn!("skipping unparseable requirement '{}': {}", line, err);
                    continue;
                },
            };
            if self.applies(&requirement, active_extras)? {
                debug!("requirement applies: {}", requirement.name);
                applicable.insert(requirement.name.clone(), requirement);
            }
        }
        Ok(applicable)
    }
}
