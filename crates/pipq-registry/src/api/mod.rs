//! Package index API response types.
//!
//! Field-by-field serde mappings for the PyPI JSON API. Optional string
//! fields that the index publishes as `""` deserialize to `None` so
//! downstream code only has one empty case to handle.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use pipq_core::utils::canonicalize_name;
use pipq_core::AnyVersion;

fn empty_str_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Full package response from the index
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageResponse {
    pub info: PackageInfo,
    #[serde(default)]
    pub last_serial: i64,
    /// All releases of the package; present on the unversioned endpoint
    #[serde(default)]
    pub releases: HashMap<String, Vec<ReleaseFile>>,
    /// Files of the queried release
    #[serde(default)]
    pub urls: Vec<ReleaseFile>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

/// Metadata from the response key `info`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackageInfo {
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub author_email: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub bugtrack_url: Option<String>,
    #[serde(default)]
    pub classifiers: Vec<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub description_content_type: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub docs_url: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub download_url: Option<String>,
    #[serde(default)]
    pub downloads: BTreeMap<String, i64>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub home_page: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub license: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub maintainer: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub maintainer_email: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub package_url: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub project_url: Option<String>,
    /// Labelled project links; values can be null in the wild
    #[serde(default)]
    pub project_urls: Option<BTreeMap<String, Option<String>>>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub release_url: Option<String>,
    /// Raw dependency requirement lines
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub requires_python: Option<String>,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub summary: Option<String>,
    pub version: String,
    #[serde(default)]
    pub yanked: bool,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub yanked_reason: Option<String>,
}

/// Checksum digests published with a release file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Digests {
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub blake2b_256: Option<String>,
}

/// One uploaded file of a release (sdist or wheel)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseFile {
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub comment_text: Option<String>,
    #[serde(default)]
    pub digests: Digests,
    #[serde(default)]
    pub downloads: i64,
    pub filename: String,
    #[serde(default)]
    pub has_sig: bool,
    #[serde(default)]
    pub md5_digest: Option<String>,
    #[serde(default)]
    pub packagetype: String,
    /// PEP 425 compatibility tag, or `source` for sdists
    #[serde(default)]
    pub python_version: String,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub requires_python: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub upload_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub upload_time_iso_8601: Option<DateTime<Utc>>,
    pub url: String,
    #[serde(default)]
    pub yanked: bool,
    #[serde(default, deserialize_with = "empty_str_as_none")]
    pub yanked_reason: Option<String>,
}

impl ReleaseFile {
    /// Upload timestamp, preferring the timezone-aware field
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.upload_time_iso_8601
            .or_else(|| self.upload_time.map(|t| t.and_utc()))
    }
}

/// Known vulnerability affecting a release
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Vulnerability {
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub fixed_in: Vec<String>,
    pub id: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub source: String,
}

impl PackageResponse {
    /// Package name with separators collapsed and lowercased
    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.info.name)
    }

    /// Parsed version of the queried release
    pub fn version(&self) -> AnyVersion {
        AnyVersion::parse(&self.info.version)
    }

    /// Human-readable `name vVERSION` label
    pub fn release_name(&self) -> String {
        format!("{} v{}", self.info.name, self.info.version)
    }

    /// Upload time of the queried release, when the index knows it
    pub fn upload_time(&self) -> Option<DateTime<Utc>> {
        if let Some(files) = self.releases.get(&self.info.version) {
            if let Some(at) = files.first().and_then(ReleaseFile::uploaded_at) {
                return Some(at);
            }
        }
        self.urls.first().and_then(ReleaseFile::uploaded_at)
    }

    /// Raw dependency requirement lines of the queried release
    pub fn dependency_lines(&self) -> &[String] {
        self.info.requires_dist.as_deref().unwrap_or(&[])
    }

    /// All releases with at least one uploaded file, sorted ascending by
    /// parsed version
    pub fn sorted_releases(&self) -> Vec<(AnyVersion, &[ReleaseFile])> {
        let mut releases: Vec<(AnyVersion, &[ReleaseFile])> = self
            .releases
            .iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(raw, files)| (AnyVersion::parse(raw), files.as_slice()))
            .collect();
        releases.sort_by(|a, b| a.0.cmp(&b.0));
        releases
    }

    /// Project documentation URL, when one is published
    pub fn documentation_url(&self) -> Option<&str> {
        self.info
            .project_urls
            .as_ref()
            .and_then(|urls| urls.get("Documentation"))
            .and_then(Option::as_deref)
    }
}
