//! `pipq releases` command implementation.
//!
//! Lists a package's releases in ascending version order, optionally
//! bounded by upload date or by version. Version bounds lean on the
//! floor/ceiling sentinels so an open end needs no special casing.

use chrono::NaiveDate;

use pipq_core::error::{PipqError, PipqResult};
use pipq_core::AnyVersion;

use super::CommandContext;

/// Date and version bounds applied to the release listing
#[derive(Debug, Clone)]
pub struct ReleaseBounds {
    pub after_version: AnyVersion,
    pub before_version: AnyVersion,
    pub after_date: Option<NaiveDate>,
    pub before_date: Option<NaiveDate>,
}

impl ReleaseBounds {
    /// Build bounds from raw CLI arguments; absent version bounds fall
    /// back to the sentinels.
    pub fn from_args(
        after_version: Option<&str>,
        before_version: Option<&str>,
        after_date: Option<&str>,
        before_date: Option<&str>,
    ) -> PipqResult<Self> {
        Ok(Self {
            after_version: after_version
                .map(AnyVersion::parse)
                .unwrap_or(AnyVersion::Floor),
            before_version: before_version
                .map(AnyVersion::parse)
                .unwrap_or(AnyVersion::Ceiling),
            after_date: after_date.map(parse_date).transpose()?,
            before_date: before_date.map(parse_date).transpose()?,
        })
    }

    /// True when a release falls strictly inside every bound
    pub fn contains(&self, version: &AnyVersion, uploaded: Option<NaiveDate>) -> bool {
        if *version <= self.after_version || *version >= self.before_version {
            return false;
        }
        match uploaded {
            Some(date) => {
                self.after_date.map_or(true, |a| date > a)
                    && self.before_date.map_or(true, |b| date < b)
            },
            // a date bound can only admit releases with a known upload time
            None => self.after_date.is_none() && self.before_date.is_none(),
        }
    }
}

fn parse_date(text: &str) -> PipqResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| PipqError::InvalidDate {
        text: text.to_string(),
    })
}

/// Execute the `pipq releases` command
pub async fn execute(
    package: String,
    after_version: Option<String>,
    before_version: Option<String>,
    after_date: Option<String>,
    before_date: Option<String>,
    ctx: &CommandContext,
) -> PipqResult<()> {
    let bounds = ReleaseBounds::from_args(
        after_version.as_deref(),
        before_version.as_deref(),
        after_date.as_deref(),
        before_date.as_deref(),
    )?;

    let pkg = ctx.fetcher.get_package(&package).await?;
    ctx.output
        .heading(&format!("Releases for {}", pkg.info.name));

    let mut shown = 0usize;
    for (version, files) in pkg.sorted_releases() {
        let uploaded = files
            .first()
            .and_then(|f| f.uploaded_at())
            .map(|at| at.date_naive());
        if !bounds.contains(&version, uploaded) {
            continue;
        }
        shown += 1;

        let date = uploaded
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        let yanked = files.iter().all(|f| f.yanked);
        if yanked {
            ctx.output
                .warn(&format!("{}  ({})  [yanked]", version, date));
        } else {
            ctx.output.line(&format!("{}  ({})", version, date));
        }
    }

    if shown == 0 {
        ctx.output.info("No releases match the given bounds");
    }
    Ok(())
}
