//! `pipq <package> [release]` command implementation.
//!
//! Prints the package info card, optionally the release file listing and
//! vulnerability details.

use pipq_core::error::PipqResult;
use pipq_registry::PackageResponse;

use super::CommandContext;

/// Execute the default info command
pub async fn execute(
    package: String,
    release: Option<String>,
    urls: bool,
    vulnerabilities: bool,
    ctx: &CommandContext,
) -> PipqResult<()> {
    if vulnerabilities && release.is_none() {
        ctx.output.error(
            "Vulnerability lookups need an explicit release, e.g. 'pipq django 3.1.0 --vulns'",
        );
        std::process::exit(2);
    }

    let pkg = match &release {
        Some(release) => ctx.fetcher.get_release(&package, release).await?,
        None => ctx.fetcher.get_package(&package).await?,
    };

    if urls {
        print_urls(&pkg, ctx);
        return Ok(());
    }
    if vulnerabilities {
        print_vulnerabilities(&pkg, ctx);
        return Ok(());
    }

    print_card(&pkg, ctx);
    Ok(())
}

fn print_card(pkg: &PackageResponse, ctx: &CommandContext) {
    let info = &pkg.info;
    let out = &ctx.output;

    out.heading(&format!("Info for package {}", pkg.release_name()));
    out.line("");
    out.field("Summary", info.summary.as_deref().unwrap_or("N/A"));
    out.field(
        "Release date",
        &pkg.upload_time()
            .map(|at| at.format("%Y-%m-%d at %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    );
    out.field("Homepage", info.home_page.as_deref().unwrap_or("N/A"));
    out.field("PyPI URL", info.package_url.as_deref().unwrap_or("N/A"));
    out.field(
        "Documentation",
        pkg.documentation_url().unwrap_or("N/A"),
    );
    out.field(
        "Author",
        &format!(
            "{} <{}>",
            info.author.as_deref().unwrap_or("N/A"),
            info.author_email.as_deref().unwrap_or("N/A")
        ),
    );
    out.field(
        "Maintainer",
        &format!(
            "{} <{}>",
            info.maintainer
                .as_deref()
                .or(info.author.as_deref())
                .unwrap_or("N/A"),
            info.maintainer_email
                .as_deref()
                .or(info.author_email.as_deref())
                .unwrap_or("N/A")
        ),
    );
    out.field("License", info.license.as_deref().unwrap_or("N/A"));
    out.field(
        "Python version(s)",
        info.requires_python.as_deref().unwrap_or("Not specified"),
    );

    let lines = pkg.dependency_lines();
    out.field("Dependencies", &format!("({})", lines.len()));
    for line in lines {
        out.line(&format!("\t\t{}", line));
    }

    if !pkg.vulnerabilities.is_empty() {
        ctx.output.warning_block(
            "== WARNING ==",
            &format!(
                "This version has {} known security vulnerabilities, use the '--vulns' flag to view them",
                pkg.vulnerabilities.len()
            ),
        );
    }
    if info.yanked {
        ctx.output.warning_block(
            "== NOTE ==",
            &format!(
                "This version has been yanked from the index.\n\tReason: '{}'",
                info.yanked_reason.as_deref().unwrap_or("not given")
            ),
        );
    }
}

fn print_urls(pkg: &PackageResponse, ctx: &CommandContext) {
    ctx.output
        .heading(&format!("Release files for {}", pkg.release_name()));
    if pkg.urls.is_empty() {
        ctx.output.info("No files uploaded for this release");
        return;
    }
    for file in &pkg.urls {
        ctx.output.line("");
        ctx.output.field("File", &file.filename);
        ctx.output.field("Type", &file.packagetype);
        ctx.output.field("Size", &format!("{} bytes", file.size));
        if let Some(sha256) = &file.digests.sha256 {
            ctx.output.field("SHA256", sha256);
        }
        ctx.output.field("URL", &file.url);
    }
}

fn print_vulnerabilities(pkg: &PackageResponse, ctx: &CommandContext) {
    if pkg.vulnerabilities.is_empty() {
        ctx.output.success(&format!(
            "No known vulnerabilities for {}",
            pkg.release_name()
        ));
        return;
    }
    ctx.output.heading(&format!(
        "{} known vulnerabilities for {}",
        pkg.vulnerabilities.len(),
        pkg.release_name()
    ));
    for vuln in &pkg.vulnerabilities {
        ctx.output.line("");
        ctx.output.field("ID", &vuln.id);
        if !vuln.aliases.is_empty() {
            ctx.output.field("Aliases", &vuln.aliases.join(", "));
        }
        if !vuln.fixed_in.is_empty() {
            ctx.output.field("Fixed in", &vuln.fixed_in.join(", "));
        }
        ctx.output.field("Link", &vuln.link);
        ctx.output.line(&vuln.details);
    }
}
