//! Lazily-populated dependency tree.
//!
//! A `DependencyNode` starts as nothing more than a parsed requirement.
//! `populate` resolves it against the package index exactly once,
//! transitioning it to the populated state and building child nodes from
//! the dependencies that apply to the current environment. Resolved fields
//! are unreadable before population; asking for one is a `NotPopulated`
//! error naming the field.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use pipq_core::error::{PipqError, PipqResult};
use pipq_core::utils::canonicalize_name;
use pipq_core::{
    AnyVersion, Constraint, DependencyEvaluator, MarkerEnvironment, MarkerGroup, Requirement,
};
use pipq_registry::{MetadataCache, PackageResponse, RegistryClient};

use crate::select::ReleaseSelector;

/// Registry access shared by every node of a tree: one pooled client plus
/// one process-lifetime metadata cache
#[derive(Debug, Clone)]
pub struct PackageFetcher {
    client: Arc<RegistryClient>,
    cache: Arc<MetadataCache>,
}

impl PackageFetcher {
    /// Create a fetcher with a fresh cache
    pub fn new(client: Arc<RegistryClient>) -> Self {
        Self::with_cache(client, Arc::new(MetadataCache::new()))
    }

    /// Create a fetcher sharing an existing cache
    pub fn with_cache(client: Arc<RegistryClient>, cache: Arc<MetadataCache>) -> Self {
        Self { client, cache }
    }

    /// Fetch a package's latest-release metadata and release list
    pub async fn get_package(&self, name: &str) -> PipqResult<PackageResponse> {
        let key = MetadataCache::key(name, None);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let package = self.client.fetch_package(name).await?;
        self.cache.insert(key, package.clone());
        Ok(package)
    }

    /// Fetch the metadata of one specific release
    pub async fn get_release(&self, name: &str, release: &str) -> PipqResult<PackageResponse> {
        let key = MetadataCache::key(name, Some(release));
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let package = self.client.fetch_release(name, release).await?;
        self.cache.insert(key, package.clone());
        Ok(package)
    }
}

/// Data owned by a populated node that resolved to a concrete release
#[derive(Debug, Clone)]
pub struct ResolvedRelease {
    /// The release that was selected
    pub version: AnyVersion,
    /// Full metadata of that release
    pub package: PackageResponse,
    /// Child nodes for the dependencies that apply, unpopulated until the
    /// recursion reaches them
    pub dependencies: Vec<DependencyNode>,
}

/// Population state: a node moves `Unpopulated -> Populated` exactly once
/// and never back. `Populated(None)` means the lookup ran but no release
/// satisfied the constraints.
#[derive(Debug, Clone)]
enum NodeState {
    Unpopulated,
    Populated(Option<Box<ResolvedRelease>>),
}

/// One edge of the dependency tree
#[derive(Debug, Clone)]
pub struct DependencyNode {
    /// Package name as written in the requirement
    pub name: String,
    /// Version constraints this edge imposes
    pub constraints: Vec<Constraint>,
    /// Environment markers recorded on the requirement
    pub markers: Vec<MarkerGroup>,
    /// Extras requested on the dependency itself
    pub extras: Vec<String>,
    state: NodeState,
}

impl DependencyNode {
    /// Build an unpopulated node from a parsed requirement
    pub fn from_requirement(requirement: Requirement) -> Self {
        Self {
            name: requirement.name,
            constraints: requirement.constraints,
            markers: requirement.markers,
            extras: requirement.extras,
            state: NodeState::Unpopulated,
        }
    }

    /// Build an unpopulated node from a requirement line
    pub fn parse(line: &str) -> PipqResult<Self> {
        Ok(Self::from_requirement(Requirement::parse(line)?))
    }

    /// True once `populate` has run, whether or not a release was found
    pub fn is_populated(&self) -> bool {
        matches!(self.state, NodeState::Populated(_))
    }

    fn resolved_ref(&self, property: &'static str) -> PipqResult<Option<&ResolvedRelease>> {
        match &self.state {
            NodeState::Unpopulated => Err(PipqError::NotPopulated { property }),
            NodeState::Populated(resolved) => Ok(resolved.as_deref()),
        }
    }

    /// Resolved release data, `None` when no release satisfied the edge
    pub fn resolved(&self) -> PipqResult<Option<&ResolvedRelease>> {
        self.resolved_ref("resolved")
    }

    /// Version the node resolved to
    pub fn version(&self) -> PipqResult<Option<&AnyVersion>> {
        Ok(self.resolved_ref("version")?.map(|r| &r.version))
    }

    /// Canonicalized name of the resolved package (falls back to the
    /// requirement's spelling for unresolved nodes)
    pub fn canonical_name(&self) -> PipqResult<String> {
        Ok(match self.resolved_ref("canonical_name")? {
            Some(resolved) => resolved.package.canonical_name(),
            None => canonicalize_name(&self.name),
        })
    }

    /// `name vVERSION` label of the resolved release
    pub fn release_name(&self) -> PipqResult<Option<String>> {
        Ok(self
            .resolved_ref("release_name")?
            .map(|r| r.package.release_name()))
    }

    /// Upload time of the resolved release
    pub fn upload_time(&self) -> PipqResult<Option<DateTime<Utc>>> {
        Ok(self
            .resolved_ref("upload_time")?
            .and_then(|r| r.package.upload_time()))
    }

    /// Child dependency nodes (empty for unresolved nodes)
    pub fn dependencies(&self) -> PipqResult<&[DependencyNode]> {
        Ok(self
            .resolved_ref("dependencies")?
            .map(|r| r.dependencies.as_slice())
            .unwrap_or(&[]))
    }

    /// Number of child dependency nodes
    pub fn dependency_count(&self) -> PipqResult<usize> {
        Ok(self.dependencies()?.len())
    }

    /// Resolve this node against the index and, while `depth > 0`, recurse
    /// into the children that apply to `env`.
    ///
    /// Population happens at most once; calling this again only continues
    /// the recursion. A package the index does not know, like an edge no
    /// release satisfies, populates to "no concrete version" instead of
    /// failing the whole tree.
    pub fn populate<'a>(
        &'a mut self,
        depth: u32,
        fetcher: &'a PackageFetcher,
        env: &'a MarkerEnvironment,
        allow_prereleases: bool,
    ) -> Pin<Box<dyn Future<Output = PipqResult<()>> + Send + 'a>> {
        Box::pin(async move {
            if matches!(self.state, NodeState::Unpopulated) {
                let overview = match fetcher.get_package(&self.name).await {
                    Ok(package) => package,
                    Err(PipqError::PackageNotFound { .. }) => {
                        debug!("package '{}' not in the index; leaving unresolved", self.name);
                        self.state = NodeState::Populated(None);
                        return Ok(());
                    },
                    Err(err) => return Err(err),
                };

                let available: Vec<AnyVersion> = overview
                    .sorted_releases()
                    .into_iter()
                    .map(|(version, _)| version)
                    .collect();
                let selector = ReleaseSelector::new(available);
                let selected = selector
                    .latest_matching(&self.constraints, allow_prereleases)?
                    .cloned();

                match selected {
                    None => {
                        debug!("no release of '{}' satisfies its constraints", self.name);
                        self.state = NodeState::Populated(None);
                    },
                    Some(version) => {
                        // the unversioned endpoint already carries the
                        // latest release's metadata
                        let package = if version.raw() == overview.info.version {
                            overview
                        } else {
                            fetcher.get_release(&self.name, version.raw()).await?
                        };

                        let evaluator = DependencyEvaluator::new(env);
                        let active: BTreeSet<String> = self.extras.iter().cloned().collect();
                        let applicable =
                            evaluator.filter_dependencies(package.dependency_lines(), &active)?;
                        let dependencies = applicable
                            .into_values()
                            .map(DependencyNode::from_requirement)
                            .collect();

                        debug!("resolved '{}' to {}", self.name, version);
                        self.state = NodeState::Populated(Some(Box::new(ResolvedRelease {
                            version,
                            package,
                            dependencies,
                        })));
                    },
                }
            }

            if depth > 0 {
                if let NodeState::Populated(Some(resolved)) = &mut self.state {
                    for child in &mut resolved.dependencies {
                        child.populate(depth - 1, fetcher, env, allow_prereleases).await?;
                    }
                }
            }

            Ok(())
        })
    }
}
