//! Group fixtures - groups are only ever created out-of-band.

use std::path::Path;

use serde::Deserialize;

use scribe_core::domain::Group;
use scribe_core::error::{DomainError, RepoError};
use scribe_core::ports::GroupRepository;

#[derive(Debug, Deserialize)]
pub struct GroupFixture {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("cannot read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed fixture file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Insert every fixture whose slug is not present yet. Returns how many were
/// created.
pub async fn seed_groups(
    groups: &dyn GroupRepository,
    fixtures: Vec<GroupFixture>,
) -> Result<usize, FixtureError> {
    let mut created = 0;
    for fixture in fixtures {
        if groups.find_by_slug(&fixture.slug).await?.is_some() {
            tracing::debug!(slug = %fixture.slug, "Group already present");
            continue;
        }
        let group = Group::new(fixture.title, fixture.slug, fixture.description)?;
        tracing::info!(slug = %group.slug, "Seeding group");
        groups.insert(group).await?;
        created += 1;
    }
    Ok(created)
}

/// Read a JSON array of groups and seed them.
pub async fn seed_groups_from_file(
    groups: &dyn GroupRepository,
    path: &Path,
) -> Result<usize, FixtureError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let fixtures: Vec<GroupFixture> = serde_json::from_str(&raw)?;
    seed_groups(groups, fixtures).await
}
