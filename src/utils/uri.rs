use crate::{ProvenanceError, Result};

/// A source locator split into `{host}/{org}/{repo}` and an optional ref.
///
/// Accepts `git+https://github.com/org/repo@refs/heads/main`,
/// `https://github.com/org/repo`, `github.com/org/repo/` and similar. The
/// `git+` prefix and the URI scheme are dropped and never take part in
/// comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUri {
    pub host: String,
    pub org: String,
    pub repo: String,
    /// Text after the `@` separator, `None` when absent or empty.
    pub git_ref: Option<String>,
}

impl GitUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(ProvenanceError::MalformedUri("empty uri".into()));
        }

        let without_git = trimmed.strip_prefix("git+").unwrap_or(trimmed);
        let without_scheme = match without_git.find("://") {
            Some(idx) => &without_git[idx + 3..],
            None => without_git,
        };

        let (path, git_ref) = match without_scheme.split_once('@') {
            Some((path, git_ref)) => {
                if git_ref.contains('@') {
                    return Err(ProvenanceError::MalformedUri(format!(
                        "more than one '@' in '{}'",
                        uri
                    )));
                }
                (path, Some(git_ref))
            }
            None => (without_scheme, None),
        };

        let parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();
        let [host, org, repo] = parts.as_slice() else {
            return Err(ProvenanceError::MalformedUri(format!(
                "expected host/org/repo, got '{}'",
                uri
            )));
        };
        if host.is_empty() || org.is_empty() || repo.is_empty() {
            return Err(ProvenanceError::MalformedUri(format!(
                "empty component in '{}'",
                uri
            )));
        }

        Ok(Self {
            host: host.to_string(),
            org: org.to_string(),
            repo: repo.to_string(),
            git_ref: git_ref.filter(|r| !r.is_empty()).map(str::to_string),
        })
    }

    /// True when host, org and repo are equal. Refs are ignored.
    pub fn same_repository(&self, other: &GitUri) -> bool {
        self.host == other.host && self.org == other.org && self.repo == other.repo
    }

    /// `host/org/repo` without scheme or ref.
    pub fn repository(&self) -> String {
        format!("{}/{}/{}", self.host, self.org, self.repo)
    }
}
