pub const BRANCH_PREFIX: &str = "refs/heads/";
pub const TAG_PREFIX: &str = "refs/tags/";

/// Classification of a fully-qualified git ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitRef<'a> {
    Branch(&'a str),
    Tag(&'a str),
    Other(&'a str),
}

impl<'a> GitRef<'a> {
    pub fn classify(full_ref: &'a str) -> Self {
        if let Some(name) = full_ref.strip_prefix(BRANCH_PREFIX) {
            GitRef::Branch(name)
        } else if let Some(name) = full_ref.strip_prefix(TAG_PREFIX) {
            GitRef::Tag(name)
        } else {
            GitRef::Other(full_ref)
        }
    }
}

/// Qualify a branch name with `refs/heads/` unless it already has it.
pub fn qualify_branch(branch: &str) -> String {
    format!("{}{}", BRANCH_PREFIX, branch.strip_prefix(BRANCH_PREFIX).unwrap_or(branch))
}

/// Qualify a tag name with `refs/tags/` unless it already has it.
pub fn qualify_tag(tag: &str) -> String {
    format!("{}{}", TAG_PREFIX, tag.strip_prefix(TAG_PREFIX).unwrap_or(tag))
}
