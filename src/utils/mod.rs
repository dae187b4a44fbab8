pub mod git_ref;
pub mod uri;
pub mod version;

pub use git_ref::GitRef;
pub use uri::GitUri;
pub use version::TagVersion;
