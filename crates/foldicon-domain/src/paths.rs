//! Portable paths.
//!
//! Records are written with the username segment of the owner's home
//! directory replaced by [`USER_PLACEHOLDER`], so a workspace copied to
//! another account (or machine) resolves back to that account's home.
//! Paths outside a home directory are left alone in both directions.

use std::path::{Path, PathBuf};

pub const USER_PLACEHOLDER: &str = "{USER}";

/// Home roots recognized in addition to the parent of the current home.
const WELL_KNOWN_HOME_ROOTS: [&str; 2] = ["/Users", "/home"];

/// The account paths are normalized against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserContext {
    home: PathBuf,
    username: String,
}

impl UserContext {
    /// Resolves the current OS user from the home directory.
    #[must_use]
    pub fn current() -> Option<Self> {
        dirs_next::home_dir().and_then(Self::from_home)
    }

    /// Builds a context for the account owning `home`; the username is the
    /// last component of the home directory.
    #[must_use]
    pub fn from_home(home: impl Into<PathBuf>) -> Option<Self> {
        let home = home.into();
        let username = home.file_name()?.to_str()?.to_string();
        if username.is_empty() || username == USER_PLACEHOLDER {
            return None;
        }
        Some(Self { home, username })
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Replaces the username component of this user's home directory with
    /// [`USER_PLACEHOLDER`] when `path` starts at a recognized home root.
    /// Anything else, including a matching name deeper in the path, is left
    /// untouched.
    #[must_use]
    pub fn normalize(&self, path: &str) -> String {
        for root in self.home_roots() {
            let segment = format!("{root}/{}", self.username);
            if !starts_with_component(path, &segment) {
                continue;
            }
            let name_start = root.len() + 1;
            let name_end = name_start + self.username.len();
            let mut normalized = String::with_capacity(path.len() + USER_PLACEHOLDER.len());
            normalized.push_str(&path[..name_start]);
            normalized.push_str(USER_PLACEHOLDER);
            normalized.push_str(&path[name_end..]);
            return normalized;
        }
        path.to_string()
    }

    /// Replaces the first [`USER_PLACEHOLDER`] path component with this
    /// user's name.
    #[must_use]
    pub fn denormalize(&self, path: &str) -> String {
        let Some(start) = find_placeholder_component(path) else {
            return path.to_string();
        };
        let mut resolved = String::with_capacity(path.len() + self.username.len());
        resolved.push_str(&path[..start]);
        resolved.push_str(&self.username);
        resolved.push_str(&path[start + USER_PLACEHOLDER.len()..]);
        resolved
    }

    fn home_roots(&self) -> Vec<String> {
        let mut roots = Vec::with_capacity(WELL_KNOWN_HOME_ROOTS.len() + 1);
        if let Some(parent) = self.home.parent().and_then(Path::to_str) {
            roots.push(parent.trim_end_matches('/').to_string());
        }
        for root in WELL_KNOWN_HOME_ROOTS {
            if !roots.iter().any(|existing| existing == root) {
                roots.push(root.to_string());
            }
        }
        roots
    }
}

#[must_use]
pub fn contains_placeholder(path: &str) -> bool {
    find_placeholder_component(path).is_some()
}

/// `path` begins with `prefix` and the prefix ends at a component boundary.
fn starts_with_component(path: &str, prefix: &str) -> bool {
    path.starts_with(prefix) && ends_component(path, prefix.len())
}

fn find_placeholder_component(path: &str) -> Option<usize> {
    path.match_indices(USER_PLACEHOLDER)
        .map(|(idx, _)| idx)
        .find(|idx| {
            *idx > 0
                && path.as_bytes()[idx - 1] == b'/'
                && ends_component(path, idx + USER_PLACEHOLDER.len())
        })
}

fn ends_component(path: &str, end: usize) -> bool {
    end == path.len() || path.as_bytes()[end] == b'/'
}
