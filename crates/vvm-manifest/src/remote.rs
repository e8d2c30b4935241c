//! SSH git remote references (`git@host:owner/repo.git`) parsed with `nom`.
//!
//! Only [`ALLOWED_GIT_HOST`] is accepted as the host.

use std::fmt;

use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_till1, take_while1},
    character::complete::char,
    combinator::all_consuming,
    sequence::preceded,
};
use serde::Serialize;
use thiserror::Error;
use vvm_common::constants::ALLOWED_GIT_HOST;

const GIT_SUFFIX: &str = ".git";

/// Reasons a URL is not an acceptable SSH git remote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The URL is not of the form `git@<host>:<path>`.
    #[error("not an SSH git remote (expected git@<host>:<owner>/<repo>.git)")]
    NotSsh,
    /// The host is not on the allow-list.
    #[error("host '{0}' is not allowed (expected {allowed})", allowed = ALLOWED_GIT_HOST)]
    HostNotAllowed(String),
    /// The path does not end in `.git`.
    #[error("path does not end in .git")]
    MissingGitSuffix,
    /// The path lacks a non-empty owner or repository segment.
    #[error("path must be <owner>/<repo>.git")]
    MissingOwnerOrRepo,
}

/// A validated SSH git remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitRemote {
    /// Host after `git@`.
    pub host: String,
    /// Everything between the host separator and the final path segment.
    pub owner: String,
    /// Final path segment without the `.git` suffix.
    pub repo: String,
}

/// `git@<host>:<path>`, where the path runs to the end of the line.
fn ssh_remote(input: &str) -> IResult<&str, (&str, &str)> {
    (
        preceded(tag("git@"), take_till1(|c: char| c == ':')),
        preceded(char(':'), take_while1(|c: char| c != '\n')),
    )
        .parse(input)
}

/// Splits `owner/repo` at the last `/` that leaves both sides non-empty.
fn split_owner_repo(path: &str) -> Option<(&str, &str)> {
    path.match_indices('/')
        .rev()
        .map(|(idx, _)| (&path[..idx], &path[idx + 1..]))
        .find(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
}

impl GitRemote {
    /// Parses and checks an SSH git remote reference.
    ///
    /// # Errors
    ///
    /// Returns the first shape problem found in `url`.
    pub fn parse(url: &str) -> Result<Self, RemoteError> {
        let (_, (host, path)) = all_consuming(ssh_remote)
            .parse(url)
            .map_err(|_: nom::Err<nom::error::Error<&str>>| RemoteError::NotSsh)?;

        if host != ALLOWED_GIT_HOST {
            return Err(RemoteError::HostNotAllowed(host.to_string()));
        }

        let stem = path
            .strip_suffix(GIT_SUFFIX)
            .ok_or(RemoteError::MissingGitSuffix)?;
        let (owner, repo) = split_owner_repo(stem).ok_or(RemoteError::MissingOwnerOrRepo)?;

        Ok(Self {
            host: host.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for GitRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git@{}:{}/{}{GIT_SUFFIX}", self.host, self.owner, self.repo)
    }
}
