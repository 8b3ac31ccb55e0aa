use serde::{Deserialize, Serialize};

/// `com.atproto.server.createSession` input.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionInput<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionOutput {
    pub access_jwt: String,
    pub handle: String,
    pub did: String,
}

/// `app.bsky.actor.defs#profileView`, trimmed to what snapshots need.
///
/// `did` is the stable identity; `handle` can change over time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub did: String,
    pub handle: String,
}

impl Account {
    pub fn new(did: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            handle: handle.into(),
        }
    }
}

/// `app.bsky.actor.defs#profileViewDetailed`; only the identity is read.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileViewDetailed {
    pub did: String,
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetFollowsOutput {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub follows: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetFollowersOutput {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub followers: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetMutesOutput {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub mutes: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetBlocksOutput {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Account>,
}
