//! Authenticated wrapper around the Bluesky XRPC endpoints graphsnap needs.
//!
//! [`BskyClient::connect`] performs session bootstrap once; the resulting [`Session`]
//! is never refreshed or mutated for the rest of the run. Listing calls are single
//! attempts, and throttling is handled by the caller's backoff.
//!
//! Mutes and blocks are always relative to the caller, so those listings carry no
//! `actor` parameter.
use crate::bsky::graph::Relationship;
use crate::bsky::types::{CreateSessionInput, CreateSessionOutput, ProfileViewDetailed};
use graphsnap_common::{GraphsnapError, Result};
use graphsnap_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt;

/// Largest page the graph endpoints accept.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Credentials and identity returned by `createSession`.
#[derive(Clone)]
pub struct Session {
    pub did: String,
    pub handle: String,
    access_jwt: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .field("access_jwt", &"<redacted>")
            .finish()
    }
}

impl From<CreateSessionOutput> for Session {
    fn from(out: CreateSessionOutput) -> Self {
        Self {
            did: out.did,
            handle: out.handle,
            access_jwt: out.access_jwt,
        }
    }
}

#[derive(Clone)]
pub struct BskyClient {
    http: HttpClient,
    session: Session,
}

impl fmt::Debug for BskyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BskyClient")
            .field("instance", &self.http.base().as_str())
            .field("session", &self.session)
            .finish()
    }
}

impl BskyClient {
    /// Create a session on `instance` for `handle` using an app password.
    pub async fn connect(instance: &str, handle: &str, app_password: &str) -> Result<Self> {
        let http = HttpClient::new(instance)
            .map_err(|e| GraphsnapError::Config(format!("invalid instance address: {e}")))?;

        tracing::info!(instance = %http.base(), handle, "creating session");
        let out: CreateSessionOutput = http
            .post_json(
                "xrpc/com.atproto.server.createSession",
                &CreateSessionInput {
                    identifier: handle,
                    password: app_password,
                },
                RequestOpts::default(),
            )
            .await
            .map_err(|e| GraphsnapError::Auth(format!("createSession failed with {e}")))?;

        let session = Session::from(out);
        tracing::info!(did = %session.did, handle = %session.handle, "session established");
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn opts<'a>(&'a self, query: Vec<(&'a str, Cow<'a, str>)>) -> RequestOpts<'a> {
        RequestOpts {
            auth: Some(Auth::Bearer(&self.session.access_jwt)),
            query: Some(query),
            ..Default::default()
        }
    }

    /// Query for one page of `kind`; `actor` is sent only when the listing takes one.
    fn page_query<'a>(
        kind: Relationship,
        actor: &'a str,
        cursor: Option<&'a str>,
        limit: u32,
    ) -> Vec<(&'a str, Cow<'a, str>)> {
        let mut q: Vec<(&str, Cow<'_, str>)> = Vec::with_capacity(3);
        if kind.takes_actor() {
            q.push(("actor", actor.into()));
        }
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            q.push(("cursor", cursor.into()));
        }
        q.push(("limit", limit.clamp(1, MAX_PAGE_LIMIT).to_string().into()));
        q
    }

    pub async fn get_profile(
        &self,
        actor: &str,
    ) -> std::result::Result<ProfileViewDetailed, HttpError> {
        self.http
            .get_json(
                "xrpc/app.bsky.actor.getProfile",
                self.opts(vec![("actor", actor.into())]),
            )
            .await
    }

    /// Fetch one raw page of a graph listing, decoded as that listing's output type.
    pub async fn get_graph_page<T: DeserializeOwned>(
        &self,
        kind: Relationship,
        actor: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> std::result::Result<T, HttpError> {
        let path = format!("xrpc/{}", kind.nsid());
        self.http
            .get_json(&path, self.opts(Self::page_query(kind, actor, cursor, limit)))
            .await
    }
}
