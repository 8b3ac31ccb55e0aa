//! The four relationship listings, expressed once over [`Paginator`].
use crate::bsky::client::BskyClient;
use crate::bsky::types::{
    Account, GetBlocksOutput, GetFollowersOutput, GetFollowsOutput, GetMutesOutput,
};
use async_trait::async_trait;
use graphsnap_fetch::{FetchError, Page, Paginator};
use graphsnap_http::HttpError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relationship {
    Following,
    Followers,
    Mutes,
    Blocks,
}

impl Relationship {
    /// XRPC method backing this listing.
    pub fn nsid(self) -> &'static str {
        match self {
            Relationship::Following => "app.bsky.graph.getFollows",
            Relationship::Followers => "app.bsky.graph.getFollowers",
            Relationship::Mutes => "app.bsky.graph.getMutes",
            Relationship::Blocks => "app.bsky.graph.getBlocks",
        }
    }

    /// Whether the endpoint lists an arbitrary actor or only the caller.
    pub fn takes_actor(self) -> bool {
        matches!(self, Relationship::Following | Relationship::Followers)
    }
}

/// The remote calls the dispatcher needs, kept behind a trait so runs can be driven
/// without a network.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Resolve the authenticated account's own DID.
    async fn self_id(&self) -> Result<String, HttpError>;

    /// Fetch one page of `kind` for `actor` (ignored when the endpoint is caller-relative).
    async fn list_page(
        &self,
        kind: Relationship,
        actor: &str,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<Page<Account>, HttpError>;
}

#[async_trait]
impl SocialGraph for BskyClient {
    async fn self_id(&self) -> Result<String, HttpError> {
        let profile = self.get_profile(&self.session().did).await?;
        Ok(profile.did)
    }

    async fn list_page(
        &self,
        kind: Relationship,
        actor: &str,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<Page<Account>, HttpError> {
        let cursor = cursor.as_deref();
        let page = match kind {
            Relationship::Following => {
                let out: GetFollowsOutput = self.get_graph_page(kind, actor, cursor, limit).await?;
                Page::new(out.follows, out.cursor)
            }
            Relationship::Followers => {
                let out: GetFollowersOutput =
                    self.get_graph_page(kind, actor, cursor, limit).await?;
                Page::new(out.followers, out.cursor)
            }
            Relationship::Mutes => {
                let out: GetMutesOutput = self.get_graph_page(kind, actor, cursor, limit).await?;
                Page::new(out.mutes, out.cursor)
            }
            Relationship::Blocks => {
                let out: GetBlocksOutput = self.get_graph_page(kind, actor, cursor, limit).await?;
                Page::new(out.blocks, out.cursor)
            }
        };
        Ok(page)
    }
}

/// Collect the complete `kind` listing for `actor`, in server order.
pub async fn list<G>(
    graph: &G,
    paginator: &Paginator,
    kind: Relationship,
    actor: &str,
) -> Result<Vec<Account>, FetchError<HttpError>>
where
    G: SocialGraph + ?Sized,
{
    tracing::info!(nsid = kind.nsid(), actor, "listing {kind:?}");
    paginator
        .collect(kind.nsid(), move |cursor, limit| {
            graph.list_page(kind, actor, cursor, limit)
        })
        .await
}
