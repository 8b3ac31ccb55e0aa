//! Runs one command against an authenticated graph and writes its snapshot.
//!
//! Nothing is written until the whole listing has been fetched, so a failed run leaves
//! the output untouched.
use crate::cli::Command;
use crate::output;
use graphsnap_common::{GraphsnapError, Result};
use graphsnap_fetch::{FetchError, Paginator};
use graphsnap_http::HttpError;
use graphsnap_social::bsky::{SocialGraph, list};
use std::io::Write;

const PROFILE_OPERATION: &str = "app.bsky.actor.getProfile";

pub async fn run<G, W>(
    command: Command,
    graph: &G,
    paginator: &Paginator,
    out: &mut W,
) -> Result<()>
where
    G: SocialGraph + ?Sized,
    W: Write,
{
    let did = paginator
        .backoff
        .retry(PROFILE_OPERATION, || graph.self_id())
        .await
        .map_err(remote)?;

    match command.relationship() {
        None => {
            tracing::info!(%did, "resolved own id");
            output::write_id(out, &did)?;
        }
        Some(kind) => {
            let accounts = list(graph, paginator, kind, &did).await.map_err(remote)?;
            tracing::info!(?command, count = accounts.len(), "writing snapshot");
            output::write_accounts(out, &accounts)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn remote(e: FetchError<HttpError>) -> GraphsnapError {
    GraphsnapError::Remote(anyhow::Error::new(e))
}
