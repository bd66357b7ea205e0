//! Issuing the dispatch.

use dispatch::{DispatchError, DispatchRequest, RestClient, RunQuery};
use serde_json::Value;
use tracing::{info, instrument};

use crate::fetch::decode;

/// POSTs the dispatch and returns the query that finds the run it started.
///
/// Returns `None` for a repository event that names no workflow; there is
/// nothing to track. The response body must be valid JSON (or empty).
#[instrument(skip_all, fields(repo = %request.repository))]
pub async fn trigger(
    client: &dyn RestClient,
    request: DispatchRequest,
) -> Result<Option<RunQuery>, DispatchError> {
    let path = request.path();
    let response = client.post(&path, &request.body()).await?;
    decode::<Value>(&response)?;
    info!(%path, "dispatch accepted");
    Ok(request.run_query())
}
