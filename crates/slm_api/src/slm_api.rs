use crate::http::{run_slm_http_server, SlmApiState};
use common::http::HttpServerConfig;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The HTTP API as a runner process
pub struct SlmApi {
    state: SlmApiState,
    config: HttpServerConfig,
}

impl SlmApi {
    pub fn new(state: SlmApiState, config: HttpServerConfig) -> Self {
        debug!("initializing Send Legal Mail API module");
        Self { state, config }
    }

    pub fn into_runner_process(
        self,
    ) -> impl FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>
    {
        move |ctx| Box::pin(async move { run_slm_http_server(self.config, self.state, ctx).await })
    }
}
