// src/reload/client.rs

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::config::ServerSection;
use crate::errors::Result;
use crate::reload::notifier::ReloadNotifier;

/// Console API path that prepares the server for plugin hot-loading.
const INITIALIZE_PATH: &str = "/apis/api.console.halo.run/v1alpha1/system/initialize";

fn reload_path(target: &str) -> String {
    format!("/apis/api.console.halo.run/v1alpha1/plugins/{target}/reload")
}

/// HTTP client for the target service's reload API.
///
/// One shared `reqwest::Client` backs both operations; it is safe for
/// concurrent use, so the cold-start task and a change-triggered reload can
/// be in flight at the same time. Credentials are resolved once at
/// construction. No request timeout is configured: a hung server hangs the
/// notification, consistent with the rest of the loop.
#[derive(Debug, Clone)]
pub struct ReloadClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ReloadClient {
    pub fn new(server: &ServerSection) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: server.url.trim_end_matches('/').to_string(),
            username: server.username.clone(),
            password: server.password.clone(),
        })
    }

    async fn post(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "sending notification");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        // Response bodies are not interpreted beyond success/failure.
        response.error_for_status()?;
        Ok(())
    }
}

impl ReloadNotifier for ReloadClient {
    fn initialize<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.post(INITIALIZE_PATH).await?;
            debug!("initialize notification accepted");
            Ok(())
        })
    }

    fn reload<'a>(
        &'a self,
        target: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.post(&reload_path(target)).await?;
            debug!(target = %target, "reload notification accepted");
            Ok(())
        })
    }
}
