//! NIP-96 client: discovery, upload with processing, and deletion.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use nip96_core::{
    extension_for, ClientConfig, DeleteOutcome, MediaUploadResult, PollSettings,
    ServerDescriptor, ServerInfo, StatusExplanations,
};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use tokio_util::sync::CancellationToken;

use crate::auth::AuthHeaderGenerator;
use crate::classify::{classify_upload_response, UploadOutcome};
use crate::delete::interpret_delete_response;
use crate::discovery::CapabilityRetriever;
use crate::error::{Nip96Error, Nip96Result};
use crate::normalize::{normalize, require_url};
use crate::poller::{NoProgress, ProcessingPoller, ProgressReporter};
use crate::transport::{DirectRouting, HttpTransport, RoutingPolicy};
use crate::upload::UploadRequest;

/// Per-call collaborators: routing strategy, progress sink and cancellation.
pub struct CallContext<'a> {
    pub routing: &'a dyn RoutingPolicy,
    pub progress: &'a dyn ProgressReporter,
    pub cancel: CancellationToken,
}

impl Default for CallContext<'static> {
    fn default() -> Self {
        Self {
            routing: &DirectRouting,
            progress: &NoProgress,
            cancel: CancellationToken::new(),
        }
    }
}

impl<'a> CallContext<'a> {
    pub fn with_routing(mut self, routing: &'a dyn RoutingPolicy) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Client for NIP-96 media servers.
///
/// Holds no per-call state: every call resolves its own requests, authorization
/// and status, so a single client can serve concurrent calls.
#[derive(Clone)]
pub struct Nip96Client {
    transport: HttpTransport,
    auth: AuthHeaderGenerator,
    user_agent: String,
    explanations: StatusExplanations,
    poll: PollSettings,
}

impl Debug for Nip96Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Nip96Client")
            .field("transport", &self.transport)
            .field("auth", &self.auth)
            .field("user_agent", &self.user_agent)
            .field("poll", &self.poll)
            .finish()
    }
}

impl Nip96Client {
    pub fn new(transport: HttpTransport, auth: AuthHeaderGenerator) -> Self {
        let defaults = ClientConfig::default();
        Self {
            transport,
            auth,
            user_agent: defaults.user_agent,
            explanations: StatusExplanations::default(),
            poll: defaults.poll,
        }
    }

    pub fn from_config(config: &ClientConfig, auth: AuthHeaderGenerator) -> Nip96Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(transport, auth)
            .with_user_agent(config.user_agent.clone())
            .with_poll_settings(config.poll.clone()))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_explanations(mut self, explanations: StatusExplanations) -> Self {
        self.explanations = explanations;
        self
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Fetch the capability document of `server_url`.
    pub async fn server_info(
        &self,
        server_url: &str,
        ctx: &CallContext<'_>,
    ) -> Nip96Result<ServerInfo> {
        CapabilityRetriever::new(&self.transport, &self.user_agent)
            .fetch_info(server_url, ctx.routing, &ctx.cancel)
            .await
    }

    /// Resolve the upload endpoint of `server_url`.
    pub async fn discover(
        &self,
        server_url: &str,
        ctx: &CallContext<'_>,
    ) -> Nip96Result<ServerDescriptor> {
        let server = CapabilityRetriever::new(&self.transport, &self.user_agent)
            .retrieve(server_url, ctx.routing, &ctx.cancel)
            .await?;
        tracing::info!(server = %server_url, api_url = %server.api_url, "Discovered upload endpoint");
        Ok(server)
    }

    /// Upload a file and wait until the server has finished processing it.
    ///
    /// A server that reports success without a usable `url` tag fails with
    /// [`Nip96Error::MissingUrl`]: a result with no location cannot be used.
    pub async fn upload(
        &self,
        server: &ServerDescriptor,
        request: UploadRequest,
        ctx: &CallContext<'_>,
    ) -> Nip96Result<MediaUploadResult> {
        let api_url = server.api_url.as_str();
        let client = self.transport.client_for(api_url, ctx.routing)?;
        let size = request.length;
        let (form, file_name) = request.into_form()?;

        let mut builder = client
            .post(api_url)
            .header(USER_AGENT, &self.user_agent)
            .multipart(form);
        if let Some(authorization) = self.auth.header(api_url, "POST", None)? {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        tracing::info!(api_url = %api_url, file_name = %file_name, size, "Uploading media");
        let reply = self.transport.send(builder, &ctx.cancel).await?;

        let outcome =
            classify_upload_response(reply.status.as_u16(), &reply.body, &self.explanations);
        let payload = match outcome {
            UploadOutcome::Completed(payload) => {
                ctx.progress.report(1.0);
                payload
            }
            UploadOutcome::Processing(status) => {
                tracing::info!(
                    processing_url = ?status.processing_url(),
                    percentage = ?status.percentage,
                    "Server is processing the upload"
                );
                ProcessingPoller::new(&self.transport, &self.user_agent, &self.poll)
                    .wait_for_completion(status, ctx.routing, ctx.progress, &ctx.cancel)
                    .await?
            }
            UploadOutcome::Rejected { message } => {
                tracing::warn!(
                    api_url = %api_url,
                    status = %reply.status,
                    message = %message,
                    "Upload rejected"
                );
                return Err(Nip96Error::UploadRejected { message });
            }
        };

        let result = require_url(normalize(&payload))?;
        tracing::info!(url = ?result.url, sha256 = ?result.sha256_hash, "Upload complete");
        Ok(result)
    }

    /// Discover `server_url` and upload to it.
    pub async fn upload_to(
        &self,
        server_url: &str,
        request: UploadRequest,
        ctx: &CallContext<'_>,
    ) -> Nip96Result<MediaUploadResult> {
        let server = self.discover(server_url, ctx).await?;
        self.upload(&server, request, ctx).await
    }

    /// Delete the file with `hash` from `server`.
    ///
    /// `content_type` selects the extension appended to the hash in the URL.
    pub async fn delete(
        &self,
        server: &ServerDescriptor,
        hash: &str,
        content_type: Option<&str>,
        ctx: &CallContext<'_>,
    ) -> Nip96Result<DeleteOutcome> {
        let extension = content_type.map(extension_for).unwrap_or_default();
        let url = server.delete_url(hash, extension);
        let client = self.transport.client_for(&url, ctx.routing)?;

        let mut builder = client.delete(&url).header(USER_AGENT, &self.user_agent);
        if let Some(authorization) = self.auth.header(&url, "DELETE", None)? {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let reply = self.transport.send(builder, &ctx.cancel).await?;
        let outcome =
            interpret_delete_response(reply.status.as_u16(), &reply.body, &self.explanations)?;
        tracing::info!(
            url = %url,
            succeeded = outcome.succeeded,
            status = ?outcome.raw_status,
            "Delete answered"
        );
        Ok(outcome)
    }
}
