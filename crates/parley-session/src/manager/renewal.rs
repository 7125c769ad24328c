//! Authenticated request pipeline with single-flight token renewal.
//!
//! A request is decorated and sent once. On 401 the access token is
//! renewed (joining a renewal already in flight if there is one) and the
//! request is re-sent exactly once with the new token. A failed renewal
//! ends the session.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use parley_common::{new_correlation_id, Event};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::credentials::CredentialPair;
use crate::endpoints;
use crate::error::{RenewalError, SessionError, TransportError};
use crate::request::{ApiRequest, ApiResponse};

use super::{Inner, SessionManager, TokenGrant};

impl SessionManager {
    /// Send `request` through the manager's own transport with renewal.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let transport = Arc::clone(&self.inner.transport);
        self.execute_with_renewal(request, move |req| {
            let transport = Arc::clone(&transport);
            async move { transport.send(&req).await }
        })
        .await
    }

    /// Send `request` with `send`, renewing the access token at most once.
    ///
    /// Non-401 responses are returned unchanged. After a successful
    /// renewal the retried response is returned whatever its status. A
    /// failed renewal clears the session and yields
    /// [`SessionError::Unauthenticated`].
    pub async fn execute_with_renewal<F, Fut>(
        &self,
        request: ApiRequest,
        send: F,
    ) -> Result<ApiResponse, SessionError>
    where
        F: Fn(ApiRequest) -> Fut,
        Fut: Future<Output = Result<ApiResponse, TransportError>>,
    {
        let cid = new_correlation_id();
        let request = self.decorate(request);
        let presented = request.bearer().map(str::to_owned);
        let path = request.path.clone();

        debug!(%cid, method = %request.method, %path, "sending request");
        let response = send(request.clone()).await.inspect_err(|e| {
            warn!(%cid, %path, "request failed: {e}");
        })?;
        if !response.is_unauthorized() {
            debug!(%cid, status = response.status, "response received");
            return Ok(response);
        }

        info!(%cid, %path, "access token rejected, renewing");
        let access = self.renew(presented.as_deref()).await?;

        let retry = request.with_bearer(access);
        let response = send(retry).await.inspect_err(|e| {
            warn!(%cid, %path, "retry failed: {e}");
        })?;
        debug!(%cid, status = response.status, "retry response received");
        Ok(response)
    }

    /// Obtain an access token newer than `presented`.
    ///
    /// Joins the in-flight renewal if one exists. If the stored token has
    /// already moved past `presented`, it is returned without a network
    /// call so a refresh token is never spent twice.
    async fn renew(&self, presented: Option<&str>) -> Result<String, SessionError> {
        let pending = {
            let mut slot = self.inner.state.renewal_slot();
            let mut credentials = self.inner.state.credentials();

            if let Some(current) = credentials.access_token() {
                if Some(current) != presented {
                    debug!("access token already renewed, reusing it");
                    return Ok(current.to_string());
                }
            }

            match slot.clone() {
                Some(handle) => {
                    debug!("joining in-flight renewal");
                    handle
                }
                None => {
                    let Some(refresh) = credentials.refresh_token().map(str::to_owned) else {
                        let had_credentials = self.inner.state.clear_locked(&mut credentials);
                        drop(credentials);
                        drop(slot);
                        self.inner.expire(had_credentials, &RenewalError::NoRefreshToken);
                        return Err(SessionError::Unauthenticated);
                    };
                    debug!("starting renewal");
                    let task = tokio::spawn(run_renewal(Arc::clone(&self.inner), refresh));
                    let handle = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(RenewalError::Transport(format!("renewal task failed: {e}")))
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some(handle.clone());
                    handle
                }
            }
        };

        pending.await.map_err(|_| SessionError::Unauthenticated)
    }
}

/// The one renewal network call. Runs on its own task so it completes
/// even if every waiter loses interest.
async fn run_renewal(inner: Arc<Inner>, refresh: String) -> Result<String, RenewalError> {
    let request = ApiRequest::post(endpoints::RENEW, json!({ "refresh": refresh }));

    let outcome =
        match tokio::time::timeout(inner.renewal_timeout, inner.transport.send(&request)).await {
            Err(_) => Err(RenewalError::Timeout),
            Ok(Err(e)) => Err(RenewalError::Transport(e.to_string())),
            Ok(Ok(response)) if !response.is_success() => Err(RenewalError::Rejected {
                status: response.status,
            }),
            Ok(Ok(response)) => response
                .json::<TokenGrant>()
                .map_err(|e| RenewalError::Malformed(e.to_string())),
        };

    inner.finish_renewal(&refresh, outcome)
}

impl Inner {
    /// Apply a renewal outcome and free the slot, atomically with respect
    /// to callers deciding whether to join or start a renewal.
    ///
    /// The outcome only touches the pair if it still holds the refresh
    /// token that was spent; a sign-in or sign-out that happened meanwhile
    /// wins.
    fn finish_renewal(
        &self,
        spent_refresh: &str,
        outcome: Result<TokenGrant, RenewalError>,
    ) -> Result<String, RenewalError> {
        let mut slot = self.state.renewal_slot();
        let mut credentials = self.state.credentials();
        *slot = None;

        if credentials.refresh_token() != Some(spent_refresh) {
            debug!("session changed during renewal, discarding outcome");
            return credentials
                .access_token()
                .map(str::to_owned)
                .ok_or(RenewalError::Superseded);
        }

        match outcome {
            Ok(grant) => {
                let access = grant.access.clone();
                let renewed: CredentialPair = credentials.renewed(grant.access, grant.refresh);
                self.state.install_locked(&mut credentials, renewed);
                drop(credentials);
                drop(slot);
                info!("access token renewed");
                self.events.publish(Event::SessionRenewed);
                Ok(access)
            }
            Err(e) => {
                let had_credentials = self.state.clear_locked(&mut credentials);
                drop(credentials);
                drop(slot);
                self.expire(had_credentials, &e);
                Err(e)
            }
        }
    }

    /// Announce that the session ended because it could not be renewed.
    pub(crate) fn expire(&self, had_credentials: bool, reason: &RenewalError) {
        warn!("renewal failed, session terminated: {reason}");
        if had_credentials {
            self.events.publish(Event::SessionExpired);
        }
    }
}
