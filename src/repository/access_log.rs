// SPDX-License-Identifier: MPL-2.0

use crate::api::AccessLog;
use crate::repository::source::AccessLogRemoteSource;
use std::sync::Arc;

/// Fire-and-forget telemetry of what the user looked at and liked
#[derive(Clone)]
pub struct AccessLogRepository {
    remote: Arc<dyn AccessLogRemoteSource>,
}

impl AccessLogRepository {
    pub fn new(remote: Arc<dyn AccessLogRemoteSource>) -> Self {
        Self { remote }
    }

    /// Post `log` if signed in. Never fails: a missing token drops the log, errors are logged.
    pub async fn record(&self, log: &AccessLog) {
        if !self.remote.has_credentials() {
            tracing::debug!("no session; dropping {:?} log for {}", log.action, log.animal_id);
            return;
        }

        if let Err(e) = self.remote.post(log).await {
            tracing::warn!("failed to post access log for {}: {e}", log.animal_id);
        }
    }
}
