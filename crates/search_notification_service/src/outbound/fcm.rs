/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::{NotificationRequest, Token},
    environment::FcmConfig,
    tools::{
        callapi::call_api,
        error::AppError,
        prometheus::{DISPATCHED_NOTIFICATIONS, MULTICAST_RECIPIENTS, SUPPRESSED_EMPTY_DISPATCHES},
    },
};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-call delivery summary from the transport. Individual token failures are
/// reported here but not retried.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MulticastReport {
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failure: u64,
}

#[async_trait]
pub trait PushMessenger: Send + Sync {
    /// Dispatches one multicast push. An empty token set must succeed without
    /// touching the transport.
    async fn send_multicast(
        &self,
        request: &NotificationRequest,
    ) -> Result<MulticastReport, AppError>;
}

#[derive(Serialize, Debug)]
struct FcmMulticastBody<'a> {
    registration_ids: Vec<&'a str>,
    notification: FcmNotification<'a>,
}

#[derive(Serialize, Debug)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

pub struct FcmClient {
    endpoint: Url,
    server_key: String,
}

impl FcmClient {
    pub fn new(fcm_cfg: &FcmConfig) -> Result<Self, AppError> {
        Ok(FcmClient {
            endpoint: Url::parse(&fcm_cfg.base_url)
                .map_err(|err| AppError::InternalError(format!("Invalid FCM URL : {err}")))?,
            server_key: fcm_cfg.server_key.to_owned(),
        })
    }
}

#[async_trait]
impl PushMessenger for FcmClient {
    async fn send_multicast(
        &self,
        request: &NotificationRequest,
    ) -> Result<MulticastReport, AppError> {
        if request.tokens.is_empty() {
            SUPPRESSED_EMPTY_DISPATCHES.inc();
            debug!(
                "Skipping multicast \"{}\" with no recipients",
                request.title
            );
            return Ok(MulticastReport::default());
        }

        let body = FcmMulticastBody {
            registration_ids: request
                .tokens
                .iter()
                .map(|Token(token)| token.as_str())
                .collect(),
            notification: FcmNotification {
                title: &request.title,
                body: &request.body,
            },
        };
        let authorization = format!("key={}", self.server_key);

        let report: MulticastReport = call_api(
            Method::POST,
            &self.endpoint,
            vec![
                ("content-type", "application/json"),
                ("authorization", authorization.as_str()),
            ],
            Some(body),
        )
        .await
        .map_err(|err| AppError::MessagingFailed(err.to_string()))?;

        DISPATCHED_NOTIFICATIONS.inc();
        MULTICAST_RECIPIENTS.observe(request.tokens.len() as f64);
        info!(
            "Dispatched multicast \"{}\" to {} tokens (success : {}, failure : {})",
            request.title,
            request.tokens.len(),
            report.success,
            report.failure
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::NotificationKind;
    use rustc_hash::FxHashSet;

    #[tokio::test]
    async fn empty_token_set_is_a_successful_noop() {
        let client = FcmClient::new(&FcmConfig {
            base_url: "https://fcm.invalid/fcm/send".to_string(),
            server_key: "test-key".to_string(),
        })
        .unwrap();

        let request =
            NotificationRequest::new(NotificationKind::ListingAdded, FxHashSet::default());

        // Points at an unroutable host : a send attempt would error, a no-op
        // never reaches the transport.
        let report = client.send_multicast(&request).await.unwrap();
        assert_eq!(report, MulticastReport::default());
    }
}
