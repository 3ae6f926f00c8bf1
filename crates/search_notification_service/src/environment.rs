/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use crate::{
    action::notification::NotificationDispatcher,
    outbound::fcm::{FcmClient, PushMessenger},
    store::{firestore::FirestoreClient, types::DocumentStore},
    tools::logger::LoggerConfig,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FcmConfig {
    pub base_url: String,
    pub server_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http_server_port: u16,
    pub logger_cfg: LoggerConfig,
    pub firestore_cfg: FirestoreConfig,
    pub fcm_cfg: FcmConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<NotificationDispatcher>,
    pub http_server_port: u16,
}

impl AppState {
    pub fn new(app_config: AppConfig) -> AppState {
        let store: Arc<dyn DocumentStore> = Arc::new(
            FirestoreClient::new(&app_config.firestore_cfg)
                .expect("Failed to create Firestore client"),
        );
        let messenger: Arc<dyn PushMessenger> =
            Arc::new(FcmClient::new(&app_config.fcm_cfg).expect("Failed to create FCM client"));

        AppState {
            dispatcher: Arc::new(NotificationDispatcher::new(store, messenger)),
            http_server_port: app_config.http_server_port,
        }
    }
}
