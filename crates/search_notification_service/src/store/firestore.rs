/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::{SearchDocument, SearchId, Token, UserDocument, UserId},
    environment::FirestoreConfig,
    store::{
        paths::{search_doc_path, user_doc_path},
        types::DocumentStore,
    },
    tools::{
        callapi::{call_api, CallApiError},
        error::AppError,
    },
};
use actix_http::StatusCode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, Url};
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// A document in Firestore's REST wire form : every field value is wrapped in
/// a type tag (`stringValue`, `arrayValue`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: FxHashMap<String, FirestoreValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    StringValue(String),
    IntegerValue(String),
    DoubleValue(f64),
    BooleanValue(bool),
    TimestampValue(DateTime<Utc>),
    NullValue(Option<serde_json::Value>),
    ArrayValue(FirestoreArray),
    MapValue(FirestoreMap),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreArray {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreMap {
    #[serde(default)]
    pub fields: FxHashMap<String, FirestoreValue>,
}

impl FirestoreValue {
    fn as_str(&self) -> Option<&str> {
        match self {
            FirestoreValue::StringValue(value) => Some(value),
            _ => None,
        }
    }
}

fn field_string(fields: &FxHashMap<String, FirestoreValue>, key: &str) -> String {
    fields
        .get(key)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

fn optional_field_string(
    fields: &FxHashMap<String, FirestoreValue>,
    key: &str,
) -> Option<String> {
    fields
        .get(key)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn field_string_array(fields: &FxHashMap<String, FirestoreValue>, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(FirestoreValue::ArrayValue(array)) => array
            .values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_search(fields: &FxHashMap<String, FirestoreValue>) -> SearchDocument {
    SearchDocument {
        name: field_string(fields, "name"),
        entry_code: field_string(fields, "entryCode"),
        users: field_string_array(fields, "users")
            .into_iter()
            .map(UserId)
            .collect(),
        requests: field_string_array(fields, "requests")
            .into_iter()
            .map(UserId)
            .collect(),
        broker_response: optional_field_string(fields, "brokerResponse"),
        accepted_house_id: optional_field_string(fields, "acceptedHouseId"),
    }
}

fn decode_user(fields: &FxHashMap<String, FirestoreValue>) -> UserDocument {
    UserDocument {
        tokens: field_string_array(fields, "tokens")
            .into_iter()
            .map(Token)
            .collect(),
    }
}

pub struct FirestoreClient {
    documents_base_url: Url,
    api_key: Option<String>,
}

impl FirestoreClient {
    pub fn new(firestore_cfg: &FirestoreConfig) -> Result<Self, AppError> {
        let documents_base_url = Url::parse(&format!(
            "{}/projects/{}/databases/(default)/documents/",
            firestore_cfg.base_url.trim_end_matches('/'),
            firestore_cfg.project_id
        ))
        .map_err(|err| AppError::InternalError(format!("Invalid Firestore base URL : {err}")))?;

        Ok(FirestoreClient {
            documents_base_url,
            api_key: firestore_cfg.api_key.to_owned(),
        })
    }

    fn document_url(&self, path: &str) -> Result<Url, AppError> {
        let mut url = self
            .documents_base_url
            .join(path)
            .map_err(|err| AppError::InternalError(format!("Invalid document path : {err}")))?;
        if let Some(api_key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", api_key);
        }
        Ok(url)
    }

    async fn get_document(&self, path: &str) -> Result<Option<FirestoreDocument>, AppError> {
        let url = self.document_url(path)?;
        match call_api::<FirestoreDocument, ()>(
            Method::GET,
            &url,
            vec![("accept", "application/json")],
            None,
        )
        .await
        {
            Ok(document) => Ok(Some(document)),
            Err(CallApiError::ExternalAPICallError(resp))
                if resp.status() == StatusCode::NOT_FOUND =>
            {
                Ok(None)
            }
            Err(err) => Err(AppError::DocumentStoreUnavailable(err.to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_search(&self, search_id: &SearchId) -> Result<Option<SearchDocument>, AppError> {
        Ok(self
            .get_document(&search_doc_path(search_id))
            .await?
            .map(|document| decode_search(&document.fields)))
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<UserDocument>, AppError> {
        Ok(self
            .get_document(&user_doc_path(user_id))
            .await?
            .map(|document| decode_user(&document.fields)))
    }
}
