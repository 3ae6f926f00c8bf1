/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct UserId(pub String);

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct SearchId(pub String);

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ListingId(pub String);

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token(pub String);

/// A search document as stored under `apartments/{searchId}`.
///
/// `users` and `requests` are disjoint at rest : a user is either a member or
/// pending, never both.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entry_code: String,
    #[serde(default)]
    pub users: Vec<UserId>,
    #[serde(default)]
    pub requests: Vec<UserId>,
    #[serde(default)]
    pub broker_response: Option<String>,
    #[serde(default)]
    pub accepted_house_id: Option<String>,
}

/// A listing document as stored under `apartments/{searchId}/apartments/{listingId}`.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListingDocument {
    pub author: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A user document as stored under `users/{userId}`. A missing `tokens` field
/// means the user has no registered devices.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default)]
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, Copy, Display, Eq, PartialEq)]
pub enum NotificationKind {
    ListingAdded,
    RequestAccepted,
    RequestRejected,
    JoinRequested,
}

impl NotificationKind {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::ListingAdded => "New Home",
            NotificationKind::RequestAccepted => "Success!",
            NotificationKind::RequestRejected => "Try Again!",
            NotificationKind::JoinRequested => "New Request",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            NotificationKind::ListingAdded => "A Home was added to your search!",
            NotificationKind::RequestAccepted => "Your Home Search Request was accepted!",
            NotificationKind::RequestRejected => "Oh no! You were not accepted to the Home Search.",
            NotificationKind::JoinRequested => "Someone requested to join your Home Search!",
        }
    }
}

/// Ephemeral payload handed to the push transport, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub tokens: FxHashSet<Token>,
}

impl NotificationRequest {
    pub fn new(kind: NotificationKind, tokens: FxHashSet<Token>) -> Self {
        NotificationRequest {
            title: kind.title().to_string(),
            body: kind.body().to_string(),
            tokens,
        }
    }
}

/// "On create" trigger payload for `apartments/{searchId}/apartments/{listingId}`.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListingCreatedEvent {
    pub search_id: SearchId,
    pub listing_id: ListingId,
    pub listing: ListingDocument,
}

/// "On update" trigger payload for `apartments/{searchId}`, carrying the
/// committed before/after snapshots. `principal` is the user who performed the
/// write when known; system-initiated writes leave it unset.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchUpdatedEvent {
    pub search_id: SearchId,
    pub before: SearchDocument,
    pub after: SearchDocument,
    #[serde(default)]
    pub principal: Option<UserId>,
}
