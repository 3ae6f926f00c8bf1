/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use async_trait::async_trait;
use chrono::Utc;
use rustc_hash::{FxHashMap, FxHashSet};
use search_notification_service::{
    action::notification::NotificationDispatcher,
    common::types::{
        ListingCreatedEvent, ListingDocument, ListingId, NotificationRequest, SearchDocument,
        SearchId, SearchUpdatedEvent, Token, UserDocument, UserId,
    },
    outbound::fcm::{MulticastReport, PushMessenger},
    store::types::DocumentStore,
    tools::error::AppError,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeStore {
    searches: FxHashMap<SearchId, SearchDocument>,
    users: FxHashMap<UserId, UserDocument>,
}

impl FakeStore {
    fn with_search(mut self, search_id: &str, search: SearchDocument) -> Self {
        self.searches.insert(SearchId(search_id.to_string()), search);
        self
    }

    fn with_user(mut self, user_id: &str, tokens: &[&str]) -> Self {
        self.users.insert(
            UserId(user_id.to_string()),
            UserDocument {
                tokens: tokens.iter().map(|token| Token(token.to_string())).collect(),
            },
        );
        self
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn get_search(&self, search_id: &SearchId) -> Result<Option<SearchDocument>, AppError> {
        Ok(self.searches.get(search_id).cloned())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<UserDocument>, AppError> {
        Ok(self.users.get(user_id).cloned())
    }
}

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<NotificationRequest>>,
}

impl RecordingMessenger {
    fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushMessenger for RecordingMessenger {
    async fn send_multicast(
        &self,
        request: &NotificationRequest,
    ) -> Result<MulticastReport, AppError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(MulticastReport {
            success: request.tokens.len() as u64,
            failure: 0,
        })
    }
}

fn dispatcher(store: FakeStore) -> (NotificationDispatcher, Arc<RecordingMessenger>) {
    let messenger = Arc::new(RecordingMessenger::default());
    (
        NotificationDispatcher::new(Arc::new(store), messenger.clone()),
        messenger,
    )
}

fn ids(raw: &[&str]) -> Vec<UserId> {
    raw.iter().map(|id| UserId(id.to_string())).collect()
}

fn tokens(raw: &[&str]) -> FxHashSet<Token> {
    raw.iter().map(|token| Token(token.to_string())).collect()
}

fn search(users: &[&str], requests: &[&str]) -> SearchDocument {
    SearchDocument {
        users: ids(users),
        requests: ids(requests),
        ..Default::default()
    }
}

fn listing_created(search_id: &str, author: &str) -> ListingCreatedEvent {
    ListingCreatedEvent {
        search_id: SearchId(search_id.to_string()),
        listing_id: ListingId("listing-1".to_string()),
        listing: ListingDocument {
            author: UserId(author.to_string()),
            created_at: Utc::now(),
            location: None,
            url: None,
            notes: None,
            state: None,
        },
    }
}

fn search_updated(
    search_id: &str,
    before: SearchDocument,
    after: SearchDocument,
    principal: Option<&str>,
) -> SearchUpdatedEvent {
    SearchUpdatedEvent {
        search_id: SearchId(search_id.to_string()),
        before,
        after,
        principal: principal.map(|id| UserId(id.to_string())),
    }
}

#[tokio::test]
async fn listing_created_notifies_all_members_except_author() {
    let store = FakeStore::default()
        .with_search("s1", search(&["u1", "u2", "u3"], &[]))
        .with_user("u1", &["t1a", "t1b"])
        .with_user("u2", &["t2"])
        .with_user("u3", &["t3"]);
    let (dispatcher, messenger) = dispatcher(store);

    dispatcher
        .handle_listing_created(listing_created("s1", "u2"))
        .await
        .unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "New Home");
    assert_eq!(sent[0].body, "A Home was added to your search!");
    assert_eq!(sent[0].tokens, tokens(&["t1a", "t1b", "t3"]));
}

#[tokio::test]
async fn listing_created_for_missing_search_is_a_noop() {
    let (dispatcher, messenger) = dispatcher(FakeStore::default());

    dispatcher
        .handle_listing_created(listing_created("gone", "u1"))
        .await
        .unwrap();

    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn listing_created_survives_one_failed_token_lookup() {
    // u2 has no user document; the other members must still be notified.
    let store = FakeStore::default()
        .with_search("s1", search(&["u1", "u2", "u3"], &[]))
        .with_user("u1", &["t1"])
        .with_user("u3", &["t3"]);
    let (dispatcher, messenger) = dispatcher(store);

    dispatcher
        .handle_listing_created(listing_created("s1", "u9"))
        .await
        .unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tokens, tokens(&["t1", "t3"]));
}

#[tokio::test]
async fn accepted_request_notifies_the_accepted_user() {
    let store = FakeStore::default().with_user("u5", &["t5"]);
    let (dispatcher, messenger) = dispatcher(store);

    let event = search_updated(
        "s1",
        search(&["u1"], &["u5"]),
        search(&["u1", "u5"], &[]),
        Some("u1"),
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Success!");
    assert_eq!(sent[0].body, "Your Home Search Request was accepted!");
    assert_eq!(sent[0].tokens, tokens(&["t5"]));
}

#[tokio::test]
async fn rejected_request_notifies_the_rejected_user() {
    let store = FakeStore::default().with_user("u5", &["t5"]);
    let (dispatcher, messenger) = dispatcher(store);

    let event = search_updated(
        "s1",
        search(&["u1"], &["u5"]),
        search(&["u1"], &[]),
        Some("u1"),
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Try Again!");
    assert_eq!(
        sent[0].body,
        "Oh no! You were not accepted to the Home Search."
    );
    assert_eq!(sent[0].tokens, tokens(&["t5"]));
}

#[tokio::test]
async fn mixed_outcomes_get_independent_sends_in_old_list_order() {
    let store = FakeStore::default()
        .with_user("u5", &["t5"])
        .with_user("u6", &["t6"]);
    let (dispatcher, messenger) = dispatcher(store);

    let event = search_updated(
        "s1",
        search(&["u1"], &["u5", "u6"]),
        search(&["u1", "u5"], &[]),
        Some("u1"),
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].title, "Success!");
    assert_eq!(sent[0].tokens, tokens(&["t5"]));
    assert_eq!(sent[1].title, "Try Again!");
    assert_eq!(sent[1].tokens, tokens(&["t6"]));
}

#[tokio::test]
async fn new_request_broadcasts_once_to_existing_members() {
    let store = FakeStore::default()
        .with_user("u1", &["t1"])
        .with_user("u2", &["t2"])
        .with_user("u6", &["t6"]);
    let (dispatcher, messenger) = dispatcher(store);

    let event = search_updated(
        "s1",
        search(&["u1", "u2"], &[]),
        search(&["u1", "u2"], &["u6"]),
        None,
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "New Request");
    assert_eq!(sent[0].body, "Someone requested to join your Home Search!");
    assert_eq!(sent[0].tokens, tokens(&["t1", "t2"]));
}

#[tokio::test]
async fn principal_is_excluded_from_the_new_request_broadcast() {
    let store = FakeStore::default()
        .with_user("u1", &["t1"])
        .with_user("u2", &["t2"]);
    let (dispatcher, messenger) = dispatcher(store);

    let event = search_updated(
        "s1",
        search(&["u1", "u2"], &[]),
        search(&["u1", "u2"], &["u6"]),
        Some("u1"),
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tokens, tokens(&["t2"]));
}

#[tokio::test]
async fn principal_is_not_notified_about_their_own_removal() {
    let store = FakeStore::default().with_user("u5", &["t5"]);
    let (dispatcher, messenger) = dispatcher(store);

    // u5 withdrew their own request : no outcome notification.
    let event = search_updated(
        "s1",
        search(&["u1"], &["u5"]),
        search(&["u1"], &[]),
        Some("u5"),
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn failed_lookup_for_one_removed_user_does_not_abort_the_rest() {
    // u5 has no user document; u6's rejection must still go out.
    let store = FakeStore::default().with_user("u6", &["t6"]);
    let (dispatcher, messenger) = dispatcher(store);

    let event = search_updated(
        "s1",
        search(&["u1"], &["u5", "u6"]),
        search(&["u1"], &[]),
        Some("u1"),
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Try Again!");
    assert_eq!(sent[0].tokens, tokens(&["t6"]));
}

#[tokio::test]
async fn unchanged_requests_send_nothing() {
    let store = FakeStore::default()
        .with_user("u1", &["t1"])
        .with_user("u5", &["t5"]);
    let (dispatcher, messenger) = dispatcher(store);

    // Unrelated field change : requests identical before and after.
    let event = search_updated(
        "s1",
        search(&["u1"], &["u5"]),
        search(&["u1"], &["u5"]),
        Some("u1"),
    );
    dispatcher.handle_search_updated(event).await.unwrap();

    assert!(messenger.sent().is_empty());
}
