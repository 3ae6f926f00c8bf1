/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::{
        types::{
            ListingCreatedEvent, NotificationKind, NotificationRequest, SearchUpdatedEvent, Token,
            UserId,
        },
        utils::{diff_membership, MembershipDiff},
    },
    outbound::fcm::PushMessenger,
    store::types::DocumentStore,
    tools::{error::AppError, prometheus::TOKEN_LOOKUP_FAILURES},
};
use futures::future::join_all;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::*;

/// Reacts to committed document-store changes by fanning out push
/// notifications. Holds no mutable state; every invocation is a one-shot
/// reaction to one event and may safely be re-run on at-least-once redelivery.
pub struct NotificationDispatcher {
    store: Arc<dyn DocumentStore>,
    messenger: Arc<dyn PushMessenger>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, messenger: Arc<dyn PushMessenger>) -> Self {
        NotificationDispatcher { store, messenger }
    }

    /// Reads the registered push tokens of one user. A missing `tokens` field
    /// resolves to an empty list; a missing user document is an error.
    async fn resolve_tokens(&self, user_id: &UserId) -> Result<Vec<Token>, AppError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_owned()))?;
        Ok(user.tokens)
    }

    /// Unions the tokens of every user except `exclude`. A failed lookup for
    /// one user is logged and skipped, never aborting the rest of the fan-out.
    async fn collect_tokens(&self, users: &[UserId], exclude: Option<&UserId>) -> FxHashSet<Token> {
        let lookups = users
            .iter()
            .filter(|user_id| exclude != Some(*user_id))
            .map(|user_id| async move { (user_id, self.resolve_tokens(user_id).await) });

        let mut tokens = FxHashSet::default();
        for (user_id, resolved) in join_all(lookups).await {
            match resolved {
                Ok(user_tokens) => tokens.extend(user_tokens),
                Err(err) => {
                    TOKEN_LOOKUP_FAILURES.inc();
                    error!("Token lookup failed for {:?} : {}", user_id, err);
                }
            }
        }
        tokens
    }

    /// "On create" of `apartments/{searchId}/apartments/{listingId}` : notify
    /// every search member except the listing's author with one multicast.
    pub async fn handle_listing_created(
        &self,
        event: ListingCreatedEvent,
    ) -> Result<(), AppError> {
        let ListingCreatedEvent {
            search_id,
            listing_id,
            listing,
        } = event;

        let Some(search) = self.store.get_search(&search_id).await? else {
            // Benign race : the search may have been deleted after the
            // listing event fired.
            info!(
                "No search document {:?} for listing {:?}, skipping fan-out",
                search_id, listing_id
            );
            return Ok(());
        };

        let tokens = self
            .collect_tokens(&search.users, Some(&listing.author))
            .await;
        self.messenger
            .send_multicast(&NotificationRequest::new(
                NotificationKind::ListingAdded,
                tokens,
            ))
            .await?;

        Ok(())
    }

    /// "On update" of `apartments/{searchId}` : diff the pending `requests`
    /// list to tell each no-longer-pending user whether they were accepted,
    /// and tell existing members when someone new asks to join. The acting
    /// principal is never notified about their own write; an absent principal
    /// excludes nobody.
    pub async fn handle_search_updated(&self, event: SearchUpdatedEvent) -> Result<(), AppError> {
        let SearchUpdatedEvent {
            search_id,
            before,
            after,
            principal,
        } = event;

        let MembershipDiff { added, removed } =
            diff_membership(&before.requests, &after.requests);
        debug!(
            "Request diff for {:?} : added {:?}, removed {:?}",
            search_id, added, removed
        );

        let members: FxHashSet<&UserId> = after.users.iter().collect();
        for user_id in &removed {
            if Some(user_id) == principal.as_ref() {
                continue;
            }

            let tokens = match self.resolve_tokens(user_id).await {
                Ok(tokens) => tokens,
                Err(err) => {
                    TOKEN_LOOKUP_FAILURES.inc();
                    error!("Token lookup failed for {:?} : {}", user_id, err);
                    continue;
                }
            };

            let kind = if members.contains(user_id) {
                NotificationKind::RequestAccepted
            } else {
                NotificationKind::RequestRejected
            };
            // One send per removed user : the message depends on the outcome,
            // and a failed send for one user must not starve the rest.
            let request = NotificationRequest::new(kind, tokens.into_iter().collect());
            if let Err(err) = self.messenger.send_multicast(&request).await {
                error!(
                    "Failed to send {} notification to {:?} : {}",
                    kind, user_id, err
                );
            }
        }

        if !added.is_empty() {
            let tokens = self.collect_tokens(&after.users, principal.as_ref()).await;
            self.messenger
                .send_multicast(&NotificationRequest::new(
                    NotificationKind::JoinRequested,
                    tokens,
                ))
                .await?;
        }

        Ok(())
    }
}
