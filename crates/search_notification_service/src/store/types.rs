/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{SearchDocument, SearchId, UserDocument, UserId};
use crate::tools::error::AppError;
use async_trait::async_trait;

/// Read-only view of the document store. Handlers never write documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads `apartments/{searchId}`. `None` when the document does not exist.
    async fn get_search(&self, search_id: &SearchId) -> Result<Option<SearchDocument>, AppError>;

    /// Reads `users/{userId}`. `None` when the document does not exist.
    async fn get_user(&self, user_id: &UserId) -> Result<Option<UserDocument>, AppError>;
}
