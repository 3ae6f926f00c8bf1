/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{SearchId, UserId};

pub fn search_doc_path(SearchId(search_id): &SearchId) -> String {
    format!("apartments/{search_id}")
}

pub fn user_doc_path(UserId(user_id): &UserId) -> String {
    format!("users/{user_id}")
}
