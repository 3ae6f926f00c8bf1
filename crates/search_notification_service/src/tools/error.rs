/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{SearchId, UserId};
use actix_http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Non-fatal at the fan-out call sites : logged and skipped there.
    #[error("no user document found for {0:?}")]
    UserNotFound(UserId),
    /// Benign in the listing-created path : the handler converts it to a no-op.
    #[error("no search document found for {0:?}")]
    SearchNotFound(SearchId),
    #[error("document store request failed : {0}")]
    DocumentStoreUnavailable(String),
    #[error("push transport request failed : {0}")]
    MessagingFailed(String),
    #[error("invalid request : {0}")]
    InvalidRequest(String),
    #[error("internal error : {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::UserNotFound(_) => "USER_NOT_FOUND",
            AppError::SearchNotFound(_) => "SEARCH_NOT_FOUND",
            AppError::DocumentStoreUnavailable(_) => "DOCUMENT_STORE_UNAVAILABLE",
            AppError::MessagingFailed(_) => "MESSAGING_FAILED",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_code: &'static str,
    error_message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound(_) | AppError::SearchNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DocumentStoreUnavailable(_)
            | AppError::MessagingFailed(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error_code: self.error_code(),
            error_message: self.to_string(),
        })
    }
}
