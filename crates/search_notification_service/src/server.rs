/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::{ListingCreatedEvent, SearchUpdatedEvent},
    environment::{AppConfig, AppState},
    tools::{error::AppError, logger::setup_tracing, prometheus::prometheus_metrics},
};
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::{env::var, net::Ipv4Addr};
use tracing::*;
use uuid::Uuid;

fn decode_event<T: DeserializeOwned>(body: &web::Bytes) -> Result<T, AppError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| AppError::InvalidRequest(err.to_string()))
}

/// "On create" push for `apartments/{searchId}/apartments/{listingId}`.
async fn listing_created(
    app_state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let event: ListingCreatedEvent = decode_event(&body)?;
    let invocation_id = Uuid::new_v4();
    info!(
        invocation_id = %invocation_id,
        "Listing {:?} created in search {:?} by {:?}",
        event.listing_id, event.search_id, event.listing.author
    );
    app_state.dispatcher.handle_listing_created(event).await?;
    Ok(HttpResponse::Ok().finish())
}

/// "On update" push for `apartments/{searchId}`, carrying before/after
/// snapshots. A non-2xx response makes the trigger runtime redeliver.
async fn search_updated(
    app_state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let event: SearchUpdatedEvent = decode_event(&body)?;
    let invocation_id = Uuid::new_v4();
    info!(
        invocation_id = %invocation_id,
        "Search {:?} updated by {:?}",
        event.search_id, event.principal
    );
    app_state.dispatcher.handle_search_updated(event).await?;
    Ok(HttpResponse::Ok().finish())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Notification Service Is Up!")
}

pub async fn run_server() -> Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall-configs/dev/search_notification_service.dhall".to_string());
    let app_config = serde_dhall::from_file(dhall_config_path).parse::<AppConfig>()?;

    let _guard = setup_tracing(app_config.logger_cfg.to_owned());

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic Occured : {:?}", panic_info);
    }));

    let app_state = AppState::new(app_config);
    let http_server_port = app_state.http_server_port;

    let prometheus = prometheus_metrics();
    HttpServer::new(move || {
        App::new()
            .wrap(prometheus.clone())
            .app_data(web::Data::new(app_state.clone()))
            .route("/health", web::get().to(health))
            .route("/trigger/listing-created", web::post().to(listing_created))
            .route("/trigger/search-updated", web::post().to(search_updated))
    })
    .bind((Ipv4Addr::UNSPECIFIED, http_server_port))?
    .shutdown_timeout(60)
    .run()
    .await?;

    Ok(())
}
