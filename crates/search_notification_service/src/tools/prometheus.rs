/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{
    opts, register_histogram, register_histogram_vec, register_int_counter, Histogram,
    HistogramVec, IntCounter,
};

pub static DISPATCHED_NOTIFICATIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("dispatched_notifications", "Dispatched Notifications")
            .expect("Failed to register dispatched notifications metrics")
    });

pub static SUPPRESSED_EMPTY_DISPATCHES: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!(
            "suppressed_empty_dispatches",
            "Multicasts suppressed because the recipient token set was empty"
        )
        .expect("Failed to register suppressed empty dispatches metrics")
    });

pub static TOKEN_LOOKUP_FAILURES: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("token_lookup_failures", "Token Lookup Failures")
            .expect("Failed to register token lookup failures metrics")
    });

pub static MULTICAST_RECIPIENTS: once_cell::sync::Lazy<Histogram> =
    once_cell::sync::Lazy::new(|| {
        register_histogram!(
            "multicast_recipients",
            "Tokens per dispatched multicast",
            vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0]
        )
        .expect("Failed to register multicast recipients metrics")
    });

pub static CALL_EXTERNAL_API: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("external_request_duration", "Call external API requests").into(),
            &["method", "host", "service", "status"]
        )
        .expect("Failed to register call external API metrics")
    });

#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status])
            .observe(duration);
    };
}

/// Prometheus middleware exposing `/metrics`, with the service's own
/// collectors registered alongside the per-route request metrics.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .buckets(&[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0,
        ])
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(DISPATCHED_NOTIFICATIONS.to_owned()))
        .expect("Failed to register dispatched notifications");

    prometheus
        .registry
        .register(Box::new(SUPPRESSED_EMPTY_DISPATCHES.to_owned()))
        .expect("Failed to register suppressed empty dispatches");

    prometheus
        .registry
        .register(Box::new(TOKEN_LOOKUP_FAILURES.to_owned()))
        .expect("Failed to register token lookup failures");

    prometheus
        .registry
        .register(Box::new(MULTICAST_RECIPIENTS.to_owned()))
        .expect("Failed to register multicast recipients");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register call external API metrics");

    prometheus
}
