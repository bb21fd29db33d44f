use crate::gui_bridge::model::ManualLocationBody;
use crate::workflow::monitor::Monitor;
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

fn error_reply(message: String, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

fn reply_result<T: Serialize>(result: anyhow::Result<T>, failure: StatusCode) -> WithStatus<Json> {
    match result {
        Ok(value) => warp::reply::with_status(warp::reply::json(&value), StatusCode::OK),
        Err(err) => error_reply(format!("{:#}", err), failure),
    }
}

async fn event_details(key: String, monitor: Monitor) -> Result<WithStatus<Json>, Infallible> {
    Ok(match monitor.details(&key).await {
        Ok(Some(details)) => warp::reply::with_status(warp::reply::json(&details), StatusCode::OK),
        Ok(None) => error_reply(format!("unknown event {}", key), StatusCode::NOT_FOUND),
        Err(err) => error_reply(format!("{:#}", err), StatusCode::INTERNAL_SERVER_ERROR),
    })
}

/// HTTP surface for the display layer: the published view plus configuration endpoints.
pub fn routes(monitor: Monitor) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_monitor = warp::any().map(move || monitor.clone());

    let events = warp::path!("events")
        .and(warp::get())
        .and(with_monitor.clone())
        .map(|monitor: Monitor| warp::reply::json(&monitor.view()));

    let details = warp::path!("events" / String)
        .and(warp::get())
        .and(with_monitor.clone())
        .and_then(event_details);

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_monitor.clone())
        .map(|monitor: Monitor| warp::reply::json(&monitor.metrics().snapshot()));

    let toggle = warp::path!("config" / "toggles" / String)
        .and(warp::post())
        .and(with_monitor.clone())
        .map(|id: String, monitor: Monitor| {
            reply_result(monitor.toggle(&id), StatusCode::BAD_REQUEST)
        });

    let manual = warp::path!("config" / "manual")
        .and(warp::put())
        .and(warp::body::json())
        .and(with_monitor.clone())
        .map(|body: ManualLocationBody, monitor: Monitor| {
            reply_result(
                monitor.set_manual_location(body.manual_lat, body.manual_lon),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        });

    let close = warp::path!("config" / "close")
        .and(warp::post())
        .and(with_monitor)
        .map(|monitor: Monitor| {
            reply_result(
                monitor.close_config().and_then(|_| monitor.settings()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        });

    events
        .or(details)
        .or(health)
        .or(toggle)
        .or(manual)
        .or(close)
}

/// Bridge that hosts the display HTTP endpoint on the current runtime.
pub struct GuiBridge {
    monitor: Monitor,
}

impl GuiBridge {
    pub fn new(monitor: Monitor) -> Self {
        Self { monitor }
    }

    pub fn serve(&self, addr: SocketAddr) -> JoinHandle<()> {
        let routes = routes(self.monitor.clone());
        log::info!("display bridge listening on http://{}", addr);
        tokio::spawn(warp::serve(routes).run(addr))
    }
}
