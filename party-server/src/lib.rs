use std::sync::Arc;
use warp::Filter;

use crate::config::Config;
use crate::groups::GroupManager;
use crate::websocket::{ConnectionRegistry, MAX_MESSAGE_BYTES, RateLimiter};
use party_types::UserInfo;

pub mod broadcaster;
pub mod config;
pub mod groups;
pub mod websocket;

pub fn create_routes(
    registry: Arc<ConnectionRegistry>,
    groups: Arc<GroupManager>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let registry_filter = warp::any().map({
        let registry = registry.clone();
        move || registry.clone()
    });

    let groups_filter = warp::any().map({
        let groups = groups.clone();
        move || groups.clone()
    });

    let config_filter = warp::any().map({
        let config = config.clone();
        move || config.clone()
    });

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(warp::header::optional::<String>("x-remote-user"))
        .and(registry_filter)
        .and(groups_filter.clone())
        .and(config_filter)
        .map(
            |ws: warp::ws::Ws,
             remote_user: Option<String>,
             registry,
             groups,
             config: Arc<Config>| {
                let rate_limiter =
                    RateLimiter::new(config.rate_limit_burst, config.rate_limit_refill());
                ws.max_message_size(MAX_MESSAGE_BYTES).on_upgrade(move |socket| {
                    websocket::handle_connection(socket, registry, groups, rate_limiter, remote_user)
                })
            },
        );

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Identity forwarded by the auth proxy
    let user = warp::path!("api" / "user")
        .and(warp::get())
        .and(warp::header::optional::<String>("x-remote-user"))
        .map(|remote_user: Option<String>| {
            warp::reply::json(&UserInfo::from_remote_user(remote_user.as_deref()))
        });

    let group_state = warp::path!("groups" / String / "state")
        .and(warp::get())
        .and(groups_filter)
        .and_then(handle_group_state_request);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "x-remote-user"])
        .allow_methods(vec!["GET"]);

    websocket
        .or(health)
        .or(user)
        .or(group_state)
        .with(cors)
        .with(warp::log("party_games"))
}

async fn handle_group_state_request(
    group: String,
    groups: Arc<GroupManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match groups.group_snapshot(&group).await {
        Some(snapshot) => Ok(warp::reply::with_status(
            warp::reply::json(&snapshot),
            warp::http::StatusCode::OK,
        )),
        None => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": "Group not found"
            })),
            warp::http::StatusCode::NOT_FOUND,
        )),
    }
}
