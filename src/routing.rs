//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;

use crate::{
    AppState, Error,
    auth::{auth_guard, get_log_out, post_log_in, register_user},
    category::{create_category_endpoint, delete_category_endpoint, list_categories_endpoint},
    endpoints,
    history::{get_history, get_history_periods},
    stats::{get_balance_stats, get_category_stats},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_history,
    },
    user_settings::{get_currencies, get_user_settings_endpoint, put_user_settings_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::USERS, post(register_user));

    let protected_routes = Router::new()
        .route(
            endpoints::USER_SETTINGS,
            get(get_user_settings_endpoint).put(put_user_settings_endpoint),
        )
        .route(endpoints::CURRENCIES, get(get_currencies))
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(endpoints::CATEGORY, delete(delete_category_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(endpoints::BALANCE_STATS, get(get_balance_stats))
        .route(endpoints::CATEGORY_STATS, get(get_category_stats))
        .route(endpoints::HISTORY, get(get_history))
        .route(endpoints::HISTORY_PERIODS, get(get_history_periods))
        .route(endpoints::TRANSACTION_HISTORY, get(get_transaction_history))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "message": "I'm a teapot" })),
    )
        .into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
