//! Order route handlers. All require a logged-in user.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

use printshare_core::OrderId;

use super::json_body;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{NewOrder, Order, OrderPatch, OrderScope};
use crate::state::AppState;

/// Query parameters for the order listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `customer` or `owner`. Absent or anything else lists both.
    pub filter: Option<String>,
}

/// GET /api/orders
///
/// # Errors
///
/// Returns 400 on a malformed query string.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>> {
    let Query(query) = query?;
    let scope = OrderScope::from_filter(query.filter.as_deref());
    Ok(Json(state.marketplace().list_orders(user.id, scope)))
}

/// GET /api/orders/{id}
///
/// # Errors
///
/// Returns 404 or 403.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>> {
    let Path(id) = id?;
    Ok(Json(state.marketplace().get_order(user.id, id)?))
}

/// POST /api/orders
///
/// # Errors
///
/// Returns 400 on invalid fields and 404 if the printer doesn't exist.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: std::result::Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>)> {
    let Json(request) = payload?;
    let order = state.marketplace().create_order(user.id, request)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /api/orders/{id}
///
/// # Errors
///
/// Returns 404, 403, or 400 (bad body or illegal transition). The body is
/// only decoded once the order exists and the caller takes part in it.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<OrderId>, PathRejection>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<Order>> {
    let Path(id) = id?;
    let market = state.marketplace();
    market.get_order(user.id, id)?;

    let patch: OrderPatch = json_body(&body?)?;
    Ok(Json(market.update_order(user.id, id, patch)?))
}
