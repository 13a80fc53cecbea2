//! Printer route handlers.

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

use printshare_core::PrinterId;

use super::auth::SuccessResponse;
use super::json_body;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{NewPrinter, Printer, PrinterPatch};
use crate::state::AppState;

/// Query parameters for the printer listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `true` for only printers with status `available`. Any other value
    /// lists everything.
    pub available: Option<String>,
}

impl ListQuery {
    fn available_only(&self) -> bool {
        self.available.as_deref() == Some("true")
    }
}

/// GET /api/printers
///
/// # Errors
///
/// Returns 400 on a malformed query string.
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Printer>>> {
    let Query(query) = query?;
    Ok(Json(state.marketplace().list_printers(query.available_only())))
}

/// GET /api/printers/{id}
///
/// # Errors
///
/// Returns 404 if the printer doesn't exist.
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<PrinterId>, PathRejection>,
) -> Result<Json<Printer>> {
    let Path(id) = id?;
    Ok(Json(state.marketplace().get_printer(id)?))
}

/// POST /api/printers
///
/// # Errors
///
/// Returns 400 on invalid fields.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: std::result::Result<Json<NewPrinter>, JsonRejection>,
) -> Result<(StatusCode, Json<Printer>)> {
    let Json(listing) = payload?;
    let printer = state.marketplace().create_printer(user.id, listing)?;
    Ok((StatusCode::CREATED, Json(printer)))
}

/// PUT /api/printers/{id}
///
/// # Errors
///
/// Returns 404, 403 or 400, in that order of precedence. The body is only
/// decoded once the printer exists and the caller owns it.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<PrinterId>, PathRejection>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<Printer>> {
    let Path(id) = id?;
    let market = state.marketplace();
    market.authorize_printer_mutation(user.id, id)?;

    let patch: PrinterPatch = json_body(&body?)?;
    Ok(Json(market.update_printer(user.id, id, patch)?))
}

/// DELETE /api/printers/{id}
///
/// # Errors
///
/// Returns 404 or 403.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<PrinterId>, PathRejection>,
) -> Result<Json<SuccessResponse>> {
    let Path(id) = id?;
    state.marketplace().delete_printer(user.id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
