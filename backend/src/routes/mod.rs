//! Route definitions for the Branch Stock Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Stock levels, reservations and adjustments
        .nest("/stock", stock_routes())
        // Movement ledger (read-only)
        .nest("/movements", movement_routes())
        // Inter-branch transfers
        .nest("/transfers", transfer_routes())
        // Advisory reports
        .nest("/reports", report_routes())
}

/// Stock level and reservation routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/reserve", post(handlers::reserve_stock))
        .route("/release", post(handlers::release_stock))
        .route("/commit", post(handlers::commit_stock))
        .route("/restore", post(handlers::restore_stock))
        .route("/restock", post(handlers::restock))
        .route("/adjust", post(handlers::adjust_stock))
        .route("/branches/:branch_id", get(handlers::list_branch_stock))
        .route(
            "/branches/:branch_id/products/:product_id",
            get(handlers::get_stock_record),
        )
        .route(
            "/branches/:branch_id/products/:product_id/movements",
            get(handlers::list_stock_movements),
        )
        .route(
            "/branches/:branch_id/products/:product_id/reorder-levels",
            put(handlers::set_reorder_levels),
        )
}

/// Movement ledger routes
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products/:product_id",
            get(handlers::list_product_movements),
        )
        .route("/branches/:branch_id", get(handlers::list_branch_movements))
}

/// Transfer workflow routes
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route("/:transfer_id", get(handlers::get_transfer))
        .route("/:transfer_id/ship", post(handlers::ship_transfer))
        .route("/:transfer_id/complete", post(handlers::complete_transfer))
        .route("/:transfer_id/cancel", post(handlers::cancel_transfer))
}

/// Advisory report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(handlers::list_low_stock))
        .route("/out-of-stock", get(handlers::list_out_of_stock))
}
