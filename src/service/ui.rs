//! HTTP API over the bidding engine
use super::SharedBiddingEngine;
use crate::auction::{Amount, Bid, BidderId, Item, ItemId};
use crate::error::{Error, ErrorKind};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{future::Future, net::SocketAddr};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidRequest {
    pub item_id: ItemId,
    #[serde(rename = "user_id")]
    pub bidder_id: BidderId,
    pub amount: Amount,
}

impl PlaceBidRequest {
    /// Both ids present and a positive amount
    fn is_complete(&self) -> bool {
        !self.item_id.is_empty()
            && !self.bidder_id.is_empty()
            && self.amount.is_finite()
            && self.amount > 0.0
    }
}

/// Body of every response
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(Envelope {
            status: status.as_u16(),
            message: message.to_owned(),
            data: Some(data),
            error: None,
        }),
    )
        .into_response()
}

/// A failed request, with the status and message it maps to
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    error: String,
}

impl ApiError {
    fn new(status: StatusCode, message: &'static str, error: impl ToString) -> Self {
        Self {
            status,
            message,
            error: error.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let (status, message) = match e.kind() {
            ErrorKind::ItemNotFound => (StatusCode::NOT_FOUND, "item not found"),
            ErrorKind::InvalidBid => (StatusCode::BAD_REQUEST, "invalid bid details"),
            ErrorKind::BidTooLow => (StatusCode::CONFLICT, "bid amount too low"),
            ErrorKind::NoBids => (StatusCode::OK, "no bids found for item"),
            ErrorKind::NoBidsForBidder => (StatusCode::OK, "no items found for user"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };
        Self::new(status, message, e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid request payload",
            rejection,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(Envelope::<()> {
                status: self.status.as_u16(),
                message: self.message.to_owned(),
                data: None,
                error: Some(self.error),
            }),
        )
            .into_response()
    }
}

pub fn router(engine: SharedBiddingEngine) -> Router {
    Router::new()
        .route("/bids", post(place_bid))
        .route("/items/:item_id/bids", get(get_bids_for_item))
        .route("/items/:item_id/winning", get(get_winning_bid))
        .route("/users/:user_id/items", get(get_items_for_bidder))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

async fn place_bid(
    State(engine): State<SharedBiddingEngine>,
    payload: Result<Json<PlaceBidRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!(error = %rejection, "invalid bid request payload");
        ApiError::from(rejection)
    })?;
    if !req.is_complete() {
        warn!(item_id = %req.item_id, bidder_id = %req.bidder_id, amount = req.amount, "incomplete bid request payload");
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid request payload",
            "item_id and user_id are required and amount must be greater than 0",
        ));
    }

    let bid = engine
        .place_bid(&req.item_id, &req.bidder_id, req.amount)
        .map_err(|e| {
            warn!(item_id = %req.item_id, bidder_id = %req.bidder_id, error = %e, "failed to record bid");
            ApiError::from(e)
        })?;

    info!(bid_id = %bid.bid_id, item_id = %bid.item_id, bidder_id = %bid.bidder_id, amount = bid.amount, "bid recorded");
    Ok(success(StatusCode::CREATED, "bid recorded successfully", bid))
}

async fn get_bids_for_item(
    State(engine): State<SharedBiddingEngine>,
    Path(item_id): Path<ItemId>,
) -> Result<Response, ApiError> {
    let bids: Vec<Bid> = match engine.get_bids_for_item(&item_id) {
        Ok(bids) => bids,
        Err(e) if e.kind() == ErrorKind::NoBids => vec![],
        Err(e) => {
            warn!(%item_id, error = %e, "error retrieving bids");
            return Err(e.into());
        }
    };

    info!(%item_id, count = bids.len(), "bids retrieved");
    Ok(success(StatusCode::OK, "bids retrieved successfully", bids))
}

async fn get_winning_bid(
    State(engine): State<SharedBiddingEngine>,
    Path(item_id): Path<ItemId>,
) -> Result<Response, ApiError> {
    let bid = engine.get_winning_bid_for_item(&item_id).map_err(|e| {
        if e.kind() == ErrorKind::NoBids {
            info!(%item_id, "no winning bid found");
            ApiError::new(StatusCode::NOT_FOUND, "no winning bid found", e)
        } else {
            warn!(%item_id, error = %e, "winning bid error");
            ApiError::from(e)
        }
    })?;

    info!(bid_id = %bid.bid_id, %item_id, bidder_id = %bid.bidder_id, amount = bid.amount, "winning bid retrieved");
    Ok(success(StatusCode::OK, "winning bid retrieved successfully", bid))
}

async fn get_items_for_bidder(
    State(engine): State<SharedBiddingEngine>,
    Path(bidder_id): Path<BidderId>,
) -> Result<Response, ApiError> {
    let items: Vec<Item> = match engine.get_items_for_bidder(&bidder_id) {
        Ok(items) => items,
        Err(e) if e.kind() == ErrorKind::NoBidsForBidder => vec![],
        Err(e) => {
            warn!(%bidder_id, error = %e, "error retrieving items");
            return Err(e.into());
        }
    };

    info!(%bidder_id, items_count = items.len(), "items retrieved");
    Ok(success(StatusCode::OK, "items retrieved successfully", items))
}

/// Serve the API on `addr` until `shutdown` completes
pub async fn serve(
    engine: SharedBiddingEngine,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let server = axum::Server::try_bind(&addr)
        .with_context(|| format!("failed to bind {addr}"))?
        .serve(router(engine).into_make_service());
    info!(local_addr = %server.local_addr(), "listening");

    server
        .with_graceful_shutdown(shutdown)
        .await
        .context("failed to run http server")?;

    info!("http server stopped");
    Ok(())
}
