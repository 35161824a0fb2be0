//! Order listing handlers for the dashboard.

use axum::{
    Json,
    extract::{Query as QueryParams, State},
};
use antenka_core::OrderId;
use antenka_store::{Document, Query, SortDirection};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

const ORDERS: &str = "orders";
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Recent order view for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RecentOrderView {
    pub id: OrderId,
    pub customer_name: String,
    pub total: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for RecentOrderView {
    fn from(doc: &Document) -> Self {
        let customer_name = match doc.str_field("customerName") {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => doc
                .str_field("email")
                .unwrap_or("Guest")
                .to_owned(),
        };

        let created_at = doc
            .str_field("createdAt")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc));

        Self {
            id: OrderId::new(doc.id.clone()),
            customer_name,
            total: doc.decimal_field("total"),
            status: doc.str_field_or_empty("status"),
            created_at,
        }
    }
}

/// Query parameters for the recent orders listing.
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// One page of recent orders.
#[derive(Debug, Serialize)]
pub struct RecentOrdersResponse {
    pub orders: Vec<RecentOrderView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Most recent orders, newest first.
#[instrument(skip(state))]
pub async fn recent(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<RecentParams>,
) -> Result<Json<RecentOrdersResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let mut query = Query::all()
        .order_by("createdAt", SortDirection::Desc)
        .limit(limit);
    if let Some(cursor) = params.cursor {
        query = query.after(cursor);
    }

    let page = state.store().query(ORDERS, query).await?;

    Ok(Json(RecentOrdersResponse {
        orders: page.documents.iter().map(RecentOrderView::from).collect(),
        next_cursor: page.next_cursor,
    }))
}
