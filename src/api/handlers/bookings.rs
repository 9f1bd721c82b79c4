//! Booking import and listing.

use crate::api::models::bookings::{AirbnbImportRequest, AirbnbImportResponse, BookingListResponse, BookingResponse, ListBookingsQuery};
use crate::api::models::users::CurrentUser;
use crate::db::handlers::{Bookings, EmailImports, bookings::BookingFilter};
use crate::db::models::email_imports::EmailImportCreateDBRequest;
use crate::errors::{Error, Result};
use crate::import::airbnb_email::{ParseEmailError, parse_airbnb_email};
use crate::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

#[utoipa::path(
    post,
    path = "/bookings/airbnb-import",
    tag = "bookings",
    summary = "Import an Airbnb confirmation email",
    description = "Scrapes the forwarded email body and records the booking data for later linking.",
    request_body = AirbnbImportRequest,
    responses(
        (status = 200, description = "Email parsed and recorded", body = AirbnbImportResponse),
        (status = 400, description = "Missing body"),
        (status = 422, description = "Could not extract reservation code")
    )
)]
pub async fn airbnb_import(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<AirbnbImportRequest>,
) -> Result<Json<AirbnbImportResponse>> {
    if request.body.is_empty() {
        return Err(Error::BadRequest {
            message: "Missing body".to_string(),
        });
    }

    let parsed = parse_airbnb_email(&request.body).map_err(|e| match e {
        ParseEmailError::MissingConfirmationCode => Error::Unprocessable { message: e.to_string() },
    })?;

    tracing::info!(code = %parsed.confirmation_code, guest = %request.guest_name, "Parsed Airbnb booking email");

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = EmailImports::new(&mut conn);

    let record = repo
        .create(&EmailImportCreateDBRequest {
            booking_date: request.received_date.unwrap_or_else(|| Utc::now().date_naive()),
            source: "Airbnb".to_string(),
            confirmation_code: parsed.confirmation_code,
            guest_name: request.guest_name,
            listing_name: parsed.listing_name,
            guests: parsed.guests.unwrap_or(0),
            check_in: parsed.check_in.unwrap_or_else(|| "N/A".to_string()),
            check_out: parsed.check_out.unwrap_or_else(|| "N/A".to_string()),
            payout: parsed.payout,
            cleaning_fee: parsed.cleaning_fee,
            room_fee: parsed.room_fee,
        })
        .await?;

    Ok(Json(AirbnbImportResponse {
        success: true,
        code: record.confirmation_code,
    }))
}

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    summary = "List bookings",
    params(ListBookingsQuery),
    responses((status = 200, description = "Bookings", body = BookingListResponse))
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<BookingListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let skip = query.skip.unwrap_or(0).max(0);

    let filter = BookingFilter {
        unit_id: query.unit,
        source: query.source,
        status: query.status,
        skip,
        limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let bookings = Bookings::new(&mut conn).list(&filter).await?;

    Ok(Json(BookingListResponse {
        data: bookings.iter().map(BookingResponse::from_db_response).collect(),
        skip,
        limit,
    }))
}
