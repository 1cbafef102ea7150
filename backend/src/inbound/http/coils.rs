//! Coil inventory HTTP handlers.
//!
//! ```text
//! POST /api/coil
//! GET /api/coil
//! GET /api/coil/stats
//! GET /api/coil/{id}
//! DELETE /api/coil/{id}
//! ```

use actix_web::{delete, get, post, web};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::CreateCoilRequest;
use crate::domain::{Coil, CoilFilter, CoilId, CoilStats, Error, StatsWindow, ValueRange};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date_or_timestamp, parse_optional_date_or_timestamp,
    parse_optional_integer, parse_optional_number, require,
};

/// Request payload for adding a coil to stock.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct CreateCoilRequestBody {
    /// Coil length; must be greater than zero.
    #[schema(example = 12.5)]
    pub length: f64,
    /// Coil weight; must be greater than zero.
    #[schema(example = 40.0)]
    pub weight: f64,
}

/// Response payload carrying the id of a newly added coil.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct CoilIdResponse {
    pub id: i64,
}

/// Response payload confirming a removal.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CoilDeletedResponse {
    pub id: i64,
    #[schema(example = "Coil deleted")]
    pub detail: String,
}

/// Coil representation returned by reads.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CoilResponse {
    pub id: i64,
    pub length: f64,
    pub weight: f64,
    #[schema(format = "date-time")]
    pub date_added: String,
    #[schema(format = "date-time")]
    pub date_removed: Option<String>,
}

/// Statistics payload for a date window.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CoilStatsResponse {
    pub added_count: i64,
    pub removed_count: i64,
    pub avg_length: Option<f64>,
    pub avg_weight: Option<f64>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub total_weight: f64,
    pub min_dwell_days: Option<i64>,
    pub max_dwell_days: Option<i64>,
    #[schema(format = "date")]
    pub busiest_day: Option<String>,
    #[schema(format = "date")]
    pub quietest_day: Option<String>,
    #[schema(format = "date")]
    pub heaviest_day: Option<String>,
    #[schema(format = "date")]
    pub lightest_day: Option<String>,
}

/// Query parameters for listing coils. Every bound is optional and inclusive.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoilListQuery {
    pub id_min: Option<String>,
    pub id_max: Option<String>,
    pub weight_min: Option<String>,
    pub weight_max: Option<String>,
    pub length_min: Option<String>,
    pub length_max: Option<String>,
    /// Date (`YYYY-MM-DD`) or RFC 3339 timestamp.
    pub date_added_start: Option<String>,
    pub date_added_end: Option<String>,
    pub date_removed_start: Option<String>,
    pub date_removed_end: Option<String>,
}

/// Query parameters for the statistics window.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoilStatsQuery {
    /// Window start: date (`YYYY-MM-DD`) or RFC 3339 timestamp.
    pub date_start: Option<String>,
    /// Window end, inclusive of the whole day.
    pub date_end: Option<String>,
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_day(day: Option<NaiveDate>) -> Option<String> {
    day.map(|day| day.format("%Y-%m-%d").to_string())
}

impl From<Coil> for CoilResponse {
    fn from(coil: Coil) -> Self {
        Self {
            id: coil.id().get(),
            length: coil.length(),
            weight: coil.weight(),
            date_added: format_timestamp(coil.added_at()),
            date_removed: coil.removed_at().map(format_timestamp),
        }
    }
}

impl From<CoilStats> for CoilStatsResponse {
    fn from(stats: CoilStats) -> Self {
        Self {
            added_count: stats.added_count,
            removed_count: stats.removed_count,
            avg_length: stats.avg_length,
            avg_weight: stats.avg_weight,
            min_length: stats.min_length,
            max_length: stats.max_length,
            min_weight: stats.min_weight,
            max_weight: stats.max_weight,
            total_weight: stats.total_weight,
            min_dwell_days: stats.min_dwell_days,
            max_dwell_days: stats.max_dwell_days,
            busiest_day: format_day(stats.busiest_day),
            quietest_day: format_day(stats.quietest_day),
            heaviest_day: format_day(stats.heaviest_day),
            lightest_day: format_day(stats.lightest_day),
        }
    }
}

fn parse_coil_filter(query: CoilListQuery) -> Result<CoilFilter, Error> {
    let id = ValueRange::new(
        parse_optional_integer(query.id_min, FieldName::new("id_min"))?,
        parse_optional_integer(query.id_max, FieldName::new("id_max"))?,
    );
    let weight = ValueRange::new(
        parse_optional_number(query.weight_min, FieldName::new("weight_min"))?,
        parse_optional_number(query.weight_max, FieldName::new("weight_max"))?,
    );
    let length = ValueRange::new(
        parse_optional_number(query.length_min, FieldName::new("length_min"))?,
        parse_optional_number(query.length_max, FieldName::new("length_max"))?,
    );
    let added_at = ValueRange::new(
        parse_optional_date_or_timestamp(query.date_added_start, FieldName::new("date_added_start"))?,
        parse_optional_date_or_timestamp(query.date_added_end, FieldName::new("date_added_end"))?,
    );
    let removed_at = ValueRange::new(
        parse_optional_date_or_timestamp(
            query.date_removed_start,
            FieldName::new("date_removed_start"),
        )?,
        parse_optional_date_or_timestamp(query.date_removed_end, FieldName::new("date_removed_end"))?,
    );

    Ok(CoilFilter::default()
        .with_id(id.map(CoilId::new))
        .with_weight(weight)
        .with_length(length)
        .with_added_at(added_at)
        .with_removed_at(removed_at))
}

fn parse_stats_window(query: CoilStatsQuery) -> Result<StatsWindow, Error> {
    let start_field = FieldName::new("date_start");
    let end_field = FieldName::new("date_end");
    let start = parse_date_or_timestamp(require(query.date_start, start_field)?, start_field)?;
    let end = parse_date_or_timestamp(require(query.date_end, end_field)?, end_field)?;

    StatsWindow::new(start, end).map_err(|err| {
        Error::invalid_request(err.to_string()).with_context(serde_json::json!({
            "field": "date_start",
            "code": "invalid_window",
        }))
    })
}

/// Add a coil to stock and return its assigned id.
#[utoipa::path(
    post,
    path = "/api/coil",
    request_body = CreateCoilRequestBody,
    responses(
        (status = 200, description = "Coil added", body = CoilIdResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["coils"],
    operation_id = "createCoil"
)]
#[post("/coil")]
pub async fn create_coil(
    state: web::Data<HttpState>,
    payload: web::Json<CreateCoilRequestBody>,
) -> ApiResult<web::Json<CoilIdResponse>> {
    let CreateCoilRequestBody { length, weight } = payload.into_inner();
    let id = state
        .coils
        .create_coil(CreateCoilRequest { length, weight })
        .await?;
    Ok(web::Json(CoilIdResponse { id: id.get() }))
}

/// Remove an active coil from stock.
#[utoipa::path(
    delete,
    path = "/api/coil/{id}",
    params(("id" = i64, Path, description = "Coil identifier")),
    responses(
        (status = 200, description = "Coil removed", body = CoilDeletedResponse),
        (status = 404, description = "No active coil with that id", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["coils"],
    operation_id = "deleteCoil"
)]
#[delete("/coil/{id}")]
pub async fn delete_coil(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<CoilDeletedResponse>> {
    let removed = state
        .coils
        .remove_coil(CoilId::new(path.into_inner()))
        .await?;
    Ok(web::Json(CoilDeletedResponse {
        id: removed.id().get(),
        detail: "Coil deleted".to_owned(),
    }))
}

/// Statistics over a date window.
#[utoipa::path(
    get,
    path = "/api/coil/stats",
    params(CoilStatsQuery),
    responses(
        (status = 200, description = "Window statistics", body = CoilStatsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["coils"],
    operation_id = "coilStats"
)]
#[get("/coil/stats")]
pub async fn coil_stats(
    state: web::Data<HttpState>,
    query: web::Query<CoilStatsQuery>,
) -> ApiResult<web::Json<CoilStatsResponse>> {
    let window = parse_stats_window(query.into_inner())?;
    let stats = state.coils_query.coil_stats(window).await?;
    Ok(web::Json(CoilStatsResponse::from(stats)))
}

/// Fetch an active coil.
#[utoipa::path(
    get,
    path = "/api/coil/{id}",
    params(("id" = i64, Path, description = "Coil identifier")),
    responses(
        (status = 200, description = "Active coil", body = CoilResponse),
        (status = 404, description = "No active coil with that id", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["coils"],
    operation_id = "getCoil"
)]
#[get("/coil/{id}")]
pub async fn get_coil(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<CoilResponse>> {
    let coil = state
        .coils_query
        .get_coil(CoilId::new(path.into_inner()))
        .await?;
    Ok(web::Json(CoilResponse::from(coil)))
}

/// List coils matching the range filters, in ascending id order.
#[utoipa::path(
    get,
    path = "/api/coil",
    params(CoilListQuery),
    responses(
        (status = 200, description = "Matching coils", body = [CoilResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["coils"],
    operation_id = "listCoils"
)]
#[get("/coil")]
pub async fn list_coils(
    state: web::Data<HttpState>,
    query: web::Query<CoilListQuery>,
) -> ApiResult<web::Json<Vec<CoilResponse>>> {
    let filter = parse_coil_filter(query.into_inner())?;
    let coils = state.coils_query.list_coils(filter).await?;
    Ok(web::Json(coils.into_iter().map(CoilResponse::from).collect()))
}

/// Register the coil endpoints on a scope; `coil_stats` precedes `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_coil)
        .service(list_coils)
        .service(coil_stats)
        .service(get_coil)
        .service(delete_coil);
}

#[cfg(test)]
#[path = "coils_tests.rs"]
mod tests;
