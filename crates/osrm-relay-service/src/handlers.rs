use axum::{
    Json,
    extract::{RawQuery, State},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tracing::{info, warn};

use osrm_relay_lib::{
    EngineResponse, Error as LibError, Locale, Operation, QueryParams, RouteSummary, SnapFallback,
    summarize,
};
use osrm_relay_service_shared::{
    AppState, PointsQuery, RequestId, RouteQuery, RouteTarget, ServiceError, ServiceResponse,
    engine_outcome, record_engine_request, record_fallback, record_summary,
};

/// Body of `/route/summary`: the engine document and its digest.
#[derive(Debug, Serialize)]
pub struct RouteWithSummary {
    pub route: EngineResponse,
    pub summary: RouteSummary,
}

const USAGE_PAGE: &str = include_str!("../static/index.html");

/// Handle `GET /`: static page with example queries.
pub async fn index() -> Html<&'static str> {
    Html(USAGE_PAGE)
}

/// Handle `GET /route`.
pub async fn route(
    State(state): State<AppState>,
    request_id: RequestId,
    RawQuery(raw): RawQuery,
) -> Result<Response, ServiceError> {
    let query = RouteQuery::from_raw(raw.as_deref());
    let target = query.target(request_id.as_str())?;

    let response = resolve_route(&state, &request_id, &target, &query.params).await?;
    Ok(Json(response).into_response())
}

/// Handle `GET /route/summary`.
///
/// Asks the engine for steps unless the caller set `steps` (and keeps
/// `overview=false` as the default).
pub async fn route_summary(
    State(state): State<AppState>,
    request_id: RequestId,
    RawQuery(raw): RawQuery,
) -> Result<Response, ServiceError> {
    let mut query = RouteQuery::from_raw(raw.as_deref());
    let target = query.target(request_id.as_str())?;
    let locale: Locale = query.locale(state.default_locale(), request_id.as_str())?;

    query.params.set_default("steps", "true");
    query.params.set_default("overview", "false");

    let response = resolve_route(&state, &request_id, &target, &query.params).await?;
    let summary = summarize(&response, locale);
    record_summary(locale.as_str(), response.is_successful());

    info!(
        request_id = %request_id,
        locale = %locale,
        legs = summary.legs.len(),
        distance_km = summary.distance_km,
        "route summary built"
    );

    Ok(ServiceResponse::new(RouteWithSummary {
        route: response,
        summary,
    })
    .into_response())
}

/// Handle `GET /table`.
pub async fn table(
    State(state): State<AppState>,
    request_id: RequestId,
    RawQuery(raw): RawQuery,
) -> Result<Response, ServiceError> {
    relay(&state, Operation::Table, &request_id, raw.as_deref()).await
}

/// Handle `GET /nearest`.
pub async fn nearest(
    State(state): State<AppState>,
    request_id: RequestId,
    RawQuery(raw): RawQuery,
) -> Result<Response, ServiceError> {
    relay(&state, Operation::Nearest, &request_id, raw.as_deref()).await
}

/// Handle `GET /match`.
pub async fn match_trace(
    State(state): State<AppState>,
    request_id: RequestId,
    RawQuery(raw): RawQuery,
) -> Result<Response, ServiceError> {
    relay(&state, Operation::Match, &request_id, raw.as_deref()).await
}

/// Handle `GET /trip`.
pub async fn trip(
    State(state): State<AppState>,
    request_id: RequestId,
    RawQuery(raw): RawQuery,
) -> Result<Response, ServiceError> {
    relay(&state, Operation::Trip, &request_id, raw.as_deref()).await
}

/// Route through the snap fallback.
///
/// Unsuccessful engine documents are returned as-is; only transport errors
/// and rejections become [`ServiceError`]s.
async fn resolve_route(
    state: &AppState,
    request_id: &RequestId,
    target: &RouteTarget,
    params: &QueryParams,
) -> Result<EngineResponse, ServiceError> {
    info!(
        request_id = %request_id,
        start = %target.start,
        end = %target.end,
        via = target.via.len(),
        "handling route request"
    );

    let resolution = SnapFallback::new(state.client())
        .resolve(&target.start, &target.end, &target.via, params)
        .await
        .map_err(|err| engine_failure(Operation::Route, request_id, &err))?;

    record_fallback(resolution.outcome, resolution.engine_calls);
    if let Some((start, end)) = &resolution.snapped {
        info!(
            request_id = %request_id,
            snapped_start = %start,
            snapped_end = %end,
            engine_calls = resolution.engine_calls,
            "route resolved with snapped endpoints"
        );
    }

    match resolution.response {
        Ok(response) => {
            record_engine_request(Operation::Route, engine_outcome(Ok(response.is_successful())));
            Ok(response)
        }
        Err(err) => Err(engine_failure(Operation::Route, request_id, &err)),
    }
}

/// Forward a non-route operation unchanged.
async fn relay(
    state: &AppState,
    operation: Operation,
    request_id: &RequestId,
    raw: Option<&str>,
) -> Result<Response, ServiceError> {
    let query = PointsQuery::from_raw(raw);
    let coordinates = query.sequence(operation, request_id.as_str())?;

    info!(
        request_id = %request_id,
        operation = %operation,
        points = coordinates.len(),
        "relaying engine request"
    );

    let response = state
        .client()
        .query(operation, &coordinates, &query.params)
        .await
        .map_err(|err| engine_failure(operation, request_id, &err))?;

    record_engine_request(operation, engine_outcome(Ok(response.is_ok())));
    Ok(Json(response).into_response())
}

fn engine_failure(operation: Operation, request_id: &RequestId, err: &LibError) -> ServiceError {
    record_engine_request(operation, engine_outcome(Err(err)));
    warn!(
        request_id = %request_id,
        operation = %operation,
        error = %err,
        "engine request failed"
    );
    ServiceError::from_lib(err, request_id.as_str())
}
