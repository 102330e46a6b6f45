use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fan_control::Event;
use log::debug;
use serde::Deserialize;

use super::{AppState, ServiceError};

#[derive(Debug, Deserialize)]
pub struct ManualRequest {
    pub speed: u8,
}

pub async fn manual(
    State(state): State<AppState>,
    Json(request): Json<ManualRequest>,
) -> Result<StatusCode, ServiceError> {
    debug!("[manual]: {:?}", request);

    if !state.zones.supports_speed(request.speed) {
        return Err(
            fan_control::Error::UnsupportedSpeed(request.speed, state.zones.levels()).into(),
        );
    }

    state.handle.send(Event::Manual(request.speed))?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn auto(State(state): State<AppState>) -> Result<StatusCode, ServiceError> {
    state.handle.send(Event::Auto)?;

    Ok(StatusCode::ACCEPTED)
}
