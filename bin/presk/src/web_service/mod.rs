mod dashboard;
mod fan;

use std::sync::Arc;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use fan_control::ZoneTable;
use log::{error, info};
use tokio::net::TcpListener;

use crate::{Error, Handle, Result};

#[derive(Debug)]
pub struct ServiceError(Error, uuid::Uuid);

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::FanControl(fan_control::Error::UnsupportedSpeed(..)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::SessionEnded => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response<Body> {
        error!("ServiceError[{}]: {}", self.1, self.0);

        (self.status(), self.0.to_string()).into_response()
    }
}

impl From<Error> for ServiceError {
    fn from(value: Error) -> Self {
        ServiceError(value, uuid::Uuid::new_v4())
    }
}

impl From<fan_control::Error> for ServiceError {
    fn from(value: fan_control::Error) -> Self {
        ServiceError(Error::FanControl(value), uuid::Uuid::new_v4())
    }
}

#[derive(Clone)]
pub struct AppState {
    handle: Handle,
    zones: Arc<ZoneTable>,
}

pub fn router(handle: Handle, zones: ZoneTable) -> Router {
    let state = AppState {
        handle,
        zones: Arc::new(zones),
    };

    Router::new()
        .route("/api/dashboard", get(dashboard::dashboard))
        .route("/api/history", get(dashboard::history))
        .route("/api/fan/manual", post(fan::manual))
        .route("/api/fan/auto", post(fan::auto))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    info!("Listening http://{}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}
