//! Keep-alive HTTP endpoint.
//!
//! Exists solely so an external uptime monitor can confirm the process is
//! running; carries no business data.

use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

pub fn router() -> Router {
    Router::new().route("/", get(health))
}

pub async fn serve(bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind health endpoint on {bind_addr}"))?;
    axum::serve(listener, router()).await?;
    Ok(())
}
