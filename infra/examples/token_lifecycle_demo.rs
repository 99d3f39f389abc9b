//! Token lifecycle walkthrough on the in-memory store
//!
//! Shows issuance, lookup, refresh and expiry with a manually driven clock.
//! Run with: cargo run -p tk_infra --example token_lifecycle_demo

use anyhow::Context;
use serde_json::json;
use tk_core::domain::entities::principal::{AuthPrincipal, PrincipalKind};
use tk_core::domain::entities::token::{TokenKind, TokenState};
use tk_core::repositories::MemoryTokenStore;
use tk_core::services::token::{mask_token, ManualClock, TokenService, TokenServiceConfig};
use tk_shared::config::{AppConfig, LoggingConfig};
use uuid::Uuid;

const HOUR: i64 = 60 * 60 * 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::development();
    tk_infra::logging::init(&LoggingConfig {
        level: "info".to_string(),
        ..config.logging.clone()
    })?;

    println!("Token Lifecycle Demo");
    println!("====================\n");

    let clock = ManualClock::new(chrono::Utc::now().timestamp_millis());
    let store = MemoryTokenStore::with_clock(clock.clone());
    let service_config = TokenServiceConfig::try_from(&config.token)?;
    let service = TokenService::with_clock(store, service_config, clock.clone())?;

    // 1. Issue a refresh token for an application user
    let principal = AuthPrincipal::new(PrincipalKind::ApplicationUser, Uuid::new_v4(), Uuid::new_v4());
    let mut state = TokenState::new();
    state.insert("device".to_string(), json!("demo-cli"));
    let refresh = service
        .create(TokenKind::Refresh, Some("refresh"), Some(principal), Some(state))
        .await?;
    println!("Issued refresh token: {}", mask_token(&refresh));

    // 2. Look it up an hour later
    clock.advance(HOUR);
    let record = service
        .lookup(&refresh)
        .await?
        .context("refresh token should resolve")?;
    println!(
        "Resolved record {} (type '{}', principal {:?}, accessed {})",
        record.id, record.token_type, record.principal, record.accessed
    );

    // 3. Exchange it for an access token bound to the same id
    let access = service
        .refresh(&refresh)
        .await?
        .context("refresh should yield an access token")?;
    println!("Refreshed access token: {}", mask_token(&access));

    // 4. The access token lapses after its lifetime
    clock.advance(24 * HOUR);
    match service.validate(&access) {
        Ok(_) => println!("Access token still valid"),
        Err(reason) => println!("Access token rejected: {}", reason),
    }
    println!(
        "Lookup after expiry: {:?}",
        service.lookup(&access).await?.map(|r| r.id)
    );

    Ok(())
}
