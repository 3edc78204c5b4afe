use rust_fines_client::config::Config;
use rust_fines_client::models::HealthReport;
use rust_fines_client::obs;
use rust_fines_client::state::AppState;

/// Bootstrap check.
///
/// Loads the configuration, builds the application state and checks that the
/// backend answers: payment health first, then the document type list.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok when both checks pass.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing(Config::debug_mode_from_env());
    let config = Config::from_env()?;

    let state = AppState::new(config)?;

    match state.payments.check_health().await {
        Ok(HealthReport::Validated(health)) => tracing::info!(
            status = %health.status,
            database = %health.database,
            payments = health.payments_count,
            "Payment backend healthy"
        ),
        Ok(HealthReport::Raw(raw)) => {
            tracing::warn!("Payment health document has an unexpected shape: {}", raw)
        }
        Err(e) => tracing::error!("Payment health check failed: {}", e),
    }

    let types = state
        .document_types
        .list(false)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    tracing::info!(
        "✓ {} document types available: {}",
        types.len(),
        types
            .iter()
            .map(|t| t.abbreviation.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("Civic code: {} laws bundled", state.civic_code.laws().len());

    Ok(())
}
