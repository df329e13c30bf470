use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use classprofile::config::Config;
use classprofile::report::convert::Converter;
use classprofile::report::document::DocumentRenderer;
use classprofile::store::CourseStore;
use classprofile::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load_or_default(&config_path)?;

    // Initialize logging
    let _logging_guard =
        classprofile::logging::init_logging(&config.log_dir, "classprofile", &config.log_level);

    tracing::info!("Class profile server starting...");

    // Build the read-only course store once; it is shared by every request.
    let store = CourseStore::load(&config.dataset_path).await?;
    if store.is_empty() {
        anyhow::bail!("dataset '{}' contains no course records", config.dataset_path);
    }

    let converter = Converter::new(
        config.browser_path.clone(),
        Duration::from_secs(config.convert_timeout_secs),
    );
    let renderer = DocumentRenderer::new(converter, &config.output_dir);

    let state = AppState {
        store: Arc::new(store),
        renderer: Arc::new(renderer),
    };
    let app = web::router(state);

    let addr = config.server_address();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
