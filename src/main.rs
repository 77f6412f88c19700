// src/main.rs
use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use voice_call_agent::api;
use voice_call_agent::config::Config;
use voice_call_agent::gateway::{CallGateway, ProviderGateway};
use voice_call_agent::scripts::{GeminiProvider, ScriptGenerator, ScriptLibrary};
use voice_call_agent::services::CallSessionRegistry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .json()
        .init();

    info!("🚀 Starting Voice Call Agent");

    let config = Config::from_env()?;

    info!("Environment: {}", config.environment);

    // Calling platform
    let gateway = Arc::new(ProviderGateway::new(
        &config.provider.base_url,
        config.provider.timeout_ms,
        config.provider.submission_mode,
        config.call_settings,
    )?);

    info!("Call submission mode: {:?}", gateway.mode());

    if let (Some(api_key), Some(app_id)) = (&config.provider.api_key, &config.provider.app_id) {
        if gateway.connect(api_key, app_id).await {
            info!("✅ Calling platform credentials from environment accepted");
        } else {
            warn!("⚠️  Calling platform credentials from environment rejected");
        }
    } else {
        info!("⚠️  No calling platform credentials configured, waiting for setup");
    }

    // Script generation
    let generator = Arc::new(ScriptGenerator::default());
    if let Some(api_key) = &config.llm.api_key {
        generator
            .configure(Arc::new(
                GeminiProvider::new(api_key.clone(), config.llm.model.clone())?
                    .with_base_url(config.llm.base_url.clone()),
            ))
            .await;
    }

    let library = Arc::new(ScriptLibrary::new());

    // Session registry
    let mut registry = CallSessionRegistry::new(gateway.clone() as Arc<dyn CallGateway>);
    if config.enforce_max_duration {
        let limit = Duration::from_secs(config.call_settings.max_duration_secs());
        info!("Max call duration enforced: {}s", limit.as_secs());
        registry = registry.with_duration_limit(limit);
    }
    let registry = Arc::new(registry);

    // HTTP Server
    let bind_address = format!("{}:{}", config.host, config.port);
    info!("🌐 Starting HTTP server on {}", bind_address);

    let llm_config = web::Data::new(config.llm.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(generator.clone()))
            .app_data(web::Data::new(library.clone()))
            .app_data(llm_config.clone())
            .configure(api::routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
