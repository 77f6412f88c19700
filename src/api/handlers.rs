// src/api/handlers.rs
use actix_web::{http::header, web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::LlmConfig;
use crate::error::AgentError;
use crate::gateway::{CallSettings, ProviderGateway};
use crate::models::{
    ActionResponse, AppendTurnRequest, EndCallRequest, FailCallRequest, GenerateScriptRequest,
    HealthResponse, InitiateCallRequest, InitiateCallResponse, SaveScriptRequest, SetupRequest,
    SetupResponse,
};
use crate::scripts::{templates, GeminiProvider, ScriptGenerator, ScriptLibrary, CALL_PURPOSES};
use crate::services::{export_csv, export_filename, CallSessionRegistry};

type Registry = web::Data<Arc<CallSessionRegistry>>;
type Gateway = web::Data<Arc<ProviderGateway>>;
type Generator = web::Data<Arc<ScriptGenerator>>;
type Library = web::Data<Arc<ScriptLibrary>>;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "voice-call-agent".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ==================== Setup ====================

async fn setup_state(gateway: &ProviderGateway, generator: &ScriptGenerator) -> SetupResponse {
    let settings = gateway.settings().await;
    let llm_configured = generator.is_configured().await;
    let provider_connected = gateway.is_connected().await;

    SetupResponse {
        setup_complete: llm_configured && provider_connected,
        llm_configured,
        provider_connected,
        max_duration_minutes: settings.max_duration_minutes,
        record_calls: settings.record_call,
    }
}

fn required(value: &Option<String>, what: &str) -> Result<String, AgentError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AgentError::InvalidRequest(format!("{} is required", what)))
}

pub async fn get_setup(gateway: Gateway, generator: Generator) -> HttpResponse {
    HttpResponse::Ok().json(setup_state(&gateway, &generator).await)
}

/// Configures the language model and connects the calling platform
#[instrument(skip_all)]
pub async fn setup(
    req: web::Json<SetupRequest>,
    gateway: Gateway,
    generator: Generator,
    registry: Registry,
    llm: web::Data<LlmConfig>,
) -> Result<HttpResponse, AgentError> {
    let llm_key = required(&req.llm_api_key, "Language model API key")?;
    let provider_key = required(&req.provider_api_key, "Calling platform API key")?;
    let app_id = required(&req.provider_app_id, "Calling platform application ID")?;

    let current = gateway.settings().await;
    let settings = CallSettings::new(
        req.max_duration_minutes.unwrap_or(current.max_duration_minutes),
        req.record_calls.unwrap_or(current.record_call),
    )?;
    let provider = GeminiProvider::new(llm_key, llm.model.clone())
        .map_err(|e| AgentError::Internal(e.to_string()))?
        .with_base_url(llm.base_url.clone());

    // Nothing is applied until the calling platform accepts the credentials
    if !gateway.connect(&provider_key, &app_id).await {
        warn!("Setup failed: calling platform rejected credentials");
        return Err(AgentError::InvalidCredentials(
            "Failed to connect to the calling platform".to_string(),
        ));
    }

    gateway.update_settings(settings).await;
    registry
        .set_duration_limit(Duration::from_secs(settings.max_duration_secs()))
        .await;
    generator.configure(Arc::new(provider)).await;

    info!("✅ Voice calling agent ready");
    Ok(HttpResponse::Ok().json(setup_state(&gateway, &generator).await))
}

// ==================== Scripts ====================

pub async fn list_templates() -> HttpResponse {
    HttpResponse::Ok().json(templates::list_templates())
}

pub async fn list_purposes() -> HttpResponse {
    HttpResponse::Ok().json(CALL_PURPOSES)
}

pub async fn generate_script(
    req: web::Json<GenerateScriptRequest>,
    generator: Generator,
) -> HttpResponse {
    let context = format!("{} {}", req.context, req.instructions);
    let script = generator.generate(&req.purpose, context.trim()).await;
    HttpResponse::Ok().json(script)
}

pub async fn save_script(
    req: web::Json<SaveScriptRequest>,
    library: Library,
) -> Result<HttpResponse, AgentError> {
    let saved = library.save(&req.name, &req.script).await?;
    Ok(HttpResponse::Created().json(saved))
}

pub async fn list_scripts(library: Library) -> HttpResponse {
    HttpResponse::Ok().json(library.list().await)
}

pub async fn get_script(
    name: web::Path<String>,
    library: Library,
) -> Result<HttpResponse, AgentError> {
    Ok(HttpResponse::Ok().json(library.get(&name).await?))
}

// ==================== Calls ====================

#[instrument(skip_all)]
pub async fn initiate_call(
    req: web::Json<InitiateCallRequest>,
    registry: Registry,
    gateway: Gateway,
    generator: Generator,
) -> Result<HttpResponse, AgentError> {
    if !setup_state(&gateway, &generator).await.setup_complete {
        return Err(AgentError::SetupRequired(
            "configure API keys before placing calls".to_string(),
        ));
    }

    let purpose = req.purpose.as_deref().unwrap_or_default();
    let call_id = registry.initiate(&req.phone_number, &req.script, purpose).await?;

    Ok(HttpResponse::Created().json(InitiateCallResponse {
        success: true,
        call_id,
        message: "Call initiated successfully".to_string(),
    }))
}

pub async fn list_active_calls(registry: Registry) -> HttpResponse {
    HttpResponse::Ok().json(registry.list_active().await)
}

pub async fn call_status(
    call_id: web::Path<Uuid>,
    registry: Registry,
) -> Result<HttpResponse, AgentError> {
    Ok(HttpResponse::Ok().json(registry.status(*call_id).await?))
}

pub async fn call_transcript(
    call_id: web::Path<Uuid>,
    registry: Registry,
) -> Result<HttpResponse, AgentError> {
    let session = registry.session(*call_id).await?;
    Ok(HttpResponse::Ok().json(session.conversation_log))
}

pub async fn end_call(
    call_id: web::Path<Uuid>,
    body: web::Bytes,
    registry: Registry,
) -> Result<HttpResponse, AgentError> {
    // The body is optional, but a present one must be a valid request
    let outcome = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<EndCallRequest>(&body)
            .map_err(|e| AgentError::InvalidRequest(format!("invalid end call body: {}", e)))?
            .outcome
    };
    registry.end(*call_id, outcome).await?;

    Ok(HttpResponse::Ok().json(ActionResponse {
        success: true,
        message: "Call ended successfully".to_string(),
    }))
}

/// Provider reports the call connected
pub async fn activate_call(
    call_id: web::Path<Uuid>,
    registry: Registry,
) -> Result<HttpResponse, AgentError> {
    registry.activate(*call_id).await?;

    Ok(HttpResponse::Ok().json(ActionResponse {
        success: true,
        message: "Call active".to_string(),
    }))
}

/// Provider reports the call failed
pub async fn fail_call(
    call_id: web::Path<Uuid>,
    req: web::Json<FailCallRequest>,
    registry: Registry,
) -> Result<HttpResponse, AgentError> {
    registry.fail(*call_id, &req.reason).await?;

    Ok(HttpResponse::Ok().json(ActionResponse {
        success: true,
        message: "Call marked as failed".to_string(),
    }))
}

pub async fn append_turn(
    call_id: web::Path<Uuid>,
    req: web::Json<AppendTurnRequest>,
    registry: Registry,
) -> Result<HttpResponse, AgentError> {
    registry.append_turn(*call_id, req.role, &req.text).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ==================== Analytics ====================

pub async fn analytics(registry: Registry) -> HttpResponse {
    HttpResponse::Ok().json(registry.analytics().await)
}

pub async fn call_history(registry: Registry) -> HttpResponse {
    HttpResponse::Ok().json(registry.history().await)
}

pub async fn export_history(registry: Registry) -> Result<HttpResponse, AgentError> {
    let history = registry.history().await;
    let body = export_csv(&history)?;
    let filename = export_filename(Utc::now());

    info!("📥 Exporting {} calls to {}", history.len(), filename);

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body))
}
