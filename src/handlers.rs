use actix_web::web::{Bytes, Data, Json, Path};
use actix_web::{HttpResponse, Responder, mime};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::config;
use crate::consts;
use crate::errors::AssistantError;
use crate::models::events::{CreateSession, SessionCreated, SessionHistory, TurnResult, UserMessage};
use crate::models::Role;
use crate::models::request::Message;
use crate::prompts;
use crate::service::AssistantService;
use crate::session::{AssistantMode, parse_session_id};

const INDEX_HTML: &str = include_str!("../static/index.html");

fn error_response(e: AssistantError) -> HttpResponse {
    HttpResponse::build(e.status_code()).json(json!({ "error": e.to_string() }))
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(INDEX_HTML)
}

pub async fn starters() -> impl Responder {
    HttpResponse::Ok().json(prompts::starters())
}

pub async fn modes(config: Data<config::Config>) -> impl Responder {
    let modes: Vec<&str> = AssistantMode::ALL.iter().map(AssistantMode::slug).collect();
    HttpResponse::Ok().json(json!({
        "modes": modes,
        "default": AssistantMode::default().slug(),
        "model": config.openai.model,
    }))
}

pub async fn create_session(
    service: Data<AssistantService>,
    request: Option<Json<CreateSession>>,
) -> impl Responder {
    let mode = match request.and_then(|request| request.0.mode) {
        None => AssistantMode::default(),
        Some(slug) => match AssistantMode::from_slug(&slug) {
            Some(mode) => mode,
            None => {
                log::info!("error: unknown mode: {:?}", slug);
                return error_response(AssistantError::ValidationError(format!(
                    "unknown mode {}",
                    slug
                )));
            }
        },
    };

    let id = service.sessions().create(mode);
    HttpResponse::Created().json(SessionCreated {
        session_id: id.to_string(),
        mode: mode.slug().to_string(),
    })
}

pub async fn get_session(service: Data<AssistantService>, id: Path<String>) -> impl Responder {
    let session = match parse_session_id(&id).and_then(|id| service.sessions().get(id)) {
        Ok(session) => session,
        Err(e) => return error_response(e),
    };

    let messages: Vec<Message> = session
        .messages
        .into_iter()
        .filter(|message| message.role() != Role::System)
        .collect();

    HttpResponse::Ok().json(SessionHistory {
        session_id: session.id.to_string(),
        mode: session.mode.slug().to_string(),
        messages,
    })
}

pub async fn delete_session(service: Data<AssistantService>, id: Path<String>) -> impl Responder {
    match parse_session_id(&id).and_then(|id| service.sessions().remove(id)) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

pub async fn post_message(
    service: Data<AssistantService>,
    id: Path<String>,
    request: Json<UserMessage>,
) -> impl Responder {
    let session_id = match parse_session_id(&id).and_then(|id| service.sessions().get(id)) {
        Ok(session) => session.id,
        Err(e) => return error_response(e),
    };
    let UserMessage { content, stream } = request.0;

    log::debug!("session {}: user message of {} chars", session_id, content.len());

    if stream.unwrap_or(false) {
        let (sender, receiver) =
            mpsc::channel::<Result<Bytes, AssistantError>>(consts::CHANNEL_BUFFER_SIZE);
        actix_web::rt::spawn(async move {
            if let Err(e) = service.stream_turn(session_id, &content, sender).await {
                log::error!("stream_turn error: {:?}", e);
            }
        });

        return HttpResponse::Ok()
            .content_type(mime::TEXT_EVENT_STREAM)
            .streaming(ReceiverStream::new(receiver));
    }

    match service.run_turn_collect(session_id, &content).await {
        Ok(events) => HttpResponse::Ok().json(TurnResult { events }),
        Err(e) => {
            log::error!("run_turn error: {:?}", e);
            error_response(e)
        }
    }
}
