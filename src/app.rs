use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, Error, web};

use crate::{config, handlers, service};

pub fn create_app(
    assistant_service: Arc<service::AssistantService>,
    config: Arc<config::Config>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Logger::default())
        .app_data(Data::from(assistant_service))
        .app_data(Data::from(config))
        .route("/", web::get().to(handlers::index))
        .service(
            web::scope("/api")
                .route("/starters", web::get().to(handlers::starters))
                .route("/modes", web::get().to(handlers::modes))
                .route("/sessions", web::post().to(handlers::create_session))
                .route("/sessions/{id}", web::get().to(handlers::get_session))
                .route("/sessions/{id}", web::delete().to(handlers::delete_session))
                .route(
                    "/sessions/{id}/messages",
                    web::post().to(handlers::post_message),
                ),
        )
}
