use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use appointd::database::{
    init_database,
    repositories::{AppointmentRepository, UserRepository},
};
use appointd::handlers::{appointments, auth};
use appointd::services::{LogMailer, Notifier};
use appointd::{AppState, AuthService, Config};

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Initialize repositories and services
    let user_repository = UserRepository::new(pool.clone());
    let appointment_repository = AppointmentRepository::new(pool.clone());
    let auth_service = AuthService::new(config.clone(), user_repository);
    let notifier = Notifier::new(Arc::new(LogMailer), config.mail_from.clone());

    let app_state = web::Data::new(AppState { auth_service });
    let appointment_repo_data = web::Data::new(appointment_repository);
    let notifier_data = web::Data::new(notifier);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(appointment_repo_data.clone())
            .app_data(notifier_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/appointments")
                            .route("", web::post().to(appointments::create_appointment))
                            .route("", web::get().to(appointments::list_appointments))
                            .route("/{id}", web::get().to(appointments::get_appointment))
                            .route("/{id}", web::put().to(appointments::update_appointment))
                            .route("/{id}", web::delete().to(appointments::delete_appointment))
                            .route(
                                "/{id}/status",
                                web::post().to(appointments::update_appointment_status),
                            ),
                    )
                    .service(
                        web::scope("/calendar")
                            .route("", web::get().to(appointments::calendar_current))
                            .route(
                                "/{year}/{month}",
                                web::get().to(appointments::calendar_month),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
