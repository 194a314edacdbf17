use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionService;
use crate::configuration::{ApplicationSettings, JwtSettings};
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::metrics::{HitCounter, HitCounterMiddleware};
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_chirp, create_user, get_chirp, health_check, list_chirps, login, metrics, refresh, reset,
    revoke, update_user, validate_chirp,
};
use crate::store::Store;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    application: ApplicationSettings,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionService::new(store.clone(), jwt_config));
    let store = web::Data::from(store);
    let counter = HitCounter::new();
    let counter_data = web::Data::new(counter.clone());
    let static_dir = application.static_dir.clone();
    let application = web::Data::new(application);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(sessions.clone())
            .app_data(store.clone())
            .app_data(counter_data.clone())
            .app_data(application.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(ValidationError::InvalidPayload(err.to_string())).into()
            }))

            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/validate_chirp", web::post().to(validate_chirp))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            // Protected methods are matched first; other methods fall through to the public resource
            .service(
                web::resource("/api/users")
                    .guard(guard::Put())
                    .wrap(JwtMiddleware)
                    .route(web::put().to(update_user)),
            )
            .route("/api/users", web::post().to(create_user))
            .service(
                web::resource("/api/chirps")
                    .guard(guard::Post())
                    .wrap(JwtMiddleware)
                    .route(web::post().to(create_chirp)),
            )
            .route("/api/chirps", web::get().to(list_chirps))
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp))

            // Admin
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            // Static files, counted
            .service(
                web::scope("/app")
                    .wrap(HitCounterMiddleware::new(counter.clone()))
                    .service(fs::Files::new("", static_dir.clone()).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
