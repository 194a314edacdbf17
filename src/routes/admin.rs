use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::metrics::HitCounter;
use crate::store::Store;

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        counter.get()
    ))
}

/// POST /admin/reset
///
/// Development only: deletes every user (and with them all tokens and
/// chirps) and zeroes the hit counter.
pub async fn reset(
    settings: web::Data<ApplicationSettings>,
    counter: web::Data<HitCounter>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    if !settings.is_dev() {
        return Err(AppError::Forbidden("reset is only allowed on the dev platform".to_string()));
    }

    store.delete_all_users().await?;
    counter.reset();

    tracing::warn!("All users deleted and metrics reset");
    Ok(HttpResponse::Ok().finish())
}
