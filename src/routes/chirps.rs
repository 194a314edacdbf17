use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::profanity::validate_chirp as clean_chirp;
use crate::store::{Chirp, Store};

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    pub user_id: String,
}

impl From<&Chirp> for ChirpResponse {
    fn from(chirp: &Chirp) -> Self {
        Self {
            id: chirp.id.to_string(),
            created_at: chirp.created_at.to_rfc3339(),
            updated_at: chirp.updated_at.to_rfc3339(),
            body: chirp.body.clone(),
            user_id: chirp.user_id.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct CleanedChirp {
    pub cleaned_body: String,
}

/// POST /api/validate_chirp
pub async fn validate_chirp(form: web::Json<ChirpRequest>) -> Result<HttpResponse, AppError> {
    let cleaned_body = clean_chirp(&form.body)?;
    Ok(HttpResponse::Ok().json(CleanedChirp { cleaned_body }))
}

/// POST /api/chirps
///
/// The author is always the authenticated user.
pub async fn create_chirp(
    identity: web::ReqData<AuthenticatedUser>,
    form: web::Json<ChirpRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let body = clean_chirp(&form.body)?;
    let chirp = store.create_chirp(&body, identity.user_id).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %chirp.user_id, "Chirp created");
    Ok(HttpResponse::Created().json(ChirpResponse::from(&chirp)))
}

/// GET /api/chirps
pub async fn list_chirps(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let chirps = store.list_chirps().await?;
    let body: Vec<ChirpResponse> = chirps.iter().map(ChirpResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| ValidationError::InvalidFormat("chirp_id"))?;

    let chirp = store.get_chirp(chirp_id).await?;
    Ok(HttpResponse::Ok().json(ChirpResponse::from(&chirp)))
}
