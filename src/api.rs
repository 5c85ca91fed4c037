use std::path::{Path, PathBuf};

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::{web, HttpResponse};
use log::{error, info, warn};

use crate::aggregate::aggregate;
use crate::error::ApiError;
use crate::models::review::{CreatedReview, Review, ReviewSubmission, ReviewSummary};
use crate::store::{ReviewStore, StoreError, REVIEWS_COLLECTION};
use crate::validation::{validate, Denylist};

pub const CREATED_MESSAGE: &str = "Review added successfully!";

/// Registers the review routes and the JSON body limits for them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::resource("/api/tours/{tour_id}/reviews")
            .route(web::post().to(create_review))
            .route(web::get().to(get_reviews)),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            warn!("[API] Rejected payload: {}", err);
            ApiError::MalformedPayload(err.to_string()).into()
        })
}

// POST /api/tours/{tour_id}/reviews
pub async fn create_review(
    store: web::Data<dyn ReviewStore>,
    denylist: web::Data<Denylist>,
    path: web::Path<String>,
    body: web::Json<ReviewSubmission>,
) -> Result<HttpResponse, ApiError> {
    let tour_id = path.into_inner();
    info!("[API] Received review for tour: {}", tour_id);

    let new_review = validate(&tour_id, &body, &denylist).map_err(|e| {
        info!("[API] Review for {} rejected: {}", tour_id, e.code());
        ApiError::from(e)
    })?;

    let doc = store
        .append(REVIEWS_COLLECTION, new_review.to_record())
        .await
        .map_err(|e| {
            error!("[API] Failed to save review for {}: {}", tour_id, e);
            ApiError::StoreWrite(e)
        })?;

    let review = new_review.into_review(doc.id, doc.created_at);
    info!("[API] Saved review {} for tour {}", review.id, tour_id);

    Ok(HttpResponse::Created().json(CreatedReview {
        message: CREATED_MESSAGE.to_string(),
        review,
    }))
}

// GET /api/tours/{tour_id}/reviews
pub async fn get_reviews(
    store: web::Data<dyn ReviewStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let tour_id = path.into_inner();

    let docs = store
        .query_by_field(REVIEWS_COLLECTION, "tourId", &tour_id)
        .await
        .map_err(|e| {
            error!("[API] Failed to fetch reviews for {}: {}", tour_id, e);
            ApiError::StoreRead(e)
        })?;

    if docs.is_empty() {
        return Ok(HttpResponse::Ok().json(ReviewSummary::empty()));
    }

    let reviews = docs
        .into_iter()
        .map(Review::try_from)
        .collect::<Result<Vec<_>, StoreError>>()
        .map_err(|e| {
            error!("[API] Unreadable review for {}: {}", tour_id, e);
            ApiError::StoreRead(e)
        })?;

    info!("[API] Returning {} reviews for tour: {}", reviews.len(), tour_id);
    Ok(HttpResponse::Ok().json(aggregate(reviews)))
}

/// Static frontend bundle. Paths without a matching file get `index.html`
/// so client-side routes resolve.
pub fn spa_service(static_dir: &Path) -> Files {
    let index: PathBuf = static_dir.join("index.html");

    Files::new("/", static_dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(&index).await?;
                let res = file.into_response(&req);
                Ok(ServiceResponse::new(req, res))
            }
        }))
}
