use actix_web::{HttpResponse, web};
use log::{debug, error};
use serde::Serialize;
use serde_json::Value;
use shared::{AccuracyResponse, PredictResponse, TransformResponse};

use crate::inference::{FeatureFrame, InferenceService, validate};

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/transform").route(web::post().to(transform)))
        .service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/accuracy").route(web::post().to(accuracy)));
}

fn bad_request(message: String) -> HttpResponse {
    error!("{}", message);
    HttpResponse::BadRequest().json(ErrorResponse { error: message })
}

fn server_error(context: &str, message: String) -> HttpResponse {
    error!("Error during {}: {}", context, message);
    HttpResponse::InternalServerError().json(ErrorResponse { error: message })
}

/// Shape the raw `features` rows shared by all three handlers. A
/// `ShapeError` is a client fault and routes to 400, same as a
/// validation failure.
fn shape(rows: &[Value]) -> Result<FeatureFrame, HttpResponse> {
    let frame = FeatureFrame::from_rows(rows).map_err(|e| bad_request(e.to_string()))?;
    debug!("Shaped {} feature rows", frame.len());
    Ok(frame)
}

async fn transform(service: web::Data<InferenceService>, body: web::Json<Value>) -> HttpResponse {
    let data = body.into_inner();
    debug!("Received data for transformation: {}", data);

    let rows = match validate::features(&data) {
        Ok(rows) => rows,
        Err(e) => return bad_request(e.to_string()),
    };
    let frame = match shape(rows) {
        Ok(frame) => frame,
        Err(response) => return response,
    };

    match service.transform(&frame) {
        Ok(matrix) => {
            debug!("Preprocessed data: {:?}", matrix);
            let transformed_features = matrix.rows().into_iter().map(|row| row.to_vec()).collect();
            HttpResponse::Ok().json(TransformResponse {
                transformed_features,
            })
        }
        Err(e) => server_error("transformation", e.to_string()),
    }
}

async fn predict(service: web::Data<InferenceService>, body: web::Json<Value>) -> HttpResponse {
    let data = body.into_inner();
    debug!("Received data: {}", data);

    let rows = match validate::features(&data) {
        Ok(rows) => rows,
        Err(e) => return bad_request(e.to_string()),
    };
    let frame = match shape(rows) {
        Ok(frame) => frame,
        Err(response) => return response,
    };

    match service.predict_label(&frame) {
        Ok(label) => {
            debug!("Predicted label: {}", label);
            HttpResponse::Ok().json(PredictResponse { prediction: label })
        }
        Err(e) => server_error("prediction", e.to_string()),
    }
}

async fn accuracy(service: web::Data<InferenceService>, body: web::Json<Value>) -> HttpResponse {
    let data = body.into_inner();
    debug!("Received data for accuracy calculation: {}", data);

    let (rows, labels) = match validate::features_and_labels(&data) {
        Ok(parts) => parts,
        Err(e) => return bad_request(e.to_string()),
    };
    let frame = match shape(rows) {
        Ok(frame) => frame,
        Err(response) => return response,
    };

    match service.accuracy(&frame, &labels) {
        Ok(accuracy) => {
            debug!("Calculated accuracy: {}", accuracy);
            HttpResponse::Ok().json(AccuracyResponse { accuracy })
        }
        Err(e) => server_error("accuracy calculation", e.to_string()),
    }
}
