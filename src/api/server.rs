use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use super::page::{self, FormValues, PageOutcome};
use super::{ErrorResponse, PredictionResponse};
use crate::core::{AccessMetrics, EstimatorError, EstimatorResult, FormField, ServerSettings};
use crate::ml::{run_inference, Regressor};
use crate::monitoring::TelemetryManager;
use crate::report::{prediction_error_message, Report};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Serves the estimator form and JSON endpoint over HTTP.
///
/// The model is shared read-only between requests; no lock is taken.
pub struct EstimatorServer {
    config: ServerSettings,
    model: Arc<dyn Regressor>,
    telemetry: TelemetryManager,
}

impl EstimatorServer {
    pub fn new(config: ServerSettings, model: Arc<dyn Regressor>, telemetry: TelemetryManager) -> Self {
        Self { config, model, telemetry }
    }

    pub fn address(&self) -> EstimatorResult<SocketAddr> {
        format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| EstimatorError::Config(format!("invalid server address: {}", e)))
    }

    /// Runs until Ctrl-C.
    pub async fn start(&self) -> EstimatorResult<()> {
        let addr = self.address()?;
        let routes = self.create_routes();

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .map_err(|e| EstimatorError::Config(format!("cannot bind {}: {}", addr, e)))?;

        info!("Serving the water use estimator on http://{}", bound);
        server.await;
        info!("Server stopped");
        Ok(())
    }

    pub fn create_routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        self.page_routes()
            .or(self.api_routes())
            .or(health())
            .recover(handle_rejection)
            .with(warp::trace::request())
    }

    /// GET / and POST /predict
    fn page_routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let index = warp::path::end()
            .and(warp::get())
            .map(|| warp::reply::html(page::render(&FormValues::default(), None)));

        let model = Arc::clone(&self.model);
        let telemetry = self.telemetry.clone();
        let submit = warp::path("predict")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::form())
            .map(move |form: HashMap<String, String>| {
                let (values, parsed) = parse_form(&form);
                let outcome = match parsed.and_then(|()| run_inference(model.as_ref(), values.metrics())) {
                    Ok(estimate) => {
                        telemetry.log_prediction("web", &estimate);
                        PageOutcome::Report(Report::new(&estimate))
                    }
                    Err(e) => {
                        telemetry.log_error(&e, "web form prediction");
                        PageOutcome::Error(prediction_error_message(&e))
                    }
                };
                warp::reply::html(page::render(&values, Some(&outcome)))
            });

        index.or(submit)
    }

    /// POST /api/predict
    fn api_routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let model = Arc::clone(&self.model);
        let telemetry = self.telemetry.clone();

        warp::path("api")
            .and(warp::path("predict"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json())
            .map(move |metrics: AccessMetrics| match run_inference(model.as_ref(), &metrics) {
                Ok(estimate) => {
                    telemetry.log_prediction("api", &estimate);
                    warp::reply::with_status(
                        warp::reply::json(&PredictionResponse::from(&estimate)),
                        StatusCode::OK,
                    )
                }
                Err(e) => {
                    telemetry.log_error(&e, "api prediction");
                    let status = match e {
                        EstimatorError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                        _ => StatusCode::INTERNAL_SERVER_ERROR,
                    };
                    error_reply(prediction_error_message(&e), status)
                }
            })
    }
}

/// GET /health
fn health() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "ok")
}

/// Reads the five fields from a urlencoded body. Missing fields take their
/// defaults; the first unparseable or out-of-range field is reported and
/// every rejected entry is echoed back as typed.
fn parse_form(form: &HashMap<String, String>) -> (FormValues, EstimatorResult<()>) {
    let mut values = FormValues::default();
    let mut result = Ok(());

    for field in FormField::ALL {
        let Some(raw) = form.get(field.key()) else {
            continue;
        };
        match field.parse(raw) {
            Ok(value) => values.set(field, value),
            Err(e) => {
                values.reject(field, raw);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
    }

    (values, result)
}

fn error_reply(message: String, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&ErrorResponse { error: message }), status)
}

/// Global Error Handler
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (message, status) = if err.is_not_found() {
        ("Not Found".to_string(), StatusCode::NOT_FOUND)
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (format!("Invalid request body: {}", e), StatusCode::BAD_REQUEST)
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        ("Request body too large".to_string(), StatusCode::PAYLOAD_TOO_LARGE)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ("Method Not Allowed".to_string(), StatusCode::METHOD_NOT_ALLOWED)
    } else {
        ("Internal Server Error".to_string(), StatusCode::INTERNAL_SERVER_ERROR)
    };

    Ok(error_reply(message, status))
}
