use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
    body::{Body, Incoming},
    header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    http::request::Parts,
    service::Service,
    HeaderMap, Method, Request, Response, StatusCode,
};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};

use std::{error::Error, future::Future, pin::Pin, sync::Arc};

use crate::{
    sanitizer::form::decode_form,
    service::{
        availability::ScheduleService,
        notice::{CheckoutError, SAVED_MESSAGE},
    },
};

use super::{
    myresponse::{NonceResponse, StatusResponse, SubmitResponse},
    nonce::NonceRegistry,
};

pub const MAX_BODY_BYTES: usize = 64 * 1024;
/// Form field (or JSON key) carrying the single-use submission token.
pub const NONCE_FIELD: &str = "restaurant_schedule_nonce";
pub const NONCE_HEADER: &str = "x-schedule-nonce";

type ServerResponse = Result<Response<Full<Bytes>>, hyper::Error>;

/// Buffers a request body of at most `MAX_BODY_BYTES`.
///
/// Answers 413 for anything longer and 400 when the body cannot be read.
async fn read_body<B>(body: B) -> Result<Bytes, ServerResponse>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.is::<LengthLimitError>() => Err(Server::payload_too_large()),
        Err(err) => {
            warn!("Could not read request body: {}", err);
            Err(Server::bad_request("Could not read request body."))
        }
    }
}

/// Compares without stopping at the first differing byte.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());
    provided.len() == expected.len()
        && provided
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

/// The Server
///
/// Host integration layer between HTTP and the `ScheduleService`. Storefront
/// endpoints live under `/api`, the admin endpoints under `/admin` need the
/// configured bearer token.
///
/// Like any hyper `Service` it is cloned for every connection, all shared state
/// sits behind `Arc`s.
#[derive(Clone)]
pub struct Server {
    service: ScheduleService,
    nonces: NonceRegistry,
    admin_token: Option<Arc<str>>,
}

impl Server {
    pub fn setup(service: ScheduleService, nonces: NonceRegistry, admin_token: Option<String>) -> Self {
        Self {
            service,
            nonces,
            admin_token: admin_token.map(Arc::from),
        }
    }

    /// Routes an already buffered request.
    fn handle(&self, parts: Parts, body: Bytes) -> ServerResponse {
        match (&parts.method, parts.uri.path()) {
            (&Method::GET, "/api/status") => self.status(),
            (&Method::POST, "/api/checkout") => self.checkout(),
            (&Method::GET, "/admin/nonce") => match self.check_admin(&parts.headers) {
                Some(rejection) => rejection,
                None => Self::ok_data(NonceResponse {
                    nonce: self.nonces.issue(),
                }),
            },
            (&Method::GET, "/admin/schedule") => match self.check_admin(&parts.headers) {
                Some(rejection) => rejection,
                None => match self.service.schedule() {
                    Ok(schedule) => Self::ok_data(schedule),
                    Err(err) => Self::server_error(&err.to_string()),
                },
            },
            (&Method::POST, "/admin/schedule") => match self.check_admin(&parts.headers) {
                Some(rejection) => rejection,
                None => self.submit(&parts.headers, &body),
            },
            _ => Self::not_found(),
        }
    }

    /// Returns the response to send back when the request is not from an admin.
    fn check_admin(&self, headers: &HeaderMap) -> Option<ServerResponse> {
        let Some(token) = self.admin_token.as_deref() else {
            return Some(Self::forbidden("Admin access is not configured."));
        };
        let provided = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        match provided {
            Some(provided) if tokens_match(provided, token) => None,
            _ => {
                warn!("Rejected admin request with missing or wrong token");
                Some(Self::unauthorized("Missing or invalid admin token."))
            }
        }
    }

    /// The /api/status endpoint, backing the storefront banner.
    fn status(&self) -> ServerResponse {
        match self.service.render_notice() {
            Ok(notice) => Self::ok_data(StatusResponse::new(notice)),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// The /api/checkout endpoint. Answers 409 with the rejection message while closed.
    fn checkout(&self) -> ServerResponse {
        match self.service.validate_checkout() {
            Ok(()) => Self::ok_data(json!({ "accepted": true })),
            Err(CheckoutError::Closed(message)) => Self::conflict(&message),
            Err(CheckoutError::Store(err)) => Self::server_error(&err.to_string()),
        }
    }

    /// Turns the body into the untyped submission the sanitizer expects.
    ///
    /// JSON bodies are taken as is, anything else is decoded as a urlencoded form.
    fn parse_submission(headers: &HeaderMap, body: &Bytes) -> Option<Value> {
        let is_json = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        if is_json {
            return serde_json::from_slice(body).ok();
        }
        let body = std::str::from_utf8(body).ok()?;
        Some(Value::Object(decode_form(body)))
    }

    /// The POST /admin/schedule endpoint.
    ///
    /// Needs a nonce from /admin/nonce, either in the body or the `X-Schedule-Nonce`
    /// header. Whatever is valid in the submitted schedule replaces the stored one.
    fn submit(&self, headers: &HeaderMap, body: &Bytes) -> ServerResponse {
        let Some(submission) = Self::parse_submission(headers, body) else {
            return Self::bad_request("Malformed body.");
        };

        let nonce = headers
            .get(NONCE_HEADER)
            .and_then(|value| value.to_str().ok())
            .or_else(|| submission.get(NONCE_FIELD).and_then(Value::as_str));
        let Some(nonce) = nonce else {
            return Self::forbidden("Nonce not provided.");
        };
        if !self.nonces.consume(nonce) {
            warn!("Rejected schedule submission with an invalid or reused nonce");
            return Self::forbidden("Invalid or expired nonce.");
        }

        match self.service.handle_submit(&submission) {
            Ok(schedule) => Self::ok_data(SubmitResponse {
                message: SAVED_MESSAGE.to_string(),
                schedule,
            }),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
        let mut res = Response::new(Full::new(Bytes::from(body)));
        *res.status_mut() = status;
        res.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        res
    }

    fn error_response(status: StatusCode, message: &str) -> ServerResponse {
        let body = json!({ "error": message }).to_string().into_bytes();
        Ok(Self::json_response(status, body))
    }

    /// Return a 200 OK response with the data provided.
    fn ok_data<T: Serialize>(body: T) -> ServerResponse {
        match serde_json::to_vec(&body) {
            Ok(data) => Ok(Self::json_response(StatusCode::OK, data)),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// Return a 500 Internal Server Error response with the message provided.
    fn server_error(message: &str) -> ServerResponse {
        error!("{}", message);
        Self::error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Return an empty 404 Not Found response.
    fn not_found() -> ServerResponse {
        let mut res = Response::new(Full::new(Bytes::new()));
        *res.status_mut() = StatusCode::NOT_FOUND;
        Ok(res)
    }

    fn bad_request(message: &str) -> ServerResponse {
        Self::error_response(StatusCode::BAD_REQUEST, message)
    }

    fn unauthorized(message: &str) -> ServerResponse {
        Self::error_response(StatusCode::UNAUTHORIZED, message)
    }

    fn forbidden(message: &str) -> ServerResponse {
        Self::error_response(StatusCode::FORBIDDEN, message)
    }

    fn conflict(message: &str) -> ServerResponse {
        Self::error_response(StatusCode::CONFLICT, message)
    }

    fn payload_too_large() -> ServerResponse {
        Self::error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
    }
}

impl Service<Request<Incoming>> for Server {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let server = self.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            info!("{} {}", parts.method, parts.uri.path());
            match read_body(body).await {
                Ok(body) => server.handle(parts, body),
                Err(rejection) => rejection,
            }
        })
    }
}
