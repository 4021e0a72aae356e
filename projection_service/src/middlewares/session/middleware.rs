use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorInternalServerError, ErrorUnauthorized},
    web, HttpMessage,
};
use chrono::Utc;
use futures::{future::LocalBoxFuture, FutureExt};
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tracing::{error, info};

use crate::repositories::session_memory_repository::{
    SessionMemoryRepository, SessionRepositoryError, SessionToken,
};

pub const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// Token of the live session which sent the request
#[derive(Clone, Copy, Debug)]
pub struct SessionFromToken(pub SessionToken);

/// Middleware rejecting the requests which are not part of a live session.
pub struct SessionMiddleware<S> {
    service: Rc<S>,
    session_repository: web::Data<SessionMemoryRepository>,
}

impl<S> Service<ServiceRequest> for SessionMiddleware<S>
where
    S: Service<
            ServiceRequest,
            Response = ServiceResponse<actix_web::body::BoxBody>,
            Error = actix_web::Error,
        > + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, actix_web::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get(SESSION_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let token = match token {
            Some(token) => token,
            None => {
                return Box::pin(ready(Err(ErrorUnauthorized(
                    "No session token was provided",
                ))));
            }
        };

        let session = SessionToken::parse(&token)
            .and_then(|token| self.session_repository.touch(&token, Utc::now()));

        let session = match session {
            Ok(session) => session,
            Err(SessionRepositoryError::Poisoned(message)) => {
                error!(error = %message, "Session registry could not be used");
                return Box::pin(ready(Err(ErrorInternalServerError(
                    "Session registry is unavailable",
                ))));
            }
            Err(error) => {
                info!(%error, "Request rejected without a live session");
                return Box::pin(ready(Err(ErrorUnauthorized(
                    "Session is unknown or expired",
                ))));
            }
        };

        let srv = Rc::clone(&self.service);

        async move {
            req.extensions_mut()
                .insert::<SessionFromToken>(SessionFromToken(session.token));

            let res = srv.call(req).await?;
            Ok(res)
        }
        .boxed_local()
    }
}

/// Middleware factory for requiring a live session.
pub struct RequireSession {
    session_repository: web::Data<SessionMemoryRepository>,
}

impl RequireSession {
    pub fn new(session_repository: web::Data<SessionMemoryRepository>) -> Self {
        Self { session_repository }
    }
}

impl<S> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<
            ServiceRequest,
            Response = ServiceResponse<actix_web::body::BoxBody>,
            Error = actix_web::Error,
        > + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = actix_web::Error;
    type Transform = SessionMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddleware {
            service: Rc::new(service),
            session_repository: self.session_repository.clone(),
        }))
    }
}
