//! Bearer-token authentication middleware.
//!
//! Runs the [`AccessGate`] for every request and stores the resulting
//! [`AccessContext`] in the request extensions. The middleware never rejects
//! a request: unauthenticated calls continue to the handler, and the
//! operation behind it refuses them if it needs an identity. A context that
//! an outer layer already authenticated is left as it is.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, HttpMessage};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::{AccessContext, AccessGate};

/// Middleware factory resolving the caller of each request.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use lostfound::domain::AccessGate;
/// use lostfound::middleware::Authenticate;
///
/// fn app(gate: AccessGate) {
///     let _app = App::new().wrap(Authenticate::new(gate));
/// }
/// ```
#[derive(Clone)]
pub struct Authenticate {
    gate: AccessGate,
}

impl Authenticate {
    pub fn new(gate: AccessGate) -> Self {
        Self { gate }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service: Rc::new(service),
            gate: self.gate.clone(),
        }))
    }
}

/// Service wrapper produced by [`Authenticate`].
pub struct AuthenticateMiddleware<S> {
    service: Rc<S>,
    gate: AccessGate,
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = self.gate.clone();
        Box::pin(async move {
            let method = req.method().as_str().to_owned();
            let path = req.path().to_owned();
            let authorization = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let mut context = req
                .extensions_mut()
                .remove::<AccessContext>()
                .unwrap_or_default();
            gate.authenticate(&mut context, &method, &path, authorization.as_deref())
                .await;
            req.extensions_mut().insert(context);
            service.call(req).await
        })
    }
}
