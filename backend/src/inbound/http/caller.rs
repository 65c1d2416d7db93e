//! Extractor exposing the access context resolved by the authentication
//! middleware, so handlers pass identity to the driving ports without
//! touching headers.

use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::domain::{AccessContext, Error};

/// Identity of the current caller.
///
/// Requests that did not pass through [`crate::middleware::Authenticate`], or
/// that carried no usable credential, extract as unauthenticated. Extraction
/// itself never fails.
#[derive(Debug, Clone, Default)]
pub struct Caller(AccessContext);

impl Caller {
    pub fn context(&self) -> &AccessContext {
        &self.0
    }
}

impl Deref for Caller {
    type Target = AccessContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = req
            .extensions()
            .get::<AccessContext>()
            .cloned()
            .unwrap_or_default();
        ready(Ok(Self(context)))
    }
}
