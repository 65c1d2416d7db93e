//! HTTP inbound adapter exposing REST endpoints.

pub mod caller;
pub mod error;
pub mod health;
pub mod items;
pub mod requests;
pub mod state;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route and the extractor error handlers on a
/// scope or app.
///
/// Literal segments are registered ahead of the `{id}` routes that would
/// otherwise shadow them.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use lostfound::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::path_config())
        .app_data(error::query_config())
        .service(users::register)
        .service(users::login)
        .service(users::check_email)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::change_password)
        .service(users::delete_user)
        .service(items::list_items)
        .service(items::report_item)
        .service(items::list_my_items)
        .service(items::list_item_requests)
        .service(items::review_item)
        .service(items::get_item)
        .service(items::update_item)
        .service(items::delete_item)
        .service(requests::file_request)
        .service(requests::list_requests)
        .service(requests::approve_request)
        .service(requests::reject_request)
        .service(requests::get_request)
        .service(requests::delete_request)
        .service(stats::get_statistics);
}
