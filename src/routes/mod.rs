pub mod auth;

pub mod classes;

pub mod notifications;

pub mod reviews;

pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use notifications::configure_notification_routes;
pub use reviews::configure_review_routes;

use actix_web::web;

// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_classes_routes)
        .configure(configure_review_routes)
        .configure(configure_notification_routes);
}
