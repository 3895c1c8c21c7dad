//! HTTP handlers for mixwheel-web

pub mod auth;
pub mod errors;
pub mod flow;
pub mod health;
pub mod playlist;
pub mod ui;

pub use auth::{auth_middleware, auth_routes, CurrentSession};
pub use errors::error_routes;
pub use flow::flow_routes;
pub use health::health_routes;
pub use playlist::playlist_routes;

/// Where guarded routes send requests without an authenticated session
pub const UNAUTHENTICATED_REDIRECT: &str = "/error?code=unauthenticated";
