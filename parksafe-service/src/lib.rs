pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod routes;
pub mod server;
pub mod wire;

#[cfg(test)]
mod tests;

pub use config::{Config, LogFormat};
pub use error::RequestError;
pub use handler::RequestHandler;
pub use routes::{handle_request, AppState, SharedState};
