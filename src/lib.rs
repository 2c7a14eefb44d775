pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod middleware;
pub mod pricing;
pub mod routes;
pub mod session;
pub mod utils;
pub mod validation;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

use session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub sessions: SessionStore,
}
