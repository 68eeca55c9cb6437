pub mod app;
pub mod budget;
pub mod clock;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod reports;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use state::AppState;
pub use storage::Store;
