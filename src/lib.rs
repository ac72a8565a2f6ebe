pub mod app;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod progress;
pub mod state;
pub mod stats;
pub mod storage;
pub mod team;
pub mod ui;

pub use app::router;
pub use catalog::Catalog;
pub use config::{Config, ProgressSettings};
pub use state::AppState;
pub use storage::{load_data, TaskStore};
