pub mod api;
pub mod app;
pub mod chart;
pub mod config;
pub mod controller;
pub mod errors;
pub mod form;
pub mod format;
pub mod handlers;
pub mod models;
pub mod page;
pub mod render;
pub mod state;
pub mod ui;

pub use api::ApiClient;
pub use app::router;
pub use config::Config;
pub use controller::InvestmentController;
