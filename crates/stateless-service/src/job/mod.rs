//! Job lifecycle services.

pub mod controller;
pub mod detail;
pub mod handler_client;
pub mod secret;

pub use controller::JobController;
pub use detail::{JobDetail, JobLinks};
pub use handler_client::HttpJobHandler;
