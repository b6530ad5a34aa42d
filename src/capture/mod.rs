pub mod chrome;
pub mod plan;
pub mod session;
