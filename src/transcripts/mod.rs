pub mod config;
pub mod fetcher;
pub mod model;
pub mod render;
pub mod select;
pub mod source;
pub mod youtube;
