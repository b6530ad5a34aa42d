pub mod gif_sink;
pub mod sink;
