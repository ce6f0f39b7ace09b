pub mod config;
pub mod media;

pub use config::MediaConfig;
