pub mod config;
pub mod session;

pub use config::EngineConfig;
pub use session::{Session, SessionError};
