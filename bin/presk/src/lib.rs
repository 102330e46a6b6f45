mod broker;
mod config;
mod error;
mod session;
mod web_service;

pub use broker::{listen, publish_fan, publisher, Publisher, Subscription};
pub use config::Config;
pub use error::Error;
pub use session::{Handle, Session};
pub use web_service::{router, serve};

pub type Result<T> = std::result::Result<T, Error>;
