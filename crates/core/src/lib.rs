pub mod config;
pub mod error;
pub mod fields;
pub mod record;

pub use config::Config;
pub use error::*;
pub use fields::*;
pub use record::*;
