//! Barrage targets: decoding HTTP request blueprints for a load generator.
mod error;
mod http_format;
mod json;
mod scanner;
mod settings;
mod static_list;
mod target;
mod targeter;

pub use error::{RequestError, TargetError};
pub use http_format::HttpTargeter;
pub use json::{JsonTargetEncoder, JsonTargeter, TargetEncoder};
pub use settings::{TargetFormat, TargetSettings, UnknownFormat, TARGET_FORMATS};
pub use static_list::StaticTargeter;
pub use target::{Header, Target};
pub use targeter::{read_all_targets, Targeter, TargeterProvider};
