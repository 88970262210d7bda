//! HTTP handlers and their error type

pub mod convert;
pub mod error;
pub mod form;
pub mod health;

pub use convert::convert_email;
pub use error::ServiceError;
pub use form::upload_form;
pub use health::health_check;
