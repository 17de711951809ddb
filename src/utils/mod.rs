pub mod error;
pub mod logger;
pub mod redact;
pub mod validation;
