pub mod error;
pub mod models;
pub mod platforms;

pub use error::DlMateError;
pub use platforms::Platform;

pub type Result<T> = std::result::Result<T, DlMateError>;
