pub mod bytes;
pub mod dir;
pub mod errors;
pub mod logger;
pub mod printer;
