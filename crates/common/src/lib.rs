pub mod envelope;
pub mod utils;
