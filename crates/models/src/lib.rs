pub mod company;
pub mod db;
pub mod enums;
pub mod errors;
pub mod institute;
pub mod islamic_profile;
pub mod user;
