pub mod domain;
pub mod mailer;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;
