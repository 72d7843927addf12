pub mod handlers;
pub mod rules;
pub mod service;
pub mod types;
pub mod validation;
