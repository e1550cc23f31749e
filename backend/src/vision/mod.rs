pub mod anthropic_service;
pub mod model;
pub mod prompt;
