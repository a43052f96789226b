pub mod api_connection;
pub mod chef;
pub mod cli;
pub mod client;
pub mod config;
pub mod recipe_parser;
pub mod request_builder;
pub mod schema;
pub mod schema_validation;
pub mod server;
