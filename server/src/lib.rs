pub mod codes;
pub mod config;
pub mod credential;
pub mod dates;
pub mod db;
pub mod environment;
pub mod errors;
pub mod normalization;
pub mod routes;
pub mod store;
pub mod submission;
pub mod urls;
