pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod form;
pub mod infra;
pub mod model;
pub mod output;
pub mod pages;
pub mod routes;
pub mod services;
pub mod state;
pub mod view;
