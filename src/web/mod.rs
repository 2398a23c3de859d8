pub mod handlers;
pub mod models;
pub mod pages;
pub mod routes;
