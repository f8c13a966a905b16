pub mod archive;
pub mod hello;
pub mod mail;
pub mod routes;
