pub mod config;
pub mod data;
pub mod util;
mod lib_constants;
pub mod bin_constants;
pub mod logging;
pub mod email_string;
pub mod backend;
pub mod session_storage;
pub mod session_controller;
pub mod authenticator;
pub mod workspace;
pub mod terminal;
pub mod app;
#[cfg(test)] pub mod testing;
