pub mod cli;
pub mod console;
pub mod db;
pub mod error;
pub mod handlers;
pub mod menu;
pub mod transfer;
