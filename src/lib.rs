pub mod auth;
pub mod breakdown;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod issues;
pub mod report;
pub mod scanner;
pub mod session;
