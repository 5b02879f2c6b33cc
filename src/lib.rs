pub mod admin;
pub mod app;
pub mod cli;
pub mod commands;
pub mod content;
pub mod context;
pub mod error;
pub mod rest;
pub mod session;
pub mod storage;
pub mod tracing;
