#![allow(async_fn_in_trait)]
pub mod catalog;
pub mod cli;
pub mod collector;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filters;
pub mod flags;
pub mod geo;
pub mod logging;
pub mod params;
pub mod prompt;
pub mod rapi;
pub mod syntax;
pub mod validate;
pub mod workflow;
