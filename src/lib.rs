pub mod actions;
pub mod common;
pub mod config;
pub mod convert;
pub mod data;
pub mod dataset;
pub mod evaluation;
pub mod logging;
pub mod model;
pub mod output;
pub mod params;
pub mod runner;
pub mod utils;
