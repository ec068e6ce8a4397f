pub mod analysis;
pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod dataset;
pub mod error;
pub mod labels;
pub mod matcher;
pub mod openimages;
pub mod scanner;
