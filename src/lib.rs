pub mod airspace;
pub mod alerts;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod geodesy;
pub mod grouping;
pub mod output;
pub mod position;
pub mod quality;
pub mod receiver;
pub mod report;
pub mod simulate;
pub mod solver;
