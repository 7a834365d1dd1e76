pub mod catalog;
pub mod config;
pub mod db;
pub mod etl;
pub mod report;
pub mod session;
