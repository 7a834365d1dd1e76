pub mod lib_duckdb;
pub mod redshift;
pub mod warehouse;
