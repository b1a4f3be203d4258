//! different utility modules used throughout the project
/// logger initialization and saving objective traces into csv files
pub mod logger;
/// solver settings from a TOML document
pub mod config_parser;
