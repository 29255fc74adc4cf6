pub mod app;
mod host;
mod persistence;
mod ui;
