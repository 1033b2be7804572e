mod app;
mod keys;
mod render;
mod run;

pub use run::run;
