// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod catalogue;
pub mod config;
pub mod engine;
pub mod generator;
pub mod logging;
pub mod recall;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod ui;
pub mod util;
pub mod vocab;

pub use app::App;
