pub mod menus;
pub mod output;
pub mod prompts;
pub mod tables;
pub mod wizard_runner;

pub use menus::{run_cli, AppContext};
