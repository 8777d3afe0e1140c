pub mod history;
pub mod logging;
pub mod paths;
