//! Configuration module for Mediagrab.
//!
//! Builds runtime settings from defaults and the environment.

mod settings;

pub use settings::{
    RuntimeMode, Settings, ENV_ADMISSION, ENV_DEV, ENV_OUTPUT_DIR, ENV_SYSTEM_TOOLS_DIR,
    ENV_TOOLS_DIR,
};
