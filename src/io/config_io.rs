use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::TaskError;
use crate::model::config::TasksConfig;

/// Config file name, looked up in the notes root
pub const CONFIG_FILE: &str = ".tasknote.toml";

/// Read `.tasknote.toml` from `root`. A missing file gives the defaults.
pub fn load_config(root: &Path) -> Result<TasksConfig, TaskError> {
    let path = root.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TasksConfig::default()),
        Err(e) => return Err(TaskError::read(path.display().to_string(), e)),
    };
    toml::from_str(&text).map_err(|e| TaskError::Settings {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
