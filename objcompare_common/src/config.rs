use crate::{ComparisonSettings, ObjCompareError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "objcompare.toml";
const ORGANIZATION: &str = "objcompare";
const APPLICATION: &str = "objcompare";

#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: ComparisonSettings,
    pub path: PathBuf,
    pub exists: bool,
}

/// Read comparison settings from a TOML file
pub fn load_settings(path: &Path) -> Result<ComparisonSettings, ObjCompareError> {
    let data = fs::read_to_string(path)?;
    toml::from_str(&data).map_err(|e| ObjCompareError::Serialization(e.to_string()))
}

/// Read settings from `path`, falling back to defaults when the file is missing
pub fn load_or_default(path: &Path) -> Result<LoadedSettings, ObjCompareError> {
    let exists = path.exists();
    let settings = if exists {
        load_settings(path)?
    } else {
        ComparisonSettings::default()
    };

    Ok(LoadedSettings {
        settings,
        path: path.to_path_buf(),
        exists,
    })
}

pub fn save_settings(path: &Path, settings: &ComparisonSettings) -> Result<(), ObjCompareError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(settings)
        .map_err(|e| ObjCompareError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

/// Per-user settings file location
pub fn default_settings_path() -> Result<PathBuf, ObjCompareError> {
    let dirs = ProjectDirs::from("", ORGANIZATION, APPLICATION)
        .ok_or_else(|| ObjCompareError::Config("Unable to determine config directory".to_string()))?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}
