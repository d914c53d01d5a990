use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Environment variable naming a directory of override config files.
pub const CONFIG_DIR_ENV: &str = "BARIATRIC_EQUIPMENT_CONFIG_DIR";

pub const CATALOG_FILE: &str = "catalog.toml";
pub const RULES_FILE: &str = "rules.toml";

/// Override files found at startup. `None` means the embedded default is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    pub catalog: Option<PathBuf>,
    pub rules: Option<PathBuf>,
}

impl ConfigPaths {
    /// Resolve override files once at startup.
    ///
    /// Looks in `$BARIATRIC_EQUIPMENT_CONFIG_DIR` if set, otherwise in
    /// `<config dir>/bariatric-equipment/`. Only files that exist are used.
    pub fn resolve() -> Self {
        let dir = match env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => {
                debug!("Using config dir from {}", CONFIG_DIR_ENV);
                Some(PathBuf::from(dir))
            }
            None => dirs::config_dir().map(|d| d.join("bariatric-equipment")),
        };

        match dir {
            Some(dir) => Self::from_dir(&dir),
            None => {
                debug!("No config directory on this platform, using embedded defaults");
                Self::default()
            }
        }
    }

    /// Override files present in `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        let existing = |name: &str| {
            let path = dir.join(name);
            if path.is_file() {
                info!("Config override found: {:?}", path);
                Some(path)
            } else {
                None
            }
        };

        Self {
            catalog: existing(CATALOG_FILE),
            rules: existing(RULES_FILE),
        }
    }
}
