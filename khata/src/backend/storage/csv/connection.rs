use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

const DATA_DIRECTORY_NAME: &str = "chai-khata";
const CUSTOMERS_FILE: &str = "customers.csv";
const ENTRIES_FILE: &str = "entries.csv";
const SETTINGS_FILE: &str = "settings.yaml";
const PIN_ATTEMPTS_FILE: &str = "pin_attempts.csv";

/// CsvConnection owns the data directory and knows where each ledger file lives
#[derive(Clone, Debug)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a new CSV connection in the default data directory
    /// This uses the platform data directory (e.g. ~/.local/share/chai-khata),
    /// falling back to ~/.chai-khata
    pub fn new_default() -> Result<Self> {
        let dir = Self::default_data_directory()?;
        info!("Using default data directory: {}", dir.display());
        Self::new(dir)
    }

    /// Resolve the default data directory without creating it
    pub fn default_data_directory() -> Result<PathBuf> {
        if let Some(data_dir) = dirs::data_dir() {
            return Ok(data_dir.join(DATA_DIRECTORY_NAME));
        }

        dirs::home_dir()
            .map(|home| home.join(format!(".{}", DATA_DIRECTORY_NAME)))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn customers_file_path(&self) -> PathBuf {
        self.base_directory.join(CUSTOMERS_FILE)
    }

    pub fn entries_file_path(&self) -> PathBuf {
        self.base_directory.join(ENTRIES_FILE)
    }

    pub fn settings_file_path(&self) -> PathBuf {
        self.base_directory.join(SETTINGS_FILE)
    }

    pub fn pin_attempts_file_path(&self) -> PathBuf {
        self.base_directory.join(PIN_ATTEMPTS_FILE)
    }

    /// Ensure a CSV file exists, writing just the header if it is new
    pub fn ensure_csv_file_exists(&self, path: &Path, header: &[&str]) -> Result<()> {
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory)?;
        }

        if !path.exists() {
            let mut contents = header.join(",");
            contents.push('\n');
            fs::write(path, contents)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            debug!("Created CSV file with header: {}", path.display());
        }

        Ok(())
    }

    /// Write a file through a temp file and rename so readers never see a partial write
    pub fn write_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
        Ok(())
    }
}
