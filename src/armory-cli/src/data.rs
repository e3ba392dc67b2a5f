//! Catalog, inventory, and wishlist files on disk

use anyhow::{bail, Context, Result};
use armory::{Catalog, CatalogError, CatalogProvider, RawItemRecord, Wishlist};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Catalog tables stored as `<dir>/<TableName>.json`
pub struct DirectoryProvider {
    dir: PathBuf,
}

impl DirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl CatalogProvider for DirectoryProvider {
    fn load_table(&self, name: &str) -> Result<String, CatalogError> {
        let path = self.table_path(name);
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CatalogError::MissingTable(name.to_string()),
            _ => CatalogError::Provider {
                table: name.to_string(),
                message: format!("{}: {e}", path.display()),
            },
        })
    }
}

/// Inventory exports are either a bare list of records or `{ "items": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum InventoryFile {
    Records(Vec<RawItemRecord>),
    Wrapped { items: Vec<RawItemRecord> },
}

pub fn load_inventory(path: &Path) -> Result<Vec<RawItemRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read inventory: {}", path.display()))?;

    let file: InventoryFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse inventory: {}", path.display()))?;

    Ok(match file {
        InventoryFile::Records(records) => records,
        InventoryFile::Wrapped { items } => items,
    })
}

/// Load the wishlist store, empty if it doesn't exist yet
pub fn load_wishlist(path: &Path) -> Result<Wishlist> {
    if !path.exists() {
        return Ok(Wishlist::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read wishlist: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse wishlist: {}", path.display()))
}

pub fn save_wishlist(path: &Path, wishlist: &Wishlist) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(wishlist).context("Failed to serialize wishlist")?;
    fs::write(path, content).with_context(|| format!("Failed to write wishlist: {}", path.display()))
}

/// Command-line overrides layered over the saved config
pub struct Session {
    pub config: Config,
    pub catalog_dir: Option<PathBuf>,
}

impl Session {
    pub fn new(config: Config, catalog_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            catalog_dir,
        }
    }

    pub fn catalog(&self) -> Result<Catalog> {
        let Some(dir) = self.catalog_dir.as_ref().or(self.config.catalog_dir.as_ref()) else {
            bail!("No catalog directory given (use --catalog or `armory configure --catalog-dir`)");
        };
        let catalog = Catalog::load(&DirectoryProvider::new(dir))
            .with_context(|| format!("Failed to load catalog from {}", dir.display()))?;
        tracing::info!(version = catalog.version(), definitions = catalog.len(), "catalog ready");
        Ok(catalog)
    }

    pub fn inventory_path(&self, arg: Option<&Path>) -> Result<PathBuf> {
        match arg.map(Path::to_path_buf).or_else(|| self.config.inventory.clone()) {
            Some(path) => Ok(path),
            None => bail!("No inventory file given (use --inventory or `armory configure --inventory`)"),
        }
    }

    pub fn wishlist_path(&self, arg: Option<&Path>) -> Result<PathBuf> {
        match arg {
            Some(path) => Ok(path.to_path_buf()),
            None => self.config.wishlist_path(),
        }
    }
}
