use std::env;
use std::path::PathBuf;

use rocket::figment::providers::{Env, Serialized};
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sqlite,
    Workbook,
}

/// Application settings, read from the same figment as Rocket's own config.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct RsvpConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageKind,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_workbook_path")]
    pub workbook_path: PathBuf,
    #[serde(default = "env::temp_dir")]
    pub export_dir: PathBuf,
    #[serde(default = "default_event_name")]
    pub event_name: String,
}

impl Default for RsvpConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            database_path: default_database_path(),
            workbook_path: default_workbook_path(),
            export_dir: env::temp_dir(),
            event_name: default_event_name(),
        }
    }
}

fn default_storage() -> StorageKind {
    StorageKind::Sqlite
}

fn default_database_path() -> PathBuf {
    PathBuf::from("rsvp_data.db")
}

fn default_workbook_path() -> PathBuf {
    PathBuf::from("rsvp_data.xlsx")
}

fn default_event_name() -> String {
    String::from("Our Celebration")
}

/// Rocket's figment with the listen port taken from `PORT`, then
/// `ROCKET_PORT`, then 3000.
pub fn figment() -> Figment {
    rocket::Config::figment()
        .merge(("port", DEFAULT_PORT))
        .merge(Env::raw().only(&["port"]).global())
        .join(Serialized::defaults(RsvpConfig::default()))
}
