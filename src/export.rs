use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use rand::{distributions::Alphanumeric, Rng};
use rocket::http::{ContentType, Header};

use crate::models::Rsvp;
use crate::workbook::{self, WorkbookError};

pub const DOWNLOAD_NAME: &str = "rsvp_data.xlsx";

#[derive(Responder)]
pub struct XlsxDownload {
    inner: Vec<u8>,
    content_type: ContentType,
    disposition: Header<'static>,
}

impl XlsxDownload {
    pub fn new(bytes: Vec<u8>) -> Self {
        XlsxDownload {
            inner: bytes,
            content_type: ContentType::new("application", "vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            disposition: Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
            ),
        }
    }
}

#[derive(Responder)]
pub enum Export {
    File(XlsxDownload),
    #[response(status = 204)]
    Empty(()),
}

fn export_path(dir: &Path) -> PathBuf {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    dir.join(format!("rsvp_export_{suffix}.xlsx"))
}

/// Encodes `rsvps` into a freshly named file under `dir` and returns its bytes.
/// The file is removed before returning; failing to remove it is only logged.
pub fn render(rsvps: &[Rsvp], dir: &Path) -> Result<Vec<u8>, WorkbookError> {
    let path = export_path(dir);

    let rendered = workbook::write_rsvps(rsvps, &path).and_then(|_| Ok(fs::read(&path)?));

    if path.exists() {
        if let Err(e) = fs::remove_file(&path) {
            warn!("Could not remove export file {}: {e}", path.display());
        }
    }

    rendered
}
