//! Pipeline – the export orchestrator. Sequences capture, encoding, page
//! placement, PDF assembly and delivery behind a single call.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::capture::{capture, CaptureOptions};
use crate::dom::Document;
use crate::error::{ConfigError, ExportError, FontError};
use crate::fonts::FontManager;
use crate::model::ResumeData;
use crate::pagination::{compute_placement, PageGeometry, Placement};
use crate::pdf::{assemble_pdf, encode_png};
use crate::templates::PREVIEW_ID;

/// A font face to load from disk before capturing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFile {
    pub family: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    pub path: PathBuf,
}

/// Export settings. Every field has a default, so a partial JSON file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Id of the render target element.
    pub target_id: String,
    /// Capture upscale factor (at least 2).
    pub scale: f32,
    /// Fallback settle delay when no readiness signal is attached.
    pub settle_delay_ms: u64,
    pub page: PageGeometry,
    pub fonts: Vec<FontFile>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "Resume".to_string(),
            target_id: PREVIEW_ID.to_string(),
            scale: 2.0,
            settle_delay_ms: 500,
            page: PageGeometry::a4_portrait(),
            fonts: Vec::new(),
        }
    }
}

impl ExportConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            scale: self.scale,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            ..CaptureOptions::default()
        }
    }

    /// Font manager with the synthetic defaults plus every configured face.
    pub fn font_manager(&self) -> Result<FontManager, FontError> {
        let mut fonts = FontManager::default();
        for f in &self.fonts {
            fonts.load_font_file(&f.family, f.bold, f.italic, &f.path)?;
        }
        Ok(fonts)
    }
}

/// `Jane  Doe` → `Jane_Doe_Resume.pdf`; an empty name → `Resume.pdf`.
pub fn export_filename(full_name: &str) -> String {
    if full_name.is_empty() {
        return "Resume.pdf".to_string();
    }
    let mut stem = String::with_capacity(full_name.len());
    let mut in_space = false;
    for c in full_name.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(c);
            in_space = false;
        }
    }
    format!("{stem}_Resume.pdf")
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Final hand-off of a finished PDF. Only called once every byte exists.
pub trait Delivery {
    /// Store `bytes` under `filename`, returning where it went.
    fn deliver(&self, filename: &str, bytes: &[u8]) -> io::Result<String>;
}

/// Writes into a directory through a temporary file that is persisted under
/// the final name, so a failed write never leaves a truncated PDF behind.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
}

impl FileDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Characters no target filesystem accepts inside a file name.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Make `filename` safe to join onto the delivery directory: separators and
/// reserved characters become `_`, and anything that is still not one
/// normal path component is refused.
pub fn sanitize_filename(filename: &str) -> io::Result<String> {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let mut components = Path::new(&safe).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(safe),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{filename}' is not a valid file name"),
        )),
    }
}

impl Delivery for FileDelivery {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> io::Result<String> {
        let filename = sanitize_filename(filename)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&filename);

        // Dropping the temp file on any early return removes it.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        log::debug!("Delivered {} bytes to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// Keeps delivered files in memory.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Delivery for MemoryDelivery {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> io::Result<String> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((filename.to_string(), bytes.to_vec()));
        Ok(format!("memory:{filename}"))
    }
}

// ---------------------------------------------------------------------------
// Exporter
// ---------------------------------------------------------------------------

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub filename: String,
    pub location: String,
    pub placement: Placement,
    pub capture_size: (u32, u32),
    pub pdf_len: usize,
}

pub struct Exporter<D: Delivery> {
    config: ExportConfig,
    fonts: FontManager,
    delivery: D,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the export ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<D: Delivery> Exporter<D> {
    pub fn new(config: ExportConfig, fonts: FontManager, delivery: D) -> Self {
        Self {
            config,
            fonts,
            delivery,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Export the render target of `document` as a one-page PDF named after
    /// `data`'s owner. Fails with exactly one error and delivers nothing when
    /// any stage fails; fails with [`ExportError::Busy`] while another export
    /// is running.
    pub async fn export(
        &self,
        document: &Document,
        data: &ResumeData,
    ) -> Result<ExportOutcome, ExportError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            log::warn!("Export rejected: another export is in progress");
            return Err(ExportError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let result = self.run(document, data).await;
        match &result {
            Ok(outcome) => log::info!("Exported {} to {}", outcome.filename, outcome.location),
            Err(e) => log::error!("Export failed: {e}"),
        }
        result
    }

    async fn run(&self, document: &Document, data: &ResumeData) -> Result<ExportOutcome, ExportError> {
        let image = capture(
            document,
            &self.config.target_id,
            &self.fonts,
            &self.config.capture_options(),
        )
        .await?;

        let png = encode_png(&image)?;
        let placement = compute_placement(image.width(), image.height(), &self.config.page);
        log::debug!("Placement on page: {placement:?}");
        let pdf = assemble_pdf(&png, &placement, &self.config.page, &self.config.title)?;

        let filename = export_filename(&data.personal_info.full_name);
        let location = self.delivery.deliver(&filename, &pdf)?;

        Ok(ExportOutcome {
            filename,
            location,
            placement,
            capture_size: image.dimensions(),
            pdf_len: pdf.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_rules() {
        assert_eq!(export_filename("Jane Doe"), "Jane_Doe_Resume.pdf");
        assert_eq!(export_filename("Jane   Q\tDoe"), "Jane_Q_Doe_Resume.pdf");
        assert_eq!(export_filename("Cher"), "Cher_Resume.pdf");
        assert_eq!(export_filename(""), "Resume.pdf");
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: ExportConfig = serde_json::from_str(r#"{ "scale": 3.0 }"#).unwrap();
        assert_eq!(config.scale, 3.0);
        assert_eq!(config.target_id, "resume-preview");
        assert_eq!(config.page, PageGeometry::a4_portrait());
        assert_eq!(config.capture_options().settle_delay, Duration::from_millis(500));
    }

    #[test]
    fn config_file_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ExportConfig::from_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            ExportConfig::from_json_file(&bad).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn file_delivery_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = FileDelivery::new(dir.path().join("out"));
        delivery.deliver("A_Resume.pdf", b"%PDF-1.7").unwrap();
        assert_eq!(
            fs::read(dir.path().join("out/A_Resume.pdf")).unwrap(),
            b"%PDF-1.7"
        );
        assert_eq!(fs::read_dir(dir.path().join("out")).unwrap().count(), 1);
    }

    #[test]
    fn failed_delivery_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the final name makes the rename fail.
        fs::create_dir(dir.path().join("A_Resume.pdf")).unwrap();
        let delivery = FileDelivery::new(dir.path());
        assert!(delivery.deliver("A_Resume.pdf", b"%PDF-1.7").is_err());
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A_Resume.pdf"]);
    }

    #[test]
    fn separators_in_names_stay_inside_the_directory() {
        assert_eq!(sanitize_filename("AC/DC_Resume.pdf").unwrap(), "AC_DC_Resume.pdf");
        assert_eq!(sanitize_filename("../x_Resume.pdf").unwrap(), ".._x_Resume.pdf");
        assert_eq!(sanitize_filename("a\\b:c").unwrap(), "a_b_c");
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename(".").is_err());
        assert!(sanitize_filename("").is_err());

        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("a/b");
        let delivery = FileDelivery::new(&out);
        for name in ["AC/DC", "../x", "../../escaped"] {
            let filename = export_filename(name);
            let location = delivery.deliver(&filename, b"%PDF-1.7").unwrap();
            assert_eq!(Path::new(&location).parent(), Some(out.as_path()));
        }
        assert_eq!(fs::read_dir(&out).unwrap().count(), 3);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }
}
