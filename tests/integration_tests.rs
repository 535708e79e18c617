//! Integration tests for the resume pipeline.
//!
//! These tests validate:
//! - Snapshot persistence and store mutations
//! - Template rules shared by every variant
//! - Capture isolation from theme and preview constraints
//! - Export end to end, including failure and concurrency behaviour

use resume_forge::capture::{capture, CaptureOptions};
use resume_forge::dom::{div, Document, ElementNode, Tag, Theme};
use resume_forge::error::{ExportError, StoreError};
use resume_forge::fonts::FontManager;
use resume_forge::model::{Education, Experience, Project, Skill, SkillLevel};
use resume_forge::pagination::{compute_placement, PageGeometry};
use resume_forge::pipeline::{ExportConfig, Exporter, FileDelivery, MemoryDelivery};
use resume_forge::samples::sample_resume;
use resume_forge::storage::{FileStorage, KeyValueStorage, MemoryStorage, STORAGE_KEY};
use resume_forge::templates::{self, preview_document, PreviewMode, PREVIEW_ID};
use resume_forge::{ResumeData, ResumeStore, TemplateId};
use sha2::{Digest, Sha256};

// =====================================================================
// Helpers
// =====================================================================

fn quick_config() -> ExportConfig {
    ExportConfig {
        settle_delay_ms: 0,
        ..ExportConfig::default()
    }
}

fn options() -> CaptureOptions {
    quick_config().capture_options()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

/// Small render target so concurrency tests stay fast.
fn tiny_document() -> Document {
    let mut doc = Document::new(Theme::Light);
    doc.attach(
        div("bg-white")
            .id(PREVIEW_ID)
            .style("width: 120px; height: 80px")
            .child(ElementNode::new(Tag::P).text("hello")),
    );
    doc
}

fn h2_titles(root: &ElementNode) -> Vec<String> {
    root.find_all(&|e| e.tag == Tag::H2)
        .into_iter()
        .map(|h| h.text_content())
        .collect()
}

// =====================================================================
// Persistence and store
// =====================================================================

#[test]
fn snapshot_json_roundtrips() {
    let data = sample_resume();
    let json = data.to_json().unwrap();
    assert!(json.contains("\"personalInfo\""));
    assert!(json.contains("\"fullName\": \"Jane Doe\""));
    assert_eq!(ResumeData::from_json(&json).unwrap(), data);
}

#[test]
fn edge_case_snapshot_roundtrips() {
    let data = ResumeData {
        experience: vec![Experience {
            id: "e1".into(),
            start_date: "2020-01".into(),
            end_date: "2022-06".into(),
            current: true,
            ..Default::default()
        }],
        education: vec![
            Education {
                id: "d1".into(),
                gpa: None,
                ..Default::default()
            },
            Education {
                id: "d2".into(),
                gpa: Some(String::new()),
                ..Default::default()
            },
        ],
        skills: vec![Skill {
            id: "s1".into(),
            level: SkillLevel::parse("Wizard"),
            ..Default::default()
        }],
        projects: vec![Project {
            id: "p1".into(),
            technologies: Vec::new(),
            ..Default::default()
        }],
        template: TemplateId::Creative,
        ..Default::default()
    };

    let back = ResumeData::from_json(&data.to_json().unwrap()).unwrap();
    assert_eq!(back, data);
    assert_eq!(back.experience[0].end_date, "2022-06");
    assert_eq!(back.education[0].gpa, None);
    assert_eq!(back.education[1].gpa.as_deref(), Some(""));
    assert_eq!(back.skills[0].level.as_str(), "Wizard");
    assert!(back.projects[0].technologies.is_empty());
}

#[test]
fn browser_snapshot_with_unknown_values_loads() {
    let json = r#"{
        "personalInfo": { "fullName": "Ada Lovelace", "email": "ada@example.com" },
        "skills": [{ "id": "s1", "name": "Analysis", "category": "Math", "level": "Guru" }],
        "template": "retro"
    }"#;
    let data = ResumeData::from_json(json).unwrap();
    assert_eq!(data.personal_info.full_name, "Ada Lovelace");
    assert_eq!(data.skills[0].level.stars(), 1);
    assert_eq!(data.template, TemplateId::Modern);
    assert!(data.to_json().unwrap().contains("\"Guru\""));
}

#[test]
fn store_persists_through_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path()).unwrap();

    let mut store = ResumeStore::load(&storage).unwrap();
    assert_eq!(store.snapshot(), &ResumeData::default());
    let id = store.add(Skill {
        name: "Rust".into(),
        category: "Languages".into(),
        level: SkillLevel::Expert,
        ..Default::default()
    });
    store.save(&mut storage).unwrap();

    let reloaded = ResumeStore::load(&storage).unwrap();
    let skill = reloaded.get::<Skill>(&id).unwrap();
    assert_eq!(skill.name, "Rust");
    assert_eq!(reloaded.version(), 0);
}

#[test]
fn store_mutations_are_explicit_and_typed() {
    let mut storage = MemoryStorage::new();
    let mut store = ResumeStore::new(ResumeData::default());
    let id = store.add(Experience {
        id: "caller-chosen".into(),
        position: "Engineer".into(),
        ..Default::default()
    });
    assert_ne!(id, "caller-chosen");
    assert!(storage.get(STORAGE_KEY).unwrap().is_none());

    store
        .update(
            &id,
            Experience {
                position: "Lead".into(),
                current: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(store.get::<Experience>(&id).unwrap().position, "Lead");
    assert_eq!(store.get::<Experience>(&id).unwrap().id, id);

    let err = store.remove::<Experience>("missing").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    store.save(&mut storage).unwrap();
    assert!(storage.get(STORAGE_KEY).unwrap().unwrap().contains("Lead"));
}

// =====================================================================
// Templates
// =====================================================================

#[test]
fn every_template_omits_empty_sections() {
    let mut data = sample_resume();
    data.education.clear();
    for template in TemplateId::ALL {
        let titles = h2_titles(&templates::render(&data, template));
        assert!(
            !titles.iter().any(|t| t == "Education"),
            "{template}: {titles:?}"
        );
        assert!(titles.iter().any(|t| t == "Projects"), "{template}");
    }
}

#[test]
fn ongoing_position_shows_present_everywhere() {
    let data = sample_resume();
    assert!(data.experience[0].current);
    for template in TemplateId::ALL {
        let text = templates::render(&data, template).text_content();
        assert!(text.contains("2021-03 - Present"), "{template}");
        assert!(!text.contains("2021-03 - 2023-01"), "{template}");
    }
}

#[test]
fn expert_skill_fills_four_stars() {
    let data = ResumeData {
        skills: vec![Skill {
            name: "Rust".into(),
            category: "Languages".into(),
            level: SkillLevel::Expert,
            ..Default::default()
        }],
        ..Default::default()
    };
    for template in [TemplateId::Modern, TemplateId::Creative] {
        let root = templates::render(&data, template);
        let filled = root.find_all(&|e| e.has_class("star-filled")).len();
        let empty = root.find_all(&|e| e.has_class("star-empty")).len();
        assert_eq!((filled, empty), (4, 0), "{template}");
    }
}

#[test]
fn unknown_template_name_renders_modern() {
    let data = sample_resume();
    assert_eq!(
        templates::render_named(&data, "does-not-exist"),
        templates::render(&data, TemplateId::Modern)
    );
}

// =====================================================================
// Pagination
// =====================================================================

#[test]
fn tall_capture_is_fitted_to_a4_height() {
    let p = compute_placement(2000, 3000, &PageGeometry::a4_portrait());
    assert!((p.height_mm - 297.0).abs() < 0.01);
    assert!((p.width_mm - 198.0).abs() < 0.05);
    assert!((p.x_mm - 6.0).abs() < 0.05);
}

// =====================================================================
// Capture
// =====================================================================

#[tokio::test]
async fn capture_ignores_page_theme() {
    let fonts = FontManager::default();
    let mut data = sample_resume();
    data.template = TemplateId::Classic;

    let light = preview_document(&data, PreviewMode::FullPage, Theme::Light);
    let dark = preview_document(&data, PreviewMode::FullPage, Theme::Dark);
    let a = capture(&light, PREVIEW_ID, &fonts, &options()).await.unwrap();
    let b = capture(&dark, PREVIEW_ID, &fonts, &options()).await.unwrap();

    assert_eq!(a.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert!(a == b, "theme leaked into capture");
}

#[tokio::test]
async fn panel_preview_captures_like_full_page() {
    let fonts = FontManager::default();
    let data = sample_resume();
    let full = preview_document(&data, PreviewMode::FullPage, Theme::Light);
    let panel = preview_document(&data, PreviewMode::Panel, Theme::Light);

    let a = capture(&full, PREVIEW_ID, &fonts, &options()).await.unwrap();
    let b = capture(&panel, PREVIEW_ID, &fonts, &options()).await.unwrap();
    assert_eq!(a.width(), 794 * 2);
    assert!(a.height() >= 1123 * 2, "capture clipped: {}", a.height());
    assert!(a == b, "panel constraints survived capture");
}

#[tokio::test]
async fn capture_is_deterministic() {
    let fonts = FontManager::default();
    let doc = preview_document(&sample_resume(), PreviewMode::FullPage, Theme::Light);
    let mut digests = Vec::new();
    for _ in 0..2 {
        let img = capture(&doc, PREVIEW_ID, &fonts, &options()).await.unwrap();
        digests.push(Sha256::digest(img.as_raw()));
    }
    assert_eq!(digests[0], digests[1]);
}

// =====================================================================
// Export
// =====================================================================

#[tokio::test]
async fn export_end_to_end() {
    let data = sample_resume();
    let doc = preview_document(&data, PreviewMode::FullPage, Theme::Light);
    let exporter = Exporter::new(quick_config(), FontManager::default(), MemoryDelivery::new());

    let outcome = exporter.export(&doc, &data).await.unwrap();
    assert_eq!(outcome.filename, "Jane_Doe_Resume.pdf");
    assert!((outcome.placement.height_mm - 297.0).abs() < 0.01);

    let files = exporter.delivery().files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, "Jane_Doe_Resume.pdf");
    assert_valid_pdf(&files[0].1);
    assert_eq!(files[0].1.len(), outcome.pdf_len);
    assert!(!exporter.is_busy());
}

#[tokio::test]
async fn unnamed_resume_exports_as_resume_pdf() {
    let data = ResumeData::default();
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(quick_config(), FontManager::default(), FileDelivery::new(dir.path()));

    let outcome = exporter.export(&tiny_document(), &data).await.unwrap();
    assert_eq!(outcome.filename, "Resume.pdf");
    assert_valid_pdf(&std::fs::read(dir.path().join("Resume.pdf")).unwrap());
}

#[tokio::test]
async fn long_resume_is_shrunk_onto_one_page() {
    let mut data = sample_resume();
    let template = data.experience[1].clone();
    data.experience
        .extend((0..60).map(|i| Experience {
            id: format!("extra-{i}"),
            ..template.clone()
        }));
    let doc = preview_document(&data, PreviewMode::FullPage, Theme::Light);
    let exporter = Exporter::new(quick_config(), FontManager::default(), MemoryDelivery::new());

    let outcome = exporter.export(&doc, &data).await.unwrap();
    assert!(outcome.capture_size.1 > 16_384, "height {}", outcome.capture_size.1);
    assert!((outcome.placement.height_mm - 297.0).abs() < 0.01);
    assert!(outcome.placement.width_mm < 210.0);
    assert_eq!(exporter.delivery().files().len(), 1);
}

#[tokio::test]
async fn names_with_path_separators_stay_in_the_output_dir() {
    let root = tempfile::tempdir().unwrap();
    let out = root.path().join("a/b");
    let exporter = Exporter::new(quick_config(), FontManager::default(), FileDelivery::new(&out));

    for name in ["Jean/Luc Picard", "../../escaped"] {
        let mut data = ResumeData::default();
        data.personal_info.full_name = name.into();
        let outcome = exporter.export(&tiny_document(), &data).await.unwrap();
        assert_eq!(outcome.filename, resume_forge::export_filename(name));
        assert_eq!(std::path::Path::new(&outcome.location).parent(), Some(out.as_path()));
    }
    assert!(out.join("Jean_Luc_Picard_Resume.pdf").exists());
    assert!(out.join(".._.._escaped_Resume.pdf").exists());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn missing_target_fails_once_and_delivers_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(quick_config(), FontManager::default(), FileDelivery::new(dir.path()));
    let doc = Document::new(Theme::Light);

    let err = exporter.export(&doc, &sample_resume()).await.unwrap_err();
    assert!(matches!(err, ExportError::RenderTargetMissing(ref id) if id == PREVIEW_ID));
    assert_eq!(err.user_message(), "Failed to export resume. Please try again.");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(!exporter.is_busy());
}

#[tokio::test(start_paused = true)]
async fn concurrent_export_is_rejected() {
    let config = ExportConfig {
        settle_delay_ms: 500,
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(config, FontManager::default(), MemoryDelivery::new());
    let doc = tiny_document();
    let data = sample_resume();

    let (first, second) = tokio::join!(exporter.export(&doc, &data), exporter.export(&doc, &data));
    assert!(first.is_ok());
    assert!(matches!(second, Err(ExportError::Busy)));
    assert_eq!(exporter.delivery().files().len(), 1);

    // The flag is released once the first export finishes.
    assert!(exporter.export(&doc, &data).await.is_ok());
}
