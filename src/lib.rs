//! # resume-forge – resume builder core
//!
//! Structured resume data goes in, a single-page A4 PDF comes out. The
//! stages are:
//!
//! 1. **Store** – versioned resume aggregate with explicit persistence
//!    ([`store`], [`storage`], [`model`])
//! 2. **Template** – pure rendering into a visual tree ([`templates`], [`dom`])
//! 3. **Style** – Tailwind-like classes and inline CSS ([`style`])
//! 4. **Layout** – flexbox layout with Taffy ([`layout`])
//! 5. **Capture** – rasterize the render target at ≥2× ([`capture`])
//! 6. **Paginate** – fit the bitmap onto one page ([`pagination`])
//! 7. **Assemble** – embed the bitmap via printpdf ([`pdf`])
//!
//! [`pipeline::Exporter`] drives stages 5–7 and hands the file to a
//! [`pipeline::Delivery`].

pub mod capture;
pub mod dom;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod pagination;
pub mod pdf;
pub mod pipeline;
pub mod samples;
pub mod storage;
pub mod store;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use error::ExportError;
pub use model::{ResumeData, SkillLevel, TemplateId};
pub use pipeline::{export_filename, ExportConfig, ExportOutcome, Exporter, FileDelivery};
pub use store::ResumeStore;
pub use templates::{preview_document, PreviewMode};
