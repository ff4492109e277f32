//! Core library for frame-by-frame video annotation.
//!
//! This crate resolves a trustworthy frame count for a video, lets a session
//! step through its frames while collecting per-frame notes and a global
//! comment, and exports those notes as CSV or as a PDF with thumbnails.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use framenote_core::{Action, CoreConfig, MediaTools, Session, open_video};
//! use framenote_core::export::write_csv_report;
//! use std::path::Path;
//!
//! let config = CoreConfig::default();
//! let tools = MediaTools::system(&config);
//! let handle = open_video(Path::new("clip.mp4"), &tools, &config, &|_: u64| {}).unwrap();
//!
//! let session = Session::new()
//!     .load(handle, &config)
//!     .apply(Action::GoTo(120)).unwrap()
//!     .apply(Action::SaveNote("lane change".to_string())).unwrap();
//!
//! let loaded = session.require_loaded().unwrap();
//! write_csv_report(
//!     Path::new("report.csv"),
//!     &loaded.export_rows(),
//!     config.report_language,
//!     config.csv_byte_order_mark,
//! ).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod external;
pub mod frame;
pub mod media;
pub mod resolver;
pub mod session;
pub mod store;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use export::{ExportRow, ReportFormat, ReportLanguage, RowLabel};
pub use external::MediaTools;
pub use frame::FrameIndex;
pub use media::{VideoHandle, VideoProperties, VideoResource, make_thumbnail, open_video};
pub use resolver::{FallbackReason, FrameCountResolver, ResolvedFrameCount, ScanObserver};
pub use session::{Action, LoadedSession, Session};
pub use store::AnnotationStore;
pub use utils::{format_bytes, format_duration};
