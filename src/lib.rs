//! # bionic-epub
//!
//! Rewrites EPUB books for bionic reading: the first few letters of every
//! word are wrapped in an emphasis element so the eye can anchor on them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bionic_epub::{convert_file, output_file_name};
//!
//! let output = output_file_name("book.epub");
//! convert_file("book.epub", &output)?;
//! # Ok::<(), bionic_epub::Error>(())
//! ```
//!
//! ## Pieces
//!
//! - [`segment`] splits text into words, whitespace, punctuation and
//!   character references.
//! - [`emphasis`] decides how many letters of a word get emphasized.
//! - [`transform`] rewrites one HTML/XHTML document.
//! - [`container`] unpacks and repacks the ZIP archive.
//! - [`convert`] ties them together for a whole book.
//!
//! Single documents can be rewritten without an archive:
//!
//! ```
//! use bionic_epub::DocumentTransformer;
//!
//! let out = DocumentTransformer::default()
//!     .transform("<p>Bionic reading</p>")
//!     .unwrap();
//! assert!(out.contains("<p><b>Bio</b>nic <b>rea</b>ding</p>"));
//! ```

pub mod cancel;
pub mod config;
pub mod container;
pub mod convert;
pub mod dom;
pub mod emphasis;
pub mod error;
pub mod segment;
pub mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use cancel::CancellationToken;
pub use config::Config;
pub use container::{Container, Member, Payload};
pub use convert::{ConversionReport, Converter, convert, convert_file, output_file_name};
pub use emphasis::{EmphasisPolicy, split_point};
pub use error::{Error, Result};
pub use segment::{Segment, SegmentKind, Segmenter};
pub use transform::{DocumentTransformer, TransformError, TransformStats};
