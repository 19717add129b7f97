//! XML document subsystem.
//!
//! # Data Flow
//! ```text
//! Response body bytes
//!     → parser.rs (quick-xml event stream → element tree)
//!     → document.rs (Document / Element, line-tracked)
//!     → gateway mapping (Gateway, Transaction)
//! ```
//!
//! # Design Decisions
//! - Every element records the line it was found on so mapping code can
//!   point at the offending entry
//! - Parsing is all-or-nothing; a malformed body never yields a partial tree
//! - Whitespace-only text is dropped, text content is unescaped

pub mod document;
pub mod parser;

pub use document::{Document, Element};
pub use parser::{parse, XmlError};
