//! Markup text replacer.
//!
//! Runs registered filters over the attribute values and text of HTML or
//! XML markup and logs every value they change.
//!
//! # Filters
//!
//! - [`TextFilter`]: receives the text of elements named in its [`Scope`]
//! - [`AttributeFilter`]: receives attribute values; names may be plain
//!   (`alt`) or qualified by tag (`img:alt`)
//!
//! Names are matched case-insensitively. For an attribute, filters under
//! `tag:attribute` run first, then those under `attribute`, then those
//! registered for all attributes. For text, filters under the tag name run
//! before those registered for all tags. Each filter receives the output of
//! the previous one. Whitespace-only text is never filtered.
//!
//! # Backends
//!
//! The default lossless backend keeps everything except filtered values byte
//! for byte. The DOM backend ([`Backend::Dom`]) reads the markup as an event
//! stream and writes normalized markup.
//!
//! # Example
//!
//! ```
//! use mtr::{ChangeKind, MarkupReplacer, Scope, TextFn};
//!
//! let mut replacer = MarkupReplacer::new();
//! replacer
//!     .register_text_filter(TextFn::new(Scope::All, |_tag, text| text.replace("foo", "bar")))
//!     .unwrap();
//!
//! let output = replacer.filter("<p>foo</p>\n<!-- foo -->").unwrap();
//! assert_eq!(output, "<p>bar</p>\n<!-- foo -->");
//! assert_eq!(replacer.changes()[0].kind, ChangeKind::Text);
//! ```

mod changes;
mod dispatch;
mod error;
mod filter;
mod registry;
mod session;

pub use changes::{Change, ChangeKind};
pub use error::{ERROR_CANNOT_RENDER_MARKUP, RegistrationError, ReplaceError};
pub use filter::{AttributeFilter, AttributeFn, Filter, Scope, TextFilter, TextFn};
pub use mtr_config::{Backend, Config, ConfigError, Dialect, LogConfig, LogLevel};
pub use registry::{FilterRegistry, WILDCARD};
pub use session::MarkupReplacer;
