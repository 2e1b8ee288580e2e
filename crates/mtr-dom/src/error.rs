//! Error types for the DOM backend.

use std::str::Utf8Error;

/// Error while reading or writing markup through the DOM backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomError {
    /// XML parsing error.
    #[error("XML parse error at byte {position}")]
    Xml {
        /// Byte offset the reader had reached.
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// XML attribute error.
    #[error("XML attribute error")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// UTF-8 decoding error.
    #[error("UTF-8 error")]
    Utf8(#[from] Utf8Error),
}
