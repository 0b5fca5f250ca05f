//! Media type identifiers naming a wire representation.

use std::{borrow::Cow, fmt};

/// Opaque identifier naming a wire representation.
///
/// The same string doubles as the transport content type, for example an
/// HTTP `Content-Type` header. Values compare by string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaType(Cow<'static, str>);

impl MediaType {
    /// Media type of the built-in binary codec.
    pub const BINARY: MediaType = MediaType::from_static("application/x-bincode");
    /// Media type of the built-in JSON codec.
    pub const JSON: MediaType = MediaType::from_static("application/json");

    /// Build a media type from a string literal.
    #[must_use]
    pub const fn from_static(value: &'static str) -> Self { Self(Cow::Borrowed(value)) }

    /// Build a media type from any string.
    #[must_use]
    pub fn new(value: impl Into<Cow<'static, str>>) -> Self { Self(value.into()) }

    /// Content type string associated with this media type.
    #[must_use]
    pub fn content_type(&self) -> &str { &self.0 }

    /// Compare against a transport content-type header.
    ///
    /// Parameters after `;` and surrounding whitespace are ignored, and the
    /// comparison is ASCII case-insensitive.
    ///
    /// ```
    /// use wirecodec::MediaType;
    ///
    /// assert!(MediaType::JSON.matches_content_type("Application/JSON; charset=utf-8"));
    /// assert!(!MediaType::JSON.matches_content_type("application/x-bincode"));
    /// ```
    #[must_use]
    pub fn matches_content_type(&self, header: &str) -> bool {
        let essence = header.split(';').next().unwrap_or_default().trim();
        essence.eq_ignore_ascii_case(&self.0)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&'static str> for MediaType {
    fn from(value: &'static str) -> Self { Self::from_static(value) }
}

impl From<String> for MediaType {
    fn from(value: String) -> Self { Self(Cow::Owned(value)) }
}
