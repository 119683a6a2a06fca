//! Shared vocabulary for child output and incoming requests.

use std::fmt;

use serde::Deserialize;

/// Which output channel of the generator process a line came from.
///
/// `Data` is the generated page itself (child stdout); `Status` is
/// progress chatter such as model loading (child stderr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSource {
    Data,
    Status,
}

impl OutputSource {
    /// Tag used in the wire framing, without brackets.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Status => "STATUS",
        }
    }
}

impl fmt::Display for OutputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of child output, tagged with the channel it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedLine {
    pub source: OutputSource,
    pub text: String,
}

impl TaggedLine {
    pub fn new(source: OutputSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

/// Request body accepted by the generation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    /// Free-form description of the page the user wants.
    pub prompt: String,
}
