use std::fmt;

/// Which path produced the authoritative transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptSource {
    Primary,
    Fallback,
}

impl TranscriptSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptSource::Primary => "primary",
            TranscriptSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    pub text: String,
    pub source: TranscriptSource,
    /// Per-chunk texts in ascending chunk index; empty for primary results.
    pub partials: Vec<String>,
}

impl TranscriptionResult {
    pub fn primary(text: String) -> Self {
        Self {
            text,
            source: TranscriptSource::Primary,
            partials: Vec::new(),
        }
    }

    /// Chunk texts are joined as-is, without a separator.
    pub fn fallback(partials: Vec<String>) -> Self {
        Self {
            text: partials.concat(),
            source: TranscriptSource::Fallback,
            partials,
        }
    }
}
