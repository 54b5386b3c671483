use std::fmt;

/// Container format of an uploaded recording, inferred from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Wav,
    Mp3,
    M4a,
    Ogg,
    Flac,
    Webm,
    Unknown,
}

impl AudioFormat {
    pub fn from_filename(filename: &str) -> Self {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "wav" | "wave" => Self::Wav,
            "mp3" => Self::Mp3,
            "m4a" | "mp4" | "aac" => Self::M4a,
            "ogg" | "oga" | "opus" => Self::Ogg,
            "flac" => Self::Flac,
            "webm" => Self::Webm,
            _ => Self::Unknown,
        }
    }

    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Wav => Some("wav"),
            Self::Mp3 => Some("mp3"),
            Self::M4a => Some("m4a"),
            Self::Ogg => Some("ogg"),
            Self::Flac => Some("flac"),
            Self::Webm => Some("webm"),
            Self::Unknown => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::M4a => "audio/mp4",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::Webm => "audio/webm",
            Self::Unknown => "application/octet-stream",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension().unwrap_or("unknown"))
    }
}
