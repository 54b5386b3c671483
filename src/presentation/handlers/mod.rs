mod health;
mod transcribe;

pub use health::health_handler;
pub use transcribe::{
    ErrorResponse, FILE_FIELD, TRANSCRIPT_SOURCE_HEADER, TranscribeResponse, transcribe_handler,
};
