//! Notes and the list-response envelope they arrive in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::NoteId;

/// A meeting recording as returned by a list source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Opaque unique identifier.
    pub id: NoteId,
    /// Display title.
    pub title: String,
    /// Length of the recording in seconds.
    pub duration: i64,
    /// Creation time as `yyyy-MM-dd HH:mm:ss`, local and unzoned.
    pub create_time: String,
}

/// Pagination metadata. Decoded but not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_now: u32,
    pub page_size: u32,
    pub page_total: u32,
    pub total_num: u64,
}

/// Payload of a successful list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteList {
    pub list: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInfo>,
}

/// The `{ code, msg, data }` envelope every source responds with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Zero on success; anything else is a failure.
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Response type for note list endpoints.
pub type ListNotesResponse = ApiResponse<NoteList>;

/// Why a decoded envelope could not be turned into data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The source reported a non-zero code.
    #[error("source returned code {code}: {msg}")]
    Failure { code: i64, msg: String },
    /// Code was zero but no payload was attached.
    #[error("successful response carried no data")]
    MissingData,
}

impl<T> ApiResponse<T> {
    /// The only code that signals success.
    pub const SUCCESS: i64 = 0;

    /// Wraps a payload in a successful envelope.
    pub fn success(data: T) -> Self {
        Self {
            code: Self::SUCCESS,
            msg: "success".to_string(),
            data: Some(data),
        }
    }

    /// Builds a failed envelope with no payload.
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }

    pub const fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }

    /// Validates the code and extracts the payload.
    pub fn into_data(self) -> Result<T, ResponseError> {
        if !self.is_success() {
            return Err(ResponseError::Failure {
                code: self.code,
                msg: self.msg,
            });
        }
        self.data.ok_or(ResponseError::MissingData)
    }
}
