//! Text encoding for strings crossing the native boundary

use std::ffi::{c_char, CStr, CString};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::infrastructure::{InfraError, InfraResult};

/// Encoding applied to every `char*` passed to or returned by the library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character
    Latin1,
}

impl TextEncoding {
    /// Encode `text` as a NUL-terminated string for the library.
    pub fn encode(self, text: &str) -> InfraResult<CString> {
        let bytes = match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        InfraError::encoding(text, format!("{c:?} is outside latin1"))
                    })
                })
                .collect::<InfraResult<Vec<u8>>>()?,
        };
        CString::new(bytes).map_err(|_| InfraError::encoding(text, "contains a NUL byte"))
    }

    /// Decode bytes returned by the library. Invalid UTF-8 is replaced, not rejected.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// Decode a library-owned `char*`; null decodes as the empty string.
    ///
    /// # Safety
    /// `ptr` must be null or point to a NUL-terminated string that stays
    /// valid for the duration of this call.
    pub unsafe fn decode_ptr(self, ptr: *const c_char) -> String {
        if ptr.is_null() {
            return String::new();
        }
        self.decode(CStr::from_ptr(ptr).to_bytes())
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("utf8"),
            TextEncoding::Latin1 => f.write_str("latin1"),
        }
    }
}
