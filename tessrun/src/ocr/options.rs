use tracing::warn;

use crate::config::EngineConfig;
use crate::error::{Result, TessError};

pub const DEFAULT_PSM: u32 = 3;
pub const DEFAULT_OEM: u32 = 1;

/// Page segmentation modes understood by Tesseract.
pub const PSM_MODES: &[(u32, &str)] = &[
    (0, "Orientation and script detection (OSD) only."),
    (1, "Automatic page segmentation with OSD."),
    (2, "Automatic page segmentation, but no OSD, or OCR."),
    (3, "Fully automatic page segmentation, but no OSD."),
    (4, "Assume a single column of text of variable sizes."),
    (5, "Assume a single uniform block of vertically aligned text."),
    (6, "Assume a single uniform block of text."),
    (7, "Treat the image as a single text line."),
    (8, "Treat the image as a single word."),
    (9, "Treat the image as a single word in a circle."),
    (10, "Treat the image as a single character."),
    (11, "Sparse text. Find as much text as possible in no particular order."),
    (12, "Sparse text with OSD."),
    (
        13,
        "Raw line. Treat the image as a single text line, bypassing Tesseract-specific hacks.",
    ),
];

/// OCR engine modes understood by Tesseract.
pub const OEM_MODES: &[(u32, &str)] = &[
    (0, "Legacy engine only."),
    (1, "Neural nets LSTM engine only."),
    (2, "Legacy + LSTM engines."),
    (3, "Default, based on what is available."),
];

/// Config keys that collide with the dedicated `-l`, `--psm` and `--oem` flags.
const RESERVED_KEYS: &[&str] = &[
    "lang",
    "psm",
    "oem",
    "tessedit_pageseg_mode",
    "tessedit_ocr_engine_mode",
];

pub fn describe_psm(psm: u32) -> Option<&'static str> {
    PSM_MODES
        .iter()
        .find(|(mode, _)| *mode == psm)
        .map(|(_, desc)| *desc)
}

pub fn describe_oem(oem: u32) -> Option<&'static str> {
    OEM_MODES
        .iter()
        .find(|(mode, _)| *mode == oem)
        .map(|(_, desc)| *desc)
}

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(key))
}

/// Split a `key=value` override at the first `=`.
pub fn parse_config_override(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(TessError::InvalidOverride(raw.to_string())),
    }
}

/// Options for a single OCR call.
///
/// `psm` and `oem` are forwarded as-is; Tesseract is the one that rejects
/// values outside the tables above. Extra config entries keep insertion order
/// and become `-c key=value` arguments, except for reserved keys, which the
/// named fields always take precedence over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    pub lang: Option<String>,
    pub psm: u32,
    pub oem: u32,
    config: Vec<(String, String)>,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            lang: None,
            psm: DEFAULT_PSM,
            oem: DEFAULT_OEM,
            config: Vec::new(),
        }
    }
}

impl OcrOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            lang: config.lang.clone(),
            psm: config.psm,
            oem: config.oem,
            config: Vec::new(),
        }
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn psm(mut self, psm: u32) -> Self {
        self.psm = psm;
        self
    }

    pub fn oem(mut self, oem: u32) -> Self {
        self.oem = oem;
        self
    }

    /// Add a config override. Setting an existing key replaces its value in place.
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_config(key, value);
        self
    }

    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.config.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.config.push((key, value)),
        }
    }

    pub fn config_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.config.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the options as Tesseract command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(6 + self.config.len() * 2);

        if let Some(lang) = &self.lang {
            args.push("-l".to_string());
            args.push(lang.clone());
        }
        args.push("--psm".to_string());
        args.push(self.psm.to_string());
        args.push("--oem".to_string());
        args.push(self.oem.to_string());

        for (key, value) in &self.config {
            if is_reserved_key(key) {
                warn!(
                    key = %key,
                    value = %value,
                    "Ignoring config override that collides with a dedicated flag"
                );
                continue;
            }
            args.push("-c".to_string());
            args.push(format!("{key}={value}"));
        }

        args
    }
}
