//! OCR invocation wrapper
//!
//! Marshals `OcrOptions` into Tesseract command-line flags, runs the engine
//! and hands back its text.
//!
//! # Architecture
//!
//! - `OcrEngine` is the capability for running an engine; `TesseractCli`
//!   implements it with the `tesseract` binary, tests swap in fakes
//! - `OcrOptions` renders `-l`, `--psm`, `--oem` and `-c key=value` flags
//! - `StagedImage` writes in-memory images to uniquely named temp PNGs
//! - `TesseractRunner` exposes the two operations, in memory and on disk
//!
//! # Errors
//!
//! `image_to_string` and `file_to_file` never return errors. Failures are
//! logged through `tracing` and become `""` / `false`. Use the `try_*`
//! variants when the cause matters.
//!
//! # Usage
//!
//! ```rust,ignore
//! let runner = TesseractRunner::default();
//! let options = OcrOptions::new().lang("eng").psm(6);
//!
//! let text = runner.image_to_string(&image, &options);
//! let ok = runner.file_to_file("scan.png", "/tmp/scan.txt", &options);
//! ```

mod engine;
mod options;
mod runner;
mod staging;

pub use engine::{EngineInvocation, EngineOutput, OcrEngine, OutputTarget, TesseractCli};
pub use options::{
    describe_oem, describe_psm, is_reserved_key, parse_config_override, OcrOptions, DEFAULT_OEM,
    DEFAULT_PSM, OEM_MODES, PSM_MODES,
};
pub use runner::{file_to_file, image_to_string, TesseractRunner};
pub use staging::StagedImage;
