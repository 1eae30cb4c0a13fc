pub mod config;
pub mod error;
pub mod ocr;

pub use error::{Result, TessError};
pub use ocr::{file_to_file, image_to_string, OcrEngine, OcrOptions, TesseractCli, TesseractRunner};
