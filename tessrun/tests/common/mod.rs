#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, GrayImage, Luma};
use tessrun::ocr::{EngineInvocation, EngineOutput, OcrEngine, OutputTarget};
use tessrun::Result;

/// What Tesseract prints for the "noisy" test page.
pub const NOISY_PAGE: &str = "Noisy image\nto test\nOCReract.jl\n\u{c}";

/// A stand-in for the `tesseract` binary that follows its output conventions:
/// `stdout` as output base prints the text, anything else writes `<base>.txt`.
#[derive(Clone)]
pub struct FakeTesseract {
    text: String,
    invocations: Arc<Mutex<Vec<EngineInvocation>>>,
}

impl FakeTesseract {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn invocations(&self) -> Vec<EngineInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn last_args(&self) -> Vec<String> {
        self.invocations()
            .last()
            .map(|inv| inv.args.clone())
            .unwrap_or_default()
    }
}

impl OcrEngine for FakeTesseract {
    fn name(&self) -> &str {
        "fake-tesseract"
    }

    fn run(&self, invocation: &EngineInvocation) -> Result<EngineOutput> {
        self.invocations.lock().unwrap().push(invocation.clone());

        if !invocation.input.is_file() {
            return Ok(EngineOutput {
                success: false,
                status: "exit status: 1".to_string(),
                stdout: Vec::new(),
                stderr: b"Error, cannot read input file".to_vec(),
            });
        }

        let stdout = match &invocation.output {
            OutputTarget::Stdout => self.text.clone().into_bytes(),
            OutputTarget::Base(base) => {
                let mut path = base.clone().into_os_string();
                path.push(".txt");
                fs::write(PathBuf::from(path), &self.text)?;
                Vec::new()
            }
        };

        Ok(EngineOutput {
            success: true,
            status: "exit status: 0".to_string(),
            stdout,
            stderr: Vec::new(),
        })
    }
}

pub fn blank_page() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 40, Luma([255])))
}

/// Write the blank page as a PNG under `dir` and return its path.
pub fn write_page(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    blank_page()
        .save(&path)
        .unwrap_or_else(|e| panic!("Failed to write fixture '{name}': {e}"));
    path
}
