use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::{Result, TessError};

use super::engine::{EngineInvocation, EngineOutput, OcrEngine, OutputTarget, TesseractCli};
use super::options::OcrOptions;
use super::staging::StagedImage;

/// Runs OCR requests against an engine.
///
/// The plain methods never fail: errors are logged and turned into an empty
/// string or `false`, so batch callers can loop over thousands of images
/// without per-item error handling. The `try_*` methods return the error
/// instead.
#[derive(Clone)]
pub struct TesseractRunner<E = TesseractCli> {
    engine: E,
    staging_dir: Option<PathBuf>,
}

impl Default for TesseractRunner<TesseractCli> {
    fn default() -> Self {
        Self::new(TesseractCli::default())
    }
}

impl TesseractRunner<TesseractCli> {
    pub fn from_config(config: &EngineConfig) -> Self {
        let runner = Self::new(TesseractCli::from_config(config));
        match &config.staging_dir {
            Some(dir) => runner.staging_dir(dir),
            None => runner,
        }
    }
}

impl<E: OcrEngine> TesseractRunner<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            staging_dir: None,
        }
    }

    /// Stage in-memory images under `dir` instead of the system temp dir.
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn execute(&self, invocation: &EngineInvocation) -> Result<EngineOutput> {
        let output = self.engine.run(invocation)?;
        if !output.success {
            return Err(TessError::EngineFailed {
                status: output.status.clone(),
                stderr: output.stderr_lossy(),
            });
        }
        Ok(output)
    }

    /// OCR an in-memory image and return the engine's text verbatim,
    /// including the trailing form feed Tesseract ends each page with.
    pub fn try_image_to_string(&self, image: &DynamicImage, options: &OcrOptions) -> Result<String> {
        let staged = StagedImage::write(image, self.staging_dir.as_deref())?;

        let invocation = EngineInvocation {
            input: staged.path().to_path_buf(),
            output: OutputTarget::Stdout,
            args: options.to_args(),
        };
        let output = self.execute(&invocation)?;
        let text = String::from_utf8(output.stdout)?;

        debug!(
            engine = self.engine.name(),
            bytes = text.len(),
            "OCR produced text for in-memory image"
        );
        Ok(text)
    }

    pub fn image_to_string(&self, image: &DynamicImage, options: &OcrOptions) -> String {
        self.try_image_to_string(image, options)
            .unwrap_or_else(|e| {
                report_failure("image_to_string", &describe_image(image), &e);
                String::new()
            })
    }

    /// Decode encoded image bytes (PNG, JPEG, TIFF, ...) and OCR them.
    pub fn try_bytes_to_string(&self, bytes: &[u8], options: &OcrOptions) -> Result<String> {
        let image = image::load_from_memory(bytes)?;
        self.try_image_to_string(&image, options)
    }

    pub fn bytes_to_string(&self, bytes: &[u8], options: &OcrOptions) -> String {
        self.try_bytes_to_string(bytes, options).unwrap_or_else(|e| {
            report_failure("bytes_to_string", &format!("{} bytes", bytes.len()), &e);
            String::new()
        })
    }

    /// Read and decode an image file, then OCR it in memory.
    pub fn try_path_to_string(&self, input: impl AsRef<Path>, options: &OcrOptions) -> Result<String> {
        let input = input.as_ref();
        let bytes = fs::read(input).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TessError::InputNotFound(input.to_path_buf()),
            _ => TessError::Io(e),
        })?;
        self.try_bytes_to_string(&bytes, options)
    }

    pub fn path_to_string(&self, input: impl AsRef<Path>, options: &OcrOptions) -> String {
        let input = input.as_ref();
        self.try_path_to_string(input, options).unwrap_or_else(|e| {
            report_failure("path_to_string", &input.display().to_string(), &e);
            String::new()
        })
    }

    /// OCR an image file and write the text to `output`, returning the path written.
    pub fn try_file_to_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: &OcrOptions,
    ) -> Result<PathBuf> {
        let input = input.as_ref();
        let output = output.as_ref();

        if !input.is_file() {
            return Err(TessError::InputNotFound(input.to_path_buf()));
        }

        // The engine always writes `<base>.txt`. Give it a private base next to
        // the destination so nothing else in that directory is touched, and
        // so the rename onto `output` stays on one filesystem.
        let parent = output
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let scratch = tempfile::Builder::new()
            .prefix("tessrun-")
            .tempdir_in(parent)?;
        let base = scratch.path().join("page");
        let produced = engine_text_path(&base);

        let invocation = EngineInvocation {
            input: input.to_path_buf(),
            output: OutputTarget::Base(base),
            args: options.to_args(),
        };
        self.execute(&invocation)?;

        if !produced.is_file() {
            return Err(TessError::MissingOutput(produced));
        }
        fs::rename(&produced, output)?;

        info!(
            engine = self.engine.name(),
            input = %input.display(),
            output = %output.display(),
            "OCR result written"
        );
        Ok(output.to_path_buf())
    }

    pub fn file_to_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: &OcrOptions,
    ) -> bool {
        let input = input.as_ref();
        match self.try_file_to_file(input, output, options) {
            Ok(_) => true,
            Err(e) => {
                report_failure("file_to_file", &input.display().to_string(), &e);
                false
            }
        }
    }
}

impl<E: OcrEngine + Clone + 'static> TesseractRunner<E> {
    /// `image_to_string` on the blocking thread pool.
    pub async fn image_to_string_async(&self, image: DynamicImage, options: OcrOptions) -> String {
        let runner = self.clone();
        let label = describe_image(&image);

        let result =
            tokio::task::spawn_blocking(move || runner.try_image_to_string(&image, &options))
                .await
                .map_err(|e| TessError::Task(e.to_string()))
                .and_then(|inner| inner);

        result.unwrap_or_else(|e| {
            report_failure("image_to_string", &label, &e);
            String::new()
        })
    }

    /// `file_to_file` on the blocking thread pool.
    pub async fn file_to_file_async(
        &self,
        input: PathBuf,
        output: PathBuf,
        options: OcrOptions,
    ) -> bool {
        let runner = self.clone();
        let label = input.display().to_string();

        let result =
            tokio::task::spawn_blocking(move || runner.try_file_to_file(&input, &output, &options))
                .await
                .map_err(|e| TessError::Task(e.to_string()))
                .and_then(|inner| inner);

        match result {
            Ok(_) => true,
            Err(e) => {
                report_failure("file_to_file", &label, &e);
                false
            }
        }
    }
}

/// OCR an in-memory image with the `tesseract` binary on `PATH`.
pub fn image_to_string(image: &DynamicImage, options: &OcrOptions) -> String {
    TesseractRunner::<TesseractCli>::default().image_to_string(image, options)
}

/// OCR an image file into a text file with the `tesseract` binary on `PATH`.
pub fn file_to_file(input: impl AsRef<Path>, output: impl AsRef<Path>, options: &OcrOptions) -> bool {
    TesseractRunner::<TesseractCli>::default().file_to_file(input, output, options)
}

fn engine_text_path(base: &Path) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(".txt");
    PathBuf::from(path)
}

fn describe_image(image: &DynamicImage) -> String {
    let (width, height) = image.dimensions();
    format!("in-memory {width}x{height} image")
}

fn report_failure(operation: &'static str, input: &str, err: &TessError) {
    if err.is_setup_failure() {
        error!(operation, input, error = %err, "OCR request failed");
    } else {
        warn!(operation, input, error = %err, "OCR request failed");
    }
}
