use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessrun::config::{Config, LogFormat};
use tessrun::ocr::{parse_config_override, OcrOptions, TesseractRunner, OEM_MODES, PSM_MODES};

#[derive(Parser)]
#[command(name = "tessrun")]
#[command(about = "Run Tesseract OCR on an image and print or save the text")]
struct Args {
    /// Image to process
    #[arg(required_unless_present_any = ["list_modes", "list_langs", "print_parameters"])]
    input: Option<PathBuf>,

    /// Write the text to this file instead of printing it
    output: Option<PathBuf>,

    /// Language(s) to recognize, e.g. `eng` or `eng+spa`
    #[arg(short, long)]
    lang: Option<String>,

    /// Page segmentation mode (see --list-modes)
    #[arg(long)]
    psm: Option<u32>,

    /// OCR engine mode (see --list-modes)
    #[arg(long)]
    oem: Option<u32>,

    /// Engine variable override, may be repeated
    #[arg(short = 'c', long = "config", value_name = "KEY=VALUE", value_parser = parse_override)]
    config: Vec<(String, String)>,

    /// Print the page segmentation and engine modes, then exit
    #[arg(long)]
    list_modes: bool,

    /// Print the installed language models, then exit
    #[arg(long)]
    list_langs: bool,

    /// Print the engine's tunable parameters, then exit
    #[arg(long)]
    print_parameters: bool,
}

fn parse_override(raw: &str) -> Result<(String, String), String> {
    parse_config_override(raw).map_err(|e| e.to_string())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tessrun=info".into());

    // stdout carries OCR text, so logs go to stderr.
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_modes() {
    println!("Page segmentation modes (--psm):");
    for (mode, desc) in PSM_MODES {
        println!("  {mode:>2}  {desc}");
    }
    println!();
    println!("OCR engine modes (--oem):");
    for (mode, desc) in OEM_MODES {
        println!("  {mode:>2}  {desc}");
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(config.logging.format);

    if args.list_modes {
        print_modes();
        return Ok(ExitCode::SUCCESS);
    }

    let runner = TesseractRunner::from_config(&config.engine);

    if args.list_langs {
        let langs = runner
            .engine()
            .list_languages()
            .context("Failed to query installed languages")?;
        for lang in langs {
            println!("{lang}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    if args.print_parameters {
        let params = runner
            .engine()
            .print_parameters()
            .context("Failed to query engine parameters")?;
        print!("{params}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut options = OcrOptions::from_config(&config.engine);
    if let Some(lang) = args.lang {
        options.lang = Some(lang);
    }
    if let Some(psm) = args.psm {
        options.psm = psm;
    }
    if let Some(oem) = args.oem {
        options.oem = oem;
    }
    for (key, value) in args.config {
        options.set_config(key, value);
    }

    let Some(input) = args.input else {
        anyhow::bail!("an input image is required");
    };

    if let Some(output) = args.output {
        let ok = runner.file_to_file(&input, &output, &options);
        return Ok(if ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let result = runner.try_path_to_string(&input, &options);

    match result {
        Ok(text) => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(input = %input.display(), error = %e, "OCR request failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
