mod common;

use std::fs;

use common::{blank_page, write_page, FakeTesseract, NOISY_PAGE};
use futures::future::join_all;
use pretty_assertions::assert_eq;
use tessrun::ocr::{OutputTarget, OEM_MODES, PSM_MODES};
use tessrun::{OcrOptions, TessError, TesseractCli, TesseractRunner};
use tempfile::TempDir;

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[test]
fn test_in_memory_page_returns_text_with_form_feed() {
    let runner = TesseractRunner::new(FakeTesseract::new(NOISY_PAGE));

    let text = runner.image_to_string(&blank_page(), &OcrOptions::default());

    assert_eq!(text, "Noisy image\nto test\nOCReract.jl\n\u{c}");
    assert_eq!(text.trim(), "Noisy image\nto test\nOCReract.jl");
}

#[test]
fn test_on_disk_page_writes_text_file() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let output = dir.path().join("res.txt");
    let runner = TesseractRunner::new(FakeTesseract::new(NOISY_PAGE));

    assert!(runner.file_to_file(&input, &output, &OcrOptions::default()));
    assert_eq!(fs::read_to_string(&output).unwrap(), NOISY_PAGE);
}

#[test]
fn test_disk_output_matches_in_memory_output() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let output = dir.path().join("res.txt");
    let runner = TesseractRunner::new(FakeTesseract::new(NOISY_PAGE));
    let options = OcrOptions::new().lang("eng").psm(6);

    let image = image::open(&input).unwrap();
    let in_memory = runner.image_to_string(&image, &options);
    assert!(runner.file_to_file(&input, &output, &options));

    assert_eq!(fs::read(&output).unwrap(), in_memory.into_bytes());
}

#[test]
fn test_repeated_calls_are_identical() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let engine = FakeTesseract::new(NOISY_PAGE);
    let runner = TesseractRunner::new(engine.clone());
    let options = OcrOptions::new().config("preserve_interword_spaces", "1");

    let first = runner.image_to_string(&blank_page(), &options);
    let second = runner.image_to_string(&blank_page(), &options);
    assert_eq!(first, second);

    let out_a = dir.path().join("a.txt");
    let out_b = dir.path().join("b.txt");
    assert!(runner.file_to_file(&input, &out_a, &options));
    assert!(runner.file_to_file(&input, &out_b, &options));
    assert_eq!(fs::read(&out_a).unwrap(), fs::read(&out_b).unwrap());

    let invocations = engine.invocations();
    assert_eq!(invocations.len(), 4);
    assert_eq!(invocations[0].args, invocations[1].args);
    assert_ne!(
        invocations[0].input, invocations[1].input,
        "each in-memory call stages its own file"
    );
}

#[test]
fn test_every_psm_reaches_the_engine() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let output = dir.path().join("res.txt");
    let engine = FakeTesseract::new(NOISY_PAGE);
    let runner = TesseractRunner::new(engine.clone());

    for (psm, _) in PSM_MODES {
        let options = OcrOptions::new().psm(*psm);

        runner.image_to_string(&blank_page(), &options);
        assert_eq!(flag_value(&engine.last_args(), "--psm"), Some(psm.to_string()));

        assert!(runner.file_to_file(&input, &output, &options));
        assert_eq!(flag_value(&engine.last_args(), "--psm"), Some(psm.to_string()));
    }
}

#[test]
fn test_every_oem_reaches_the_engine() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let output = dir.path().join("res.txt");
    let engine = FakeTesseract::new(NOISY_PAGE);
    let runner = TesseractRunner::new(engine.clone());

    for (oem, _) in OEM_MODES {
        let options = OcrOptions::new().oem(*oem);

        runner.image_to_string(&blank_page(), &options);
        assert_eq!(flag_value(&engine.last_args(), "--oem"), Some(oem.to_string()));

        assert!(runner.file_to_file(&input, &output, &options));
        assert_eq!(flag_value(&engine.last_args(), "--oem"), Some(oem.to_string()));
    }
}

#[test]
fn test_each_config_pair_is_its_own_override() {
    let engine = FakeTesseract::new(NOISY_PAGE);
    let runner = TesseractRunner::new(engine.clone());
    let options = OcrOptions::new()
        .config("tessedit_char_whitelist", "ABCabc")
        .config("textord_min_linesize", "2.5")
        .config("debug_file", "/dev/null");

    runner.image_to_string(&blank_page(), &options);

    let args = engine.last_args();
    let overrides: Vec<&str> = args
        .windows(2)
        .filter(|pair| pair[0] == "-c")
        .map(|pair| pair[1].as_str())
        .collect();
    assert_eq!(
        overrides,
        vec![
            "tessedit_char_whitelist=ABCabc",
            "textord_min_linesize=2.5",
            "debug_file=/dev/null",
        ]
    );
}

#[test]
fn test_named_options_take_precedence_over_config() {
    let engine = FakeTesseract::new(NOISY_PAGE);
    let runner = TesseractRunner::new(engine.clone());
    let options = OcrOptions::new()
        .lang("eng")
        .psm(8)
        .config("psm", "3")
        .config("tessedit_pageseg_mode", "3")
        .config("lang", "deu");

    runner.image_to_string(&blank_page(), &options);

    let args = engine.last_args();
    assert_eq!(flag_value(&args, "-l"), Some("eng".to_string()));
    assert_eq!(flag_value(&args, "--psm"), Some("8".to_string()));
    assert!(!args.iter().any(|a| a == "-c"));
    assert_eq!(args.iter().filter(|a| *a == "--psm").count(), 1);
}

#[test]
fn test_nonexistent_image_path_yields_sentinels() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.png");
    let output = dir.path().join("res.txt");
    let engine = FakeTesseract::new(NOISY_PAGE);
    let runner = TesseractRunner::new(engine.clone());

    assert!(!runner.file_to_file(&missing, &output, &OcrOptions::default()));
    assert!(!output.exists());
    assert!(engine.invocations().is_empty());

    assert_eq!(runner.path_to_string(&missing, &OcrOptions::default()), "");
    assert!(matches!(
        runner.try_path_to_string(&missing, &OcrOptions::default()),
        Err(TessError::InputNotFound(path)) if path == missing
    ));
    assert!(engine.invocations().is_empty());
}

#[test]
fn test_missing_engine_binary_yields_sentinels() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let output = dir.path().join("res.txt");
    let runner = TesseractRunner::new(TesseractCli::new("/nonexistent/bin/tesseract"));

    assert_eq!(runner.image_to_string(&blank_page(), &OcrOptions::default()), "");
    assert!(!runner.file_to_file(&input, &output, &OcrOptions::default()));

    assert!(matches!(
        runner.try_image_to_string(&blank_page(), &OcrOptions::default()),
        Err(TessError::EngineNotFound { .. })
    ));
}

#[test]
fn test_destination_without_txt_extension() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let output = dir.path().join("result");
    let engine = FakeTesseract::new(NOISY_PAGE);
    let runner = TesseractRunner::new(engine.clone());

    assert!(runner.file_to_file(&input, &output, &OcrOptions::default()));
    assert_eq!(fs::read_to_string(&output).unwrap(), NOISY_PAGE);
    assert!(!dir.path().join("result.txt").exists());
    match &engine.invocations()[0].output {
        OutputTarget::Base(base) => assert!(base.starts_with(dir.path())),
        other => panic!("expected a file base, got {other:?}"),
    }
}

#[test]
fn test_existing_sibling_txt_survives() {
    let dir = TempDir::new().unwrap();
    let input = write_page(dir.path(), "noisy.png");
    let output = dir.path().join("report");
    let sibling = dir.path().join("report.txt");
    fs::write(&sibling, "user notes, unrelated").unwrap();
    let runner = TesseractRunner::new(FakeTesseract::new(NOISY_PAGE));

    assert!(runner.file_to_file(&input, &output, &OcrOptions::default()));
    assert_eq!(fs::read_to_string(&output).unwrap(), NOISY_PAGE);
    assert_eq!(fs::read_to_string(&sibling).unwrap(), "user notes, unrelated");
}

#[tokio::test]
async fn test_parallel_async_calls() {
    let runner = TesseractRunner::new(FakeTesseract::new(NOISY_PAGE));

    let texts = join_all(
        (0..8).map(|_| runner.image_to_string_async(blank_page(), OcrOptions::default())),
    )
    .await;

    assert_eq!(texts.len(), 8);
    assert!(texts.iter().all(|text| text == NOISY_PAGE));
}
