mod common;

use std::fs;

use image::{GenericImageView, ImageFormat};
use image_resizer::converter::{convert_file, scaled_dimensions, Conversion, SkipReason};
use image_resizer::{ImageCrateCodec, OutputFormat, TargetSize};
use tempfile::TempDir;

use common::{file_size, flat_image, noisy_image, open_guessed, write_image};

fn png() -> OutputFormat {
    OutputFormat::from_name("png", 75).unwrap()
}

#[test]
fn percent_mode_halves_dimensions() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("wide.png");
    let output = dir.path().join("out").join("wide.png");
    write_image(&input, &noisy_image(200, 100));

    let conversion = convert_file(
        &input,
        &output,
        TargetSize::Percent(0.5),
        &png(),
        &ImageCrateCodec,
    );

    match conversion {
        Conversion::Converted {
            width,
            height,
            input_size,
            output_size,
            ..
        } => {
            assert_eq!((width, height), (100, 50));
            assert_eq!(input_size, file_size(&input));
            assert_eq!(output_size, file_size(&output));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let bytes = fs::read(&output).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (100, 50));
}

#[test]
fn byte_mode_uses_power_law_estimate() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("noise.png");
    let output = dir.path().join("noise_small.jpg");
    write_image(&input, &noisy_image(200, 100));

    let input_size = file_size(&input);
    let target = 10 * 1024;
    assert!(input_size > target);

    let conversion = convert_file(
        &input,
        &output,
        TargetSize::Bytes(target),
        &OutputFormat::from_name("jpeg", 75).unwrap(),
        &ImageCrateCodec,
    );

    let expected = scaled_dimensions(200, 100, target, input_size);
    assert!(expected.0 < 200 && expected.1 < 100);
    assert!(matches!(
        conversion,
        Conversion::Converted { width, height, .. } if (width, height) == expected
    ));

    let resized = open_guessed(&output);
    assert_eq!(resized.dimensions(), expected);
}

#[test]
fn input_below_target_is_skipped_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("tiny.png");
    let output = dir.path().join("tiny_out.png");
    write_image(&input, &flat_image(8, 8));
    assert!(file_size(&input) < 1024);

    let conversion = convert_file(
        &input,
        &output,
        TargetSize::Bytes(1024),
        &png(),
        &ImageCrateCodec,
    );

    assert_eq!(conversion, Conversion::Skipped(SkipReason::BelowTarget));
    assert!(!output.exists());
}

#[test]
fn second_run_does_not_touch_existing_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.jpg");
    let output = dir.path().join("resized.jpg");
    write_image(&input, &noisy_image(64, 48));
    let format = OutputFormat::from_name("jpeg", 75).unwrap();

    let first = convert_file(&input, &output, TargetSize::Percent(0.5), &format, &ImageCrateCodec);
    assert!(matches!(first, Conversion::Converted { .. }));
    let content = fs::read(&output).unwrap();
    let modified = fs::metadata(&output).unwrap().modified().unwrap();

    let second = convert_file(&input, &output, TargetSize::Percent(0.5), &format, &ImageCrateCodec);
    assert_eq!(second, Conversion::Skipped(SkipReason::OutputExists));
    assert_eq!(fs::read(&output).unwrap(), content);
    assert_eq!(fs::metadata(&output).unwrap().modified().unwrap(), modified);
}

#[test]
fn existing_output_directory_receives_basename() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("src").join("cat.png");
    let out_dir = dir.path().join("dest");
    fs::create_dir_all(&out_dir).unwrap();
    write_image(&input, &noisy_image(20, 20));

    let conversion = convert_file(&input, &out_dir, TargetSize::Percent(1.0), &png(), &ImageCrateCodec);

    match conversion {
        Conversion::Converted { output, .. } => assert_eq!(output, out_dir.join("cat.png")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(open_guessed(&out_dir.join("cat.png")).dimensions(), (20, 20));
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("a").join("b").join("c").join("out.png");
    write_image(&input, &noisy_image(10, 10));

    let conversion = convert_file(&input, &output, TargetSize::Percent(0.8), &png(), &ImageCrateCodec);

    assert!(matches!(conversion, Conversion::Converted { width: 8, height: 8, .. }));
    assert!(output.is_file());
}

#[test]
fn undecodable_input_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.jpg");
    let output = dir.path().join("broken_out.jpg");
    fs::write(&input, b"this is not a jpeg").unwrap();

    let conversion = convert_file(&input, &output, TargetSize::Percent(0.5), &png(), &ImageCrateCodec);

    assert!(matches!(conversion, Conversion::Failed(_)));
    assert!(!output.exists());
}

#[test]
fn unsupported_encoder_fails_without_partial_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.dds");
    write_image(&input, &noisy_image(16, 16));

    // DDSはデコードのみ対応
    let dds = OutputFormat::from_name("dds", 75).unwrap();
    let conversion = convert_file(&input, &output, TargetSize::Percent(0.5), &dds, &ImageCrateCodec);

    match conversion {
        Conversion::Failed(message) => assert!(message.contains("dds")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!output.exists());
}
