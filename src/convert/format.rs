//! 画像形式の変換（PNG: 可逆, JPEG: 品質指定）

use crate::batch::{create_progress_bar, BatchReport};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::scanner::{scan_folder, IMAGE_EXTENSIONS};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub fn convert_folder(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<BatchReport> {
    let images = scan_folder(input, IMAGE_EXTENSIONS)?;
    std::fs::create_dir_all(output)?;

    let pb = create_progress_bar(images.len() as u64, "Convert");
    let outcomes: Vec<(String, Result<PathBuf>)> = images
        .par_iter()
        .map(|img| {
            let outcome = convert_image(&img.path, output, format, quality);
            pb.inc(1);
            (img.file_name.clone(), outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut report = BatchReport::default();
    for (file_name, outcome) in outcomes {
        match outcome {
            Ok(path) => report.record_written(path),
            Err(e) => report.record_failure(file_name, e),
        }
    }
    Ok(report)
}

/// 1枚を変換して `<stem>.<png|jpg>` として保存
pub fn convert_image(
    input: &Path,
    output_dir: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<PathBuf> {
    let img = image::open(input)?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    match format {
        OutputFormat::Png => img.save_with_format(&output_path, ImageFormat::Png)?,
        OutputFormat::Jpeg => {
            // JPEGはアルファ非対応
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let mut writer = BufWriter::new(File::create(&output_path)?);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            rgb.write_with_encoder(encoder)?;
        }
    }

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_convert_png_with_alpha_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("lancaster.png");
        RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 128])).save(&input).unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();

        let path = convert_image(&input, &out, OutputFormat::Jpeg, 90).unwrap();
        assert_eq!(path, out.join("lancaster.jpg"));

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn test_convert_folder_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))
            .save(dir.path().join("ok.png"))
            .unwrap();
        std::fs::write(dir.path().join("bad.jpg"), b"garbage").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let out = dir.path().join("converted");
        let report = convert_folder(dir.path(), &out, OutputFormat::Png, 95).unwrap();

        assert_eq!(report.written, vec![out.join("ok.png")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item, "bad.jpg");
        assert!(!out.join("notes.png").exists());
    }
}
