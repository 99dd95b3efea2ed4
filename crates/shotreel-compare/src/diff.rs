//! Per-channel absolute pixel differences

use crate::error::{CompareError, Result};
use crate::frames;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Difference of two equally sized images, or `None` when the sizes differ.
/// Colour channels hold `|a - b|`; alpha is opaque so the result is viewable.
pub fn diff_images(a: &DynamicImage, b: &DynamicImage) -> Option<RgbaImage> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let a = a.to_rgba8();
    let b = b.to_rgba8();
    let (width, height) = a.dimensions();

    let mut out = RgbaImage::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        *pixel = Rgba([
            pa[0].abs_diff(pb[0]),
            pa[1].abs_diff(pb[1]),
            pa[2].abs_diff(pb[2]),
            u8::MAX,
        ]);
    }
    Some(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    OnlyInFirst,
    OnlyInSecond,
    SizeMismatch { first: (u32, u32), second: (u32, u32) },
    Unreadable { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub name: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Default, Serialize)]
pub struct ComparisonReport {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

fn load(path: &Path) -> std::result::Result<DynamicImage, String> {
    image::open(path).map_err(|e| e.to_string())
}

/// Write `<stem>_diff.png` into `output` for every frame name the two runs
/// share. Frames that cannot be compared are skipped and reported.
pub fn generate(first: &Path, second: &Path, output: &Path) -> Result<ComparisonReport> {
    let pairing = frames::pair(first, second)?;
    std::fs::create_dir_all(output).map_err(|source| CompareError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    let mut report = ComparisonReport {
        output_dir: output.to_path_buf(),
        ..Default::default()
    };
    for name in pairing.only_first {
        tracing::warn!(name = %name, "skipping frame present only in first input");
        report.skipped.push(Skipped {
            name,
            reason: SkipReason::OnlyInFirst,
        });
    }
    for name in pairing.only_second {
        tracing::warn!(name = %name, "skipping frame present only in second input");
        report.skipped.push(Skipped {
            name,
            reason: SkipReason::OnlyInSecond,
        });
    }

    for (name, path_a, path_b) in pairing.shared {
        let (a, b) = match (load(&path_a), load(&path_b)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(detail), _) | (_, Err(detail)) => {
                tracing::warn!(name = %name, "skipping unreadable frame: {}", detail);
                report.skipped.push(Skipped {
                    name,
                    reason: SkipReason::Unreadable { detail },
                });
                continue;
            }
        };

        let Some(diff) = diff_images(&a, &b) else {
            tracing::warn!(
                name = %name,
                first = ?a.dimensions(),
                second = ?b.dimensions(),
                "skipping frame due to size mismatch"
            );
            report.skipped.push(Skipped {
                name,
                reason: SkipReason::SizeMismatch {
                    first: a.dimensions(),
                    second: b.dimensions(),
                },
            });
            continue;
        };

        let path = output.join(frames::diff_name(&name));
        diff.save(&path).map_err(|source| CompareError::Image {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote diff frame");
        report.written.push(path);
    }

    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "diff generation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    #[test]
    fn identical_images_diff_to_black() {
        let img = solid(3, 2, [10, 200, 30, 255]);
        let diff = diff_images(&img, &img).unwrap();
        assert!(diff.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn channels_are_independent() {
        let a = solid(1, 1, [10, 200, 30, 255]);
        let b = solid(1, 1, [50, 100, 30, 255]);
        let diff = diff_images(&a, &b).unwrap();
        assert_eq!(*diff.get_pixel(0, 0), Rgba([40, 100, 0, 255]));
    }

    #[test]
    fn size_mismatch_yields_none() {
        assert!(diff_images(&solid(2, 2, [0; 4]), &solid(2, 3, [0; 4])).is_none());
    }

    #[test]
    fn mixed_color_types_compare() {
        let rgb = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(2, 2, image::Rgb([9, 9, 9])));
        let rgba = solid(2, 2, [9, 9, 9, 255]);
        let diff = diff_images(&rgb, &rgba).unwrap();
        assert!(diff.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    proptest! {
        #[test]
        fn diff_is_symmetric(
            w in 1u32..6,
            h in 1u32..6,
            seed_a in prop::collection::vec(any::<u8>(), 144),
            seed_b in prop::collection::vec(any::<u8>(), 144),
        ) {
            let n = (w * h * 4) as usize;
            let a = DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, seed_a[..n].to_vec()).unwrap());
            let b = DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, seed_b[..n].to_vec()).unwrap());
            prop_assert_eq!(diff_images(&a, &b), diff_images(&b, &a));
        }
    }
}
