//! Procedurally drawn placeholder images.
//!
//! Each placeholder is a two-colour diagonal gradient with a handful of
//! translucent circles and rectangles on top, encoded as JPEG. File names
//! carry the unix timestamp and a random hex suffix so that every run
//! produces fresh images. Once a run has attached its images the directory
//! is rotated: files the page references always survive, older ones are
//! kept up to the configured limit.

use image::{ImageFormat, Rgb, RgbImage};
use rand::{Rng, rng};
use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 450;

const PALETTE: &[Rgb<u8>] = &[
    Rgb([13, 27, 42]),
    Rgb([27, 38, 59]),
    Rgb([65, 90, 119]),
    Rgb([0, 105, 92]),
    Rgb([21, 101, 192]),
    Rgb([106, 27, 154]),
    Rgb([183, 28, 28]),
    Rgb([245, 124, 0]),
    Rgb([46, 125, 50]),
];

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    Rgb([
        lerp(base[0], over[0], alpha),
        lerp(base[1], over[1], alpha),
        lerp(base[2], over[2], alpha),
    ])
}

fn pick(rng: &mut impl Rng) -> Rgb<u8> {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// Draw a placeholder of the given size.
pub fn draw(width: u32, height: u32, rng: &mut impl Rng) -> RgbImage {
    let start = pick(rng);
    let mut end = pick(rng);
    if end == start {
        end = Rgb([255 - start[0], 255 - start[1], 255 - start[2]]);
    }

    let span = (width + height).max(1) as f32;
    let mut img = RgbImage::from_fn(width, height, |x, y| {
        let t = (x + y) as f32 / span;
        blend(start, end, t)
    });

    for _ in 0..rng.random_range(3..7) {
        let color = pick(rng);
        let alpha = rng.random_range(0.2..0.45);
        let cx = rng.random_range(0..width.max(1)) as i64;
        let cy = rng.random_range(0..height.max(1)) as i64;
        let r = rng.random_range(20..(height.max(41) / 2)) as i64;
        for y in (cy - r).max(0)..(cy + r).min(height as i64) {
            for x in (cx - r).max(0)..(cx + r).min(width as i64) {
                if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                    let px = img.get_pixel_mut(x as u32, y as u32);
                    *px = blend(*px, color, alpha);
                }
            }
        }
    }

    for _ in 0..rng.random_range(2..5) {
        let color = pick(rng);
        let alpha = rng.random_range(0.15..0.35);
        let x0 = rng.random_range(0..width.max(1));
        let y0 = rng.random_range(0..height.max(1));
        let w = rng.random_range(1..=(width / 3).max(1));
        let h = rng.random_range(1..=(height / 3).max(1));
        for y in y0..(y0 + h).min(height) {
            for x in x0..(x0 + w).min(width) {
                let px = img.get_pixel_mut(x, y);
                *px = blend(*px, color, alpha);
            }
        }
    }

    img
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// A `dynamic_<ts>_<hex>.jpg` path in `dir` that does not exist yet.
fn unique_path(dir: &Path) -> PathBuf {
    let mut rng = rng();
    loop {
        let name = format!("dynamic_{}_{:08x}.jpg", unix_now(), rng.random::<u32>());
        let path = dir.join(name);
        if !path.exists() {
            return path;
        }
    }
}

/// Draw a placeholder into `dir` and return the new file name.
pub fn write_placeholder(dir: &Path) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let path = unique_path(dir);
    let img = draw(WIDTH, HEIGHT, &mut rng());
    img.save_with_format(&path, ImageFormat::Jpeg)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or("placeholder path has no file name")?;
    debug!(file = %file_name, "Drew placeholder image");
    Ok(file_name)
}

/// Delete placeholders in `dir` beyond the `keep` most recently modified.
/// Files named in `in_use` are never deleted and count towards `keep`.
///
/// Returns how many files were removed.
pub fn rotate(dir: &Path, keep: usize, in_use: &HashSet<String>) -> std::io::Result<usize> {
    let mut files: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with("dynamic_") && name.ends_with(".jpg")
        })
        .filter_map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, entry.path()))
        })
        .collect();

    files.sort_by(|a, b| b.cmp(a));
    let is_used = |path: &Path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| in_use.contains(n))
    };
    let mut kept = files.iter().filter(|(_, path)| is_used(path.as_path())).count();
    let mut removed = 0;
    for (_, path) in &files {
        if is_used(path.as_path()) {
            continue;
        }
        if kept < keep {
            kept += 1;
            continue;
        }
        fs::remove_file(path)?;
        removed += 1;
    }
    if removed > 0 {
        debug!(removed, keep, "Rotated placeholder images");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_draw_dimensions() {
        let img = draw(64, 48, &mut rng());
        assert_eq!(img.dimensions(), (64, 48));
    }

    #[test]
    fn test_placeholders_get_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_placeholder(dir.path()).unwrap();
        let second = write_placeholder(dir.path()).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("dynamic_") && first.ends_with(".jpg"));
        assert!(dir.path().join(&first).exists());
        assert!(dir.path().join(&second).exists());
    }

    /// Five placeholders, `dynamic_0_…` oldest to `dynamic_4_…` newest.
    fn aged_placeholders(dir: &Path) {
        let base = SystemTime::now() - Duration::from_secs(1_000);
        for i in 0..5u64 {
            let path = dir.join(format!("dynamic_{i}_0000000{i}.jpg"));
            fs::write(&path, b"jpeg").unwrap();
            let file = fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(base + Duration::from_secs(i * 10)).unwrap();
        }
    }

    #[test]
    fn test_rotate_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        aged_placeholders(dir.path());
        fs::write(dir.path().join("keep-me.txt"), b"x").unwrap();

        assert_eq!(rotate(dir.path(), 2, &HashSet::new()).unwrap(), 3);
        assert!(dir.path().join("dynamic_4_00000004.jpg").exists());
        assert!(dir.path().join("dynamic_3_00000003.jpg").exists());
        assert!(!dir.path().join("dynamic_0_00000000.jpg").exists());
        assert!(dir.path().join("keep-me.txt").exists());
    }

    #[test]
    fn test_rotate_never_deletes_files_in_use() {
        let dir = tempfile::tempdir().unwrap();
        aged_placeholders(dir.path());
        let in_use: HashSet<String> = ["dynamic_0_00000000.jpg", "dynamic_1_00000001.jpg"]
            .into_iter()
            .map(String::from)
            .collect();

        // Both in-use files already fill the quota, so every other file goes
        assert_eq!(rotate(dir.path(), 2, &in_use).unwrap(), 3);
        assert!(dir.path().join("dynamic_0_00000000.jpg").exists());
        assert!(dir.path().join("dynamic_1_00000001.jpg").exists());
        assert!(!dir.path().join("dynamic_4_00000004.jpg").exists());

        assert_eq!(rotate(dir.path(), 0, &in_use).unwrap(), 0);
        assert!(dir.path().join("dynamic_0_00000000.jpg").exists());
    }

    #[test]
    fn test_rotate_fills_quota_with_newest_unused() {
        let dir = tempfile::tempdir().unwrap();
        aged_placeholders(dir.path());
        let in_use: HashSet<String> = std::iter::once("dynamic_0_00000000.jpg".to_string()).collect();

        assert_eq!(rotate(dir.path(), 3, &in_use).unwrap(), 2);
        assert!(dir.path().join("dynamic_0_00000000.jpg").exists());
        assert!(dir.path().join("dynamic_4_00000004.jpg").exists());
        assert!(dir.path().join("dynamic_3_00000003.jpg").exists());
        assert!(!dir.path().join("dynamic_2_00000002.jpg").exists());
    }
}
