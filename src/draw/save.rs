use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const EXPORT_FILE_NAME: &str = "drawing.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png)
        .context("encode surface as png")?;
    Ok(out.into_inner())
}

/// Folder the "download" lands in: the configured folder, else the user's
/// download folder, else the working directory.
pub fn resolve_export_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured.map(str::trim).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = dirs_next::download_dir() {
        return Ok(dir);
    }
    std::env::current_dir().map_err(|err| anyhow!("resolve working directory: {err}"))
}

pub fn export_path(output_dir: &Path) -> PathBuf {
    output_dir.join(EXPORT_FILE_NAME)
}

/// Encodes `img` and writes it to `drawing.png` inside `output_dir`,
/// replacing any previous export.
pub fn download_png(img: &RgbaImage, output_dir: &Path) -> Result<ExportedImage> {
    let bytes = encode_png(img)?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create export folder {}", output_dir.display()))?;
    let path = export_path(output_dir);
    fs::write(&path, &bytes).with_context(|| format!("write export {}", path.display()))?;
    Ok(ExportedImage {
        path,
        width: img.width(),
        height: img.height(),
        byte_len: bytes.len(),
    })
}
