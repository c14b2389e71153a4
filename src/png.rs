//! Raster export of a rendered diagram.

use std::path::Path;

use log::info;

use crate::error::ExportError;

/// Rasterize an SVG document to PNG bytes at `scale` × its intrinsic size.
pub fn render_png(svg: &str, font_family: &str, scale: f32) -> Result<Vec<u8>, ExportError> {
    let mut opt = usvg::Options::default();
    if let Some(first) = font_family.split(',').next() {
        opt.font_family = first.trim().to_string();
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(ExportError::Pixmap(width, height))?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

pub fn write_png(svg: &str, font_family: &str, scale: f32, output: &Path) -> Result<(), ExportError> {
    let bytes = render_png(svg, font_family, scale)?;
    std::fs::write(output, bytes)?;
    info!(path = output.display().to_string(); "PNG exported");
    Ok(())
}
