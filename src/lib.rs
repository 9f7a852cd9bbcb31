mod config;
mod error;
mod fonts;
pub mod layout;
mod model;
mod pdf;

pub use config::{Assets, LayoutConfig};
pub use error::{Error, MeasureError};
pub use fonts::Measure;
pub use model::{LineItem, PartyInfo, ShipmentManifest};

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// Lay out, number and serialize the packing list for `manifest`.
pub fn generate_packing_list(
    manifest: &ShipmentManifest,
    assets: &Assets,
    config: &LayoutConfig,
) -> Result<Vec<u8>, Error> {
    pdf::render(manifest, assets, config, None)
}

/// Like [`generate_packing_list`], but stops with [`Error::Cancelled`] at the
/// next page boundary once `cancel` is set.
pub fn generate_packing_list_with_cancel(
    manifest: &ShipmentManifest,
    assets: &Assets,
    config: &LayoutConfig,
    cancel: &AtomicBool,
) -> Result<Vec<u8>, Error> {
    pdf::render(manifest, assets, config, Some(cancel))
}

pub fn write_packing_list(
    manifest_json: &Path,
    output: &Path,
    assets: &Assets,
    config: &LayoutConfig,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let raw = std::fs::read(manifest_json).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, manifest_json.display())),
        ),
        _ => Error::Io(e),
    })?;
    let manifest = ShipmentManifest::from_json_slice(&raw)?;
    let t_parse = t0.elapsed();

    let bytes = generate_packing_list(&manifest, assets, config)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms ({} items, output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        manifest.shipping_item_list.len(),
        bytes.len(),
    );

    Ok(())
}
