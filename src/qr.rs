use std::{
    io::Cursor,
    panic::{self, AssertUnwindSafe},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{
    GrayImage, ImageFormat, Luma,
    imageops::{self, FilterType},
};
use log::{debug, error, info, warn};
use qrcode::{Color, EcLevel, QrCode};

use crate::{
    error::{Error, Result},
    store::ActivityStore,
    types::{Activity, ActivityKind},
};

pub const IMAGE_SIZE: u32 = 256;
pub const QUIET_ZONE: u32 = 2;
pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

const UPSCALE_LIMIT: u32 = 2048;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Renders `payload` as a 256x256 black on white PNG with a 2 module margin.
///
/// Every module gets the same whole-pixel pitch and the symbol is centred;
/// leftover pixels are white. From version 27 up the pitch drops to 1 px.
pub fn render_png(payload: &str) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::M)
        .map_err(|err| Error::EncodingFailed(err.to_string()))?;

    let width = code.width() as u32;
    let colors = code.to_colors();
    let pitch = module_pitch(width);
    let offset = IMAGE_SIZE.saturating_sub(width * pitch) / 2;

    let image = GrayImage::from_fn(IMAGE_SIZE, IMAGE_SIZE, |x, y| {
        if x < offset || y < offset {
            return LIGHT;
        }
        let (mx, my) = ((x - offset) / pitch, (y - offset) / pitch);
        if mx >= width || my >= width {
            return LIGHT;
        }
        match colors[(my * width + mx) as usize] {
            Color::Dark => DARK,
            Color::Light => LIGHT,
        }
    });

    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| {
            error!("[Render QR] PNG encoding failed with err: {err}");
            Error::internal("Failed to generate QR code image")
        })?;

    Ok(png.into_inner())
}

/// Pixels per module for a symbol `width` modules wide plus its quiet zone.
pub fn module_pitch(width: u32) -> u32 {
    (IMAGE_SIZE / (width + 2 * QUIET_ZONE)).max(1)
}

/// Finds the first readable QR symbol in a greyscale bitmap.
///
/// Symbols drawn with 1 px modules are below what the reader handles, so a
/// miss is retried once on a 2x nearest-neighbour copy.
pub fn scan(image: &GrayImage) -> Result<String> {
    if let Some(content) = scan_guarded(image) {
        return Ok(content);
    }

    let (w, h) = image.dimensions();
    if w.max(h) > UPSCALE_LIMIT {
        return Err(Error::NoSymbolFound);
    }
    debug!("[Scan] Retrying at 2x");
    let upscaled = imageops::resize(image, w * 2, h * 2, FilterType::Nearest);
    scan_guarded(&upscaled).ok_or(Error::NoSymbolFound)
}

// rqrr asserts on some degenerate grids; those count as unreadable.
fn scan_guarded(image: &GrayImage) -> Option<String> {
    panic::catch_unwind(AssertUnwindSafe(|| scan_grids(image))).unwrap_or_else(|_| {
        warn!("[Scan] QR reader panicked, treating symbol as unreadable");
        None
    })
}

fn scan_grids(image: &GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        image.width() as usize,
        image.height() as usize,
        |x, y| image.get_pixel(x as u32, y as u32)[0],
    );

    let grids = prepared.detect_grids();
    debug!("[Scan] Found {} candidate grids", grids.len());

    grids.iter().find_map(|grid| match grid.decode() {
        Ok((_, content)) if !content.is_empty() => Some(content),
        Ok(_) => None,
        Err(err) => {
            debug!("[Scan] Grid failed to decode with err: {err:?}");
            None
        }
    })
}

/// Encodes `url` into a PNG data URL and records a `generate` activity.
///
/// `url` is encoded exactly as given; callers validate it first.
pub fn generate(store: &dyn ActivityStore, url: &str) -> Result<String> {
    let png = render_png(url)?;
    let data_url = format!("{DATA_URL_PREFIX}{}", STANDARD.encode(&png));

    let activity = store.add(url, ActivityKind::Generate)?;
    log_recorded(&activity);

    Ok(data_url)
}

/// Reads a QR payload out of raw PNG/JPEG bytes and records a `decode`
/// activity. The payload is returned as-is, it need not be a URL.
pub fn decode(store: &dyn ActivityStore, bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(Error::validation("No image file provided"));
    }

    let image = image::load_from_memory(bytes).map_err(Error::ImageDecodeFailed)?;
    let payload = scan(&image.to_luma8())?;

    let activity = store.add(&payload, ActivityKind::Decode)?;
    log_recorded(&activity);

    Ok(payload)
}

fn log_recorded(activity: &Activity) {
    info!(
        "[Activity] Recorded {} #{} for {}",
        activity.kind, activity.id, activity.url
    );
}
