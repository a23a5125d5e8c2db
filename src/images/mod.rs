//! Generated image handling
//!
//! Provides:
//! - Decoding of inference payloads and PNG re-encoding
//! - Per-request temporary image files

mod temp;

use std::io::Cursor;
use std::path::PathBuf;

use image::ImageFormat;
use tracing::debug;

use crate::error::BotResult;

pub use temp::TempImage;

/// Decode an inference payload and re-encode it as PNG
///
/// Fails on anything that is not a decodable image, which is how an API
/// answering 200 with a non-image body surfaces.
pub fn decode_to_png(data: &[u8]) -> BotResult<Vec<u8>> {
    let format = image::guess_format(data)?;
    let image = image::load_from_memory_with_format(data, format)?;
    debug!(
        "Decoded {:?} image {}x{}",
        format,
        image.width(),
        image.height()
    );

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Decode `data` and write it as PNG to a fresh temp file in `dir`
///
/// Decoding and the file write run on the blocking pool.
pub async fn stage(data: Vec<u8>, dir: PathBuf, user_id: u64) -> BotResult<TempImage> {
    tokio::task::spawn_blocking(move || {
        let png = decode_to_png(&data)?;
        TempImage::write(&dir, user_id, &png)
    })
    .await?
}
