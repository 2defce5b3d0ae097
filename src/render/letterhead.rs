//! Letterhead asset loading.
//!
//! The letterhead band at the top of every document is an external image
//! asset — a local file in most deployments, a cross-origin URL when the
//! asset is served from a CDN. It is fetched and decoded *before*
//! rasterization so the rasterizer itself stays synchronous and pure; a
//! fetch or decode failure propagates as a render error and the export is
//! abandoned with no partial artifact.

use image::RgbImage;

use crate::error::FolioError;

/// Load a letterhead image from a file path or an `http(s)` URL.
pub async fn load(source: &str) -> Result<RgbImage, FolioError> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source).await?
    } else {
        tokio::fs::read(source)
            .await
            .map_err(|e| FolioError::Render(format!("failed to read letterhead {source}: {e}")))?
    };
    decode(&bytes)
}

async fn fetch(url: &str) -> Result<Vec<u8>, FolioError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| FolioError::Render(format!("failed to fetch letterhead {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(FolioError::Render(format!(
            "letterhead fetch returned {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| FolioError::Render(format!("failed to read letterhead body: {e}")))?;
    Ok(bytes.to_vec())
}

fn decode(bytes: &[u8]) -> Result<RgbImage, FolioError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| FolioError::Render(format!("failed to decode letterhead: {e}")))?;
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_round_trip() {
        let mut png = Vec::new();
        let img = RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let decoded = decode(&png).unwrap();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(*decoded.get_pixel(0, 0), image::Rgb([10, 20, 30]));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"not an image").unwrap_err();
        assert!(matches!(err, FolioError::Render(_)));
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let err = load("/nonexistent/letterhead.jpg").await.unwrap_err();
        assert!(matches!(err, FolioError::Render(_)));
    }
}
