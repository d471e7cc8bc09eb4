//! Logo and signature images, fetched and decoded once per report.
//!
//! A location is an `http(s)://` URL, a `data:<mime>;base64,` URL or a
//! filesystem path. Decoding uses printpdf's re-exported image crate so the
//! decoded image embeds directly.

use std::path::Path;

use base64::Engine;
use printpdf::image_crate::{self, DynamicImage};
use thiserror::Error;

use crate::report::types::AssetSlot;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset request failed (status {status}): {location}")]
    Http { status: u16, location: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed data URL: {0}")]
    DataUrl(String),

    #[error("Image decoding error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait AssetFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, AssetError>;
}

/// Fetches URLs over HTTP, decodes data URLs, reads everything else from disk.
pub struct DefaultAssetFetcher {
    client: reqwest::blocking::Client,
}

impl DefaultAssetFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, AssetError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AssetError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AssetError::HttpClient(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Http {
                status: status.as_u16(),
                location: url.to_string(),
            });
        }
        let bytes = response
            .bytes()
            .map_err(|e| AssetError::HttpClient(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl AssetFetcher for DefaultAssetFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, AssetError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            self.fetch_http(location)
        } else if location.starts_with("data:") {
            decode_data_url(location)
        } else {
            let path = Path::new(location);
            if !path.exists() {
                return Err(AssetError::NotFound(location.to_string()));
            }
            Ok(std::fs::read(path)?)
        }
    }
}

/// `data:image/png;base64,<payload>` → payload bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, AssetError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AssetError::DataUrl("missing data: prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::DataUrl("missing payload separator".into()))?;
    if !meta.ends_with(";base64") {
        return Err(AssetError::DataUrl(format!("unsupported encoding in '{meta}'")));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AssetError::DataUrl(e.to_string()))
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AssetError> {
    let img = image_crate::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
    // PDF image XObjects here carry no alpha channel.
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Decoded report images. A missing image is simply not drawn.
#[derive(Default)]
pub struct ReportAssets {
    pub logo: Option<DynamicImage>,
    pub signature: Option<DynamicImage>,
}

impl ReportAssets {
    pub fn none() -> Self {
        Self::default()
    }

    /// Fetches and decodes both images. Failures are logged and the slot left empty.
    pub fn load(
        fetcher: &dyn AssetFetcher,
        logo: Option<&str>,
        signature: Option<&str>,
    ) -> Self {
        Self {
            logo: logo.and_then(|loc| load_one(fetcher, AssetSlot::Logo, loc)),
            signature: signature.and_then(|loc| load_one(fetcher, AssetSlot::Signature, loc)),
        }
    }

    pub fn get(&self, slot: AssetSlot) -> Option<&DynamicImage> {
        match slot {
            AssetSlot::Logo => self.logo.as_ref(),
            AssetSlot::Signature => self.signature.as_ref(),
        }
    }
}

fn load_one(fetcher: &dyn AssetFetcher, slot: AssetSlot, location: &str) -> Option<DynamicImage> {
    match fetcher.fetch(location).and_then(|bytes| decode_image(&bytes)) {
        Ok(img) => {
            tracing::debug!(?slot, width = img.width(), height = img.height(), "Asset loaded");
            Some(img)
        }
        Err(e) => {
            tracing::warn!(?slot, error = %e, "Asset unavailable, rendering without it");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    use printpdf::image_crate::{ImageOutputFormat, Rgba, RgbaImage};

    pub(crate) fn tiny_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 128]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    /// Serves fixed bytes per location.
    pub(crate) struct StaticAssets(pub HashMap<String, Vec<u8>>);

    impl AssetFetcher for StaticAssets {
        fn fetch(&self, location: &str) -> Result<Vec<u8>, AssetError> {
            self.0
                .get(location)
                .cloned()
                .ok_or_else(|| AssetError::NotFound(location.to_string()))
        }
    }

    #[test]
    fn decodes_base64_data_url() {
        let url = "data:text/plain;base64,aGVsbG8=";
        assert_eq!(decode_data_url(url).unwrap(), b"hello");
    }

    #[test]
    fn rejects_non_base64_data_url() {
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(AssetError::DataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(AssetError::DataUrl(_))
        ));
    }

    #[test]
    fn default_fetcher_reads_files_and_data_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, tiny_png()).unwrap();

        let fetcher = DefaultAssetFetcher::new(5).unwrap();
        let from_file = fetcher.fetch(path.to_str().unwrap()).unwrap();
        assert_eq!(from_file, tiny_png());

        let encoded = base64::engine::general_purpose::STANDARD.encode(tiny_png());
        let from_data = fetcher
            .fetch(&format!("data:image/png;base64,{encoded}"))
            .unwrap();
        assert_eq!(from_data, tiny_png());
    }

    #[test]
    fn missing_file_is_not_found() {
        let fetcher = DefaultAssetFetcher::new(5).unwrap();
        assert!(matches!(
            fetcher.fetch("/definitely/not/here.png"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn decoded_images_drop_alpha() {
        let img = decode_image(&tiny_png()).unwrap();
        assert!(matches!(img, DynamicImage::ImageRgb8(_)));
        assert_eq!((img.width(), img.height()), (4, 2));
    }

    #[test]
    fn failed_asset_is_omitted_not_fatal() {
        let fetcher = StaticAssets(HashMap::from([
            ("logo".to_string(), tiny_png()),
            ("broken".to_string(), b"not an image".to_vec()),
        ]));
        let assets = ReportAssets::load(&fetcher, Some("logo"), Some("broken"));
        assert!(assets.get(AssetSlot::Logo).is_some());
        assert!(assets.get(AssetSlot::Signature).is_none());

        let assets = ReportAssets::load(&fetcher, None, Some("missing"));
        assert!(assets.logo.is_none() && assets.signature.is_none());
    }
}
