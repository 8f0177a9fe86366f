use image::DynamicImage;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const COVER_PREFIXES: &[&str] = &["cover", "folder", "front"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http status {0}")]
    Status(u16),
    #[error("decode: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
    /// Already-fetched, still-encoded image data.
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Interprets a user-supplied reference. A `file://` prefix is stripped.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            let path = raw.strip_prefix("file://").unwrap_or(raw);
            Self::Path(PathBuf::from(path))
        }
    }

    pub(crate) async fn read(&self) -> Result<Cow<'_, [u8]>, LoadError> {
        match self {
            Self::Path(path) => Ok(Cow::Owned(tokio::fs::read(path).await?)),
            Self::Url(url) => Ok(Cow::Owned(fetch(&reqwest::Client::new(), url).await?)),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Fetches and decodes `source`.
pub async fn load_image(source: &ImageSource) -> Result<DynamicImage, LoadError> {
    let bytes = source.read().await?;
    decode(&bytes)
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, LoadError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }
    Ok(response.bytes().await?.to_vec())
}

pub(crate) fn decode(bytes: &[u8]) -> Result<DynamicImage, LoadError> {
    let image = image::load_from_memory(bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::Empty);
    }
    Ok(image)
}

/// Picks the image in `dir` most likely to be its artwork.
///
/// Names starting with `cover`, `folder` or `front`, or containing `album`,
/// win over any other image. Ties resolve alphabetically.
pub fn find_cover_image(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    let mut images: Vec<(bool, String, PathBuf)> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_lowercase();
            let is_image = Path::new(&name)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext));
            if !is_image {
                return None;
            }
            let is_cover = COVER_PREFIXES.iter().any(|p| name.starts_with(p)) || name.contains("album");
            Some((!is_cover, name, e.path()))
        })
        .collect();
    images.sort();
    images.into_iter().next().map(|(_, _, path)| path)
}
