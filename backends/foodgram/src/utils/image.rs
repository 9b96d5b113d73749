use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";
const RECIPES_DIR: &str = "recipes";

/// The `image` field of a recipe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageField {
    /// A freshly uploaded `data:image/<ext>;base64,<payload>` URI
    Upload { extension: String, bytes: Vec<u8> },
    /// A reference to an image that is already stored
    Stored(String),
}

impl ImageField {
    pub fn parse(value: &str) -> AppResult<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::validation("image", "image can't be blank"));
        }

        let Some(rest) = value.strip_prefix(DATA_URI_PREFIX) else {
            return Ok(ImageField::Stored(value.to_owned()));
        };

        let (extension, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or_else(|| AppError::validation("image", "image must be base64 encoded"))?;

        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::validation("image", "unsupported image type"));
        }

        let bytes = base64_simd::STANDARD
            .decode_to_vec(payload.as_bytes())
            .map_err(|_| AppError::validation("image", "image is not valid base64"))?;

        if bytes.is_empty() {
            return Err(AppError::validation("image", "image can't be empty"));
        }

        Ok(ImageField::Upload {
            extension: extension.to_ascii_lowercase(),
            bytes,
        })
    }
}

/// Writes uploaded recipe images below the media root.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the value to persist in `recipes.image`.
    pub fn store(&self, image: ImageField) -> AppResult<String> {
        match image {
            ImageField::Stored(path) => Ok(path),
            ImageField::Upload { extension, bytes } => {
                let dir = self.root.join(RECIPES_DIR);
                fs::create_dir_all(&dir)?;

                let file_name = format!("{}.{extension}", Uuid::new_v4());
                fs::write(dir.join(&file_name), bytes)?;

                Ok(format!("{RECIPES_DIR}/{file_name}"))
            }
        }
    }

    /// Best-effort removal of a file written by [`MediaStore::store`].
    pub fn discard(&self, stored: &str) {
        if !stored.starts_with(RECIPES_DIR) || stored.contains("..") {
            return;
        }

        if let Err(error) = fs::remove_file(self.root.join(stored)) {
            warn!(%error, path = stored, "failed to discard recipe image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_data_uri() {
        // "hello" in base64
        let field = ImageField::parse("data:image/PNG;base64,aGVsbG8=").unwrap();
        assert_eq!(
            field,
            ImageField::Upload {
                extension: "png".into(),
                bytes: b"hello".to_vec(),
            }
        );
    }

    #[test]
    fn keeps_existing_paths() {
        let field = ImageField::parse("recipes/abc.png").unwrap();
        assert_eq!(field, ImageField::Stored("recipes/abc.png".into()));
    }

    #[test]
    fn rejects_broken_uploads() {
        for value in [
            "",
            "data:image/png,aGVsbG8=",
            "data:image/;base64,aGVsbG8=",
            "data:image/p/ng;base64,aGVsbG8=",
            "data:image/png;base64,***",
            "data:image/png;base64,",
        ] {
            assert!(ImageField::parse(value).is_err(), "accepted {value:?}");
        }
    }

    #[test]
    fn stores_and_discards_uploads() {
        let root = std::env::temp_dir().join(format!("foodgram-media-{}", Uuid::new_v4()));
        let media = MediaStore::new(&root);

        let stored = media
            .store(ImageField::Upload {
                extension: "jpg".into(),
                bytes: vec![1, 2, 3],
            })
            .unwrap();

        assert!(stored.starts_with("recipes/") && stored.ends_with(".jpg"));
        assert_eq!(fs::read(root.join(&stored)).unwrap(), vec![1, 2, 3]);

        media.discard(&stored);
        assert!(!root.join(&stored).exists());

        let _ = fs::remove_dir_all(root);
    }
}
