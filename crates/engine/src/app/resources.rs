use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use crate::asset_keys::{validate_asset_key, AssetKeyError};

const PLACEHOLDER_TEXTURE_SIZE: u32 = 32;
const PLACEHOLDER_RGBA: [u8; 4] = [255, 0, 255, 255];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    key: String,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    pub fn solid(key: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            key: key.into(),
            width,
            height,
            rgba: rgba.repeat(pixel_count),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

pub type TextureHandle = Arc<Texture>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundBuffer {
    key: String,
    bytes: Vec<u8>,
}

impl SoundBuffer {
    pub fn new(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            bytes,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_silent(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub type SoundBufferHandle = Arc<SoundBuffer>;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid asset key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("asset '{key}' is not registered and no asset root is configured")]
    NoAssetRoot { key: String },
    #[error("failed to read asset at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Synchronous, caching asset loader. Repeated loads of one key return the
/// same handle.
#[derive(Debug, Default)]
pub struct ResourceManager {
    asset_root: Option<PathBuf>,
    textures: HashMap<String, TextureHandle>,
    sound_buffers: HashMap<String, SoundBufferHandle>,
    warned_keys: HashSet<String>,
}

impl ResourceManager {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: Some(asset_root.into()),
            ..Self::default()
        }
    }

    /// A manager that only serves assets registered with `insert_*`.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn insert_texture(&mut self, texture: Texture) -> TextureHandle {
        let handle = Arc::new(texture);
        self.textures
            .insert(handle.key().to_string(), Arc::clone(&handle));
        handle
    }

    pub fn insert_sound_buffer(&mut self, buffer: SoundBuffer) -> SoundBufferHandle {
        let handle = Arc::new(buffer);
        self.sound_buffers
            .insert(handle.key().to_string(), Arc::clone(&handle));
        handle
    }

    pub fn load_texture(&mut self, key: &str) -> Result<TextureHandle, ResourceError> {
        if let Some(handle) = self.textures.get(key) {
            return Ok(Arc::clone(handle));
        }
        let path = self.resolve_path(key, "sprites", "png")?;
        let texture = load_texture_rgba(key, &path)?;
        debug!(
            key,
            path = %path.display(),
            width = texture.width,
            height = texture.height,
            "texture_loaded"
        );
        Ok(self.insert_texture(texture))
    }

    pub fn load_texture_or_placeholder(&mut self, key: &str) -> TextureHandle {
        match self.load_texture(key) {
            Ok(handle) => handle,
            Err(error) => {
                self.warn_load_once(key, &error, "texture_load_failed_using_placeholder");
                self.insert_texture(Texture::solid(
                    key,
                    PLACEHOLDER_TEXTURE_SIZE,
                    PLACEHOLDER_TEXTURE_SIZE,
                    PLACEHOLDER_RGBA,
                ))
            }
        }
    }

    pub fn load_sound_buffer(&mut self, key: &str) -> Result<SoundBufferHandle, ResourceError> {
        if let Some(handle) = self.sound_buffers.get(key) {
            return Ok(Arc::clone(handle));
        }
        let path = self.resolve_path(key, "sounds", "wav")?;
        let bytes = fs::read(&path).map_err(|source| ResourceError::Read {
            path: path.clone(),
            source,
        })?;
        debug!(key, path = %path.display(), bytes = bytes.len(), "sound_buffer_loaded");
        Ok(self.insert_sound_buffer(SoundBuffer::new(key, bytes)))
    }

    pub fn load_sound_buffer_or_silent(&mut self, key: &str) -> SoundBufferHandle {
        match self.load_sound_buffer(key) {
            Ok(handle) => handle,
            Err(error) => {
                self.warn_load_once(key, &error, "sound_load_failed_using_silence");
                self.insert_sound_buffer(SoundBuffer::new(key, Vec::new()))
            }
        }
    }

    fn resolve_path(
        &self,
        key: &str,
        kind_dir: &str,
        extension: &str,
    ) -> Result<PathBuf, ResourceError> {
        validate_asset_key(key).map_err(|source| ResourceError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        let root = self
            .asset_root
            .as_ref()
            .ok_or_else(|| ResourceError::NoAssetRoot {
                key: key.to_string(),
            })?;
        Ok(root.join(kind_dir).join(format!("{key}.{extension}")))
    }

    fn warn_load_once(&mut self, key: &str, error: &ResourceError, event: &'static str) {
        if !self.warned_keys.insert(key.to_string()) {
            return;
        }
        warn!(asset_key = key, error = %error, "{event}");
    }
}

fn load_texture_rgba(key: &str, path: &Path) -> Result<Texture, ResourceError> {
    let reader = ImageReader::open(path).map_err(|source| ResourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| ResourceError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(Texture {
        key: key.to_string(),
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
