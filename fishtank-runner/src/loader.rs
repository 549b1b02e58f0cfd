//! Loads fish models from disk on background threads.

use crossbeam_channel::{unbounded, Receiver, Sender};
use fishtank_core::{AssetError, AssetLoader, Entity, LoadCompletion, ModelAsset, ModelFormat};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_HEADER_LEN: usize = 12;

/// One thread per request; completions are collected on the frame thread by `poll`.
pub struct FileModelLoader {
    tx: Sender<LoadCompletion>,
    rx: Receiver<LoadCompletion>,
    in_flight: usize,
}

impl FileModelLoader {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx, in_flight: 0 }
    }
}

impl Default for FileModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for FileModelLoader {
    fn request(&mut self, actor: Entity, path: &Path) {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let owned = path.to_path_buf();

        let spawned = thread::Builder::new()
            .name(format!("load-{}", actor.id()))
            .spawn(move || {
                let result = load_model(&owned);
                // The receiver lives as long as the loader; a send error means it was dropped
                let _ = tx.send(LoadCompletion { actor, result });
            });

        if let Err(source) = spawned {
            let _ = self.tx.send(LoadCompletion {
                actor,
                result: Err(AssetError::Io { path: path.to_path_buf(), source }),
            });
        }
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        let completions: Vec<LoadCompletion> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Reads a glTF model and checks its header.
///
/// Binary files must start with the `glTF` magic followed by a little-endian
/// version; JSON files must declare `asset.version`.
pub fn load_model(path: &Path) -> Result<ModelAsset, AssetError> {
    let bytes = fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (format, version) = if bytes.starts_with(GLB_MAGIC) {
        (ModelFormat::Glb, glb_version(path, &bytes)?)
    } else {
        (ModelFormat::Gltf, gltf_version(path, &bytes)?)
    };

    debug!("Read {} ({:?} v{}, {} bytes)", path.display(), format, version, bytes.len());
    Ok(ModelAsset {
        path: path.to_path_buf(),
        format,
        version,
        byte_len: bytes.len(),
        scale: 1.0,
    })
}

fn glb_version(path: &Path, bytes: &[u8]) -> Result<String, AssetError> {
    if bytes.len() < GLB_HEADER_LEN {
        return Err(malformed(path, "truncated binary header"));
    }
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[4..8]);
    Ok(u32::from_le_bytes(word).to_string())
}

fn gltf_version(path: &Path, bytes: &[u8]) -> Result<String, AssetError> {
    let document: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|_| AssetError::UnrecognizedFormat(path.to_path_buf()))?;

    document
        .get("asset")
        .and_then(|asset| asset.get("version"))
        .and_then(|version| version.as_str())
        .map(str::to_string)
        .ok_or_else(|| malformed(path, "missing asset.version"))
}

fn malformed(path: &Path, reason: &str) -> AssetError {
    AssetError::Malformed {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}
