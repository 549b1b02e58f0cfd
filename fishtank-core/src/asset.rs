//! Seam between the frame loop and whatever loads actor models.

use crate::Entity;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Container format of a loaded model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// JSON glTF (`.gltf`)
    Gltf,
    /// Binary glTF (`.glb`)
    Glb,
}

/// A loaded model, as attached to an actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAsset {
    pub path: PathBuf,
    pub format: ModelFormat,
    /// glTF asset version declared by the file
    pub version: String,
    pub byte_len: usize,
    /// Uniform scale applied when the model is placed in the scene
    pub scale: f32,
}

impl ModelAsset {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read model {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unrecognized model format: {}", .0.display())]
    UnrecognizedFormat(PathBuf),

    #[error("Malformed model {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// Result of one load request, delivered at a frame boundary.
#[derive(Debug)]
pub struct LoadCompletion {
    pub actor: Entity,
    pub result: Result<ModelAsset, AssetError>,
}

/// Asynchronous model loader.
///
/// `request` starts a load and returns immediately; finished loads are handed
/// back by `poll`, which the frame loop calls once per frame. There is no
/// cancellation: a request that never completes simply never shows up.
pub trait AssetLoader {
    fn request(&mut self, actor: Entity, path: &Path);

    /// Drains every completion that arrived since the last call, in arrival order.
    fn poll(&mut self) -> Vec<LoadCompletion>;

    /// Number of requests that have not completed yet
    fn in_flight(&self) -> usize;
}
