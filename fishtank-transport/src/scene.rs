//! Static scene setup handed to the renderer once, before any frame.

use fishtank_core::{Container, Vec3};
use serde::Serialize;
use std::path::PathBuf;

/// Output surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub look_at: [f32; 3],
}

impl Camera {
    /// Perspective camera slightly above the tank, looking at its center.
    pub fn new(viewport: &Viewport) -> Self {
        Self {
            fov_degrees: 75.0,
            aspect: viewport.aspect(),
            near: 0.1,
            far: 1000.0,
            position: [0.0, 2.0, 25.0],
            look_at: [0.0, 0.0, 0.0],
        }
    }

    /// Keeps the projection in step with the viewport.
    pub fn on_resize(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Light {
    pub color: u32,
    pub intensity: f32,
    /// `None` for ambient light
    pub position: Option<[f32; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerLook {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub color: u32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelLook {
    pub path: PathBuf,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleLook {
    pub sprite: PathBuf,
    pub size: f32,
    pub opacity: f32,
}

/// Everything the renderer needs besides per-frame transforms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDescription {
    pub background: u32,
    pub container: ContainerLook,
    pub lights: Vec<Light>,
    pub camera: Camera,
    pub viewport: Viewport,
    pub model: ModelLook,
    pub particles: ParticleLook,
}

impl SceneDescription {
    /// Deep-blue water, a faint glass box, dim ambient light and a bright
    /// point light at the center.
    pub fn new(container: &Container, viewport: Viewport, model: ModelLook, particles: ParticleLook) -> Self {
        Self {
            background: 0x000033,
            container: ContainerLook {
                width: container.width,
                height: container.height,
                depth: container.depth,
                color: 0xffffff,
                opacity: 0.05,
            },
            lights: vec![
                Light { color: 0xffffff, intensity: 0.04, position: None },
                Light { color: 0xffffff, intensity: 50.0, position: Some(Vec3::ZERO.to_array()) },
            ],
            camera: Camera::new(&viewport),
            viewport,
            model,
            particles,
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.on_resize(&viewport);
    }
}
