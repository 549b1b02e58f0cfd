use fishtank_core::{Container, FailurePolicy};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// --- Enums for Choices ---
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializerType {
    #[default]
    Json,
    Binary,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    #[default]
    Stdio,
    File,
    Null,
}

// --- Configuration Sections ---

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ContainerSettings {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        let container = Container::default();
        Self {
            width: container.width,
            height: container.height,
            depth: container.depth,
        }
    }
}

impl ContainerSettings {
    pub fn to_container(&self) -> Container {
        Container::new(self.width, self.height, self.depth)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ActorSettings {
    #[serde(default = "default_actor_count")]
    pub count: u32,
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_model_scale")]
    pub scale: f32,
    #[serde(default = "default_swim_speed")]
    pub swim_speed: f32,
    #[serde(default = "default_rotation_smoothing")]
    pub rotation_smoothing: f32,
    #[serde(default = "default_clipping_margin")]
    pub clipping_margin: f32,
    #[serde(default)]
    pub on_load_failure: FailurePolicy,
}

// Scene defaults
fn default_actor_count() -> u32 { 22 }
fn default_model_path() -> PathBuf { PathBuf::from("./fish.gltf") }
fn default_model_scale() -> f32 { 0.005 }
fn default_swim_speed() -> f32 { 0.02 }
fn default_rotation_smoothing() -> f32 { 0.1 }
fn default_clipping_margin() -> f32 { 1.1 }

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            count: default_actor_count(),
            model_path: default_model_path(),
            scale: default_model_scale(),
            swim_speed: default_swim_speed(),
            rotation_smoothing: default_rotation_smoothing(),
            clipping_margin: default_clipping_margin(),
            on_load_failure: FailurePolicy::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParticleSettings {
    #[serde(default = "default_particle_count")]
    pub count: u32,
    /// Scale of the random increment added to vertical velocity each frame
    #[serde(default = "default_particle_speed")]
    pub speed: f32,
    /// Scale applied to vertical velocity when moving the particle
    #[serde(default = "default_particle_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_particle_damping")]
    pub damping: f32,
    #[serde(default = "default_sprite_path")]
    pub sprite_path: PathBuf,
    #[serde(default = "default_sprite_size")]
    pub size: f32,
    #[serde(default = "default_sprite_opacity")]
    pub opacity: f32,
}

fn default_particle_count() -> u32 { 75 }
fn default_particle_speed() -> f32 { 0.01 }
fn default_particle_amplitude() -> f32 { 0.5 }
fn default_particle_damping() -> f32 { 0.98 }
fn default_sprite_path() -> PathBuf { PathBuf::from("./particle.png") }
fn default_sprite_size() -> f32 { 0.1 }
fn default_sprite_opacity() -> f32 { 0.7 }

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: default_particle_count(),
            speed: default_particle_speed(),
            amplitude: default_particle_amplitude(),
            damping: default_particle_damping(),
            sprite_path: default_sprite_path(),
            size: default_sprite_size(),
            opacity: default_sprite_opacity(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self { width: 1280, height: 720, pixel_ratio: 1.0 }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SerializerConfig {
    #[serde(rename = "type", default)]
    pub serializer_type: SerializerType,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SenderConfig {
    #[serde(rename = "type", default)]
    pub sender_type: SenderType,
    pub options: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TransportConfig {
    #[serde(default)]
    pub serializer: SerializerConfig,
    #[serde(default)]
    pub sender: SenderConfig,
    /// Emit a frame snapshot every N frames
    #[serde(default = "default_output_every")]
    pub output_every: u32,
}

fn default_output_every() -> u32 { 1 }

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerConfig::default(),
            sender: SenderConfig::default(),
            output_every: default_output_every(),
        }
    }
}

// --- Top-Level Config Struct ---

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// Seed for every random draw; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub container: ContainerSettings,
    #[serde(default)]
    pub actors: ActorSettings,
    #[serde(default)]
    pub particles: ParticleSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_framerate() -> u32 { 60 }

impl Default for Config {
    fn default() -> Self {
        Self {
            framerate: default_framerate(),
            seed: None,
            container: ContainerSettings::default(),
            actors: ActorSettings::default(),
            particles: ParticleSettings::default(),
            viewport: ViewportSettings::default(),
            transport: TransportConfig::default(),
        }
    }
}

// --- File Sender Options ---
#[derive(Deserialize, Debug, Clone)]
pub struct FileOptions {
    pub path: PathBuf,
}

impl SenderConfig {
    /// File sender options, if present and well-formed
    pub fn get_file_options(&self) -> Option<FileOptions> {
        self.options
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.framerate == 0 {
            return invalid("Framerate cannot be zero.");
        }

        let container = self.container.to_container();
        if ![container.width, container.height, container.depth]
            .iter()
            .all(|extent| extent.is_finite() && *extent > 0.0)
        {
            return invalid("Container width, height and depth must be positive and finite.");
        }

        let actors = &self.actors;
        if !(actors.swim_speed.is_finite() && actors.swim_speed > 0.0) {
            return invalid("Swim speed must be positive and finite.");
        }
        if !(actors.rotation_smoothing > 0.0 && actors.rotation_smoothing <= 1.0) {
            return invalid("Rotation smoothing must be in (0, 1].");
        }
        // A margin of half the smallest extent collapses the swimmable region to a plane
        if !(0.0..container.smallest_extent() / 2.0).contains(&actors.clipping_margin) {
            return invalid("Clipping margin must be >= 0 and less than half the smallest container extent.");
        }
        if !(actors.scale.is_finite() && actors.scale > 0.0) {
            return invalid("Model scale must be positive and finite.");
        }

        let particles = &self.particles;
        if !(particles.speed.is_finite() && particles.speed >= 0.0) {
            return invalid("Particle speed must be finite and non-negative.");
        }
        if !(particles.amplitude.is_finite() && particles.amplitude >= 0.0) {
            return invalid("Particle amplitude must be finite and non-negative.");
        }
        if !(particles.damping > 0.0 && particles.damping < 1.0) {
            return invalid("Particle damping must be in (0, 1).");
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return invalid("Viewport dimensions cannot be zero.");
        }

        if self.transport.output_every == 0 {
            return invalid("Output frequency must be greater than 0.");
        }
        if self.transport.sender.sender_type == SenderType::File
            && self.transport.sender.get_file_options().is_none()
        {
            return invalid("File sender requires an options.path entry.");
        }

        Ok(())
    }
}

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Validation(message.to_string()))
}

// --- Loading Function ---

/// Loads and validates a config file. `.toml` files are parsed as TOML,
/// everything else as JSON.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));

    let config: Config = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn write_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn empty_object_uses_scene_defaults() {
        let file = write_json("{}");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.framerate, 60);
        assert_eq!(config.container.width, 28.0);
        assert_eq!(config.actors.count, 22);
        assert_eq!(config.actors.swim_speed, 0.02);
        assert_eq!(config.actors.on_load_failure, FailurePolicy::Exclude);
        assert_eq!(config.particles.count, 75);
        assert_eq!(config.particles.damping, 0.98);
        assert_eq!(config.transport.serializer.serializer_type, SerializerType::Json);
        assert_eq!(config.transport.sender.sender_type, SenderType::Stdio);
    }

    #[test]
    fn load_valid_json_config() {
        let file = write_json(
            r#"{
              "framerate": 30,
              "seed": 7,
              "container": { "width": 10.0, "height": 8.0, "depth": 6.0 },
              "actors": { "count": 4, "clipping_margin": 0.5, "on_load_failure": "block" },
              "particles": { "count": 10, "damping": 0.9 },
              "transport": {
                "serializer": { "type": "binary" },
                "sender": { "type": "file", "options": { "path": "frames.log" } },
                "output_every": 5
              }
            }"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.framerate, 30);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.container.to_container(), Container::new(10.0, 8.0, 6.0));
        assert_eq!(config.actors.count, 4);
        assert_eq!(config.actors.on_load_failure, FailurePolicy::Block);
        assert_eq!(config.actors.rotation_smoothing, 0.1);
        assert_eq!(config.transport.serializer.serializer_type, SerializerType::Binary);
        assert_eq!(
            config.transport.sender.get_file_options().unwrap().path,
            PathBuf::from("frames.log")
        );
        assert_eq!(config.transport.output_every, 5);
    }

    #[test]
    fn load_valid_toml_config() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
framerate = 24

[container]
width = 20.0
height = 10.0
depth = 10.0

[actors]
count = 3
swim_speed = 0.05

[transport.sender]
type = "null"
"#
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.framerate, 24);
        assert_eq!(config.container.width, 20.0);
        assert_eq!(config.actors.count, 3);
        assert_eq!(config.actors.swim_speed, 0.05);
        assert_eq!(config.transport.sender.sender_type, SenderType::Null);
    }

    #[test]
    fn load_invalid_framerate() {
        let file = write_json(r#"{ "framerate": 0 }"#);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn clipping_margin_must_leave_room_to_swim() {
        // Smallest extent is 15, so 7.5 collapses the region
        let file = write_json(r#"{ "actors": { "clipping_margin": 7.5 } }"#);
        assert!(matches!(load_config(file.path()), Err(ConfigError::Validation(_))));

        let file = write_json(r#"{ "actors": { "clipping_margin": -0.1 } }"#);
        assert!(matches!(load_config(file.path()), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rotation_smoothing_range() {
        let mut config = Config::default();
        config.actors.rotation_smoothing = 1.0;
        assert!(config.validate().is_ok());
        config.actors.rotation_smoothing = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let cases = [
            "[container]\nwidth = nan\n",
            "[container]\ndepth = inf\n",
            "[actors]\nswim_speed = inf\n",
            "[actors]\nclipping_margin = nan\n",
            "[actors]\nscale = nan\n",
            "[particles]\nspeed = nan\n",
            "[particles]\namplitude = inf\n",
            "[particles]\ndamping = nan\n",
        ];
        for case in cases {
            let config: Config = toml::from_str(case).unwrap();
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "accepted {case:?}"
            );
        }
    }

    #[test]
    fn damping_must_be_fractional() {
        let mut config = Config::default();
        config.particles.damping = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn file_sender_requires_path() {
        let file = write_json(r#"{ "transport": { "sender": { "type": "file" } } }"#);
        assert!(matches!(load_config(file.path()), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_json("{ framerate: ");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_config(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
