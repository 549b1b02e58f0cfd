//! Hands scene state to an external renderer: what to draw once, and where
//! everything is on each frame.

pub mod scene;
pub mod snapshot;

pub use scene::{Camera, ContainerLook, Light, ModelLook, ParticleLook, SceneDescription, Viewport};
pub use snapshot::{ActorState, FrameSnapshot};

use fishtank_core::Tank;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

// --- Error Types ---

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Failed to open output {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// --- Messages ---

/// One line of output
#[derive(Serialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Message<'a> {
    Scene(&'a SceneDescription),
    Frame(&'a FrameSnapshot),
}

// --- Traits ---

/// Turns a message into a single line of text.
pub trait Serializer: Send + Sync {
    fn serialize(&self, message: &Message<'_>) -> Result<String, SerializationError>;
}

/// Sends serialized lines to a destination.
pub trait Sender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Makes sure everything sent so far has reached the destination.
    fn flush(&mut self) -> Result<(), TransportError>;
}

// --- Serializers ---

pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, message: &Message<'_>) -> Result<String, SerializationError> {
        Ok(serde_json::to_string(message)?)
    }
}

/// bincode, base64-encoded so that frames stay one per line.
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn serialize(&self, message: &Message<'_>) -> Result<String, SerializationError> {
        let bytes = bincode::serialize(message)?;
        Ok(base64::encode(bytes))
    }
}

// --- Senders ---

/// Writes each message as a line on standard output.
pub struct StdioSender {
    stdout: io::Stdout,
}

impl StdioSender {
    pub fn new() -> Self {
        StdioSender { stdout: io::stdout() }
    }
}

impl Default for StdioSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for StdioSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut handle = self.stdout.lock();
        handle.write_all(data)?;
        handle.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.stdout.flush()?;
        Ok(())
    }
}

/// Writes each message as a line in a file, truncating it on creation.
pub struct FileSender {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSender {
    pub fn new(path: &Path) -> Result<Self, TransportError> {
        let file = File::create(path).map_err(|source| TransportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Writing frames to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sender for FileSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Discards everything. Useful for headless benchmarking.
pub struct NullSender;

impl Sender for NullSender {
    fn send(&mut self, _data: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

// --- Controller ---

/// Pairs a serializer with a sender and decides which frames go out.
pub struct TransportController {
    serializer: Box<dyn Serializer>,
    sender: Box<dyn Sender>,
    output_every: u32,
    sent_frames: u64,
}

impl TransportController {
    pub fn new(serializer: Box<dyn Serializer>, sender: Box<dyn Sender>, output_every: u32) -> Self {
        Self {
            serializer,
            sender,
            output_every: output_every.max(1),
            sent_frames: 0,
        }
    }

    pub fn send_scene(&mut self, scene: &SceneDescription) -> Result<(), TransportError> {
        let line = self.serializer.serialize(&Message::Scene(scene))?;
        self.sender.send(line.as_bytes())?;
        self.sender.flush()
    }

    /// Sends a snapshot of `tank` if its frame is due. Returns whether one was sent.
    pub fn publish(&mut self, tank: &Tank) -> Result<bool, TransportError> {
        if tank.frame() % u64::from(self.output_every) != 0 {
            return Ok(false);
        }
        let snapshot = FrameSnapshot::capture(tank);
        let line = self.serializer.serialize(&Message::Frame(&snapshot))?;
        self.sender.send(line.as_bytes())?;
        self.sent_frames += 1;
        Ok(true)
    }

    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.sender.flush()
    }

    pub fn sent_frames(&self) -> u64 {
        self.sent_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use fishtank_core::{Actor, Container, Entity, FailurePolicy, Particle, Vec3};
    use std::fs;
    use std::sync::{Arc, Mutex};

    /// Sender that keeps lines in memory for inspection
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<String>>>);

    impl Sender for Capture {
        fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
            self.0.lock().unwrap().push(String::from_utf8(data.to_vec()).unwrap());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn tank() -> Tank {
        let mut fish = Actor::new(Entity::new(0), Vec3::new(1.0, 2.0, 3.0));
        fish.orientation = Vec3::new(0.0, 0.5, 1.5);
        Tank::new(
            Container::default(),
            vec![fish, Actor::new(Entity::new(1), Vec3::ZERO)],
            vec![Particle::at_rest(Vec3::new(-1.0, 0.25, 4.0))],
            FailurePolicy::Exclude,
        )
    }

    #[test]
    fn snapshot_captures_states_and_transforms() {
        let mut tank = tank();
        tank.record_load(Entity::new(0), true);

        let snapshot = FrameSnapshot::capture(&tank);

        assert_eq!(snapshot.frame, 0);
        assert!(!snapshot.ready);
        assert_eq!(snapshot.actors[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(snapshot.actors[0].orientation, [0.0, 0.5, 1.5]);
        assert_eq!(snapshot.actors[0].state, fishtank_core::LoadState::Ready);
        assert_eq!(snapshot.actors[1].state, fishtank_core::LoadState::Pending);
        assert_eq!(snapshot.particles, vec![[-1.0, 0.25, 4.0]]);
    }

    #[test]
    fn json_frame_line_is_tagged() {
        let tank = tank();
        let snapshot = FrameSnapshot::capture(&tank);
        let line = JsonSerializer.serialize(&Message::Frame(&snapshot)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["frame"]["frame"], 0);
        assert_eq!(value["frame"]["actors"][0]["state"], "pending");
        assert_eq!(value["frame"]["particles"][0][1], 0.25);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn binary_frame_is_single_line_base64() {
        let tank = tank();
        let snapshot = FrameSnapshot::capture(&tank);
        let line = BinarySerializer.serialize(&Message::Frame(&snapshot)).unwrap();

        let bytes = base64::decode(&line).unwrap();
        assert!(!bytes.is_empty());
        assert!(!line.contains('\n'));
    }

    #[test]
    fn controller_respects_output_every() {
        let capture = Capture::default();
        let mut controller =
            TransportController::new(Box::new(JsonSerializer), Box::new(capture.clone()), 3);
        let mut tank = tank();

        for _ in 0..7 {
            controller.publish(&tank).unwrap();
            tank.advance_frame();
        }

        // Frames 0, 3 and 6
        assert_eq!(controller.sent_frames(), 3);
        assert_eq!(capture.0.lock().unwrap().len(), 3);
    }

    #[test]
    fn file_sender_writes_scene_then_frames() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("frames.jsonl");
        let sender = FileSender::new(&path).unwrap();
        let mut controller = TransportController::new(Box::new(JsonSerializer), Box::new(sender), 1);
        let tank = tank();
        let scene = SceneDescription::new(
            &tank.container,
            Viewport { width: 640, height: 480, pixel_ratio: 2.0 },
            ModelLook { path: PathBuf::from("fish.gltf"), scale: 0.005 },
            ParticleLook { sprite: PathBuf::from("particle.png"), size: 0.1, opacity: 0.7 },
        );

        controller.send_scene(&scene).unwrap();
        controller.publish(&tank).unwrap();
        controller.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(r#"{"scene":"#));
        assert!(lines[1].starts_with(r#"{"frame":"#));
        temp.close().unwrap();
    }

    #[test]
    fn file_sender_reports_unwritable_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("frames.jsonl");
        assert!(matches!(FileSender::new(&path), Err(TransportError::Open { .. })));
    }
}
