use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::error::RenderError;

pub const DEFAULT_PUBLIC_PREFIX: &str = "/static";

/// The three things this crate knows how to draw. Each maps to exactly one
/// artifact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    HouseBlueprint,
    CryptoPlan,
    RobotModel,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::HouseBlueprint,
        ArtifactKind::CryptoPlan,
        ArtifactKind::RobotModel,
    ];

    pub fn stem(self) -> &'static str {
        match self {
            ArtifactKind::HouseBlueprint => "house_blueprint",
            ArtifactKind::CryptoPlan => "crypto_plan",
            ArtifactKind::RobotModel => "robot_model",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.png", self.stem())
    }

    fn slot(self) -> usize {
        match self {
            ArtifactKind::HouseBlueprint => 0,
            ArtifactKind::CryptoPlan => 1,
            ArtifactKind::RobotModel => 2,
        }
    }
}

/// A persisted render result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Where the sink put the bytes.
    pub path: PathBuf,
    /// How clients should refer to it, e.g. `/static/robot_model.png`.
    pub public_path: String,
    pub bytes: usize,
}

/// Capability to store a finished artifact under its fixed name.
///
/// Storing the same kind twice replaces the earlier bytes.
pub trait OutputSink {
    fn persist(&self, kind: ArtifactKind, png: &[u8]) -> Result<Artifact, RenderError>;
}

fn public_path(prefix: &str, kind: ArtifactKind) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), kind.file_name())
}

/// Writes artifacts into a flat directory.
///
/// Every write goes to a uniquely named temporary sibling that is renamed over
/// the target, so a reader sees either the previous file or the new one, never
/// a torn mix. This holds across processes sharing the directory. Writers of
/// the same kind within one sink are also serialized.
pub struct FsSink {
    dir: PathBuf,
    public_prefix: String,
    locks: [Mutex<()>; 3],
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_public_prefix(dir, DEFAULT_PUBLIC_PREFIX)
    }

    pub fn with_public_prefix(dir: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.to_string(),
            locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

impl OutputSink for FsSink {
    fn persist(&self, kind: ArtifactKind, png: &[u8]) -> Result<Artifact, RenderError> {
        let _guard = self.locks[kind.slot()].lock();

        fs::create_dir_all(&self.dir).map_err(|e| {
            RenderError::failure(
                &format!("Failed to create output directory {}", self.dir.display()),
                e,
            )
        })?;

        let target = self.path_for(kind);

        let prefix = format!(".{}.", kind.stem());
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o644));
        }

        // Dropping the staging file on any error path removes it.
        let mut staging = builder
            .tempfile_in(&self.dir)
            .map_err(|e| {
                RenderError::failure(
                    &format!("Failed to create staging file in {}", self.dir.display()),
                    e,
                )
            })?;
        if let Err(e) = staging.write_all(png) {
            return Err(RenderError::failure(
                &format!("Failed to write {}", staging.path().display()),
                e,
            ));
        }
        staging.persist(&target).map_err(|e| {
            RenderError::failure(&format!("Failed to replace {}", target.display()), e)
        })?;

        info!(artifact = kind.stem(), path = %target.display(), bytes = png.len(), "artifact written");

        Ok(Artifact {
            kind,
            path: target,
            public_path: public_path(&self.public_prefix, kind),
            bytes: png.len(),
        })
    }
}

/// Keeps artifacts in memory; useful for embedding and tests.
#[derive(Default)]
pub struct MemorySink {
    artifacts: Mutex<HashMap<ArtifactKind, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<Vec<u8>> {
        self.artifacts.lock().get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.artifacts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.lock().is_empty()
    }
}

impl OutputSink for MemorySink {
    fn persist(&self, kind: ArtifactKind, png: &[u8]) -> Result<Artifact, RenderError> {
        self.artifacts.lock().insert(kind, png.to_vec());

        Ok(Artifact {
            kind,
            path: PathBuf::from(kind.file_name()),
            public_path: public_path(DEFAULT_PUBLIC_PREFIX, kind),
            bytes: png.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_are_fixed_per_kind() {
        let names: Vec<String> = ArtifactKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            ["house_blueprint.png", "crypto_plan.png", "robot_model.png"]
        );
    }

    #[test]
    fn public_path_ignores_trailing_slash() {
        assert_eq!(
            public_path("/static/", ArtifactKind::RobotModel),
            "/static/robot_model.png"
        );
    }

    #[test]
    fn fs_sink_creates_directory_and_overwrites() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sink = FsSink::new(tmp.path().join("static"));

        let first = sink
            .persist(ArtifactKind::CryptoPlan, b"first")
            .expect("first write");
        assert_eq!(first.public_path, "/static/crypto_plan.png");
        assert_eq!(fs::read(&first.path).expect("read"), b"first");

        let second = sink
            .persist(ArtifactKind::CryptoPlan, b"second!")
            .expect("second write");
        assert_eq!(first.path, second.path);
        assert_eq!(second.bytes, 7);
        assert_eq!(fs::read(&second.path).expect("read"), b"second!");

        let entries: Vec<_> = fs::read_dir(sink.dir())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("crypto_plan.png")]);
    }

    #[test]
    fn independent_sinks_on_one_directory_never_fail_or_tear() {
        use std::sync::Barrier;
        use std::thread;

        let tmp = tempfile::tempdir().expect("tempdir");
        let large = vec![0xAB; 1 << 20];
        let small = vec![0xCD; 1 << 16];
        let barrier = Barrier::new(2);

        thread::scope(|scope| {
            for payload in [&large, &small] {
                let barrier = &barrier;
                let dir = tmp.path();
                scope.spawn(move || {
                    let sink = FsSink::new(dir);
                    for _ in 0..20 {
                        barrier.wait();
                        sink.persist(ArtifactKind::CryptoPlan, payload)
                            .expect("concurrent write");
                    }
                });
            }
        });

        let on_disk = fs::read(tmp.path().join("crypto_plan.png")).expect("read");
        assert!(on_disk == large || on_disk == small);
        let leftovers = fs::read_dir(tmp.path()).expect("read_dir").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn memory_sink_keeps_latest_bytes() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.persist(ArtifactKind::RobotModel, b"a").expect("a");
        sink.persist(ArtifactKind::RobotModel, b"b").expect("b");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(ArtifactKind::RobotModel).as_deref(), Some(&b"b"[..]));
        assert_eq!(sink.get(ArtifactKind::HouseBlueprint), None);
    }
}
