#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lantern::server::router::{Router, RouterBuilder};
use lantern::server::static_files::StaticFiles;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory removed on drop.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "lantern-{}-{}-{}",
            label,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Web root with an index page, a stylesheet and a text file.
pub fn site() -> TempDir {
    let dir = TempDir::new("site");
    dir.write("index.html", "<h1>home</h1>");
    dir.write("css/site.css", "body { color: red; }");
    dir.write("notes.txt", "plain notes");
    dir
}

pub fn router(root: &TempDir, build: impl FnOnce(RouterBuilder) -> RouterBuilder) -> Arc<Router> {
    let files = StaticFiles::new(root.path()).unwrap();
    Arc::new(build(Router::builder()).build(files))
}

/// Splits raw wire bytes into (head, body) at the first blank line.
pub fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let pos = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head terminator");
    (
        String::from_utf8(raw[..pos].to_vec()).unwrap(),
        raw[pos + 4..].to_vec(),
    )
}
