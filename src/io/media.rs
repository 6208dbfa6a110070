// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image sequence discovery and background frame loading.
//!
//! Decoding happens on a worker thread. The worker never touches the state
//! container: results travel back over a channel and the UI thread decides
//! what to do with them.

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;

/// A decoded RGBA image.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// A decoded frame of the sequence.
pub struct LoadedFrame {
    pub frame: i32,
    pub path: PathBuf,
    pub image: LoadedImage,
}

/// Decode an image file to RGBA8.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgba8();
    Ok(LoadedImage {
        width: img.width(),
        height: img.height(),
        pixels: img.into_raw(),
    })
}

/// List the files in `dir` whose extension is in `extensions`, in natural
/// order (`plate.2.png` before `plate.10.png`).
pub fn discover_image_sequence(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    log::info!("Found {} image(s) in {}", files.len(), dir.display());
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare strings treating runs of ASCII digits as numbers.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let na = take_number(&mut a_chars);
                let nb = take_number(&mut b_chars);
                let ordering = na
                    .trim_start_matches('0')
                    .len()
                    .cmp(&nb.trim_start_matches('0').len())
                    .then_with(|| na.trim_start_matches('0').cmp(nb.trim_start_matches('0')))
                    .then_with(|| na.len().cmp(&nb.len()));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(ca), Some(cb)) => {
                if ca != cb {
                    return ca.cmp(&cb);
                }
                a_chars.next();
                b_chars.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

/// Decodes frames on a background thread.
///
/// Requests that pile up while the worker is busy are collapsed to the most
/// recent one, so scrubbing the timeline never builds a backlog.
pub struct ImageLoader {
    requests: Option<Sender<(i32, PathBuf)>>,
    results: Receiver<(i32, Result<LoadedFrame>)>,
    worker: Option<JoinHandle<()>>,
}

impl ImageLoader {
    /// Start the worker. `on_ready` runs on the worker after each result is
    /// sent (e.g. to wake the UI).
    pub fn spawn(on_ready: impl Fn() + Send + 'static) -> Self {
        let (request_tx, request_rx) = channel::<(i32, PathBuf)>();
        let (result_tx, result_rx) = channel();

        let worker = std::thread::spawn(move || {
            while let Ok(mut request) = request_rx.recv() {
                // Skip to the newest request
                while let Ok(newer) = request_rx.try_recv() {
                    request = newer;
                }
                let (frame, path) = request;
                let result = load_image(&path).map(|image| LoadedFrame {
                    frame,
                    path: path.clone(),
                    image,
                });
                if result_tx.send((frame, result)).is_err() {
                    break;
                }
                on_ready();
            }
            log::debug!("Image loader worker exiting");
        });

        Self {
            requests: Some(request_tx),
            results: result_rx,
            worker: Some(worker),
        }
    }

    /// Queue a frame for decoding.
    pub fn request(&self, frame: i32, path: PathBuf) {
        if let Some(requests) = &self.requests {
            if requests.send((frame, path)).is_err() {
                log::error!("Image loader worker is gone");
            }
        }
    }

    /// Most recent finished result, if any. Older finished results are
    /// dropped.
    pub fn poll(&self) -> Option<(i32, Result<LoadedFrame>)> {
        self.results.try_iter().last()
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Image loader worker panicked");
            }
        }
    }
}
