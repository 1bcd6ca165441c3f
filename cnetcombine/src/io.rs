//! Reading and writing networks, network lists, serial lists and parameter
//! files. Every file is opened and closed within a single call.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use common::SerdeFormat;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::CombineConfig;
use crate::control::ControlNet;
use crate::error::{Error, Result};

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = SerdeFormat::from_path(path)?;
    let text = read_to_string(path)?;
    format.deserialize(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn save_document<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let format = SerdeFormat::from_path(path)?;
    let text = format.serialize(value).map_err(|source| Error::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a control network and check its point invariants.
pub fn load_network(path: &Path) -> Result<ControlNet> {
    let net: ControlNet = load_document(path)?;
    net.validate()?;
    tracing::info!(
        path = %path.display(),
        network_id = %net.network_id,
        points = net.num_points(),
        "Loaded control network"
    );
    Ok(net)
}

pub fn save_network(net: &ControlNet, path: &Path) -> Result<()> {
    save_document(net, path)
}

pub fn load_combine_config(path: &Path) -> Result<CombineConfig> {
    load_document(path)
}

/// Network paths listed in `path`, one per line.
///
/// Blank lines and `#` comments are skipped; relative entries resolve
/// against the list file's directory.
pub fn read_network_list(path: &Path) -> Result<Vec<PathBuf>> {
    let text = read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let paths: Vec<PathBuf> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let entry = Path::new(line);
            if entry.is_absolute() {
                entry.to_path_buf()
            } else {
                base_dir.join(entry)
            }
        })
        .collect();

    if paths.is_empty() {
        return Err(Error::EmptyNetworkList {
            path: path.to_path_buf(),
        });
    }
    Ok(paths)
}

/// One serial per line, newline terminated.
pub fn write_serial_list<'a>(
    serials: impl IntoIterator<Item = &'a str>,
    path: &Path,
) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for serial in serials {
        writeln!(writer, "{serial}").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}

/// Output files written beside their destinations and moved into place
/// together by [`StagedOutputs::commit`]. Anything not committed is removed
/// on drop.
#[derive(Debug, Default)]
pub struct StagedOutputs {
    staged: Vec<(PathBuf, PathBuf)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Staging path for `dest`. Keeps the file name as a suffix so the
    /// format extension still applies.
    pub fn stage(&mut self, dest: &Path) -> PathBuf {
        let name = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let staging = dest.with_file_name(format!(".staged-{name}"));
        self.staged.push((staging.clone(), dest.to_path_buf()));
        staging
    }

    pub fn commit(mut self) -> Result<()> {
        while !self.staged.is_empty() {
            let (staging, dest) = self.staged.remove(0);
            if let Err(source) = fs::rename(&staging, &dest) {
                let _ = fs::remove_file(&staging);
                return Err(Error::Io { path: dest, source });
            }
        }
        Ok(())
    }
}

impl Drop for StagedOutputs {
    fn drop(&mut self) {
        for (staging, _) in &self.staged {
            let _ = fs::remove_file(staging);
        }
    }
}
