//! Shared filesystem helpers built on `cap-std` and `camino`.
#![forbid(unsafe_code)]

mod staged;

pub use staged::StagedInput;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::MAIN_SEPARATOR_STR;

/// Open `path` for reading with ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create or truncate `path`, whose parent directory must already exist.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Open the directory holding `path` and return it with the final component.
///
/// A bare file name resolves against the current directory.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} has no file name")))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name.to_owned()))
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    let (root, relative) = split_root(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    root.create_dir_all(relative)
}

/// Return whether `path` is an existing regular file.
///
/// A missing file or parent directory yields `Ok(false)`; other IO failures
/// are returned.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let probe = open_dir_and_file(path)
        .and_then(|(dir, name)| dir.metadata(name.as_str()))
        .map(|meta| meta.is_file());
    missing_as_false(probe)
}

/// Return whether `path` is an existing directory.
///
/// Paths without a final component, such as `.` or `/`, are opened directly.
pub fn dir_is_dir(path: &Utf8Path) -> io::Result<bool> {
    let probe = match path.file_name() {
        Some(_) => open_dir_and_file(path)
            .and_then(|(dir, name)| dir.metadata(name.as_str()))
            .map(|meta| meta.is_dir()),
        None => fs_utf8::Dir::open_ambient_dir(path, ambient_authority()).map(|_| true),
    };
    missing_as_false(probe)
}

fn missing_as_false(probe: io::Result<bool>) -> io::Result<bool> {
    match probe {
        Err(err) if matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(false)
        }
        other => other,
    }
}

/// Split `path` into an opened root directory and the remainder below it.
///
/// cap-std only resolves relative paths, so absolute paths are opened at their
/// root (and drive or UNC prefix on Windows). Relative paths hang off `.`.
fn split_root(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &Utf8Path)> {
    let mut components = path.components();
    let root = match components.next() {
        Some(Utf8Component::Prefix(prefix)) => {
            let mut root = Utf8PathBuf::from(prefix.as_str());
            if components.clone().next() == Some(Utf8Component::RootDir) {
                components.next();
                root.push(MAIN_SEPARATOR_STR);
            }
            root
        }
        Some(Utf8Component::RootDir) => Utf8PathBuf::from(MAIN_SEPARATOR_STR),
        _ => {
            let cwd = fs_utf8::Dir::open_ambient_dir(".", ambient_authority())?;
            return Ok((cwd, path));
        }
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
    Ok((dir, components.as_path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::{Read, Write};
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 tempdir");
        (tmp, root)
    }

    #[rstest]
    fn creates_nested_output(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let target = root.join("out/nested/result.json");
        ensure_parent_dir(&target).expect("create parents");
        let mut file = create_utf8_file(&target).expect("create file");
        file.write_all(b"{}").expect("write");

        let mut contents = String::new();
        open_utf8_file(&target)
            .expect("reopen")
            .read_to_string(&mut contents)
            .expect("read");
        assert_eq!(contents, "{}");
        assert!(file_is_file(&target).expect("probe file"));
        assert!(dir_is_dir(&root.join("out/nested")).expect("probe dir"));
    }

    #[rstest]
    fn probes_report_missing_paths_as_false(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        assert!(!file_is_file(&root.join("absent.py")).expect("probe file"));
        assert!(!file_is_file(&root.join("absent/script.py")).expect("probe nested"));
        assert!(!dir_is_dir(&root.join("absent")).expect("probe dir"));
    }

    #[rstest]
    fn probes_distinguish_files_from_directories(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let script = root.join("solver.py");
        create_utf8_file(&script).expect("create script");
        assert!(!dir_is_dir(&script).expect("file is not a dir"));
        assert!(!file_is_file(&root).expect("dir is not a file"));
        assert!(dir_is_dir(Utf8Path::new(".")).expect("cwd is a dir"));
    }

    #[rstest]
    fn split_root_keeps_relative_paths_under_cwd() {
        let (_, rest) = split_root(Utf8Path::new("reports/today")).expect("open cwd");
        assert_eq!(rest, "reports/today");
    }

    #[cfg(unix)]
    #[rstest]
    fn split_root_strips_the_unix_root() {
        let (_, rest) = split_root(Utf8Path::new("/tmp/aquaroute")).expect("open root");
        assert_eq!(rest, "tmp/aquaroute");
    }
}
