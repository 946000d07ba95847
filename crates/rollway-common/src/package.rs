// package.rs — downloadable addon manifests
//
// The addon index is a line-oriented text file. `package <id>` opens a
// record and the keyed lines that follow fill it in; an unknown key is
// skipped so newer servers can add fields. A second, simpler file tracks
// which addon archives are installed locally so we don't have to rescan
// the download directory on every boot.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::common::strip_newline;

pub const PACKAGE_DIR: &str = "DLC";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("package io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageCategory {
    LevelSet,
    Campaign,
    Profile,
    Course,
}

impl PackageCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageCategory::LevelSet => "levelset",
            PackageCategory::Campaign => "campaign",
            PackageCategory::Profile => "profile",
            PackageCategory::Course => "course",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "levelset" => Some(PackageCategory::LevelSet),
            "campaign" => Some(PackageCategory::Campaign),
            "profile" => Some(PackageCategory::Profile),
            "course" => Some(PackageCategory::Course),
            _ => None,
        }
    }

    /// URL path segment under the addons root.
    pub fn url_segment(self) -> &'static str {
        match self {
            PackageCategory::LevelSet => "levelsets",
            PackageCategory::Campaign => "campaign",
            PackageCategory::Profile => "ball",
            PackageCategory::Course => "course",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    Available,
    Downloading,
    Installed,
    /// Screenshot present but the archive is not.
    Partial,
    /// Archive on disk doesn't match the advertised size.
    Corrupt,
}

#[derive(Debug, Clone)]
pub struct Package {
    pub id: String,
    /// Id prefix up to the first '-' ("set", "map", "ball", ...).
    pub kind: String,
    pub category: Option<PackageCategory>,
    pub filename: String,
    pub size: u32,
    pub files: String,
    pub name: String,
    pub desc: String,
    pub shot: String,
    pub status: PackageStatus,
}

impl Package {
    fn new(id: &str) -> Self {
        let kind = id.split('-').next().unwrap_or("").to_string();
        Self {
            id: id.to_string(),
            kind,
            category: None,
            filename: String::new(),
            size: 0,
            files: String::new(),
            name: String::new(),
            desc: String::new(),
            shot: String::new(),
            status: PackageStatus::Available,
        }
    }
}

// ============================================================
// Manifest parsing
// ============================================================

/// Parse an `available-addons.txt` manifest.
pub fn parse_manifest(text: &str) -> Vec<Package> {
    let mut packages: Vec<Package> = Vec::new();

    for raw in text.lines() {
        let line = strip_newline(raw);

        if let Some(id) = line.strip_prefix("package ") {
            packages.push(Package::new(id));
            continue;
        }

        let Some(pkg) = packages.last_mut() else {
            continue;
        };

        if let Some(v) = line.strip_prefix("category ") {
            pkg.category = PackageCategory::from_str(v);
        } else if let Some(v) = line.strip_prefix("filename ") {
            pkg.filename = v.to_string();
        } else if let Some(v) = line.strip_prefix("size ") {
            pkg.size = v.trim().parse().unwrap_or(0);
        } else if let Some(v) = line.strip_prefix("files ") {
            pkg.files = v.to_string();
        } else if let Some(v) = line.strip_prefix("name ") {
            pkg.name = v.to_string();
        } else if let Some(v) = line.strip_prefix("desc ") {
            // Literal "\n" markers become real line breaks (CRLF, the
            // manifests are authored on Windows).
            pkg.desc = v.replace("\\n", "\r\n");
        } else if let Some(v) = line.strip_prefix("shot ") {
            pkg.shot = v.to_string();
        }
    }

    packages
}

pub fn load_manifest(path: &Path) -> Result<Vec<Package>, PackageError> {
    Ok(parse_manifest(&fs::read_to_string(path)?))
}

/// Find the package whose `files` list mentions `file`.
pub fn find_by_file<'a>(packages: &'a [Package], file: &str) -> Option<&'a Package> {
    packages
        .iter()
        .find(|p| p.files.split_whitespace().any(|f| f == file))
}

// ============================================================
// URL / path assembly
// ============================================================

pub fn package_url(base: &str, category: Option<PackageCategory>, filename: &str) -> Option<String> {
    if filename.is_empty() {
        return None;
    }
    let base = base.trim_end_matches('/');
    Some(match category {
        Some(cat) => format!("{}/{}/{}", base, cat.url_segment(), filename),
        None => format!("{}/{}", base, filename),
    })
}

pub fn package_path(filename: &str) -> Option<String> {
    if filename.is_empty() {
        return None;
    }
    Some(format!("{}/{}", PACKAGE_DIR, filename))
}

// ============================================================
// Installed-addon ledger
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPackage {
    pub id: String,
    pub filename: String,
}

/// Parse `installed-addons.txt`: alternating package/filename lines. A
/// filename with no preceding package line derives its id from the
/// filename stem, which covers ledgers written by very old builds.
pub fn parse_installed(text: &str) -> Vec<LocalPackage> {
    let mut out: Vec<LocalPackage> = Vec::new();
    let mut pending_id: Option<String> = None;

    for raw in text.lines() {
        let line = strip_newline(raw);

        if let Some(id) = line.strip_prefix("package ") {
            pending_id = Some(id.to_string());
        } else if let Some(filename) = line.strip_prefix("filename ") {
            let id = pending_id.take().unwrap_or_else(|| {
                crate::common::base_name_sans(filename, ".zip").to_string()
            });
            out.push(LocalPackage {
                id,
                filename: filename.to_string(),
            });
        }
    }

    out
}

pub fn write_installed(packages: &[LocalPackage]) -> String {
    let mut out = String::new();
    for p in packages {
        out.push_str(&format!("package {}\nfilename {}\n", p.id, p.filename));
    }
    out
}

/// Resolve each package's status against the download directory.
pub fn resolve_statuses(packages: &mut [Package], download_dir: &Path) {
    for pkg in packages.iter_mut() {
        if pkg.filename.is_empty() {
            continue;
        }

        let archive = download_dir.join(&pkg.filename);
        match fs::metadata(&archive) {
            Ok(meta) if pkg.size == 0 || meta.len() == u64::from(pkg.size) => {
                pkg.status = PackageStatus::Installed;
            }
            Ok(_) => pkg.status = PackageStatus::Corrupt,
            Err(_) => {
                let shot_present =
                    !pkg.shot.is_empty() && download_dir.join(&pkg.shot).exists();
                pkg.status = if shot_present {
                    PackageStatus::Partial
                } else {
                    PackageStatus::Available
                };
            }
        }
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
package set-easy\n\
category levelset\n\
filename set-easy.zip\n\
size 1024\n\
files set-easy.txt\n\
name Easy Levels\n\
desc First line.\\nSecond line.\n\
shot shot-easy.png\n\
package ball-orb\n\
category profile\n\
filename ball-orb.zip\n\
weird-key something\n";

    #[test]
    fn manifest_parses_records_in_order() {
        let pkgs = parse_manifest(MANIFEST);
        assert_eq!(pkgs.len(), 2);

        assert_eq!(pkgs[0].id, "set-easy");
        assert_eq!(pkgs[0].kind, "set");
        assert_eq!(pkgs[0].category, Some(PackageCategory::LevelSet));
        assert_eq!(pkgs[0].size, 1024);
        assert_eq!(pkgs[0].name, "Easy Levels");

        assert_eq!(pkgs[1].kind, "ball");
        assert_eq!(pkgs[1].category, Some(PackageCategory::Profile));
    }

    #[test]
    fn desc_newline_markers_become_crlf() {
        let pkgs = parse_manifest(MANIFEST);
        assert_eq!(pkgs[0].desc, "First line.\r\nSecond line.");
    }

    #[test]
    fn keys_before_any_package_are_ignored() {
        let pkgs = parse_manifest("filename stray.zip\npackage a-b\n");
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].filename, "");
    }

    #[test]
    fn find_by_file_matches_whole_names() {
        let pkgs = parse_manifest(MANIFEST);
        assert_eq!(find_by_file(&pkgs, "set-easy.txt").unwrap().id, "set-easy");
        assert!(find_by_file(&pkgs, "set-easy").is_none());
    }

    #[test]
    fn url_assembly() {
        assert_eq!(
            package_url("https://example.net/addons/", Some(PackageCategory::LevelSet), "a.zip")
                .unwrap(),
            "https://example.net/addons/levelsets/a.zip"
        );
        assert_eq!(
            package_url("https://example.net/addons", None, "a.zip").unwrap(),
            "https://example.net/addons/a.zip"
        );
        assert!(package_url("https://example.net", None, "").is_none());
    }

    #[test]
    fn installed_ledger_roundtrip() {
        let pkgs = vec![
            LocalPackage { id: "set-easy".into(), filename: "set-easy.zip".into() },
            LocalPackage { id: "ball-orb".into(), filename: "ball-orb.zip".into() },
        ];
        let text = write_installed(&pkgs);
        assert_eq!(parse_installed(&text), pkgs);
    }

    #[test]
    fn installed_ledger_derives_missing_ids() {
        let parsed = parse_installed("filename set-lost.zip\n");
        assert_eq!(parsed[0].id, "set-lost");
    }

    #[test]
    fn statuses_against_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("set-easy.zip"), vec![0u8; 1024]).unwrap();
        std::fs::write(dir.path().join("shot-short.png"), b"png").unwrap();

        let mut pkgs = parse_manifest(
            "package set-easy\nfilename set-easy.zip\nsize 1024\n\
             package set-bad\nfilename set-bad.zip\nsize 10\n\
             package set-short\nfilename set-short.zip\nshot shot-short.png\n",
        );
        std::fs::write(dir.path().join("set-bad.zip"), b"xx").unwrap();

        resolve_statuses(&mut pkgs, dir.path());
        assert_eq!(pkgs[0].status, PackageStatus::Installed);
        assert_eq!(pkgs[1].status, PackageStatus::Corrupt);
        assert_eq!(pkgs[2].status, PackageStatus::Partial);
    }
}
