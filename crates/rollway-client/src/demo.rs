// demo.rs — replay files
//
// A replay is a versioned binary header followed by one
// (timer, coins, status) triplet per recorded step. Recordings land in
// `Replays/Last.nbr` until the player gives them a real name.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use rollway_common::binary::{get_index, get_string, put_index, put_string};
use rollway_common::common::{make_time_from_utc, time_to_utc_str, MAXSTR};
use rollway_common::fs::UserDirs;

use crate::progress::{Mode, Status};

pub const DEMO_MAGIC: i32 = 0xAF | (b'N' as i32) << 8 | (b'B' as i32) << 16 | (b'R' as i32) << 24;

pub const DEMO_VERSION_MIN: i32 = 9;
pub const DEMO_VERSION: i32 = 10;

/// Name the recorder saves under before the player renames it.
pub const DEMO_LAST: &str = "Last";

const PATHMAX: usize = 64;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("demo io: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a replay file")]
    BadMagic,
    #[error("unsupported replay version {0}")]
    BadVersion(i32),
    #[error("corrupt replay header")]
    BadHeader,
}

// ============================================================
// Mode / status codes
// ============================================================

fn mode_code(mode: Mode) -> i32 {
    match mode {
        Mode::None => 0,
        Mode::Normal => 1,
        Mode::Challenge => 2,
        Mode::Zen => 3,
        Mode::BoostRush => 4,
        Mode::Campaign => 5,
        Mode::Hardcore => 6,
        Mode::Standalone => 7,
    }
}

fn mode_from_code(code: i32) -> Mode {
    match code {
        1 => Mode::Normal,
        2 => Mode::Challenge,
        3 => Mode::Zen,
        4 => Mode::BoostRush,
        5 => Mode::Campaign,
        6 => Mode::Hardcore,
        7 => Mode::Standalone,
        _ => Mode::None,
    }
}

fn status_code(status: Status) -> i32 {
    match status {
        Status::None => 0,
        Status::Goal => 1,
        Status::Fall => 2,
        Status::Time => 3,
    }
}

fn status_from_code(code: i32) -> Status {
    match code {
        1 => Status::Goal,
        2 => Status::Fall,
        3 => Status::Time,
        _ => Status::None,
    }
}

// ============================================================
// Demo record
// ============================================================

#[derive(Debug, Clone)]
pub struct Demo {
    pub path: PathBuf,
    pub name: String,

    pub player: String,
    pub date: DateTime<Utc>,

    pub timer: i32,
    pub coins: i32,
    pub status: Status,
    pub mode: Mode,

    pub set: String,
    pub shot: String,
    pub file: String,

    pub time: i32,
    pub goal: i32,
    pub score: i32,
    pub balls: i32,
    pub times: i32,
}

impl Demo {
    fn empty() -> Self {
        Self {
            path: PathBuf::new(),
            name: String::new(),
            player: String::new(),
            date: Utc::now(),
            timer: 0,
            coins: 0,
            status: Status::None,
            mode: Mode::None,
            set: String::new(),
            shot: String::new(),
            file: String::new(),
            time: 0,
            goal: 0,
            score: 0,
            balls: 0,
            times: 0,
        }
    }
}

// ============================================================
// Header codec
// ============================================================

/// Outcome flags a read can report alongside failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoCompat {
    pub old_detected: bool,
    pub requires_update: bool,
}

fn header_read<R: Read>(fp: &mut R, compat: &mut DemoCompat) -> Result<Demo, DemoError> {
    let magic = get_index(fp)?;
    let version = get_index(fp)?;
    let timer = get_index(fp)?;

    if magic != DEMO_MAGIC {
        return Err(DemoError::BadMagic);
    }
    if version < DEMO_VERSION_MIN || version > DEMO_VERSION {
        if version < DEMO_VERSION_MIN {
            compat.old_detected = true;
        }
        return Err(DemoError::BadVersion(version));
    }
    if version < DEMO_VERSION {
        compat.requires_update = true;
    }
    if timer == 0 {
        return Err(DemoError::BadHeader);
    }

    let mut d = Demo::empty();
    d.timer = timer;
    d.coins = get_index(fp)?;
    d.status = status_from_code(get_index(fp)?);
    d.mode = mode_from_code(get_index(fp)?);

    d.player = get_string(fp, MAXSTR)?;
    let datestr = get_string(fp, MAXSTR)?;
    d.date = make_time_from_utc(&datestr).ok_or(DemoError::BadHeader)?;

    d.set = get_string(fp, PATHMAX)?;
    d.shot = get_string(fp, PATHMAX)?;
    d.file = get_string(fp, PATHMAX)?;

    d.time = get_index(fp)?;
    d.goal = get_index(fp)?;
    let _ = get_index(fp)?; // unused (was goal-enabled flag)
    d.score = get_index(fp)?;
    d.balls = get_index(fp)?;
    d.times = get_index(fp)?;

    Ok(d)
}

fn header_write<W: Write>(fp: &mut W, d: &Demo) -> Result<(), DemoError> {
    put_index(fp, DEMO_MAGIC)?;
    put_index(fp, DEMO_VERSION)?;
    put_index(fp, d.timer)?;
    put_index(fp, d.coins)?;
    put_index(fp, status_code(d.status))?;
    put_index(fp, mode_code(d.mode))?;

    put_string(fp, &d.player)?;
    put_string(fp, &time_to_utc_str(d.date))?;

    put_string(fp, &d.set)?;
    put_string(fp, &d.shot)?;
    put_string(fp, &d.file)?;

    put_index(fp, d.time)?;
    put_index(fp, d.goal)?;
    put_index(fp, 0)?; // unused (was goal-enabled flag)
    put_index(fp, d.score)?;
    put_index(fp, d.balls)?;
    put_index(fp, d.times)?;

    Ok(())
}

// ============================================================
// Load / scan
// ============================================================

pub struct DemoKeeper {
    dirs: UserDirs,
    pub compat: DemoCompat,
    recorder: Option<Recorder>,
    saved: bool,
}

struct Recorder {
    header: Demo,
    steps: Vec<(i32, i32, i32)>,
}

impl DemoKeeper {
    pub fn new(dirs: UserDirs) -> Self {
        Self {
            dirs,
            compat: DemoCompat::default(),
            recorder: None,
            saved: false,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dirs.replay_file(name)
    }

    /// Read the header of one replay.
    pub fn load(&mut self, name: &str) -> Result<Demo, DemoError> {
        let path = self.path(name);
        let mut fp = BufReader::new(File::open(&path)?);
        let mut d = header_read(&mut fp, &mut self.compat)?;
        d.path = path;
        d.name = name.to_string();
        Ok(d)
    }

    /// Every readable replay, newest first. Unreadable files are skipped
    /// with a log line rather than failing the scan.
    pub fn scan(&mut self) -> Vec<Demo> {
        let mut out = Vec::new();

        let entries = match std::fs::read_dir(self.dirs.replays()) {
            Ok(e) => e,
            Err(_) => return out,
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some(stem) = file_name.strip_suffix(rollway_common::fs::REPLAY_EXT) else {
                continue;
            };
            match self.load(stem) {
                Ok(d) => out.push(d),
                Err(e) => log::warn!("skipping replay {file_name}: {e}"),
            }
        }

        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Expand the replay-name format: `%s` set id, `%l` level name, `%p`
    /// player; a numeric suffix keeps the result unique on disk.
    pub fn format_name(&self, fmt: &str, set: &str, level: &str, player: &str) -> String {
        let base = fmt
            .replace("%s", set)
            .replace("%l", level)
            .replace("%p", player);

        if !self.exists(&base) {
            return base;
        }
        for i in 2.. {
            let candidate = format!("{base}-{i:02}");
            if !self.exists(&candidate) {
                return candidate;
            }
        }
        unreachable!()
    }

    // ============================================================
    // Recording
    // ============================================================

    /// Begin recording. The header is finalized when the recording
    /// stops.
    pub fn play_init(&mut self, player: &str, set: &str, level_file: &str, mode: Mode, time: i32, goal: i32) {
        self.recorder = Some(Recorder {
            header: Demo {
                player: player.to_string(),
                set: set.to_string(),
                file: level_file.to_string(),
                mode,
                time,
                goal,
                date: Utc::now(),
                ..Demo::empty()
            },
            steps: Vec::new(),
        });
        self.saved = false;
    }

    pub fn recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Append one step of play.
    pub fn play_stat(&mut self, timer: i32, coins: i32, status: Status) {
        if let Some(rec) = self.recorder.as_mut() {
            rec.header.timer = timer;
            rec.header.coins = coins;
            rec.header.status = status;
            rec.steps.push((timer, coins, status_code(status)));
        }
    }

    /// Stop recording. `keep` writes `Last.nbr`; discarding drops the
    /// buffer, or the already-written `Last.nbr` when the retention
    /// policy retracts a finished recording.
    pub fn play_stop(&mut self, keep: bool) -> Result<(), DemoError> {
        let Some(rec) = self.recorder.take() else {
            if !keep && self.saved {
                let _ = std::fs::remove_file(self.path(DEMO_LAST));
                self.saved = false;
            }
            return Ok(());
        };

        if !keep || rec.header.timer == 0 {
            self.saved = false;
            return Ok(());
        }

        let path = self.path(DEMO_LAST);
        let mut fp = BufWriter::new(File::create(&path)?);
        header_write(&mut fp, &rec.header)?;
        for (timer, coins, status) in &rec.steps {
            put_index(&mut fp, *timer)?;
            put_index(&mut fp, *coins)?;
            put_index(&mut fp, *status)?;
        }
        fp.flush()?;

        self.saved = true;
        Ok(())
    }

    /// A finished recording is waiting under the Last name.
    pub fn saved(&self) -> bool {
        self.saved && self.exists(DEMO_LAST)
    }

    /// Give the last recording its real name.
    pub fn rename(&mut self, name: &str) -> Result<(), DemoError> {
        let from = self.path(DEMO_LAST);
        let to = self.path(name);
        std::fs::rename(from, to)?;
        self.saved = false;
        Ok(())
    }

    /// Rewrite the player field of a stored replay (account rename).
    pub fn rename_player(&mut self, name: &str, player: &str) -> Result<(), DemoError> {
        let (mut demo, steps) = self.read_all(name)?;
        demo.player = player.to_string();

        let mut fp = BufWriter::new(File::create(self.path(name))?);
        header_write(&mut fp, &demo)?;
        for (timer, coins, status) in steps {
            put_index(&mut fp, timer)?;
            put_index(&mut fp, coins)?;
            put_index(&mut fp, status)?;
        }
        fp.flush()?;
        Ok(())
    }

    fn read_all(&mut self, name: &str) -> Result<(Demo, Vec<(i32, i32, i32)>), DemoError> {
        let path = self.path(name);
        let mut fp = BufReader::new(File::open(&path)?);
        let mut d = header_read(&mut fp, &mut self.compat)?;
        d.path = path;
        d.name = name.to_string();

        let mut steps = Vec::new();
        loop {
            let timer = match get_index(&mut fp) {
                Ok(t) => t,
                Err(_) => break,
            };
            let coins = get_index(&mut fp)?;
            let status = get_index(&mut fp)?;
            steps.push((timer, coins, status));
        }
        Ok((d, steps))
    }

    // ============================================================
    // Playback
    // ============================================================

    pub fn replay_init(&mut self, name: &str) -> Result<Playback, DemoError> {
        let (demo, steps) = self.read_all(name)?;
        Ok(Playback { demo, steps, pos: 0 })
    }
}

pub struct Playback {
    pub demo: Demo,
    steps: Vec<(i32, i32, i32)>,
    pos: usize,
}

impl Playback {
    /// Next recorded step, or None at end of the replay.
    pub fn step(&mut self) -> Option<(i32, i32, Status)> {
        let (timer, coins, status) = *self.steps.get(self.pos)?;
        self.pos += 1;
        Some((timer, coins, status_from_code(status)))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn keeper() -> (DemoKeeper, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let dirs = UserDirs::at(dir.path().to_path_buf()).unwrap();
        (DemoKeeper::new(dirs), dir)
    }

    fn record_one(keeper: &mut DemoKeeper) {
        keeper.play_init("Marble", "easy", "map-easy/level1.sol", Mode::Normal, 60_000, 25);
        keeper.play_stat(1_000, 3, Status::None);
        keeper.play_stat(2_000, 9, Status::None);
        keeper.play_stat(2_500, 25, Status::Goal);
        keeper.play_stop(true).unwrap();
    }

    #[test]
    fn record_save_and_load_back() {
        let (mut keeper, _dir) = keeper();
        record_one(&mut keeper);
        assert!(keeper.saved());

        let d = keeper.load(DEMO_LAST).unwrap();
        assert_eq!(d.player, "Marble");
        assert_eq!(d.coins, 25);
        assert_eq!(d.status, Status::Goal);
        assert_eq!(d.mode, Mode::Normal);
        assert_eq!(d.timer, 2_500);
    }

    #[test]
    fn rename_moves_last_out_of_the_way() {
        let (mut keeper, _dir) = keeper();
        record_one(&mut keeper);

        keeper.rename("easy-level1").unwrap();
        assert!(!keeper.saved());
        assert!(keeper.exists("easy-level1"));
        assert!(!keeper.exists(DEMO_LAST));
    }

    #[test]
    fn discarded_recording_writes_nothing() {
        let (mut keeper, _dir) = keeper();
        keeper.play_init("Marble", "easy", "lvl", Mode::Normal, 0, 0);
        keeper.play_stat(500, 1, Status::None);
        keeper.play_stop(false).unwrap();
        assert!(!keeper.saved());
        assert!(!keeper.exists(DEMO_LAST));
    }

    #[test]
    fn playback_replays_the_stat_stream() {
        let (mut keeper, _dir) = keeper();
        record_one(&mut keeper);

        let mut playback = keeper.replay_init(DEMO_LAST).unwrap();
        assert_eq!(playback.len(), 3);
        assert_eq!(playback.step(), Some((1_000, 3, Status::None)));
        assert_eq!(playback.step(), Some((2_000, 9, Status::None)));
        assert_eq!(playback.step(), Some((2_500, 25, Status::Goal)));
        assert_eq!(playback.step(), None);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let (mut keeper, _dir) = keeper();
        std::fs::write(keeper.path("junk"), b"not a replay at all....").unwrap();
        assert!(matches!(keeper.load("junk"), Err(DemoError::BadMagic)));
    }

    #[test]
    fn old_version_flags_compat() {
        let (mut keeper, _dir) = keeper();

        let mut bytes = Vec::new();
        put_index(&mut bytes, DEMO_MAGIC).unwrap();
        put_index(&mut bytes, DEMO_VERSION_MIN - 1).unwrap();
        put_index(&mut bytes, 1_000).unwrap();
        std::fs::write(keeper.path("ancient"), &bytes).unwrap();

        assert!(matches!(keeper.load("ancient"), Err(DemoError::BadVersion(_))));
        assert!(keeper.compat.old_detected);
    }

    #[test]
    fn scan_skips_garbage_and_sorts_by_date() {
        let (mut keeper, _dir) = keeper();
        record_one(&mut keeper);
        keeper.rename("first").unwrap();
        std::fs::write(keeper.path("bogus"), b"zzzz").unwrap();
        record_one(&mut keeper);
        keeper.rename("second").unwrap();

        let demos = keeper.scan();
        assert_eq!(demos.len(), 2);
        assert!(demos.iter().all(|d| d.name != "bogus"));
    }

    #[test]
    fn format_name_expands_and_uniquifies() {
        let (mut keeper, _dir) = keeper();
        assert_eq!(keeper.format_name("%s-%l", "easy", "level1", "p"), "easy-level1");

        record_one(&mut keeper);
        keeper.rename("easy-level1").unwrap();
        assert_eq!(keeper.format_name("%s-%l", "easy", "level1", "p"), "easy-level1-02");
    }
}
