// config.rs — persistent option store
//
// Registered variables with defaults, addressed through typed handles so
// screens read `cfg.get_d(config::SCREEN_ANIMATIONS)` without string
// lookups on the hot path. Persistence is a plain key/value text file;
// keys we don't recognize are carried through a save so files written by
// newer builds survive older ones.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::warn;

/// Handle to a registered integer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptD(usize);

/// Handle to a registered string option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptS(usize);

// ============================================================
// Standard options
// ============================================================

pub const ACCOUNT_SAVE: OptD = OptD(0);
pub const SCREEN_ANIMATIONS: OptD = OptD(1);
pub const SMOOTH_FIX: OptD = OptD(2);
pub const NOTIFICATION_SHOP: OptD = OptD(3);
pub const NOTIFICATION_REWARD: OptD = OptD(4);
pub const VIEW_FOV: OptD = OptD(5);
pub const ACCOUNT_MAYHEM: OptD = OptD(6);

pub const JOYSTICK_BUTTON_A: OptD = OptD(7);
pub const JOYSTICK_BUTTON_B: OptD = OptD(8);
pub const JOYSTICK_BUTTON_X: OptD = OptD(9);
pub const JOYSTICK_BUTTON_Y: OptD = OptD(10);
pub const JOYSTICK_BUTTON_L1: OptD = OptD(11);
pub const JOYSTICK_BUTTON_R1: OptD = OptD(12);
pub const JOYSTICK_BUTTON_L2: OptD = OptD(13);
pub const JOYSTICK_BUTTON_R2: OptD = OptD(14);
pub const JOYSTICK_BUTTON_START: OptD = OptD(15);
pub const JOYSTICK_BUTTON_SELECT: OptD = OptD(16);

pub const JOYSTICK_AXIS_X0: OptD = OptD(17);
pub const JOYSTICK_AXIS_Y0: OptD = OptD(18);
pub const JOYSTICK_AXIS_X1: OptD = OptD(19);
pub const JOYSTICK_AXIS_Y1: OptD = OptD(20);
pub const JOYSTICK_AXIS_X0_INVERT: OptD = OptD(21);
pub const JOYSTICK_AXIS_Y0_INVERT: OptD = OptD(22);
pub const JOYSTICK_AXIS_X1_INVERT: OptD = OptD(23);
pub const JOYSTICK_AXIS_Y1_INVERT: OptD = OptD(24);

pub const KEY_RESTART: OptD = OptD(25);
pub const KEY_SCORE_NEXT: OptD = OptD(26);

pub const PLAYER: OptS = OptS(0);
pub const REPLAY_NAME: OptS = OptS(1);
pub const LANGUAGE: OptS = OptS(2);

const OPTION_D: &[(&str, i32)] = &[
    ("account_save", 3),
    ("screen_animations", 1),
    ("smooth_fix", 0),
    ("notification_shop", 1),
    ("notification_reward", 1),
    ("view_fov", 50),
    ("account_mayhem", 0),
    ("joystick_button_a", 0),
    ("joystick_button_b", 1),
    ("joystick_button_x", 2),
    ("joystick_button_y", 3),
    ("joystick_button_l1", 4),
    ("joystick_button_r1", 5),
    ("joystick_button_l2", 6),
    ("joystick_button_r2", 7),
    ("joystick_button_start", 8),
    ("joystick_button_select", 9),
    ("joystick_axis_x0", 0),
    ("joystick_axis_y0", 1),
    ("joystick_axis_x1", 2),
    ("joystick_axis_y1", 3),
    ("joystick_axis_x0_invert", 0),
    ("joystick_axis_y0_invert", 0),
    ("joystick_axis_x1_invert", 0),
    ("joystick_axis_y1_invert", 0),
    ("key_restart", b'r' as i32),
    ("key_score_next", 9),
];

const OPTION_S: &[(&str, &str)] = &[
    ("player", ""),
    ("replay_name", "%s-%l"),
    ("language", ""),
];

// ============================================================
// Config context
// ============================================================

pub struct Config {
    values_d: Vec<i32>,
    values_s: Vec<String>,
    index_d: HashMap<&'static str, usize>,
    index_s: HashMap<&'static str, usize>,
    /// Lines we didn't recognize at load time, preserved verbatim.
    foreign: Vec<String>,
    dirty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        let mut index_d = HashMap::new();
        let mut index_s = HashMap::new();

        for (i, (name, _)) in OPTION_D.iter().enumerate() {
            index_d.insert(*name, i);
        }
        for (i, (name, _)) in OPTION_S.iter().enumerate() {
            index_s.insert(*name, i);
        }

        Self {
            values_d: OPTION_D.iter().map(|(_, def)| *def).collect(),
            values_s: OPTION_S.iter().map(|(_, def)| def.to_string()).collect(),
            index_d,
            index_s,
            foreign: Vec::new(),
            dirty: false,
        }
    }

    pub fn get_d(&self, opt: OptD) -> i32 {
        self.values_d[opt.0]
    }

    pub fn set_d(&mut self, opt: OptD, val: i32) {
        if self.values_d[opt.0] != val {
            self.values_d[opt.0] = val;
            self.dirty = true;
        }
    }

    /// True when the option currently holds `val`. Used for bindings:
    /// "is this button the one bound to A?"
    pub fn tst_d(&self, opt: OptD, val: i32) -> bool {
        self.values_d[opt.0] == val
    }

    pub fn tgl_d(&mut self, opt: OptD) {
        self.values_d[opt.0] = i32::from(self.values_d[opt.0] == 0);
        self.dirty = true;
    }

    pub fn get_s(&self, opt: OptS) -> &str {
        &self.values_s[opt.0]
    }

    pub fn set_s(&mut self, opt: OptS, val: &str) {
        if self.values_s[opt.0] != val {
            self.values_s[opt.0] = val.to_string();
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ============================================================
    // Persistence
    // ============================================================

    pub fn load(&mut self, path: &Path) -> io::Result<()> {
        let data = fs::read_to_string(path)?;

        for line in data.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let (key, value) = match line.split_once(char::is_whitespace) {
                Some((k, v)) => (k, v.trim_start()),
                None => (line, ""),
            };

            if let Some(&i) = self.index_d.get(key) {
                match value.parse::<i32>() {
                    Ok(d) => self.values_d[i] = d,
                    Err(_) => warn!("config: bad value for {key}: {value:?}"),
                }
            } else if let Some(&i) = self.index_s.get(key) {
                self.values_s[i] = value.to_string();
            } else {
                self.foreign.push(line.to_string());
            }
        }

        self.dirty = false;
        Ok(())
    }

    /// Write every option, padded into columns the way the original files
    /// were. Skipped when nothing changed.
    pub fn save(&mut self, path: &Path) -> io::Result<()> {
        if !self.dirty && path.exists() {
            return Ok(());
        }

        let mut out = Vec::new();
        for (i, (name, _)) in OPTION_D.iter().enumerate() {
            writeln!(out, "{:<25} {}", name, self.values_d[i])?;
        }
        for (i, (name, _)) in OPTION_S.iter().enumerate() {
            writeln!(out, "{:<25} {}", name, self.values_s[i])?;
        }
        for line in &self.foreign {
            writeln!(out, "{line}")?;
        }

        fs::write(path, out)?;
        self.dirty = false;
        Ok(())
    }
}

// ============================================================
// Server policy
// ============================================================

/// Handle to a server-policy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyD(usize);

pub const POLICY_EDITION: PolicyD = PolicyD(0);
pub const POLICY_SHOP_ENABLED: PolicyD = PolicyD(1);
pub const POLICY_SHOP_ENABLED_MANAGED: PolicyD = PolicyD(2);
pub const POLICY_SHOP_ENABLED_CONSUMABLES: PolicyD = PolicyD(3);
pub const POLICY_SHOP_ENABLED_IAP: PolicyD = PolicyD(4);
pub const POLICY_MODE_CAREER_UNLOCKED: PolicyD = PolicyD(5);

const POLICY: &[(&str, i32)] = &[
    ("edition", 1),
    ("shop_enabled", 1),
    ("shop_enabled_managed", 1),
    ("shop_enabled_consumables", 1),
    ("shop_enabled_iap", 1),
    ("playmodes_unlocked_mode_career", 1),
];

/// Deployment policy pushed from the server side. Read-only at runtime;
/// an edition of -1 means the build is unlicensed and most shop surfaces
/// shut off.
pub struct ServerPolicy {
    values: Vec<i32>,
    index: HashMap<&'static str, usize>,
}

impl Default for ServerPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerPolicy {
    pub fn new() -> Self {
        Self {
            values: POLICY.iter().map(|(_, def)| *def).collect(),
            index: POLICY
                .iter()
                .enumerate()
                .map(|(i, (name, _))| (*name, i))
                .collect(),
        }
    }

    pub fn get_d(&self, p: PolicyD) -> i32 {
        self.values[p.0]
    }

    pub fn load(&mut self, path: &Path) -> io::Result<()> {
        let data = fs::read_to_string(path)?;

        for line in data.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once(char::is_whitespace) {
                if let Some(&i) = self.index.get(key) {
                    match value.trim_start().parse::<i32>() {
                        Ok(d) => self.values[i] = d,
                        Err(_) => warn!("policy: bad value for {key}"),
                    }
                }
            }
        }

        Ok(())
    }

    /// Seed a policy value from server data at startup.
    pub fn set_d(&mut self, p: PolicyD, val: i32) {
        self.values[p.0] = val;
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_registered() {
        let cfg = Config::new();
        assert_eq!(cfg.get_d(ACCOUNT_SAVE), 3);
        assert_eq!(cfg.get_d(SCREEN_ANIMATIONS), 1);
        assert_eq!(cfg.get_s(REPLAY_NAME), "%s-%l");
    }

    #[test]
    fn tst_matches_bound_value() {
        let mut cfg = Config::new();
        cfg.set_d(JOYSTICK_BUTTON_A, 2);
        assert!(cfg.tst_d(JOYSTICK_BUTTON_A, 2));
        assert!(!cfg.tst_d(JOYSTICK_BUTTON_A, 0));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configrc");

        let mut cfg = Config::new();
        cfg.set_d(SMOOTH_FIX, 1);
        cfg.set_s(PLAYER, "Marble");
        cfg.save(&path).unwrap();

        let mut other = Config::new();
        other.load(&path).unwrap();
        assert_eq!(other.get_d(SMOOTH_FIX), 1);
        assert_eq!(other.get_s(PLAYER), "Marble");
        assert!(!other.is_dirty());
    }

    #[test]
    fn unknown_keys_survive_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configrc");
        std::fs::write(&path, "future_option          42\n").unwrap();

        let mut cfg = Config::new();
        cfg.load(&path).unwrap();
        cfg.set_d(SMOOTH_FIX, 1);
        cfg.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("future_option"));
    }

    #[test]
    fn clean_config_skips_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configrc");

        let mut cfg = Config::new();
        cfg.set_d(SMOOTH_FIX, 1);
        cfg.save(&path).unwrap();
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();

        cfg.save(&path).unwrap();
        let after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn policy_defaults_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy");
        std::fs::write(&path, "edition -1\nshop_enabled 0\n").unwrap();

        let mut policy = ServerPolicy::new();
        assert_eq!(policy.get_d(POLICY_EDITION), 1);
        policy.load(&path).unwrap();
        assert_eq!(policy.get_d(POLICY_EDITION), -1);
        assert_eq!(policy.get_d(POLICY_SHOP_ENABLED), 0);
    }
}
