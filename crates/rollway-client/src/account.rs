// account.rs — player account data
//
// Wallet balances, owned products and consumable stock, persisted per
// player next to the config. The wallet is capped; going negative on
// gems or extra lives marks the account bankrupt, which the game-over
// screen surfaces.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use rollway_common::fs::write_atomic;

pub const WALLET_MAX_COINS: i32 = 1_000_000;

/// Handle to an integer account value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccD(usize);

/// Handle to a string account value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccS(usize);

pub const WALLET_COINS: AccD = AccD(0);
pub const WALLET_GEMS: AccD = AccD(1);
pub const PRODUCT_LEVELS: AccD = AccD(2);
pub const PRODUCT_BALLS: AccD = AccD(3);
pub const PRODUCT_BONUS: AccD = AccD(4);
pub const PRODUCT_MEDIATION: AccD = AccD(5);
pub const SET_UNLOCKS: AccD = AccD(6);
pub const CONSUMABLE_EARNINATOR: AccD = AccD(7);
pub const CONSUMABLE_FLOATIFIER: AccD = AccD(8);
pub const CONSUMABLE_SPEEDIFIER: AccD = AccD(9);
pub const CONSUMABLE_EXTRALIVES: AccD = AccD(10);

pub const PLAYER: AccS = AccS(0);
pub const BALL_FILE: AccS = AccS(1);

// New accounts start with a few gems and one of each powerup so the shop
// has something to demonstrate.
const VALUES_D: &[(&str, i32)] = &[
    ("wallet_coins", 0),
    ("wallet_gems", 15),
    ("product_levels", 0),
    ("product_balls", 0),
    ("product_bonus", 0),
    ("product_mediation", 0),
    ("set_unlocks", 1),
    ("consumeable_earninator", 1),
    ("consumeable_floatifier", 1),
    ("consumeable_speedifier", 1),
    ("consumeable_extralives", 0),
];

const VALUES_S: &[(&str, &str)] = &[
    ("player", ""),
    ("ball_file", "ball/legacy-ball/legacy-ball"),
];

pub struct Account {
    values_d: Vec<i32>,
    values_s: Vec<String>,
    index_d: HashMap<&'static str, usize>,
    index_s: HashMap<&'static str, usize>,
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

impl Account {
    pub fn new() -> Self {
        Self {
            values_d: VALUES_D.iter().map(|(_, d)| *d).collect(),
            values_s: VALUES_S.iter().map(|(_, s)| s.to_string()).collect(),
            index_d: VALUES_D
                .iter()
                .enumerate()
                .map(|(i, (n, _))| (*n, i))
                .collect(),
            index_s: VALUES_S
                .iter()
                .enumerate()
                .map(|(i, (n, _))| (*n, i))
                .collect(),
        }
    }

    pub fn get_d(&self, v: AccD) -> i32 {
        self.values_d[v.0]
    }

    pub fn set_d(&mut self, v: AccD, val: i32) {
        self.values_d[v.0] = val;
    }

    pub fn tst_d(&self, v: AccD, val: i32) -> bool {
        self.values_d[v.0] == val
    }

    pub fn tgl_d(&mut self, v: AccD) {
        self.values_d[v.0] = i32::from(self.values_d[v.0] == 0);
    }

    pub fn get_s(&self, v: AccS) -> &str {
        &self.values_s[v.0]
    }

    pub fn set_s(&mut self, v: AccS, val: &str) {
        self.values_s[v.0] = val.to_string();
    }

    /// Credit coins, clamped to the wallet cap.
    pub fn add_coins(&mut self, coins: i32) {
        let wallet = self.get_d(WALLET_COINS);
        self.set_d(WALLET_COINS, (wallet + coins).min(WALLET_MAX_COINS));
    }

    pub fn bankrupt(&self) -> bool {
        self.get_d(CONSUMABLE_EXTRALIVES) < 0 || self.get_d(WALLET_GEMS) < 0
    }

    // ============================================================
    // Persistence
    // ============================================================

    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    pub fn load(&mut self, path: &Path) -> io::Result<()> {
        let data = std::fs::read_to_string(path)?;

        for line in data.lines() {
            let Some((key, value)) = line.split_once(char::is_whitespace) else {
                continue;
            };
            let value = value.trim_start();

            if let Some(&i) = self.index_d.get(key) {
                if let Ok(d) = value.parse::<i32>() {
                    self.values_d[i] = d;
                }
            } else if let Some(&i) = self.index_s.get(key) {
                self.values_s[i] = value.to_string();
            }
        }

        Ok(())
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = String::new();
        for (i, (name, _)) in VALUES_D.iter().enumerate() {
            out.push_str(&format!("{:<25} {}\n", name, self.values_d[i]));
        }
        for (i, (name, _)) in VALUES_S.iter().enumerate() {
            if !self.values_s[i].is_empty() {
                out.push_str(&format!("{:<25} {}\n", name, self.values_s[i]));
            }
        }

        write_atomic(path, out.as_bytes())
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_account_defaults() {
        let acc = Account::new();
        assert_eq!(acc.get_d(WALLET_COINS), 0);
        assert_eq!(acc.get_d(WALLET_GEMS), 15);
        assert_eq!(acc.get_d(CONSUMABLE_SPEEDIFIER), 1);
        assert_eq!(acc.get_d(CONSUMABLE_EXTRALIVES), 0);
        assert!(!acc.bankrupt());
    }

    #[test]
    fn coins_clamp_at_wallet_cap() {
        let mut acc = Account::new();
        acc.set_d(WALLET_COINS, WALLET_MAX_COINS - 10);
        acc.add_coins(500);
        assert_eq!(acc.get_d(WALLET_COINS), WALLET_MAX_COINS);
    }

    #[test]
    fn negative_gems_mean_bankrupt() {
        let mut acc = Account::new();
        acc.set_d(WALLET_GEMS, -1);
        assert!(acc.bankrupt());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accountrc");

        let mut acc = Account::new();
        acc.set_d(WALLET_COINS, 360);
        acc.set_d(PRODUCT_BONUS, 1);
        acc.set_s(PLAYER, "Marble");
        acc.save(&path).unwrap();

        assert!(Account::exists(&path));

        let mut other = Account::new();
        other.load(&path).unwrap();
        assert_eq!(other.get_d(WALLET_COINS), 360);
        assert_eq!(other.get_d(PRODUCT_BONUS), 1);
        assert_eq!(other.get_s(PLAYER), "Marble");
        // Untouched values keep their defaults.
        assert_eq!(other.get_d(WALLET_GEMS), 15);
    }

    #[test]
    fn unknown_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accountrc");
        std::fs::write(&path, "mystery 9\nwallet_coins 5\n").unwrap();

        let mut acc = Account::new();
        acc.load(&path).unwrap();
        assert_eq!(acc.get_d(WALLET_COINS), 5);
    }
}
