// wgcl.rs — web account session
//
// WGCL ("Web server Game Core Launcher") links the local account to a
// server-side one so wallets and consumables follow the player between
// machines. The wire protocol itself lives behind the backend trait;
// this module owns the session state and the offline retry queue.

use log::{info, warn};

/// Minimum credential lengths the login form enforces.
pub const WGCL_NAME_MIN: usize = 3;
pub const WGCL_PASSWORD_MIN: usize = 14;

/// Wallet-and-consumable snapshot pushed to or pulled from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WgclDelta {
    pub coins: i32,
    pub gems: i32,
    pub hp: i32,
    pub doublecash: i32,
    pub halfgrav: i32,
    pub doublespeed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOp {
    Add(WgclDelta),
    Set(WgclDelta),
}

pub trait WgclBackend {
    /// Authenticate; true on success.
    fn login(&mut self, name: &str, password: &str) -> bool;
    fn logout(&mut self) -> bool;
    fn push_add(&mut self, delta: &WgclDelta) -> bool;
    fn push_set(&mut self, delta: &WgclDelta) -> bool;
    fn online(&self) -> bool;
}

/// Backend used when the game runs with no server configured: always
/// offline, never authenticates.
#[derive(Default)]
pub struct OfflineBackend;

impl WgclBackend for OfflineBackend {
    fn login(&mut self, _: &str, _: &str) -> bool {
        false
    }
    fn logout(&mut self) -> bool {
        true
    }
    fn push_add(&mut self, _: &WgclDelta) -> bool {
        false
    }
    fn push_set(&mut self, _: &WgclDelta) -> bool {
        false
    }
    fn online(&self) -> bool {
        false
    }
}

pub struct WgclSession {
    backend: Box<dyn WgclBackend>,
    logged_in: bool,
    account_name: String,
    pending: Vec<PendingOp>,
}

impl Default for WgclSession {
    fn default() -> Self {
        Self::new(Box::new(OfflineBackend))
    }
}

impl WgclSession {
    pub fn new(backend: Box<dyn WgclBackend>) -> Self {
        Self {
            backend,
            logged_in: false,
            account_name: String::new(),
            pending: Vec::new(),
        }
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn online(&self) -> bool {
        self.backend.online()
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// While a session is live the local player name mirrors the server
    /// account and must not be edited.
    pub fn name_read_only(&self) -> bool {
        self.logged_in
    }

    /// Validate and attempt a login. Short credentials never reach the
    /// backend.
    pub fn login(&mut self, name: &str, password: &str) -> bool {
        if name.chars().count() < WGCL_NAME_MIN
            || password.chars().count() < WGCL_PASSWORD_MIN
        {
            return false;
        }

        if self.backend.login(name, password) {
            self.logged_in = true;
            self.account_name = name.to_string();
            info!("wgcl: logged in as {name}");
            true
        } else {
            warn!("wgcl: login failed for {name}");
            false
        }
    }

    pub fn logout(&mut self) -> bool {
        if !self.backend.logout() {
            return false;
        }
        self.logged_in = false;
        self.account_name.clear();
        self.pending.clear();
        true
    }

    /// Push a delta; queued for retry when the server is unreachable.
    pub fn try_add(&mut self, delta: WgclDelta) -> bool {
        if self.logged_in && self.backend.push_add(&delta) {
            return true;
        }
        self.pending.push(PendingOp::Add(delta));
        false
    }

    /// Push an absolute snapshot; queued for retry when unreachable.
    pub fn try_set(&mut self, delta: WgclDelta) -> bool {
        if self.logged_in && self.backend.push_set(&delta) {
            return true;
        }
        self.pending.push(PendingOp::Set(delta));
        false
    }

    /// Retry everything queued while offline. True when the queue
    /// drained.
    pub fn restart_attempt(&mut self) -> bool {
        if !self.logged_in {
            return false;
        }

        while let Some(op) = self.pending.first().copied() {
            let ok = match op {
                PendingOp::Add(d) => self.backend.push_add(&d),
                PendingOp::Set(d) => self.backend.push_set(&d),
            };
            if !ok {
                return false;
            }
            self.pending.remove(0);
        }

        true
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeBackend {
        accept: bool,
        reachable: Rc<Cell<bool>>,
        pushes: Rc<Cell<usize>>,
    }

    impl WgclBackend for FakeBackend {
        fn login(&mut self, _: &str, _: &str) -> bool {
            self.accept
        }
        fn logout(&mut self) -> bool {
            true
        }
        fn push_add(&mut self, _: &WgclDelta) -> bool {
            if self.reachable.get() {
                self.pushes.set(self.pushes.get() + 1);
                true
            } else {
                false
            }
        }
        fn push_set(&mut self, d: &WgclDelta) -> bool {
            self.push_add(d)
        }
        fn online(&self) -> bool {
            self.reachable.get()
        }
    }

    fn session(accept: bool) -> (WgclSession, Rc<Cell<bool>>, Rc<Cell<usize>>) {
        let reachable = Rc::new(Cell::new(true));
        let pushes = Rc::new(Cell::new(0));
        let s = WgclSession::new(Box::new(FakeBackend {
            accept,
            reachable: Rc::clone(&reachable),
            pushes: Rc::clone(&pushes),
        }));
        (s, reachable, pushes)
    }

    const GOOD_PW: &str = "longenoughpassword";

    #[test]
    fn short_credentials_are_rejected_locally() {
        let (mut s, _, _) = session(true);
        assert!(!s.login("ab", GOOD_PW));
        assert!(!s.login("player", "short"));
        assert!(!s.logged_in());
    }

    #[test]
    fn login_links_account_and_locks_name() {
        let (mut s, _, _) = session(true);
        assert!(s.login("player", GOOD_PW));
        assert!(s.logged_in());
        assert!(s.name_read_only());
        assert_eq!(s.account_name(), "player");

        assert!(s.logout());
        assert!(!s.name_read_only());
    }

    #[test]
    fn offline_pushes_queue_and_drain_on_restart() {
        let (mut s, reachable, pushes) = session(true);
        s.login("player", GOOD_PW);

        reachable.set(false);
        assert!(!s.try_add(WgclDelta { coins: 10, ..Default::default() }));
        assert!(!s.try_set(WgclDelta { gems: 5, ..Default::default() }));
        assert_eq!(s.pending_count(), 2);

        // Still down: nothing drains.
        assert!(!s.restart_attempt());
        assert_eq!(s.pending_count(), 2);

        reachable.set(true);
        assert!(s.restart_attempt());
        assert_eq!(s.pending_count(), 0);
        assert_eq!(pushes.get(), 2);
    }

    #[test]
    fn logout_drops_the_queue() {
        let (mut s, reachable, _) = session(true);
        s.login("player", GOOD_PW);
        reachable.set(false);
        s.try_add(WgclDelta::default());
        s.logout();
        assert_eq!(s.pending_count(), 0);
    }
}
