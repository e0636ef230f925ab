//! Author: [Seclususs](https://github.com/seclususs)

//! Text preference that mirrors one or more sysfs nodes.
//!
//! Reads fill the displayed value from the primary node. Writes go to the
//! primary node, or to every node of the list in multi-file mode, and may be
//! recorded as bootup entries. Each write schedules one re-read on the
//! looper so the displayed value follows what the kernel actually kept.

use crate::common::traits::{BootupStore, PathValidator, ValueFile};
use crate::config::attributes::PreferenceAttributes;
use crate::config::defaults::{
    BOOTUP_CATEGORY, DEFAULT_MULTIFILE, DEFAULT_STARTUP, REFRESH_DELAY_MS,
};
use crate::controllers::preference_logic::Target;
use crate::daemon::looper::{CancelToken, Looper};
use crate::hal::sysfs::{SysfsFile, SysfsPathValidator};
use crate::registry::bootup::BootupEntry;
use crate::utils::strings;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Called for every user-driven change; returns whether the change is accepted.
pub type ChangeListener = fn(&AutoEditTextPreference, &str) -> bool;

#[derive(Clone)]
pub struct Collaborators {
    pub validator: Rc<dyn PathValidator>,
    pub files: Rc<dyn ValueFile>,
    pub bootup: Rc<dyn BootupStore>,
}

impl Collaborators {
    pub fn new(
        validator: Rc<dyn PathValidator>,
        files: Rc<dyn ValueFile>,
        bootup: Rc<dyn BootupStore>,
    ) -> Self {
        Self {
            validator,
            files,
            bootup,
        }
    }

    pub fn sysfs(bootup: Rc<dyn BootupStore>) -> Self {
        Self::new(
            Rc::new(SysfsPathValidator::default()),
            Rc::new(SysfsFile::default()),
            bootup,
        )
    }
}

#[derive(Debug)]
struct PreferenceState {
    key: String,
    target: Target,
    value: Option<String>,
    startup: bool,
    multi_file: bool,
}

impl PreferenceState {
    fn load_from(&mut self, files: &dyn ValueFile) {
        let Some(path) = self.target.primary() else {
            return;
        };
        match files.read_one_line(path) {
            Ok(line) => self.value = Some(line),
            Err(e) => log::debug!("Preference '{}': read failed for {path}: {e}", self.key),
        }
    }
}

pub struct AutoEditTextPreference {
    state: Rc<RefCell<PreferenceState>>,
    collaborators: Collaborators,
    looper: Rc<Looper>,
    refresh_token: CancelToken,
    listener: Option<ChangeListener>,
}

fn write_on_change(pref: &AutoEditTextPreference, value: &str) -> bool {
    pref.apply_value(value);
    true
}

impl AutoEditTextPreference {
    /// Builds the preference from its attributes and attaches the
    /// write-on-change subscription. The value is not read until
    /// [`load_current_value`](Self::load_current_value) runs.
    pub fn new(
        key: impl Into<String>,
        attrs: &PreferenceAttributes,
        collaborators: Collaborators,
        looper: Rc<Looper>,
    ) -> Self {
        let mut pref = Self {
            state: Rc::new(RefCell::new(PreferenceState {
                key: key.into(),
                target: Target::Unsupported,
                value: None,
                startup: DEFAULT_STARTUP,
                multi_file: DEFAULT_MULTIFILE,
            })),
            collaborators,
            looper,
            refresh_token: CancelToken::new(),
            listener: None,
        };
        pref.configure(attrs);
        pref.handle_self(true);
        pref
    }

    pub fn configure(&mut self, attrs: &PreferenceAttributes) {
        let target = Target::resolve(attrs, self.collaborators.validator.as_ref());
        let mut state = self.state.borrow_mut();
        state.startup = attrs.startup;
        state.multi_file = attrs.multifile && attrs.file_path.is_none();
        if !target.is_supported() {
            log::debug!("Preference '{}': no usable path, disabled", state.key);
        }
        state.target = target;
    }

    pub fn key(&self) -> String {
        self.state.borrow().key.clone()
    }

    pub fn path(&self) -> Option<String> {
        self.state.borrow().target.primary().map(str::to_string)
    }

    pub fn target(&self) -> Target {
        self.state.borrow().target.clone()
    }

    pub fn value(&self) -> Option<String> {
        self.state.borrow().value.clone()
    }

    pub fn is_supported(&self) -> bool {
        self.state.borrow().target.is_supported()
    }

    pub fn is_startup(&self) -> bool {
        self.state.borrow().startup
    }

    pub fn is_multi_file(&self) -> bool {
        self.state.borrow().multi_file
    }

    pub fn is_handling_self(&self) -> bool {
        self.listener.is_some()
    }

    pub fn set_path(&mut self, path: &str) {
        if let Some(target) = Target::from_path(path, self.collaborators.validator.as_ref()) {
            self.state.borrow_mut().target = target;
        }
    }

    pub fn set_paths(&mut self, paths: &[String]) {
        let multi_file = self.is_multi_file();
        if let Some(target) =
            Target::from_paths(paths, multi_file, self.collaborators.validator.as_ref())
        {
            self.state.borrow_mut().target = target;
        }
    }

    pub fn set_multi_file(&mut self, multi_file: bool) {
        self.state.borrow_mut().multi_file = multi_file;
    }

    pub fn set_startup(&mut self, startup: bool) {
        self.state.borrow_mut().startup = startup;
    }

    pub fn load_current_value(&self) {
        self.state
            .borrow_mut()
            .load_from(self.collaborators.files.as_ref());
    }

    /// Writes `value` to the backing node(s) and records bootup entries.
    /// Individual write failures are logged and skipped. Values outside the
    /// safe character set are neither written nor recorded.
    pub fn apply_value(&self, value: &str) {
        let (key, target, startup, multi_file) = {
            let state = self.state.borrow();
            (
                state.key.clone(),
                state.target.clone(),
                state.startup,
                state.multi_file,
            )
        };
        if !target.is_supported() {
            return;
        }
        if !strings::validate_value(value) {
            log::warn!("Preference '{key}': refusing unsafe value '{value}'");
            self.schedule_refresh();
            return;
        }
        match target.fan_out() {
            Some(paths) if multi_file => {
                for (i, path) in paths.iter().enumerate() {
                    self.write_node(path, value);
                    if startup {
                        self.record_bootup(format!("{key}{i}"), path, value);
                    }
                }
            }
            _ => {
                let Some(path) = target.primary() else {
                    return;
                };
                self.write_node(path, value);
                if startup {
                    self.record_bootup(key, path, value);
                }
            }
        }
        self.schedule_refresh();
    }

    pub fn handle_self(&mut self, handle_self: bool) {
        self.listener = handle_self.then_some(write_on_change as ChangeListener);
    }

    /// Entry point for user-driven changes. An accepted change becomes the
    /// displayed value until the scheduled re-read replaces it.
    pub fn on_preference_change<V>(&self, new_value: &V) -> bool
    where
        V: fmt::Display + ?Sized,
    {
        let text = new_value.to_string();
        let accepted = match self.listener {
            Some(listener) => listener(self, &text),
            None => true,
        };
        if accepted {
            self.state.borrow_mut().value = Some(text);
        }
        accepted
    }

    fn write_node(&self, path: &str, value: &str) {
        if let Err(e) = self.collaborators.files.write_value(path, value) {
            log::debug!("Write failed '{value}' -> {path}: {e}");
        }
    }

    fn record_bootup(&self, name: String, path: &str, value: &str) {
        let entry = BootupEntry::new(BOOTUP_CATEGORY, name, path, value, true);
        if let Err(e) = self.collaborators.bootup.set_bootup(entry) {
            log::warn!("Failed to store bootup entry for {path}: {e}");
        }
    }

    fn schedule_refresh(&self) {
        let state: Weak<RefCell<PreferenceState>> = Rc::downgrade(&self.state);
        let files = Rc::clone(&self.collaborators.files);
        self.looper.post_delayed(
            Duration::from_millis(REFRESH_DELAY_MS),
            &self.refresh_token,
            move || {
                let Some(state) = state.upgrade() else {
                    return;
                };
                match state.try_borrow_mut() {
                    Ok(mut state) => state.load_from(files.as_ref()),
                    Err(_) => log::debug!("Preference busy, skipping refresh"),
                }
            },
        );
    }
}

impl fmt::Debug for AutoEditTextPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoEditTextPreference")
            .field("state", &self.state.borrow())
            .field("handling_self", &self.listener.is_some())
            .finish()
    }
}

impl Drop for AutoEditTextPreference {
    fn drop(&mut self) {
        self.refresh_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::MockValueFile;
    use crate::daemon::types::DevctlError;
    use crate::registry::bootup::MemoryBootupStore;

    use mockall::{Sequence, predicate::eq};
    use std::io;
    use std::time::Instant;

    struct AnyPath;

    impl PathValidator for AnyPath {
        fn check_path(&self, raw: &str) -> Option<String> {
            let raw = raw.trim();
            (!raw.is_empty() && !raw.contains("missing")).then(|| raw.to_string())
        }
    }

    fn build(
        attrs: &PreferenceAttributes,
        files: MockValueFile,
    ) -> (AutoEditTextPreference, Rc<MemoryBootupStore>, Rc<Looper>) {
        let store = Rc::new(MemoryBootupStore::new());
        let looper = Rc::new(Looper::new());
        let pref = AutoEditTextPreference::new(
            "cpu_gov",
            attrs,
            Collaborators::new(Rc::new(AnyPath), Rc::new(files), store.clone()),
            looper.clone(),
        );
        (pref, store, looper)
    }

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn unsupported_preference_never_touches_files() {
        let mut files = MockValueFile::new();
        files.expect_read_one_line().never();
        files.expect_write_value().never();
        let attrs = PreferenceAttributes::with_paths(["/sys/missing0", "/sys/missing1"]);
        let (pref, store, looper) = build(&attrs, files);

        assert!(!pref.is_supported());
        pref.load_current_value();
        pref.apply_value("1");
        assert!(pref.value().is_none());
        assert!(store.entries().is_empty());
        assert_eq!(looper.pending(), 0);
    }

    #[test]
    fn single_target_writes_once_and_stores_plain_key() {
        let mut files = MockValueFile::new();
        files
            .expect_write_value()
            .with(eq("/sys/gov"), eq("powersave"))
            .times(1)
            .returning(|_, _| Ok(()));
        let (pref, store, looper) = build(&PreferenceAttributes::with_path("/sys/gov"), files);

        pref.apply_value("powersave");
        let entries = store.entries();
        assert_eq!(
            entries,
            vec![BootupEntry::new("default", "cpu_gov", "/sys/gov", "powersave", true)]
        );
        assert_eq!(looper.pending(), 1);
    }

    #[test]
    fn multi_target_fans_out_in_order_with_indexed_keys() {
        let mut files = MockValueFile::new();
        let mut seq = Sequence::new();
        for node in ["/sys/p0", "/sys/p1", "/sys/p2"] {
            files
                .expect_write_value()
                .with(eq(node), eq("y"))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
        let attrs =
            PreferenceAttributes::with_paths(["/sys/p0", "/sys/p1", "/sys/p2"]).multifile(true);
        let (pref, store, _looper) = build(&attrs, files);

        pref.apply_value("y");
        let names: Vec<_> = store.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["cpu_gov0", "cpu_gov1", "cpu_gov2"]);
    }

    #[test]
    fn list_without_multifile_only_writes_primary() {
        let mut files = MockValueFile::new();
        files
            .expect_write_value()
            .with(eq("/sys/p0"), eq("z"))
            .times(1)
            .returning(|_, _| Ok(()));
        let (pref, store, _looper) =
            build(&PreferenceAttributes::with_paths(["/sys/p0", "/sys/p1"]), files);

        pref.apply_value("z");
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].name, "cpu_gov");
    }

    #[test]
    fn disabling_multifile_after_resolution_writes_primary_only() {
        let mut files = MockValueFile::new();
        files
            .expect_write_value()
            .with(eq("/sys/p0"), eq("3"))
            .times(1)
            .returning(|_, _| Ok(()));
        let attrs = PreferenceAttributes::with_paths(["/sys/p0", "/sys/p1"]).multifile(true);
        let (mut pref, store, _looper) = build(&attrs, files);
        assert!(pref.target().fan_out().is_some());

        pref.set_multi_file(false);
        pref.apply_value("3");
        assert_eq!(store.entries()[0].name, "cpu_gov");
    }

    #[test]
    fn fan_out_continues_past_failed_writes() {
        let mut files = MockValueFile::new();
        files
            .expect_write_value()
            .with(eq("/sys/p0"), eq("1"))
            .times(1)
            .returning(|_, _| {
                Err(DevctlError::IoError(io::Error::from(
                    io::ErrorKind::PermissionDenied,
                )))
            });
        files
            .expect_write_value()
            .with(eq("/sys/p1"), eq("1"))
            .times(1)
            .returning(|_, _| Ok(()));
        let attrs = PreferenceAttributes::with_paths(["/sys/p0", "/sys/p1"]).multifile(true);
        let (pref, store, looper) = build(&attrs, files);

        pref.apply_value("1");
        assert_eq!(store.entries().len(), 2);
        assert_eq!(looper.pending(), 1);
    }

    #[test]
    fn unsafe_values_are_neither_written_nor_recorded() {
        let mut files = MockValueFile::new();
        files.expect_write_value().never();
        let (pref, store, looper) = build(&PreferenceAttributes::with_path("/sys/gov"), files);

        pref.apply_value("1; reboot");
        assert!(store.entries().is_empty());
        assert_eq!(looper.pending(), 1);
    }

    #[test]
    fn sysfs_collaborators_only_accept_kernel_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let node = dir.path().join("value");
        std::fs::write(&node, "1\n").unwrap();
        let pref = AutoEditTextPreference::new(
            "outside",
            &PreferenceAttributes::with_path(node.to_string_lossy()),
            Collaborators::sysfs(Rc::new(MemoryBootupStore::new())),
            Rc::new(Looper::new()),
        );
        assert_eq!(pref.key(), "outside");
        assert!(!pref.is_supported());
    }

    #[test]
    fn startup_off_skips_bootup_entries() {
        let mut files = MockValueFile::new();
        files.expect_write_value().times(1).returning(|_, _| Ok(()));
        let (mut pref, store, _looper) =
            build(&PreferenceAttributes::with_path("/sys/gov"), files);
        pref.set_startup(false);
        pref.apply_value("1");
        assert!(store.entries().is_empty());
    }

    #[test]
    fn refresh_runs_once_after_the_delay() {
        let mut files = MockValueFile::new();
        files.expect_write_value().times(1).returning(|_, _| Ok(()));
        files
            .expect_read_one_line()
            .with(eq("/sys/gov"))
            .times(1)
            .returning(|_| Ok("schedutil".to_string()));
        let (pref, _store, looper) = build(&PreferenceAttributes::with_path("/sys/gov"), files);

        let before = Instant::now();
        pref.apply_value("schedutil");
        assert_eq!(looper.run_due(before + Duration::from_millis(REFRESH_DELAY_MS - 1)), 0);
        assert!(pref.value().is_none());

        let after = Instant::now() + Duration::from_millis(REFRESH_DELAY_MS);
        assert_eq!(looper.run_due(after), 1);
        assert_eq!(pref.value().as_deref(), Some("schedutil"));
        assert_eq!(looper.run_due(after + Duration::from_secs(1)), 0);
    }

    #[test]
    fn read_failure_keeps_previous_value() {
        let mut files = MockValueFile::new();
        let mut seq = Sequence::new();
        files
            .expect_read_one_line()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("42".to_string()));
        files
            .expect_read_one_line()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(DevctlError::InvalidPath("/sys/gov".into())));
        let (pref, _store, _looper) = build(&PreferenceAttributes::with_path("/sys/gov"), files);

        pref.load_current_value();
        pref.load_current_value();
        assert_eq!(pref.value().as_deref(), Some("42"));
    }

    #[test]
    fn dropped_preference_abandons_pending_refresh() {
        let mut files = MockValueFile::new();
        files.expect_write_value().times(1).returning(|_, _| Ok(()));
        files.expect_read_one_line().never();
        let (pref, _store, looper) = build(&PreferenceAttributes::with_path("/sys/gov"), files);

        pref.apply_value("1");
        assert_eq!(looper.pending(), 1);
        drop(pref);
        assert_eq!(looper.pending(), 0);
        assert_eq!(looper.run_due(Instant::now() + Duration::from_secs(1)), 0);
    }

    #[test]
    fn change_notifications_write_only_when_attached() {
        let mut files = MockValueFile::new();
        files
            .expect_write_value()
            .with(eq("/sys/gov"), eq("64"))
            .times(1)
            .returning(|_, _| Ok(()));
        let (mut pref, store, _looper) =
            build(&PreferenceAttributes::with_path("/sys/gov"), files);
        assert!(pref.is_handling_self());

        assert!(pref.on_preference_change(&64));
        assert_eq!(pref.value().as_deref(), Some("64"));

        pref.handle_self(false);
        assert!(!pref.is_handling_self());
        assert!(pref.on_preference_change("128"));
        assert_eq!(pref.value().as_deref(), Some("128"));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn set_path_replaces_target_only_when_valid() {
        let attrs = PreferenceAttributes::with_paths(["/sys/p0", "/sys/p1"]).multifile(true);
        let (mut pref, _store, _looper) = build(&attrs, MockValueFile::new());

        pref.set_path("/sys/missing");
        assert!(pref.target().fan_out().is_some());

        pref.set_path("/sys/other");
        assert_eq!(pref.target(), Target::Single("/sys/other".into()));
        assert_eq!(pref.path().as_deref(), Some("/sys/other"));
    }

    #[test]
    fn set_paths_follows_multifile_mode() {
        let (mut pref, _store, _looper) =
            build(&PreferenceAttributes::default(), MockValueFile::new());
        assert!(!pref.is_supported());

        pref.set_paths(&paths(&["/sys/missing", "/sys/a", "/sys/b"]));
        assert_eq!(pref.target(), Target::Single("/sys/a".into()));

        pref.set_multi_file(true);
        pref.set_paths(&paths(&["/sys/a", "/sys/b"]));
        assert_eq!(
            pref.target(),
            Target::Multi {
                primary: "/sys/a".into(),
                paths: paths(&["/sys/a", "/sys/b"]),
            }
        );

        pref.set_paths(&paths(&["/sys/missing"]));
        assert_eq!(pref.path().as_deref(), Some("/sys/a"));
    }

    #[test]
    fn declared_single_path_forces_multifile_off() {
        let attrs = PreferenceAttributes::with_path("/sys/gov").multifile(true);
        let (pref, _store, _looper) = build(&attrs, MockValueFile::new());
        assert!(!pref.is_multi_file());
    }

    #[test]
    fn configure_is_idempotent() {
        let attrs = PreferenceAttributes::with_paths(["/sys/a", "/sys/b"])
            .multifile(true)
            .startup(false);
        let (mut pref, _store, _looper) = build(&attrs, MockValueFile::new());
        let snapshot = |p: &AutoEditTextPreference| {
            (p.target(), p.is_supported(), p.is_multi_file(), p.is_startup())
        };
        let first = snapshot(&pref);
        pref.configure(&attrs);
        let second = snapshot(&pref);
        assert_eq!(first, second);
    }
}
