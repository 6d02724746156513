/// Run-wide switches, read from `git config cmg.<key>` and then from CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// `cmg.verbose`: print every VCS command
    pub verbose: bool,
    /// `cmg.gitrebase`: rebase instead of merge when integrating a remote branch
    pub rebase: bool,
    /// `cmg.online`: fetch and push at all
    pub online: bool,
    /// `cmg.addnewfile`: add unversioned files before a Subversion commit
    pub add_new_files: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbose: false,
            rebase: true,
            online: true,
            add_new_files: true,
        }
    }
}

impl Settings {
    /// Keys looked up under the `cmg.` prefix
    pub const KEYS: [&'static str; 4] = ["verbose", "gitrebase", "online", "addnewfile"];

    /// Apply one raw `cmg.<key>` value. Anything but `true`/`false` in any case keeps the current value.
    pub fn apply_raw(&mut self, key: &str, raw: &str) -> bool {
        let value = match raw.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => return false,
        };
        let slot = match key {
            "verbose" => &mut self.verbose,
            "gitrebase" => &mut self.rebase,
            "online" => &mut self.online,
            "addnewfile" => &mut self.add_new_files,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Force verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose |= verbose;
        self
    }

    /// Force offline mode
    pub fn with_offline(mut self, offline: bool) -> Self {
        if offline {
            self.online = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.verbose);
        assert!(settings.rebase);
        assert!(settings.online);
        assert!(settings.add_new_files);
    }

    #[test]
    fn test_apply_raw_accepts_only_booleans() {
        let mut settings = Settings::default();
        assert!(settings.apply_raw("gitrebase", "false"));
        assert!(!settings.rebase);
        assert!(!settings.apply_raw("online", "no"));
        assert!(settings.online);
        assert!(!settings.apply_raw("colour", "true"));
    }

    #[test]
    fn test_apply_raw_ignores_case() {
        let mut settings = Settings::default();
        assert!(settings.apply_raw("verbose", " TRUE "));
        assert!(settings.verbose);
        assert!(settings.apply_raw("online", "False"));
        assert!(!settings.online);
    }

    #[test]
    fn test_cli_overrides() {
        let settings = Settings::default().with_verbose(true).with_offline(true);
        assert!(settings.verbose);
        assert!(!settings.online);
        let untouched = Settings::default().with_verbose(false).with_offline(false);
        assert_eq!(untouched, Settings::default());
    }
}
