use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Name of the section holding fallback values for every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// One `[name]` block of a stream or baseline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    options: Vec<(String, String)>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: &str, value: String) {
        match self.options.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.options.push((key.to_string(), value)),
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        let before = self.options.len();
        self.options.retain(|(k, _)| k != key);
        before != self.options.len()
    }

    fn value_mut(&mut self, key: &str) -> Option<&mut String> {
        self.options
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Parse failure for a stream file or tag annotation.
///
/// Every offending line is collected before the error is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("File contains parsing errors: {source_name}{}", format_problems(.problems))]
pub struct ConfigParseError {
    /// File path or tag name the text came from
    pub source_name: String,
    /// (line number, line text) of every unparseable line
    pub problems: Vec<(usize, String)>,
}

fn format_problems(problems: &[(usize, String)]) -> String {
    problems
        .iter()
        .map(|(line, text)| format!("\n\t[line {:2}]: {}", line, text))
        .collect()
}

fn section_regex() -> &'static Regex {
    static SECTION: OnceLock<Regex> = OnceLock::new();
    SECTION.get_or_init(|| Regex::new(r"^\[(?P<name>[^\]]+)\]").expect("valid section regex"))
}

fn option_regex() -> &'static Regex {
    static OPTION: OnceLock<Regex> = OnceLock::new();
    OPTION.get_or_init(|| {
        Regex::new(r"^(?P<key>[^:=\s][^:=]*?)\s*[:=]\s*(?P<value>.*)$").expect("valid option regex")
    })
}

fn is_comment(trimmed: &str) -> bool {
    if trimmed.starts_with('#') || trimmed.starts_with(';') {
        return true;
    }
    trimmed
        .split_whitespace()
        .next()
        .map(|word| word.eq_ignore_ascii_case("rem"))
        .unwrap_or(false)
}

fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for (pos, byte) in bytes.iter().enumerate() {
        if *byte == b';' && pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
            return value[..pos].trim_end();
        }
    }
    value
}

/// Content of a value written as `"..."`, optionally followed by an inline comment.
fn unquote(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('"')?;
    inner.match_indices('"').find_map(|(pos, _)| {
        let rest = &inner[pos + 1..];
        let closes = rest.trim().is_empty()
            || (rest.starts_with(char::is_whitespace) && rest.trim_start().starts_with(';'));
        closes.then(|| &inner[..pos])
    })
}

/// Single-line values that would not read back verbatim unquoted
fn needs_quotes(value: &str) -> bool {
    !value.contains('\n')
        && (value.starts_with('"')
            || value != value.trim()
            || value.contains(" ;")
            || value.contains("\t;"))
}

/// Ordered, layered configuration: component sections plus `[DEFAULT]` fallbacks.
///
/// Used both for the stream files at the container root and for the baseline
/// text stored in a tag annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    defaults: Vec<(String, String)>,
    sections: Vec<Section>,
}

impl ConfigSnapshot {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text. `source_name` only appears in error messages.
    pub fn parse(text: &str, source_name: &str) -> Result<Self, ConfigParseError> {
        let mut snapshot = Self::new();
        snapshot.merge_str(text, source_name)?;
        Ok(snapshot)
    }

    /// Parse `text` and layer it on top of this snapshot. Later values win per section and key.
    ///
    /// Nothing is merged when the text contains a parse error.
    pub fn merge_str(&mut self, text: &str, source_name: &str) -> Result<(), ConfigParseError> {
        let layer = Self::parse_layer(text, source_name)?;
        self.merge(layer);
        Ok(())
    }

    /// Layer `other` on top of this snapshot.
    pub fn merge(&mut self, other: ConfigSnapshot) {
        for (key, value) in other.defaults {
            match self.defaults.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => self.defaults.push((key, value)),
            }
        }
        for section in other.sections {
            let target = self.section_entry(&section.name);
            for (key, value) in section.options {
                target.set(&key, value);
            }
        }
    }

    fn parse_layer(text: &str, source_name: &str) -> Result<Self, ConfigParseError> {
        #[derive(Clone, Copy)]
        enum Cursor {
            None,
            Defaults,
            Section(usize),
        }

        let mut snapshot = Self::new();
        let mut problems = Vec::new();
        let mut cursor = Cursor::None;
        let mut last_key: Option<String> = None;

        for (index, line) in text.lines().enumerate() {
            let lineno = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                continue;
            }

            let indented = line.starts_with(|c: char| c.is_whitespace());
            let is_header = section_regex().is_match(trimmed);
            let is_option = option_regex().is_match(trimmed);

            if indented && !is_header && !is_option {
                if let Some(key) = &last_key {
                    let slot = match cursor {
                        Cursor::Defaults => snapshot
                            .defaults
                            .iter_mut()
                            .find(|(k, _)| k == key)
                            .map(|(_, v)| v),
                        Cursor::Section(pos) => snapshot.sections[pos].value_mut(key),
                        Cursor::None => None,
                    };
                    if let Some(value) = slot {
                        value.push('\n');
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(caps) = section_regex().captures(trimmed) {
                let name = caps["name"].trim().to_string();
                cursor = if name == DEFAULT_SECTION {
                    Cursor::Defaults
                } else {
                    Cursor::Section(snapshot.section_index(&name))
                };
                last_key = None;
                continue;
            }

            if let Some(caps) = option_regex().captures(trimmed) {
                let key = caps["key"].trim().to_lowercase();
                let raw = caps["value"].trim();
                let value = unquote(raw).unwrap_or_else(|| strip_inline_comment(raw)).to_string();
                match cursor {
                    Cursor::None => {
                        problems.push((lineno, line.to_string()));
                        continue;
                    }
                    Cursor::Defaults => match snapshot.defaults.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => snapshot.defaults.push((key.clone(), value)),
                    },
                    Cursor::Section(pos) => snapshot.sections[pos].set(&key, value),
                }
                last_key = Some(key);
                continue;
            }

            problems.push((lineno, line.to_string()));
        }

        if problems.is_empty() {
            Ok(snapshot)
        } else {
            Err(ConfigParseError {
                source_name: source_name.to_string(),
                problems,
            })
        }
    }

    fn section_index(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|s| s.name == name) {
            Some(pos) => pos,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        }
    }

    fn section_entry(&mut self, name: &str) -> &mut Section {
        let pos = self.section_index(name);
        &mut self.sections[pos]
    }

    /// Component section names in declaration order (`[DEFAULT]` excluded)
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Value of `key` in `section`, falling back to `[DEFAULT]`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.sections
            .iter()
            .find(|s| s.name == section)
            .and_then(|s| s.get(&key))
            .or_else(|| {
                self.defaults
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.as_str())
            })
    }

    /// Whether `get` would return a value
    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// Set `key` in `section`, creating the section when needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let key = key.to_lowercase();
        self.section_entry(section).set(&key, value.into());
    }

    /// Remove `key` from `section`. `[DEFAULT]` values are left alone.
    pub fn remove_option(&mut self, section: &str, key: &str) -> bool {
        let key = key.to_lowercase();
        self.sections
            .iter_mut()
            .find(|s| s.name == section)
            .map(|s| s.remove(&key))
            .unwrap_or(false)
    }

    /// True when there are neither sections nor defaults
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.defaults.is_empty()
    }
}

fn write_option(f: &mut fmt::Formatter<'_>, key: &str, value: &str) -> fmt::Result {
    if needs_quotes(value) {
        writeln!(f, "{} = \"{}\"", key, value)
    } else {
        writeln!(f, "{} = {}", key, value.replace('\n', "\n\t"))
    }
}

impl fmt::Display for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.defaults.is_empty() {
            writeln!(f, "[{}]", DEFAULT_SECTION)?;
            for (key, value) in &self.defaults {
                write_option(f, key, value)?;
            }
            writeln!(f)?;
        }
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.options {
                write_option(f, key, value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
