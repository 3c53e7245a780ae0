use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, GetError};
use crate::parser::{self, Store};
use crate::section::Section;
use crate::util;

/// Name of the section that holds options found before any header.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// The default section always lives at the front of the list.
const DEFAULT_INDEX: usize = 0;

/// How section and option names are compared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseMode {
    #[must_use]
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::Sensitive => a == b,
            Self::Insensitive => a
                .chars()
                .flat_map(char::to_lowercase)
                .eq(b.chars().flat_map(char::to_lowercase)),
        }
    }
}

/// Layout used when writing a configuration back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// Prefix for header comment lines.
    pub comment: String,
    /// Placed between an option name and its value.
    pub separator: String,
    pub pre_space: bool,
    pub post_space: bool,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            comment: "# ".to_owned(),
            separator: ":".to_owned(),
            pre_space: false,
            post_space: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub default_section: String,
    pub case: CaseMode,
    pub format: Format,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_section: DEFAULT_SECTION.to_owned(),
            case: CaseMode::default(),
            format: Format::default(),
        }
    }
}

/// An in-memory configuration: named sections of string options.
#[derive(Debug, Clone)]
pub struct Config {
    sections: Vec<Section>,
    case: CaseMode,
    format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// An empty `default_section` falls back to [`DEFAULT_SECTION`].
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        let default_section = if options.default_section.is_empty() {
            DEFAULT_SECTION.to_owned()
        } else {
            options.default_section
        };

        let mut sections = Vec::with_capacity(16);
        sections.push(Section::new(default_section));

        Self {
            sections,
            case: options.case,
            format: options.format,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Self::from_reader_with(reader, Options::default())
    }

    pub fn from_reader_with<R: Read>(reader: R, options: Options) -> Result<Self, Error> {
        let mut config = Self::with_options(options);
        parser::parse(BufReader::new(reader), &mut config)?;
        Ok(config)
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::read_file_with(path, Options::default())
    }

    pub fn read_file_with(path: impl AsRef<Path>, options: Options) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading configuration");

        let file = fs::File::open(path)?;
        Self::from_reader_with(file, options)
    }

    #[must_use]
    pub fn case(&self) -> CaseMode {
        self.case
    }

    #[must_use]
    pub fn format(&self) -> &Format {
        &self.format
    }

    #[must_use]
    pub fn default_section(&self) -> &str {
        self.sections[DEFAULT_INDEX].name()
    }

    fn position(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return Some(DEFAULT_INDEX);
        }

        self.sections
            .iter()
            .position(|section| self.case.matches(section.name(), name))
    }

    /// Look up a section. The empty name refers to the default section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.position(name).map(|i| &self.sections[i])
    }

    /// Section names in the order they were created, starting with the default section.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::name)
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns `true` if the section was created, `false` if it already existed.
    pub fn add_section(&mut self, name: &str) -> bool {
        if self.has_section(name) {
            return false;
        }

        self.sections.push(Section::new(name.to_owned()));
        true
    }

    /// Remove a section and all of its options. The default section cannot be removed.
    pub fn remove_section(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(DEFAULT_INDEX) | None => false,
            Some(i) => {
                self.sections.remove(i);
                true
            }
        }
    }

    /// Set an option, creating the section if needed.
    ///
    /// Returns `true` if the option was inserted, `false` if an existing value was replaced.
    pub fn add_option(&mut self, section: &str, option: &str, value: impl Into<String>) -> bool {
        let i = if let Some(i) = self.position(section) {
            i
        } else {
            self.sections.push(Section::new(section.to_owned()));
            self.sections.len() - 1
        };

        self.sections[i].insert(option, value.into(), self.case)
    }

    pub fn remove_option(&mut self, section: &str, option: &str) -> bool {
        let case = self.case;
        self.position(section)
            .is_some_and(|i| self.sections[i].remove(option, case))
    }

    #[must_use]
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.raw_value(section, option).is_some()
    }

    /// Option names visible from `section`: its own, then those of the default section it does
    /// not shadow.
    pub fn options(&self, section: &str) -> Result<Vec<&str>, GetError> {
        let target = self.section(section).ok_or_else(|| GetError::SectionNotFound {
            section: section.to_owned(),
        })?;

        let mut names = target.iter().map(|(k, _)| k).collect::<Vec<_>>();
        let defaults = &self.sections[DEFAULT_INDEX];

        if !std::ptr::eq(target, defaults) {
            for (k, _) in defaults.iter() {
                if target.get(k, self.case).is_none() {
                    names.push(k);
                }
            }
        }

        Ok(names)
    }

    /// The stored value, without interpolation. Falls back to the default section.
    #[must_use]
    pub fn raw_value(&self, section: &str, option: &str) -> Option<&str> {
        self.section(section)
            .and_then(|s| s.get(option, self.case))
            .or_else(|| self.sections[DEFAULT_INDEX].get(option, self.case))
    }

    pub fn raw_string(&self, section: &str, option: &str) -> Result<&str, GetError> {
        self.raw_value(section, option)
            .ok_or_else(|| GetError::OptionNotFound {
                section: section.to_owned(),
                option: option.to_owned(),
            })
    }

    /// The value with every `%(name)s` reference replaced by the value of `name`, looked up in
    /// the same section and then in the default section.
    pub fn string(&self, section: &str, option: &str) -> Result<String, GetError> {
        let raw = self.raw_string(section, option)?;
        let value = util::expand(raw, |name| self.raw_value(section, name))?;
        Ok(value)
    }

    pub fn bool(&self, section: &str, option: &str) -> Result<bool, GetError> {
        let value = self.string(section, option)?;
        util::parse_bool(&value).ok_or(GetError::InvalidValue { value, kind: "bool" })
    }

    pub fn int(&self, section: &str, option: &str) -> Result<i64, GetError> {
        let value = self.string(section, option)?;
        value
            .trim()
            .parse()
            .map_err(|_| GetError::InvalidValue { value, kind: "int" })
    }

    pub fn float(&self, section: &str, option: &str) -> Result<f64, GetError> {
        let value = self.string(section, option)?;
        value
            .trim()
            .parse()
            .map_err(|_| GetError::InvalidValue { value, kind: "float" })
    }

    pub(crate) fn all_sections(&self) -> &[Section] {
        &self.sections
    }
}

impl Store for Config {
    fn add_section(&mut self, name: &str) -> bool {
        Config::add_section(self, name)
    }

    fn add_option(&mut self, section: &str, option: &str, value: String) -> bool {
        Config::add_option(self, section, option, value)
    }

    fn raw_value(&self, section: &str, option: &str) -> Option<&str> {
        Config::raw_value(self, section, option)
    }
}
