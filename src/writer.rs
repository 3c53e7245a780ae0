use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::parser::{Line, classify};

impl Config {
    /// Serialize the configuration.
    ///
    /// `header`, if given, is written first as comment lines. The default section is only
    /// written when it holds options. Values spanning several lines are written as indented
    /// continuation lines.
    ///
    /// Every line is checked against the parser before anything is written. Text that would read
    /// back differently fails with [`Error::Unrepresentable`]: an option named `remote` (taken
    /// for a `rem` comment), a continuation line such as `[t]` or `a = b`, a blank inner line, or
    /// a value carrying an inline comment.
    pub fn write_to<W: Write>(&self, mut writer: W, header: Option<&str>) -> Result<(), Error> {
        let text = self.render(header)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize to `path`. Nothing is created when the configuration cannot be written.
    pub fn write_file(&self, path: impl AsRef<Path>, header: Option<&str>) -> Result<(), Error> {
        let path = path.as_ref();
        debug!(path = %path.display(), "writing configuration");

        let text = self.render(header)?;
        let mut writer = BufWriter::new(fs::File::create(path)?);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn render(&self, header: Option<&str>) -> Result<String, Error> {
        let format = self.format();
        let mut out = String::with_capacity(1024);

        if let Some(header) = header {
            for line in header.lines() {
                let line = format!("{}{line}", format.comment);
                let shape = classify(&line, false);
                ensure(&line, matches!(shape, Line::Blank | Line::Comment))?;
                push_line(&mut out, &line);
            }
            out.push('\n');
        }

        let separator = format!(
            "{}{}{}",
            if format.pre_space { " " } else { "" },
            format.separator,
            if format.post_space { " " } else { "" },
        );

        for (i, section) in self.all_sections().iter().enumerate() {
            if i == 0 && section.is_empty() {
                continue;
            }

            let line = format!("[{}]", section.name());
            ensure(&line, classify(&line, false) == Line::Section(section.name()))?;
            push_line(&mut out, &line);

            for (option, value) in section.iter() {
                let mut lines = value.split('\n');
                let first = lines.next().unwrap_or_default();

                let line = format!("{option}{separator}{first}");
                ensure(&line, classify(&line, false) == Line::KeyValue(option, first))?;
                push_line(&mut out, &line);

                for text in lines {
                    let line = format!("\t{text}");
                    ensure(&line, classify(&line, true) == Line::Continuation(text))?;
                    push_line(&mut out, &line);
                }
            }

            out.push('\n');
        }

        Ok(out)
    }
}

/// `reads_back` tells whether `line` parses as the shape it was written for.
fn ensure(line: &str, reads_back: bool) -> Result<(), Error> {
    if reads_back {
        Ok(())
    } else {
        Err(Error::Unrepresentable {
            text: line.to_owned(),
        })
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use crate::{Config, Error, Format, Options};

    fn render(config: &Config, header: Option<&str>) -> String {
        let mut out = Vec::new();
        config.write_to(&mut out, header).expect("writing to memory cannot fail");
        String::from_utf8(out).expect("output should be UTF-8")
    }

    #[test]
    fn default_layout() {
        let config = Config::from_reader("top = 1\n[s]\na = 1\nb = x\n  y\n".as_bytes())
            .expect("failed to parse hardcoded config");

        assert_eq!(
            render(&config, Some("generated\nby hand")),
            "# generated\n# by hand\n\n[DEFAULT]\ntop: 1\n\n[s]\na: 1\nb: x\n\ty\n\n"
        );
    }

    #[test]
    fn empty_default_section_is_omitted() {
        let mut config = Config::new();
        config.add_section("empty");

        assert_eq!(render(&config, None), "[empty]\n\n");
    }

    #[test]
    fn custom_separator() {
        let options = Options {
            format: Format {
                comment: "; ".to_owned(),
                separator: "=".to_owned(),
                pre_space: true,
                post_space: true,
            },
            ..Options::default()
        };
        let mut config = Config::with_options(options);
        config.add_option("s", "a", "1");

        assert_eq!(render(&config, Some("hi")), "; hi\n\n[s]\na = 1\n\n");
    }

    fn unrepresentable(config: &Config) -> String {
        match config.write_to(Vec::new(), None) {
            Err(Error::Unrepresentable { text }) => text,
            other => panic!("expected an unrepresentable line, got {other:?}"),
        }
    }

    #[test]
    fn rejects_option_read_back_as_comment() {
        let mut config = Config::new();
        config.add_option("s", "remote", "1");

        assert_eq!(unrepresentable(&config), "remote: 1");
    }

    #[test]
    fn rejects_continuation_read_back_as_header() {
        let mut config = Config::new();
        config.add_option("s", "v", "x\n[t]");

        assert_eq!(unrepresentable(&config), "\t[t]");
    }

    #[test]
    fn rejects_lines_that_change_shape() {
        let cases = [
            ("key", "x\na = b"),
            ("key", "x\n\ny"),
            ("key", "1 # not a comment"),
            ("a=b", "1"),
        ];

        for (option, value) in cases {
            let mut config = Config::new();
            config.add_option("s", option, value);

            assert!(
                matches!(config.write_to(Vec::new(), None), Err(Error::Unrepresentable { .. })),
                "{option:?} = {value:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_untrimmed_section_name() {
        let mut config = Config::new();
        config.add_option(" s ", "a", "1");

        assert_eq!(unrepresentable(&config), "[ s ]");
    }

    #[test]
    fn rejected_file_is_not_created() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("out.ini");
        let mut config = Config::new();
        config.add_option("s", "remote", "1");

        assert!(config.write_file(&path, None).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn written_values_read_back() {
        let mut config = Config::new();
        config.add_option("", "top", "1");
        config.add_option("s", "url", "http://example.org:80/?q=1");
        config.add_option("s", "motd", "hello\nworld");
        config.add_option("s", "empty", "");

        let text = render(&config, Some("generated"));
        let again = Config::from_reader(text.as_bytes()).expect("written text should parse");

        assert_eq!(again.raw_value("", "top"), Some("1"));
        assert_eq!(again.raw_value("s", "url"), Some("http://example.org:80/?q=1"));
        assert_eq!(again.raw_value("s", "motd"), Some("hello\nworld"));
        assert_eq!(again.raw_value("s", "empty"), Some(""));
    }
}
