//! Interactive confirmation for the fix step.

use log::warn;
use papirus_apps::{Choice, FixPrompt, UnmatchedApp};
use std::io::{self, BufRead, Write};

/// Reads answers line by line from `input`, writing questions to `output`.
/// End of input, or a failing `output`, answers "no".
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// `None` at end of input.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }

    fn try_confirm_batch(&mut self, count: usize) -> io::Result<bool> {
        writeln!(
            self.output,
            "\nFound {count} applications that could use Papirus icons."
        )?;
        let answer = self.ask("Do you want to apply fixes? (y/n): ")?;
        Ok(matches!(answer.as_deref(), Some("y" | "yes")))
    }

    fn try_choose(&mut self, entry: &UnmatchedApp) -> io::Result<Choice> {
        writeln!(self.output, "\nApp: {}", entry.app.name)?;
        writeln!(self.output, "Current icon: {}", entry.app.icon)?;
        if let [only] = entry.suggestions.as_slice() {
            writeln!(self.output, "Suggested icon: {only}")?;
        } else {
            writeln!(self.output, "Suggested icons:")?;
            for (i, icon) in entry.suggestions.iter().enumerate() {
                writeln!(self.output, "  {}) {}", i + 1, icon)?;
            }
        }

        loop {
            let Some(answer) = self.ask("Apply this fix? (y/n/s=skip, or a number): ")? else {
                return Ok(Choice::Skip);
            };
            match answer.as_str() {
                "" | "y" | "yes" => return Ok(Choice::Apply(0)),
                "n" | "no" | "s" | "skip" => return Ok(Choice::Skip),
                other => match other.parse::<usize>() {
                    Ok(n) if (1..=entry.suggestions.len()).contains(&n) => {
                        return Ok(Choice::Apply(n - 1));
                    }
                    _ => writeln!(self.output, "Please answer y, n, s or a listed number.")?,
                },
            }
        }
    }
}

impl<R: BufRead, W: Write> FixPrompt for LinePrompt<R, W> {
    fn confirm_batch(&mut self, count: usize) -> bool {
        self.try_confirm_batch(count).unwrap_or_else(|e| {
            warn!("Prompt failed, not applying fixes: {}", e);
            false
        })
    }

    fn choose(&mut self, entry: &UnmatchedApp) -> Choice {
        self.try_choose(entry).unwrap_or_else(|e| {
            warn!("Prompt failed, skipping {}: {}", entry.app.name, e);
            Choice::Skip
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papirus_apps::{AppDescriptor, PackageOrigin};
    use std::io::Cursor;
    use std::path::PathBuf;

    fn entry(suggestions: &[&str]) -> UnmatchedApp {
        UnmatchedApp {
            app: AppDescriptor {
                name: "Tool".to_string(),
                icon: "tool".to_string(),
                exec: "tool".to_string(),
                categories: String::new(),
                comment: String::new(),
                file_path: PathBuf::from("/usr/share/applications/tool.desktop"),
                origin: PackageOrigin::Apt,
            },
            resolved_path: None,
            current_theme: "unknown".to_string(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn prompt(input: &str) -> LinePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn batch_confirmation_accepts_yes_only() {
        assert!(prompt("y\n").confirm_batch(2));
        assert!(prompt("YES\n").confirm_batch(2));
        assert!(!prompt("n\n").confirm_batch(2));
        assert!(!prompt("").confirm_batch(2));
    }

    #[test]
    fn choices_map_to_suggestions() {
        let e = entry(&["a", "b", "c"]);
        assert_eq!(prompt("\n").choose(&e), Choice::Apply(0));
        assert_eq!(prompt("y\n").choose(&e), Choice::Apply(0));
        assert_eq!(prompt("3\n").choose(&e), Choice::Apply(2));
        assert_eq!(prompt("s\n").choose(&e), Choice::Skip);
        assert_eq!(prompt("no\n").choose(&e), Choice::Skip);
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let e = entry(&["a", "b"]);
        let mut p = prompt("7\nmaybe\n2\n");

        assert_eq!(p.choose(&e), Choice::Apply(1));
        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches("Please answer").count(), 2);
        assert!(shown.contains("  2) b"));
    }

    #[test]
    fn end_of_input_skips() {
        assert_eq!(prompt("maybe\n").choose(&entry(&["a"])), Choice::Skip);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unwritable_output_declines_and_skips() {
        let mut p = LinePrompt::new(Cursor::new(b"y\ny\n".to_vec()), BrokenPipe);

        assert!(!p.confirm_batch(1));
        assert_eq!(p.choose(&entry(&["a"])), Choice::Skip);
    }
}
