use std::io::{self, BufRead, Write};

/// Asks someone to pick one of several options.
///
/// Blocks until a choice is made. `None` means the choice was cancelled.
pub trait Chooser: Send + Sync {
    fn choose(&self, title: &str, options: &[String]) -> Option<usize>;
}

impl<F> Chooser for F
where
    F: Fn(&str, &[String]) -> Option<usize> + Send + Sync,
{
    fn choose(&self, title: &str, options: &[String]) -> Option<usize> {
        self(title, options)
    }
}

/// Cancels every choice. Useful when nobody is around to answer.
pub struct NoChoice;

impl Chooser for NoChoice {
    fn choose(&self, _title: &str, _options: &[String]) -> Option<usize> {
        None
    }
}

/// Prompts on stderr and reads a 1-based number from stdin.
pub struct PromptChooser;

impl Chooser for PromptChooser {
    fn choose(&self, title: &str, options: &[String]) -> Option<usize> {
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "{}:", title);
        for (i, option) in options.iter().enumerate() {
            let _ = writeln!(stderr, "  {}: {}", i + 1, option);
        }
        let _ = write!(stderr, "Choice (empty to cancel): ");
        let _ = stderr.flush();

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        parse_choice(&line, options.len())
    }
}

fn parse_choice(line: &str, count: usize) -> Option<usize> {
    let n: usize = line.trim().parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("2\n", 3), Some(1));
        assert_eq!(parse_choice("", 3), None);
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
    }

    #[test]
    fn test_closure_chooser() {
        let chooser = |_: &str, options: &[String]| Some(options.len() - 1);
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(chooser.choose("Select source", &options), Some(1));
        assert_eq!(NoChoice.choose("Select source", &options), None);
    }
}
