//! A y/n consent dialog on the controlling terminal.

use async_trait::async_trait;
use consentui_core::presenter::{ConsentPresenter, ConsentPrompt, HostId, UserChoice};
use std::io::{self, BufRead, Write};

/// Reads the answer from stdin. There is no dismiss option: anything other
/// than yes or no asks again, and end of input counts as Decline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPresenter;

#[async_trait]
impl ConsentPresenter for TerminalPresenter {
    async fn present(&self, host: &HostId, prompt: &ConsentPrompt) -> UserChoice {
        tracing::debug!(%host, "Showing terminal consent dialog");
        let prompt = prompt.clone();
        let answer = tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            read_choice(&mut stdin.lock(), &mut io::stderr(), &prompt)
        })
        .await;

        match answer {
            Ok(Ok(choice)) => choice,
            Ok(Err(error)) => {
                tracing::warn!(%error, "Could not read answer, treating as decline");
                UserChoice::Declined
            }
            Err(error) => {
                tracing::warn!(%error, "Dialog task failed, treating as decline");
                UserChoice::Declined
            }
        }
    }
}

pub fn parse_answer(line: &str) -> Option<UserChoice> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(UserChoice::Accepted),
        "n" | "no" => Some(UserChoice::Declined),
        _ => None,
    }
}

/// Render `prompt` to `output` and read lines from `input` until one is an answer.
pub fn read_choice(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &ConsentPrompt,
) -> io::Result<UserChoice> {
    writeln!(output, "{}", prompt.title)?;
    writeln!(output, "{}", prompt.message)?;
    loop {
        write!(
            output,
            "[y] {} / [n] {}: ",
            prompt.allow_label, prompt.decline_label
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(UserChoice::Declined);
        }
        if let Some(choice) = parse_answer(&line) {
            return Ok(choice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Some(UserChoice::Accepted));
        assert_eq!(parse_answer(" YES "), Some(UserChoice::Accepted));
        assert_eq!(parse_answer("n"), Some(UserChoice::Declined));
        assert_eq!(parse_answer("No\r\n"), Some(UserChoice::Declined));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn test_read_choice_asks_until_answered() {
        let mut input = Cursor::new("\nlater\ny\n");
        let mut output = Vec::new();
        let choice = read_choice(&mut input, &mut output, &ConsentPrompt::default()).unwrap();

        assert_eq!(choice, UserChoice::Accepted);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("[y]").count(), 3);
        assert!(shown.starts_with(&ConsentPrompt::default().title));
    }

    #[test]
    fn test_end_of_input_declines() {
        let mut input = Cursor::new("what\n");
        let mut output = Vec::new();
        let choice = read_choice(&mut input, &mut output, &ConsentPrompt::default()).unwrap();
        assert_eq!(choice, UserChoice::Declined);
    }
}
