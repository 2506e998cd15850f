//! Line-oriented terminal prompts

use std::io::{self, BufRead, IsTerminal, Write};

use super::WizardError;

/// Question/answer channel with the operator.
pub trait Prompter {
    /// Show `question` and return the trimmed answer.
    ///
    /// End of input is reported as [`WizardError::Cancelled`].
    fn ask(&mut self, question: &str) -> Result<String, WizardError>;

    /// Like [`Prompter::ask`], for answers that must not be echoed.
    fn ask_secret(&mut self, question: &str) -> Result<String, WizardError> {
        self.ask(question)
    }

    /// Show a block of text.
    fn say(&mut self, text: &str) -> Result<(), WizardError>;
}

/// Prompter over any reader/writer pair; stdin/stdout in the binary.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    hide_secrets: bool,
}

impl TerminalPrompter<io::BufReader<io::Stdin>, io::Stdout> {
    /// Secrets are read with echo off when stdin is a terminal.
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let hide_secrets = stdin.is_terminal();
        Self {
            hide_secrets,
            ..Self::new(io::BufReader::new(stdin), io::stdout())
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            hide_secrets: false,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, question: &str) -> Result<String, WizardError> {
        write!(self.output, "{} ", question).map_err(WizardError::Output)?;
        self.output.flush().map_err(WizardError::Output)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(WizardError::Input)?;
        if read == 0 {
            return Err(WizardError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    fn ask_secret(&mut self, question: &str) -> Result<String, WizardError> {
        if !self.hide_secrets {
            return self.ask(question);
        }

        write!(self.output, "{} ", question).map_err(WizardError::Output)?;
        self.output.flush().map_err(WizardError::Output)?;
        let secret = rpassword::read_password().map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => WizardError::Cancelled,
            _ => WizardError::Input(e),
        })?;
        // Echo is off, so the operator's ENTER left the cursor on the prompt line
        writeln!(self.output).map_err(WizardError::Output)?;
        Ok(secret.trim().to_string())
    }

    fn say(&mut self, text: &str) -> Result<(), WizardError> {
        writeln!(self.output, "{}", text).map_err(WizardError::Output)
    }
}

/// Ask until a non-blank answer is given.
pub fn ask_required<P: Prompter + ?Sized>(p: &mut P, label: &str) -> Result<String, WizardError> {
    loop {
        let answer = p.ask(&format!("{}:", label))?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        p.say("  This field is required. Try again.")?;
    }
}

/// [`ask_required`] without echoing the answer.
pub fn ask_required_secret<P: Prompter + ?Sized>(
    p: &mut P,
    label: &str,
) -> Result<String, WizardError> {
    loop {
        let answer = p.ask_secret(&format!("{} (input hidden):", label))?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        p.say("  This field is required. Try again.")?;
    }
}

/// Ask once; a blank answer becomes `None`.
pub fn ask_optional<P: Prompter + ?Sized>(
    p: &mut P,
    label: &str,
) -> Result<Option<String>, WizardError> {
    let answer = p.ask(&format!("{} (optional):", label))?;
    Ok((!answer.is_empty()).then_some(answer))
}

/// Ask once; a blank answer becomes `default`.
pub fn ask_with_default<P: Prompter + ?Sized>(
    p: &mut P,
    label: &str,
    default: &str,
) -> Result<String, WizardError> {
    let answer = p.ask(&format!("{} [{}]:", label, default))?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

/// Yes/no question. Blank takes `default`; anything but y/yes is no.
pub fn confirm<P: Prompter + ?Sized>(
    p: &mut P,
    question: &str,
    default: bool,
) -> Result<bool, WizardError> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let answer = p.ask(&format!("{} {}:", question, hint))?;
    if answer.is_empty() {
        return Ok(default);
    }
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_ask_trims_and_echoes_question() {
        let mut p = prompter("  value \n");
        assert_eq!(p.ask("Name:").unwrap(), "value");
        assert_eq!(String::from_utf8(p.into_output()).unwrap(), "Name: ");
    }

    #[test]
    fn test_end_of_input_is_cancellation() {
        let mut p = prompter("");
        assert!(matches!(p.ask("Name:"), Err(WizardError::Cancelled)));
    }

    #[test]
    fn test_required_reprompts_on_blank() {
        let mut p = prompter("\n   \nfinally\n");
        assert_eq!(ask_required(&mut p, "Tenant ID").unwrap(), "finally");

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Tenant ID:").count(), 3);
        assert_eq!(output.matches("required").count(), 2);
    }

    #[test]
    fn test_required_cancelled_while_blank() {
        let mut p = prompter("\n\n");
        assert!(matches!(
            ask_required(&mut p, "Tenant ID"),
            Err(WizardError::Cancelled)
        ));
    }

    #[test]
    fn test_required_secret_reprompts_on_blank() {
        let mut p = prompter("\nsecret-value\n");
        assert_eq!(
            ask_required_secret(&mut p, "Client secret").unwrap(),
            "secret-value"
        );

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Client secret (input hidden):").count(), 2);
        assert!(!output.contains("secret-value"));
    }

    #[test]
    fn test_required_secret_cancelled_at_end_of_input() {
        let mut p = prompter("");
        assert!(matches!(
            ask_required_secret(&mut p, "Client secret"),
            Err(WizardError::Cancelled)
        ));
    }

    #[test]
    fn test_defaults() {
        let mut p = prompter("\n\nLibrary\n");
        assert_eq!(ask_optional(&mut p, "Path").unwrap(), None);
        assert_eq!(
            ask_with_default(&mut p, "Library", "Documents").unwrap(),
            "Documents"
        );
        assert_eq!(
            ask_with_default(&mut p, "Library", "Documents").unwrap(),
            "Library"
        );
    }

    #[test]
    fn test_confirm() {
        let mut p = prompter("\nYES\nn\nsure\n\n");
        assert!(!confirm(&mut p, "Overwrite?", false).unwrap());
        assert!(confirm(&mut p, "Overwrite?", false).unwrap());
        assert!(!confirm(&mut p, "Overwrite?", true).unwrap());
        assert!(!confirm(&mut p, "Overwrite?", true).unwrap());
        assert!(confirm(&mut p, "Overwrite?", true).unwrap());
    }
}
