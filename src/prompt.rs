//! Line-oriented prompting over any reader/writer pair.
use crate::error::SessionError;
use std::fmt::Display;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Default)]
pub struct Question {
    /// Parameter name, used in error messages.
    pub field: &'static str,
    pub text: String,
    pub section: Option<String>,
    pub intro: Option<String>,
    pub options: Vec<String>,
    pub default: Option<String>,
    pub required: bool,
}

impl Question {
    pub fn new(field: &'static str, text: impl Into<String>) -> Self {
        Self {
            field,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn section(mut self, title: impl Into<String>) -> Self {
        self.section = Some(title.into());
        self
    }

    pub fn intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = Some(intro.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// `\n->> text (a/b) [default]: `, or the same ending in `:\n` when the
    /// text itself ends with a newline.
    pub fn prompt_line(&self) -> String {
        let opts = if self.options.is_empty() {
            String::new()
        } else {
            format!(" ({})", self.options.join("/"))
        };
        let default = match &self.default {
            Some(d) => format!(" [{}]", d),
            None => String::new(),
        };
        match self.text.strip_suffix('\n') {
            Some(text) => format!("\n->> {}{}{}:\n", text.trim_matches('\n'), opts, default),
            None => format!("\n->> {}{}{}: ", self.text, opts, default),
        }
    }
}

pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    pub fn say(&mut self, msg: impl Display) -> Result<(), SessionError> {
        writeln!(self.writer, "{}", msg)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn section(&mut self, title: &str) -> Result<(), SessionError> {
        self.say(format!("\n--------------{}--------------", title))
    }

    /// Prints the section banner and introduction of a question, if it has them.
    pub fn introduce(&mut self, question: &Question) -> Result<(), SessionError> {
        if let Some(title) = &question.section {
            self.section(title)?;
        }
        if let Some(intro) = &question.intro {
            self.say(intro)?;
        }
        Ok(())
    }

    /// Reads one line with the trailing newline removed. End of input is an error.
    pub fn read_line(&mut self, prompt: &str, field: &str) -> Result<String, SessionError> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(SessionError::InputTerminated(field.to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Asks until an acceptable answer is given. An empty answer becomes the
    /// default if there is one; a required question asks again.
    pub fn ask(&mut self, question: &Question) -> Result<String, SessionError> {
        loop {
            let answer = self.read_line(&question.prompt_line(), question.field)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            if let Some(default) = &question.default {
                return Ok(default.clone());
            }
            if !question.required {
                return Ok(String::new());
            }
            self.say("\n** This is a required entry. **")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), vec![])
    }

    fn output(p: Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_inner().1).unwrap()
    }

    #[test]
    fn test_prompt_line_format() {
        let q = Question::new("priority", "Enter the priority level for the order")
            .options(["low", "medium"])
            .default_value("medium");
        assert_eq!(
            q.prompt_line(),
            "\n->> Enter the priority level for the order (low/medium) [medium]: "
        );
        let q = Question::new("output", "Enter the output file\n");
        assert_eq!(q.prompt_line(), "\n->> Enter the output file:\n");
    }

    #[test]
    fn test_required_reasks_on_empty() {
        let mut p = prompter("\n  \nNAPL\n");
        let answer = p.ask(&Question::new("collections", "Collections").required()).unwrap();
        assert_eq!(answer, "NAPL");
        assert_eq!(output(p).matches("required entry").count(), 2);
    }

    #[test]
    fn test_default_and_optional() {
        let mut p = prompter("\n\n");
        let q = Question::new("no_order", "Search only?").default_value("n");
        assert_eq!(p.ask(&q).unwrap(), "n");
        assert_eq!(p.ask(&Question::new("dates", "Dates")).unwrap(), "");
    }

    #[test]
    fn test_end_of_input() {
        let mut p = prompter("");
        let err = p.ask(&Question::new("dates", "Dates")).unwrap_err();
        assert!(matches!(err, SessionError::InputTerminated(f) if f == "dates"));
    }
}
