//! REPL 命令解析

use vt_core::{Result, VeritasError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask { prompt: String },
    Analyze { id: String },
    Feedback { id: String, is_correct: bool, feedback: String },
    Unresolved,
    Ping { message: String },
    Help,
    Clear,
    Quit,
}

pub const HELP: &str = "\
Available commands:
  ask <prompt>                      - Ask the responder and record the interaction
  analyze <id>                      - Re-run the reviewer on a stored interaction
  feedback <id> <true|false> [text] - Record a verdict and train the reviewer
  unresolved                        - List interactions still marked incorrect
  ping <message>                    - Send a raw message to the reviewer
  clear                             - Clear the screen
  help                              - Show this help message
  quit / exit                       - Exit the CLI";

/// 解析一行输入；空行返回 `Ok(None)`
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name {
        "ask" => Command::Ask {
            prompt: required(rest, "ask <prompt>")?.to_string(),
        },
        "analyze" => Command::Analyze {
            id: single_id(rest, "analyze <id>")?,
        },
        "feedback" => parse_feedback(rest)?,
        "unresolved" => Command::Unresolved,
        "ping" => Command::Ping {
            message: required(rest, "ping <message>")?.to_string(),
        },
        "help" => Command::Help,
        "clear" => Command::Clear,
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(VeritasError::InvalidInput(format!(
                "unknown command: {other}"
            )))
        }
    };
    Ok(Some(command))
}

fn parse_feedback(rest: &str) -> Result<Command> {
    const USAGE: &str = "feedback <id> <true|false> [text]";

    let mut parts = rest.splitn(3, char::is_whitespace);
    let id = parts.next().filter(|s| !s.is_empty());
    let verdict = parts.next();
    let (Some(id), Some(verdict)) = (id, verdict) else {
        return Err(usage(USAGE));
    };

    let is_correct = match verdict {
        "true" | "yes" | "y" => true,
        "false" | "no" | "n" => false,
        _ => return Err(usage(USAGE)),
    };

    Ok(Command::Feedback {
        id: id.to_string(),
        is_correct,
        feedback: parts.next().unwrap_or("").trim().to_string(),
    })
}

fn required<'a>(rest: &'a str, usage_text: &str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(usage(usage_text))
    } else {
        Ok(rest)
    }
}

fn single_id(rest: &str, usage_text: &str) -> Result<String> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(id), None) => Ok(id.to_string()),
        _ => Err(usage(usage_text)),
    }
}

fn usage(text: &str) -> VeritasError {
    VeritasError::InvalidInput(format!("usage: {text}"))
}
