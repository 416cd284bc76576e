use std::path::PathBuf;

use interpreter_core::{ColumnRowView, Msg, SubmissionMode, UnknownMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Core(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command :{0} (try :help)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("no column at index {0}")]
    NoSuchColumn(usize),
    #[error(transparent)]
    Mode(#[from] UnknownMode),
}

/// Turns one input line into a command. Plain text is a chat message;
/// column commands resolve indices against the columns currently shown.
pub fn parse_command(
    line: &str,
    columns: &[ColumnRowView],
) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Some(Command::Core(Msg::SubmitClicked {
            message: Some(line.to_string()),
        })));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let msg = match name {
        "help" | "h" => return Ok(Some(Command::Help)),
        "quit" | "q" => return Ok(Some(Command::Quit)),
        "load" => {
            if arg.is_empty() {
                return Err(CommandError::Usage(":load <path>"));
            }
            Msg::FileSelected {
                path: PathBuf::from(arg),
            }
        }
        "remove" => Msg::FileRemoved,
        "describe" => {
            let (index, text) = match arg.split_once(char::is_whitespace) {
                Some((index, text)) => (index, text.trim()),
                None => (arg, ""),
            };
            let column = resolve_column(index, columns, ":describe <index> <text>")?;
            Msg::AnnotationEdited {
                header: column.header.clone(),
                text: text.to_string(),
            }
        }
        "drop" => {
            let column = resolve_column(arg, columns, ":drop <index>")?;
            Msg::HeaderRemoved {
                index: column.index,
                header: column.header.clone(),
            }
        }
        "mode" => {
            if arg.is_empty() {
                return Err(CommandError::Usage(":mode <GPT-4|GPT-3.5>"));
            }
            Msg::ModeSelected(arg.parse::<SubmissionMode>()?)
        }
        "logging" => Msg::AllowLoggingToggled,
        "send" => Msg::SubmitClicked { message: None },
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(Command::Core(msg)))
}

fn resolve_column<'a>(
    raw: &str,
    columns: &'a [ColumnRowView],
    usage: &'static str,
) -> Result<&'a ColumnRowView, CommandError> {
    let index: usize = raw.parse().map_err(|_| CommandError::Usage(usage))?;
    columns.get(index).ok_or(CommandError::NoSuchColumn(index))
}

pub fn help_text() -> &'static str {
    "\
Commands:
  :load <path>              upload a CSV file
  :remove                   remove the uploaded file
  :describe <index> <text>  describe a column
  :drop <index>             leave a column out of the descriptions
  :mode <GPT-4|GPT-3.5>     choose the model
  :logging                  toggle server logging consent
  :send                     resubmit the conversation without a new message
  :help                     show this help
  :quit                     exit
Anything else is sent as a chat message."
}
