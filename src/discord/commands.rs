use crate::chat::ChatMode;

pub const GREETING: &str = "(Crimson eyes glow) The illusion begins anew.";
pub const FAILURE_REPLY: &str = "(Coughs blood) My vision blurs... (Error)";
pub const HELP_TEXT: &str = "**Commands**\n\
                             `/start` or `/reset`: forget this conversation and begin again\n\
                             `/mode`: switch between normal and analysis mode\n\
                             `/mode normal` or `/mode analysis`: pick a mode\n\
                             `/help`: show this message\n\
                             Anything else is answered in character.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeArg {
    Toggle,
    Set(ChatMode),
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
    Help,
    Mode(ModeArg),
    Unknown(String),
}

/// Parses `/name [args]`. Returns `None` for ordinary chat text.
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.trim().strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next()?.to_ascii_lowercase();
    let args = parts.next().map(str::trim).unwrap_or("");

    let command = match name.as_str() {
        "start" => Command::Start,
        "reset" => Command::Reset,
        "help" => Command::Help,
        "mode" if args.is_empty() => Command::Mode(ModeArg::Toggle),
        "mode" => match args.parse::<ChatMode>() {
            Ok(mode) => Command::Mode(ModeArg::Set(mode)),
            Err(_) => Command::Mode(ModeArg::Invalid(args.to_string())),
        },
        "" => return None,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

pub fn mode_reply(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Normal => "(The Sharingan fades) We speak as before.",
        ChatMode::Analysis => {
            "(Mangekyō awakens) Analysis mode. Show me the code, and I will see through it."
        }
    }
}
