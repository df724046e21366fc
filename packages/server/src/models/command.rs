//! In-band text protocol.
//!
//! `/name args` is a player command, `!name args` from an admin is an admin
//! command, and everything else is chat. Both command sets are closed enums
//! built through lookup tables, so an unknown name never reaches a variant.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartVote,
    Target {
        first: String,
        second: Option<String>,
    },
    Untarget,
    Vote(String),
    Unvote,
    Guilty,
    Innocent,
    Abstain,
    Rules,
    Role,
    Players,
    Games,
    Join(Option<usize>),
    New(Option<String>),
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Stop,
    Start,
    Resume,
    Restart,
    Time,
    Hold,
    Release,
    Yell(String),
    Help,
    /// Not part of the shared set; handed to the variant's own admin hook.
    Custom { name: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Chat(String),
    Command(Command),
    Admin(AdminCommand),
    Invalid(ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command /{0}. Type /rules for help.")]
    UnknownCommand(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

type Builder = fn(&[&str]) -> Result<Command, ParseError>;

struct CommandSpec {
    names: &'static [&'static str],
    usage: &'static str,
    build: Builder,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { names: &["start"], usage: "/start", build: build_start },
    CommandSpec { names: &["target", "t"], usage: "/target <name> [<name>]", build: build_target },
    CommandSpec { names: &["untarget", "ut"], usage: "/untarget", build: build_untarget },
    CommandSpec { names: &["vote", "v"], usage: "/vote <name>", build: build_vote },
    CommandSpec { names: &["unvote", "uv"], usage: "/unvote", build: build_unvote },
    CommandSpec { names: &["guilty", "g"], usage: "/guilty", build: build_guilty },
    CommandSpec { names: &["innocent", "i"], usage: "/innocent", build: build_innocent },
    CommandSpec { names: &["abstain", "a"], usage: "/abstain", build: build_abstain },
    CommandSpec { names: &["rules", "help"], usage: "/rules", build: build_rules },
    CommandSpec { names: &["role"], usage: "/role", build: build_role },
    CommandSpec { names: &["players", "who"], usage: "/players", build: build_players },
    CommandSpec { names: &["games", "list"], usage: "/games", build: build_games },
    CommandSpec { names: &["join"], usage: "/join [<number>]", build: build_join },
    CommandSpec { names: &["new"], usage: "/new [classic|oneday]", build: build_new },
    CommandSpec { names: &["leave"], usage: "/leave", build: build_leave },
];

fn build_start(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::StartVote)
}

fn build_target(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [first] => Ok(Command::Target {
            first: first.to_string(),
            second: None,
        }),
        [first, second] => Ok(Command::Target {
            first: first.to_string(),
            second: Some(second.to_string()),
        }),
        _ => Err(ParseError::Usage("/target <name> [<name>]")),
    }
}

fn build_untarget(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Untarget)
}

fn build_vote(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [name] => Ok(Command::Vote(name.to_string())),
        _ => Err(ParseError::Usage("/vote <name>")),
    }
}

fn build_unvote(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Unvote)
}

fn build_guilty(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Guilty)
}

fn build_innocent(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Innocent)
}

fn build_abstain(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Abstain)
}

fn build_rules(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Rules)
}

fn build_role(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Role)
}

fn build_players(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Players)
}

fn build_games(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Games)
}

fn build_join(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [] => Ok(Command::Join(None)),
        [number] => number
            .parse::<usize>()
            .map(|n| Command::Join(Some(n)))
            .map_err(|_| ParseError::Usage("/join [<number>]")),
        _ => Err(ParseError::Usage("/join [<number>]")),
    }
}

fn build_new(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [] => Ok(Command::New(None)),
        [kind] => Ok(Command::New(Some(kind.to_lowercase()))),
        _ => Err(ParseError::Usage("/new [classic|oneday]")),
    }
}

fn build_leave(_: &[&str]) -> Result<Command, ParseError> {
    Ok(Command::Leave)
}

type AdminBuilder = fn(&str) -> AdminCommand;

const ADMIN_COMMANDS: &[(&str, AdminBuilder)] = &[
    ("stop", |_| AdminCommand::Stop),
    ("start", |_| AdminCommand::Start),
    ("resume", |_| AdminCommand::Resume),
    ("restart", |_| AdminCommand::Restart),
    ("time", |_| AdminCommand::Time),
    ("hold", |_| AdminCommand::Hold),
    ("release", |_| AdminCommand::Release),
    ("yell", |rest| AdminCommand::Yell(rest.to_string())),
    ("help", |_| AdminCommand::Help),
];

pub const ADMIN_HELP: &str =
    "!stop, !start, !resume, !restart, !time, !hold, !release, !yell <message>, !help";

impl Input {
    pub fn parse(text: &str, admin: bool) -> Input {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('/') {
            return match parse_command(rest) {
                Ok(command) => Input::Command(command),
                Err(e) => Input::Invalid(e),
            };
        }
        if admin {
            if let Some(rest) = text.strip_prefix('!') {
                return Input::Admin(parse_admin(rest));
            }
        }
        Input::Chat(text.to_string())
    }
}

fn parse_command(text: &str) -> Result<Command, ParseError> {
    let mut words = text.split_whitespace();
    let name = words.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = words.collect();
    let spec = COMMANDS
        .iter()
        .find(|spec| spec.names.contains(&name.as_str()))
        .ok_or_else(|| ParseError::UnknownCommand(name.clone()))?;
    (spec.build)(&args).map_err(|e| match e {
        ParseError::Usage(_) => ParseError::Usage(spec.usage),
        other => other,
    })
}

fn parse_admin(text: &str) -> AdminCommand {
    let (name, rest) = match text.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (text, ""),
    };
    let name = name.to_lowercase();
    match ADMIN_COMMANDS.iter().find(|(n, _)| *n == name) {
        Some((_, build)) => build(rest),
        None => AdminCommand::Custom {
            name,
            args: rest.split_whitespace().map(str::to_string).collect(),
        },
    }
}
