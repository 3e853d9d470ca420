use std::{env, fs, process::ExitCode, str::FromStr};

use flagenum::{EnumOptions, FlagEnum, Resolved};
use tracing_subscriber::EnvFilter;

/// Enum definition file: the labels plus any [`EnumOptions`] field.
///
/// ```json
/// {"name": "DOW", "keys": ["mon", "tue", "wed"], "read_only": false}
/// ```
#[derive(Debug, serde::Deserialize)]
struct Definition {
    #[serde(default)]
    keys: serde_json::Value,
    #[serde(flatten)]
    options: EnumOptions,
}

/// Commands applied in order after the definition is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
enum Command {
    /// `get <key>`: single member by label or position.
    Get,
    /// `resolve <key>`: full lookup protocol.
    Resolve,
    /// `flag <label>`
    Flag,
    /// `in <label> <combo>`: is the member part of the combination?
    In,
    /// `keyfor <flag>`
    KeyFor,
    Append,
    Prepend,
    /// `insert <label> <position>`
    Insert,
    Remove,
    /// `rename <old> <new>`
    Rename,
    Keys,
    Report,
}

impl Command {
    fn arity(self) -> usize {
        match self {
            Self::Keys | Self::Report => 0,
            Self::In | Self::Insert | Self::Rename => 2,
            _ => 1,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((file_path, commands)) = args.split_first() else {
        eprintln!("usage: flagenum <definition.json> [command args...]");
        return ExitCode::FAILURE;
    };

    let mut flags = match load_definition(file_path) {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if commands.is_empty() {
        println!("{flags}");
        return ExitCode::SUCCESS;
    }

    let mut rest = commands;
    while let Some((name, tail)) = rest.split_first() {
        let Ok(command) = Command::from_str(name) else {
            eprintln!("error: unknown command {name:?}");
            return ExitCode::FAILURE;
        };
        if tail.len() < command.arity() {
            eprintln!("error: {command} takes {} argument(s)", command.arity());
            return ExitCode::FAILURE;
        }
        let (command_args, next) = tail.split_at(command.arity());
        if let Err(err) = run(&mut flags, command, command_args) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
        rest = next;
    }
    ExitCode::SUCCESS
}

fn run(flags: &mut FlagEnum, command: Command, args: &[String]) -> Result<(), String> {
    match (command, args) {
        (Command::Get, [key]) => {
            let member = flags.get(key);
            println!("{member} index={} flag={}", member.index(), member.flag());
        }
        (Command::Resolve, [key]) => match flags.resolve(key) {
            Resolved::Member(member) => println!("member {member} index={} flag={}", member.index(), member.flag()),
            Resolved::Combo(combo) => println!("combo {combo}"),
            Resolved::Flag(flag) => println!("flag {flag}"),
            Resolved::Predicate(predicate) => println!("predicate {} flag={}", predicate.label(), predicate.flag()),
        },
        (Command::Flag, [label]) => println!("{}", flags.flag_of(label)),
        (Command::In, [label, combo]) => {
            println!("{}", flags.predicate(label).test(flags.combo(combo)));
        }
        (Command::KeyFor, [flag]) => {
            let flag: u128 = flag.parse().map_err(|err| format!("invalid flag {flag:?}: {err}"))?;
            println!("{}", flags.key_for(flag).unwrap_or_default());
        }
        (Command::Append, [label]) => flags.append(label),
        (Command::Prepend, [label]) => flags.prepend(label),
        (Command::Insert, [label, position]) => {
            let position = position
                .parse()
                .map_err(|err| format!("invalid position {position:?}: {err}"))?;
            flags.insert(label, position);
        }
        (Command::Remove, [label]) => flags.remove(label),
        (Command::Rename, [old, new]) => flags.rename(old, new),
        (Command::Keys, []) => println!("{}", flags.keys().join("\n")),
        (Command::Report, []) => println!("{flags}"),
        (command, args) => return Err(format!("{command} does not take {} argument(s)", args.len())),
    }
    Ok(())
}

fn load_definition(file_path: &str) -> Result<FlagEnum, String> {
    let contents = read_file(file_path)?;
    let definition: Definition =
        serde_json::from_str(&contents).map_err(|err| format!("invalid definition {file_path}: {err}"))?;
    FlagEnum::with_options(definition.keys, definition.options).map_err(|err| err.to_string())
}

fn read_file(file_path: &str) -> Result<String, String> {
    match fs::metadata(file_path) {
        Ok(metadata) => {
            if !metadata.is_file() {
                return Err(format!("{file_path} is not a file"));
            }
        }
        Err(err) => {
            return Err(format!("reading {file_path}: {err}"));
        }
    }
    fs::read_to_string(file_path).map_err(|err| format!("reading {file_path}: {err}"))
}
