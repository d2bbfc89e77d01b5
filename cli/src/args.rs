//! Argument parsing for `ctl`.

use std::path::PathBuf;


/// A parsed invocation: global options plus one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config: Option<PathBuf>,
    pub command: Command,
}


#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Trigger the node at `path` with an optional JSON argument.
    Call { path: String, json: Option<String> },
    /// Children of `path` with their types.
    List { path: String },
    /// Meta-type of `path` filled with its current value.
    Type { path: String },
    /// Descendant urls of `path`.
    Tree { path: String },
    /// Whole tree as one hash.
    Dump,
    Help,
}


pub const USAGE: &str = "\
Usage: ctl [--config FILE] <command>

Commands:
  call PATH [JSON]   trigger PATH, print the result as JSON
  list PATH          children of PATH with their types
  type PATH          meta-type of PATH with its current value
  tree [PATH]        descendant urls of PATH
  dump               every value in the tree
  help               this text

Environment:
  CTLSPACE_CONFIG    tree file used when --config is absent
  CTLSPACE_LOG       log filter (default: warn)";


/// Parse arguments, without the program name.
pub fn parse_args(args: &[&str]) -> Result<Invocation, String> {
    let mut config = None;
    let mut rest = args;
    while let Some(first) = rest.first() {
        match *first {
            "--config" | "-c" => {
                let file = rest.get(1).ok_or("--config needs a file")?;
                config = Some(PathBuf::from(file));
                rest = &rest[2..];
            }
            flag if flag.starts_with("--config=") => {
                config = Some(PathBuf::from(&flag["--config=".len()..]));
                rest = &rest[1..];
            }
            _ => break,
        }
    }

    let command = parse_command(rest)?;
    Ok(Invocation { config, command })
}


fn parse_command(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'ctl help' for usage.".into());
    }

    match args[0] {
        "call" => parse_call(args),
        "list" => Ok(Command::List {
            path: required_path(args, "list")?,
        }),
        "type" => Ok(Command::Type {
            path: required_path(args, "type")?,
        }),
        "tree" => Ok(Command::Tree {
            path: args.get(1).copied().unwrap_or("/").to_string(),
        }),
        "dump" => Ok(Command::Dump),
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => Err(format!("Unknown command: '{}'", args[0])),
    }
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `ctl call <path> [json...]`
fn parse_call(args: &[&str]) -> Result<Command, String> {
    let path = required_path(args, "call PATH [JSON]")?;
    let json = if args.len() > 2 {
        Some(args[2..].join(" "))
    } else {
        None
    };
    Ok(Command::Call { path, json })
}

fn required_path(args: &[&str], usage: &str) -> Result<String, String> {
    args.get(1)
        .map(|p| p.to_string())
        .ok_or_else(|| format!("Usage: ctl {}", usage))
}
