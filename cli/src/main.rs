//! `ctl`: drive a ctlspace tree from the command line.
//!
//! # Usage
//!
//! ```text
//! ctl --config synth.yaml call /synth/osc/freq 220
//! ctl --config synth.yaml list /synth/osc
//! ctl --config synth.yaml tree
//! ctl --config synth.yaml dump
//! ```
//!
//! Results go to stdout as JSON; logs and errors go to stderr.

mod args;

use std::path::{Path, PathBuf};
use std::process;

use ctlspace_core::config;
use ctlspace_core::{CtlError, Error, Root, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{parse_args, Command, USAGE};


fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args.iter().skip(1).map(|s| s.as_str()).collect();

    let invocation = match parse_args(&arg_refs) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("ctl: {}", e);
            process::exit(1);
        }
    };

    if invocation.command == Command::Help {
        println!("{}", USAGE);
        return;
    }

    let root = match build_root(resolve_config(invocation.config).as_deref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ctl: {}", e);
            process::exit(1);
        }
    };

    let result = execute(&root, &invocation.command);
    match result.as_error() {
        Some(e) => {
            eprintln!("ctl error: {}", e);
            process::exit(1);
        }
        None => println!("{}", result.to_json()),
    }
}


fn init_logging() {
    let filter = EnvFilter::try_from_env("CTLSPACE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}


fn resolve_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| std::env::var("CTLSPACE_CONFIG").ok().map(PathBuf::from))
}


fn build_root(config_path: Option<&Path>) -> Result<Root, CtlError> {
    match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading tree");
            Root::from_config(&config::load(path)?)
        }
        None => Ok(Root::new()),
    }
}


/// Run one command against the tree. Failures come back as Error values.
fn execute(root: &Root, command: &Command) -> Value {
    match command {
        Command::Call { path, json } => {
            let argument = match json {
                Some(text) => parse_argument(text),
                None => Value::Nil,
            };
            if argument.is_error() {
                return argument;
            }
            root.call(path, &argument)
        }
        Command::List { path } => inspect(root, path, |o| o.list_with_type()),
        Command::Type { path } => inspect(root, path, |o| o.type_with_current_value()),
        Command::Tree { path } => inspect(root, path, |o| o.tree()),
        Command::Dump => root.object().to_hash(),
        Command::Help => Value::string(USAGE),
    }
}


fn inspect(root: &Root, path: &str, f: impl Fn(&ctlspace_core::Object) -> Value) -> Value {
    match root.find_or_build(path).map(|h| h.get()) {
        Ok(Some(object)) => f(object.as_ref()),
        Ok(None) => Error::not_found(path).into(),
        Err(e) => e.into(),
    }
}


/// Parse a JSON argument; anything after the first document is an error.
fn parse_argument(text: &str) -> Value {
    let mut value = Value::Nil;
    let consumed = value.build_from_json(text);
    if value.is_error() {
        return value;
    }
    let trailing = text[consumed..].trim();
    if !trailing.is_empty() {
        return Error::bad_request(format!("unexpected text after JSON argument: '{}'", trailing))
            .into();
    }
    value
}
