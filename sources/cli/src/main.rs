use std::process::exit;
use std::sync::Arc;

use args::Cli;
use clap::Parser;
use interpreter::error::Throwable;
use interpreter::object::numeric::Integral;
use interpreter::object::RuntimeValue;
use interpreter::VM;
use tracing::{error, info, Level};
use tracing_subscriber::fmt;

mod args;

fn main() {
    let args = Cli::parse();

    let format = fmt::format()
        .with_ansi(true)
        .without_time()
        .with_level(true)
        .with_target(false)
        .compact();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .event_format(format)
        .with_writer(std::io::stderr)
        .init();

    let classes = match jar::load(&args.path) {
        Ok(classes) => classes,
        Err(err) => {
            error!("{err}");
            exit(1);
        }
    };

    if classes.is_empty() {
        error!("{} holds no classes", args.path.display());
        exit(1);
    }

    for class in &classes {
        let name = class.name().unwrap_or_else(|_| "<unnamed>".into());
        let super_name = class.super_name().unwrap_or_default();

        if super_name.is_empty() {
            info!("loaded {name} ({} methods)", class.methods.values.len());
        } else {
            info!(
                "loaded {name} extends {super_name} ({} methods)",
                class.methods.values.len()
            );
        }
    }

    let Some(entry) = args.entry else {
        return;
    };

    let class = Arc::new(classes.into_iter().next().unwrap());
    let call_args: Vec<RuntimeValue> = args
        .args
        .iter()
        .map(|value| RuntimeValue::Integral(Integral::from(*value)))
        .collect();

    let mut vm = VM::new();
    match vm.call(class, None, &call_args, &entry) {
        Ok(Some(value)) => println!("{value}"),
        Ok(None) => info!("{entry} returned nothing"),
        Err(err) => {
            error!("uncaught exception in {entry}: {err}");
            if let Throwable::Runtime(thrown) = err {
                for source in &thrown.sources {
                    error!("  {source}");
                }
            }
            exit(1);
        }
    }
}
