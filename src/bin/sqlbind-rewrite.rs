use clap::{Parser, Subcommand};
use serde_json::{Map, Value as JsonValue};
use tracing::Level;

use sqlbind::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rewrite :name placeholders and quote identifiers offline")]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Log rewrite details to stderr.
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inline sequence binds and list the placeholders left for the driver.
    Rewrite {
        #[arg(long)]
        sql: String,
        /// JSON object of bind values; arrays become sequences.
        #[arg(long, default_value = "{}")]
        binds: String,
        #[arg(long, value_enum, default_value = "ansi")]
        dialect: Dialect,
    },
    /// Quote dotted names and a trailing `AS` alias outside string literals.
    QuoteNames {
        #[arg(long)]
        text: String,
        #[arg(long, value_enum, default_value = "ansi")]
        dialect: Dialect,
    },
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match run(args.command) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Output lines for one subcommand.
fn run(command: Command) -> Result<Vec<String>, SqlBindError> {
    let lines = match command {
        Command::Rewrite { sql, binds, dialect } => {
            let values: Map<String, JsonValue> = serde_json::from_str(&binds)?;
            let mut store = BindStore::new();
            store.bind_values(values.into_iter().map(|(k, v)| (k, BindValue::from(v))));

            let out = match dialect {
                #[cfg(feature = "sqlite")]
                Dialect::Sqlite => rewrite(&sql, &store, &SqliteLiteralQuoter),
                _ => rewrite(&sql, &store, &AnsiLiteralQuoter),
            };
            vec![out.statement.into_owned(), serde_json::to_string(&out.placeholders)?]
        }
        Command::QuoteNames { text, dialect } => {
            vec![IdentifierQuoter::for_dialect(dialect).quote_names_in(&text)]
        }
    };
    Ok(lines)
}
