use clap::{App, AppSettings, Arg, SubCommand};
use ed25519_dalek::SecretKey;
use tracing_subscriber::EnvFilter;

mod command_keygen;
mod command_poll;
mod command_run;
mod command_vote;
mod command_voter;

use command_keygen::*;
use command_poll::*;
use command_run::*;
use command_vote::*;
use command_voter::*;

fn main() {
    let matches = App::new("StarVote CLI")
        .version("0.1")
        .about("Builds, signs and replays anonymous poll requests")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("secret-key")
                .long("secret-key")
                .takes_value(true)
                .help("Hex secret key - can also be set with STARVOTE_SECRET_KEY"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate a coordinator keypair"))
        .subcommand(
            SubCommand::with_name("poll")
                .about("Poll lifecycle requests")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("create")
                        .about("Create a poll coordinated by the secret key's owner")
                        .arg(Arg::with_name("POLL-ID").index(1).required(true))
                        .arg(
                            Arg::with_name("depth")
                                .long("depth")
                                .takes_value(true)
                                .default_value("20")
                                .help("Membership tree depth"),
                        )
                        .arg(
                            Arg::with_name("public")
                                .long("public")
                                .help("Let anyone add members"),
                        )
                        .arg(
                            Arg::with_name("live")
                                .long("live")
                                .help("Mark the poll as live"),
                        )
                        .arg(
                            Arg::with_name("info")
                                .long("info")
                                .takes_value(true)
                                .help("Encrypted poll metadata, in hex"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("start")
                        .about("Start a poll, publishing its encryption key")
                        .arg(Arg::with_name("POLL-ID").index(1).required(true))
                        .arg(Arg::with_name("ENCRYPTION-KEY").index(2).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("end")
                        .about("End a poll, publishing its decryption key")
                        .arg(Arg::with_name("POLL-ID").index(1).required(true))
                        .arg(Arg::with_name("DECRYPTION-KEY").index(2).required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("voter")
                .about("Membership requests")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("add")
                        .about("Add an identity commitment to a poll")
                        .arg(Arg::with_name("POLL-ID").index(1).required(true))
                        .arg(Arg::with_name("COMMITMENT").index(2).required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Vote requests")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("generate")
                        .about("Generate a vote carrying a development-only digest proof")
                        .arg(Arg::with_name("POLL-ID").index(1).required(true))
                        .arg(Arg::with_name("BALLOT").index(2).required(true))
                        .arg(Arg::with_name("NULLIFIER").index(3).required(true))
                        .arg(
                            Arg::with_name("ROOT")
                                .index(4)
                                .required(true)
                                .help("Membership root the proof is bound to"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Apply signed requests to an in-memory registry and print the events")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("JSON file holding a request or an array of requests"),
                ),
        )
        .get_matches();

    let filter = match matches.occurrences_of("v") {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let env_secret = std::env::var("STARVOTE_SECRET_KEY");
    let secret_key = match matches.value_of("secret-key") {
        Some(key) => Some(key.to_owned()),
        None => env_secret.ok(),
    };
    let secret_key = secret_key.map(|key| parse_secret_key(&expand(&key)));

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("keygen") {
        command_keygen(matches);
    }
    if let Some(matches) = matches.subcommand_matches("poll") {
        command_poll(matches, secret_key.as_ref());
    }
    if let Some(matches) = matches.subcommand_matches("voter") {
        command_voter(matches, secret_key.as_ref());
    }
    if let Some(matches) = matches.subcommand_matches("vote") {
        command_vote(matches);
    }
    if let Some(matches) = matches.subcommand_matches("run") {
        command_run(matches);
    }
}

/// Expand `~` and environment variables in an argument
pub fn expand(input: &str) -> String {
    match shellexpand::full(input) {
        Ok(expanded) => expanded.into_owned(),
        Err(e) => {
            eprintln!("starvote: unable to expand {}: {}", input, e);
            std::process::exit(1);
        }
    }
}

pub fn require_secret_key(secret_key: Option<&SecretKey>) -> &SecretKey {
    secret_key.unwrap_or_else(|| {
        eprintln!("Please provide a secret key either via --secret-key or STARVOTE_SECRET_KEY");
        std::process::exit(1);
    })
}

/// Read a required positional argument and parse it, exiting on failure
pub fn parse_arg<T>(matches: &clap::ArgMatches, name: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = expand(matches.value_of(name).unwrap_or_default());
    raw.parse().unwrap_or_else(|e| {
        eprintln!("starvote: invalid {}: {}", name, e);
        std::process::exit(1);
    })
}

pub fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("starvote: unable to serialize output: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_secret_key(hex_key: &str) -> SecretKey {
    let bytes = hex::decode(hex_key.trim()).unwrap_or_else(|e| {
        eprintln!("starvote: secret key is not valid hex: {}", e);
        std::process::exit(1);
    });
    SecretKey::from_bytes(&bytes).unwrap_or_else(|e| {
        eprintln!("starvote: invalid secret key: {}", e);
        std::process::exit(1);
    })
}
