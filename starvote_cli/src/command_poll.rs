use crate::{expand, parse_arg, print_json, require_secret_key};
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use starvote::{CreatePoll, EndPoll, PollId, Principal, Request, StartPoll, Visibility};

pub fn command_poll(matches: &clap::ArgMatches, secret_key: Option<&SecretKey>) {
    let secret_key = require_secret_key(secret_key);
    let caller = Principal::from(PublicKey::from(secret_key));

    let request = if let Some(matches) = matches.subcommand_matches("create") {
        command_poll_create(matches, caller)
    } else if let Some(matches) = matches.subcommand_matches("start") {
        Request::StartPoll(StartPoll {
            poll_id: parse_arg::<PollId>(matches, "POLL-ID"),
            caller,
            encryption_key: expand(matches.value_of("ENCRYPTION-KEY").unwrap_or_default()),
        })
    } else if let Some(matches) = matches.subcommand_matches("end") {
        Request::EndPoll(EndPoll {
            poll_id: parse_arg::<PollId>(matches, "POLL-ID"),
            caller,
            decryption_key: expand(matches.value_of("DECRYPTION-KEY").unwrap_or_default()),
        })
    } else {
        return;
    };

    let signed = request.sign(secret_key).unwrap_or_else(|e| {
        eprintln!("starvote poll: unable to sign request: {}", e);
        std::process::exit(1);
    });
    print_json(&signed);
}

fn command_poll_create(matches: &clap::ArgMatches, coordinator: Principal) -> Request {
    let encrypted_info = match matches.value_of("info") {
        Some(info) => hex::decode(expand(info)).unwrap_or_else(|e| {
            eprintln!("starvote poll create: info is not valid hex: {}", e);
            std::process::exit(1);
        }),
        None => vec![],
    };
    let visibility = if matches.is_present("public") {
        Visibility::Public
    } else {
        Visibility::Private
    };

    Request::CreatePoll(CreatePoll {
        poll_id: parse_arg(matches, "POLL-ID"),
        coordinator,
        tree_depth: parse_arg(matches, "depth"),
        visibility,
        live: matches.is_present("live"),
        encrypted_info,
    })
}
