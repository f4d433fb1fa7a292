use crate::{parse_arg, print_json, require_secret_key};
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use starvote::{AddVoter, Field, PollId, Principal, Signed, SignedRequest};

pub fn command_voter(matches: &clap::ArgMatches, secret_key: Option<&SecretKey>) {
    // Subcommands
    if let Some(matches) = matches.subcommand_matches("add") {
        let secret_key = require_secret_key(secret_key);
        command_voter_add(matches, secret_key);
    }
}

pub fn command_voter_add(matches: &clap::ArgMatches, secret_key: &SecretKey) {
    let caller = Principal::from(PublicKey::from(secret_key));

    let add_voter = AddVoter {
        poll_id: parse_arg::<PollId>(matches, "POLL-ID"),
        caller,
        commitment: parse_arg::<Field>(matches, "COMMITMENT"),
    };

    let signed = Signed::sign(secret_key, add_voter).unwrap_or_else(|e| {
        eprintln!("starvote voter add: unable to sign request: {}", e);
        std::process::exit(1);
    });
    print_json(&SignedRequest::AddVoter(signed));
}
