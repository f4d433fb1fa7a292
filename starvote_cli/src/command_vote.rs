use crate::{expand, parse_arg, print_json};
use starvote::{
    Ballot, CastVote, DigestVerifier, Field, PollId, PublicSignals, Request, Sha256Hasher,
};

pub fn command_vote(matches: &clap::ArgMatches) {
    // Subcommands
    if let Some(matches) = matches.subcommand_matches("generate") {
        command_vote_generate(matches);
    }
}

/// Print an unsigned vote whose proof only the digest verifier accepts
pub fn command_vote_generate(matches: &clap::ArgMatches) {
    let poll_id: PollId = parse_arg(matches, "POLL-ID");
    let ballot = Ballot::from(expand(matches.value_of("BALLOT").unwrap_or_default()).as_str());
    let nullifier: Field = parse_arg(matches, "NULLIFIER");
    let root: Field = parse_arg(matches, "ROOT");

    let signals = PublicSignals::new(&Sha256Hasher, root, nullifier, &ballot, poll_id);
    tracing::warn!("digest proofs carry no anonymity; use them for local testing only");

    let vote = Request::CastVote(CastVote {
        poll_id,
        ballot,
        nullifier,
        proof: DigestVerifier::prove(&signals),
    });
    print_json(&vote.unsigned());
}
