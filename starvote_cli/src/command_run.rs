use crate::expand;
use starvote::{Config, PollRegistry, SignedRequest};
use starvote::{DigestVerifier, Event, Sha256Hasher};
use std::fs::read_to_string;

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Input {
    Many(Vec<SignedRequest>),
    One(SignedRequest),
}

/// Replay a file of signed requests against a fresh in-memory registry.
///
/// Rejected requests are reported and skipped; only unreadable input is fatal.
pub fn command_run(matches: &clap::ArgMatches) {
    let filename = expand(matches.value_of("INPUT").unwrap_or_default());

    let contents = read_to_string(&filename).unwrap_or_else(|e| {
        eprintln!("starvote run: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });
    let requests = match serde_json::from_str(&contents) {
        Ok(Input::Many(requests)) => requests,
        Ok(Input::One(request)) => vec![request],
        Err(e) => {
            eprintln!("starvote run: unable to parse {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("starvote run: {}", e);
        std::process::exit(1);
    });
    tracing::info!(?config, requests = requests.len(), "replaying requests");

    let mut registry = PollRegistry::new(config, Sha256Hasher, DigestVerifier);
    registry.subscribe(|event: &Event| match serde_json::to_string(event) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(%e, "unable to serialize event"),
    });

    for (n, request) in requests.iter().enumerate() {
        if let Err(e) = request.apply(&mut registry) {
            println!(
                "{}",
                serde_json::json!({
                    "type": "rejected",
                    "request": n,
                    "request_type": request.request_type(),
                    "poll_id": request.poll_id(),
                    "kind": e.kind(),
                    "error": e.to_string(),
                })
            );
        }
    }
}
