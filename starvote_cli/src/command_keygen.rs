pub fn command_keygen(_matches: &clap::ArgMatches) {
    let (secret, public) = starvote::generate_keypair();

    println!("secret-key: {}", hex::encode(secret.to_bytes()));
    println!("public-key: {}", public);
}
