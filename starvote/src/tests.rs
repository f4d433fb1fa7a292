use crate::*;

// Root of a tree holding a single leaf at index 0, folded against the empty subtrees
fn single_leaf_root(poll_id: PollId, depth: usize, leaf: Field) -> Field {
    let hasher = Sha256Hasher;
    let mut zero = hash_poll_id(&hasher, poll_id);
    let mut node = leaf;
    for _ in 0..depth {
        node = hasher.hash2(&node, &zero);
        zero = hasher.hash2(&zero, &zero);
    }
    node
}

fn proof_for(root: Field, nullifier: Field, ballot: &str, poll_id: PollId) -> Proof {
    let signals = PublicSignals::new(&Sha256Hasher, root, nullifier, &Ballot::from(ballot), poll_id);
    DigestVerifier::prove(&signals)
}

#[test]
fn end_to_end() {
    let log = EventLog::new();
    let mut registry = PollRegistry::default();
    registry.subscribe(log.clone());

    let coordinator = Principal([9; 32]);
    let c1 = Field::from(0xc1);
    let n1 = Field::from(0x11);

    registry
        .create_poll(1, coordinator, 20, Visibility::Private, false, b"metadata".to_vec())
        .unwrap();

    let (index, r1) = registry.add_voter(&coordinator, 1, c1).unwrap();
    assert_eq!(index, 0);
    assert_eq!(r1, single_leaf_root(1, 20, c1));
    assert_eq!(registry.number_of_leaves(1).unwrap(), 1);

    registry.start_poll(&coordinator, 1, "enc1".into()).unwrap();
    assert_eq!(registry.phase(1).unwrap(), Phase::Started);
    assert_eq!(registry.encryption_key(1).unwrap(), Some("enc1"));

    let proof = proof_for(r1, n1, "yes", 1);
    registry
        .cast_vote(1, Ballot::from("yes"), n1, &proof)
        .unwrap();
    assert_eq!(
        log.last(),
        Some(Event::VoteAdded {
            poll_id: 1,
            ballot: Ballot::from("yes")
        })
    );

    let err = registry
        .cast_vote(1, Ballot::from("yes"), n1, &proof)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Replay);

    registry.end_poll(&coordinator, 1, "dec1".into()).unwrap();
    assert_eq!(registry.phase(1).unwrap(), Phase::Ended);
    assert_eq!(registry.decryption_key(1).unwrap(), Some("dec1"));

    let n2 = Field::from(0x12);
    let err = registry
        .cast_vote(1, Ballot::from("no"), n2, &proof_for(r1, n2, "no", 1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPhase);

    let events = log.events();
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.poll_id() == 1));
    assert_eq!(
        registry.votes(1).unwrap(),
        &[VoteRecord {
            poll_id: 1,
            ballot: Ballot::from("yes")
        }][..]
    );
}

#[test]
fn end_to_end_with_signed_requests() {
    let (secret, coordinator) = generate_keypair();
    let mut registry = PollRegistry::default();
    let log = EventLog::new();
    registry.subscribe(log.clone());

    let c1 = Field::from(0xc1);
    let n1 = Field::from(0x11);
    let r1 = single_leaf_root(1, 20, c1);

    let requests = vec![
        Request::CreatePoll(CreatePoll {
            poll_id: 1,
            coordinator,
            tree_depth: 20,
            visibility: Visibility::Private,
            live: false,
            encrypted_info: vec![],
        }),
        Request::AddVoter(AddVoter {
            poll_id: 1,
            caller: coordinator,
            commitment: c1,
        }),
        Request::StartPoll(StartPoll {
            poll_id: 1,
            caller: coordinator,
            encryption_key: "enc1".into(),
        }),
    ];
    for request in requests {
        let signed = request.sign(&secret).unwrap();
        // Requests travel as bytes
        let signed = SignedRequest::from_bytes(&signed.as_bytes().unwrap()).unwrap();
        signed.apply(&mut registry).unwrap();
    }
    assert_eq!(registry.merkle_root(1).unwrap(), r1);

    let vote = Request::CastVote(CastVote {
        poll_id: 1,
        ballot: Ballot::from("yes"),
        nullifier: n1,
        proof: proof_for(r1, n1, "yes", 1),
    })
    .unsigned();
    assert_eq!(
        vote.apply(&mut registry).unwrap(),
        Outcome::VoteAccepted { poll_id: 1 }
    );
    assert_eq!(
        vote.apply(&mut registry).unwrap_err().kind(),
        ErrorKind::Replay
    );

    let end = Request::EndPoll(EndPoll {
        poll_id: 1,
        caller: coordinator,
        decryption_key: "dec1".into(),
    })
    .sign(&secret)
    .unwrap();
    end.apply(&mut registry).unwrap();

    let json = serde_json::to_vec(&vote).unwrap();
    let replayed = SignedRequest::from_bytes(&json).unwrap();
    assert_eq!(
        replayed.apply(&mut registry).unwrap_err().kind(),
        ErrorKind::InvalidPhase
    );

    assert_eq!(log.len(), 5);
}

#[test]
fn failed_requests_are_idempotent() {
    let coordinator = Principal([9; 32]);
    let mut registry = PollRegistry::default();
    registry
        .create_poll(4, coordinator, 16, Visibility::Public, true, vec![])
        .unwrap();
    registry.add_voter(&coordinator, 4, Field::from(1)).unwrap();
    registry.start_poll(&coordinator, 4, "enc".into()).unwrap();

    let bad = Proof(vec![0; 32]);
    for _ in 0..3 {
        let err = registry
            .cast_vote(4, Ballot::from("yes"), Field::from(5), &bad)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CryptoRejected);
    }
    assert!(!registry.nullifier_used(4, &Field::from(5)).unwrap());
    assert!(registry.is_live_poll(4).unwrap());
}
