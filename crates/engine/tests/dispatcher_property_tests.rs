mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use proptest::prelude::*;

use kehua_engine as ke;
use ke::ChallengeHandler;

struct Fixtures {
    anchor_pem: String,
    pinned_leaf: Vec<u8>,
    rogue_leaf: Vec<u8>,
}

fn fixtures() -> &'static Fixtures {
    static FIXTURES: OnceLock<Fixtures> = OnceLock::new();
    FIXTURES.get_or_init(|| {
        let (ca, leaf) = common::kehua_fixture();
        let rogue = common::make_ca("Rogue CA");
        let rogue_leaf =
            common::issue_leaf(&rogue, common::KEHUA_API_HOST, vec![common::ip_san(common::KEHUA_API_HOST)]);
        Fixtures {
            anchor_pem: ca.pem,
            pinned_leaf: leaf.der,
            rogue_leaf: rogue_leaf.der,
        }
    })
}

fn dispatcher(strict: bool) -> &'static ke::ChallengeDispatcher {
    static STRICT: OnceLock<ke::ChallengeDispatcher> = OnceLock::new();
    static PERMISSIVE: OnceLock<ke::ChallengeDispatcher> = OnceLock::new();
    let cell = if strict { &STRICT } else { &PERMISSIVE };
    cell.get_or_init(|| {
        let anchor = ke::AnchorSource::Pem(fixtures().anchor_pem.clone());
        let policy = ke::TrustPolicyConfig { anchor, strict_mode: strict };
        ke::ChallengeDispatcher::from_policy(&policy).expect("dispatcher")
    })
}

#[derive(Debug, Clone, Copy)]
enum Chain {
    Pinned,
    Rogue,
    Empty,
    Garbage,
    Absent,
}

fn chain_strategy() -> impl Strategy<Value = Chain> {
    prop_oneof![
        Just(Chain::Pinned),
        Just(Chain::Rogue),
        Just(Chain::Empty),
        Just(Chain::Garbage),
        Just(Chain::Absent),
    ]
}

fn method_strategy() -> impl Strategy<Value = ke::AuthenticationMethod> {
    prop_oneof![
        4 => Just(ke::AuthenticationMethod::ServerTrust),
        1 => Just(ke::AuthenticationMethod::HttpBasic),
        1 => Just(ke::AuthenticationMethod::HttpDigest),
        1 => Just(ke::AuthenticationMethod::ClientCertificate),
        1 => "[a-z]{1,12}".prop_map(ke::AuthenticationMethod::Other),
    ]
}

fn host_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(common::KEHUA_API_HOST.to_string()),
        Just("example.com".to_string()),
        Just(String::new()),
        "[a-z]{1,10}\\.test",
    ]
}

fn presented(chain: Chain) -> Option<ke::PresentedTrust> {
    let f = fixtures();
    match chain {
        Chain::Pinned => Some(common::chain(&[&f.pinned_leaf])),
        Chain::Rogue => Some(common::chain(&[&f.rogue_leaf])),
        Chain::Empty => Some(ke::PresentedTrust::default()),
        Chain::Garbage => Some(common::chain(&[b"\x30\x03\x02\x01"])),
        Chain::Absent => None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn every_challenge_completes_exactly_once(
        strict in any::<bool>(),
        method in method_strategy(),
        chain in chain_strategy(),
        host in host_strategy(),
        port in any::<u16>(),
    ) {
        let space = ke::ProtectionSpace {
            host: host.clone(),
            port,
            authentication_method: method.clone(),
            server_trust: presented(chain),
        };

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));
        let (calls_in, seen_in) = (Arc::clone(&calls), Arc::clone(&seen));
        dispatcher(strict).on_challenge(
            space,
            Box::new(move |decision| {
                calls_in.fetch_add(1, Ordering::SeqCst);
                *seen_in.lock().unwrap() = Some(decision.kind());
            }),
        );

        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
        let kind = seen.lock().unwrap().take().expect("decision recorded");

        let server_trust = method.is_server_trust() && !matches!(chain, Chain::Absent);
        let expected = if !server_trust {
            ke::DecisionKind::DefaultHandling
        } else if !strict {
            ke::DecisionKind::UseCredential
        } else if matches!(chain, Chain::Pinned) && host == common::KEHUA_API_HOST {
            ke::DecisionKind::UseCredential
        } else {
            ke::DecisionKind::CancelChallenge
        };
        prop_assert_eq!(kind, expected);
    }
}
