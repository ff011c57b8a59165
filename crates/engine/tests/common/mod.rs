#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{IpAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use openssl::pkey::PKey;
use openssl::ssl::{SslAcceptor, SslMethod};
use openssl::x509::X509;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyUsagePurpose,
    SanType,
};

use kehua_engine as ke;

pub const KEHUA_ROOT_CA: &str = "KeHua Root CA";
pub const KEHUA_API_HOST: &str = "120.48.25.62";

/// A CA generated with rcgen plus its PEM, for use as a pinned anchor.
pub struct TestCa {
    pub cert: Certificate,
    pub der: Vec<u8>,
    pub pem: String,
}

/// A server certificate issued by a `TestCa`.
pub struct TestLeaf {
    pub der: Vec<u8>,
    pub pem: String,
    pub key_pem: String,
}

fn dn(cn: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    dn
}

pub fn make_ca(cn: &str) -> TestCa {
    let mut params = CertificateParams::new(vec![]);
    params.distinguished_name = dn(cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    let cert = Certificate::from_params(params).expect("ca cert");
    let der = cert.serialize_der().expect("ca der");
    let pem = ke::encode_pem(&der);
    TestCa { cert, der, pem }
}

pub fn ip_san(ip: &str) -> SanType {
    SanType::IpAddress(ip.parse::<IpAddr>().expect("ip literal"))
}

pub fn dns_san(name: &str) -> SanType {
    SanType::DnsName(name.to_string())
}

pub fn issue_leaf(ca: &TestCa, cn: &str, sans: Vec<SanType>) -> TestLeaf {
    let mut params = CertificateParams::new(vec![]);
    params.distinguished_name = dn(cn);
    params.subject_alt_names = sans;
    let cert = Certificate::from_params(params).expect("leaf cert");
    let der = cert.serialize_der_with_signer(&ca.cert).expect("leaf der");
    let pem = ke::encode_pem(&der);
    let key_pem = cert.serialize_private_key_pem();
    TestLeaf { der, pem, key_pem }
}

/// A self-signed server certificate, the shape of the shipped anchor.
pub fn self_signed(cn: &str, sans: Vec<SanType>) -> TestLeaf {
    let mut params = CertificateParams::new(vec![]);
    params.distinguished_name = dn(cn);
    params.subject_alt_names = sans;
    let cert = Certificate::from_params(params).expect("self-signed cert");
    let der = cert.serialize_der().expect("self-signed der");
    let pem = ke::encode_pem(&der);
    let key_pem = cert.serialize_private_key_pem();
    TestLeaf { der, pem, key_pem }
}

/// The "KeHua Root CA" and a leaf it issued for the production API host.
pub fn kehua_fixture() -> (TestCa, TestLeaf) {
    let ca = make_ca(KEHUA_ROOT_CA);
    let leaf = issue_leaf(&ca, KEHUA_API_HOST, vec![ip_san(KEHUA_API_HOST)]);
    (ca, leaf)
}

pub fn chain(certs: &[&[u8]]) -> ke::PresentedTrust {
    ke::PresentedTrust::from_der_chain(certs.iter().map(|c| c.to_vec()))
}

pub fn pinned_to(ca: &TestCa, strict: bool) -> ke::TrustPolicyConfig {
    let anchor = ke::AnchorSource::Pem(ca.pem.clone());
    if strict {
        ke::TrustPolicyConfig::strict(anchor)
    } else {
        ke::TrustPolicyConfig::permissive(anchor)
    }
}

pub fn evaluator(ca: &TestCa, strict: bool) -> ke::TrustEvaluator {
    ke::TrustEvaluator::from_policy(&pinned_to(ca, strict)).expect("evaluator")
}

/// Minimal HTTPS server on 127.0.0.1 that answers every request with a fixed
/// status line and records request bodies.
pub struct TestServer {
    pub port: u16,
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("https://127.0.0.1:{}", self.port)
    }

    pub fn request_count(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }
}

pub fn spawn_tls_server(leaf: &TestLeaf, status_line: &'static str) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();

    let mut builder = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).expect("acceptor");
    builder
        .set_private_key(&PKey::private_key_from_pem(leaf.key_pem.as_bytes()).expect("key"))
        .expect("set key");
    builder
        .set_certificate(&X509::from_der(&leaf.der).expect("cert"))
        .expect("set cert");
    builder.check_private_key().expect("key matches cert");
    let acceptor = builder.build();

    let bodies = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&bodies);
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
            // Handshakes aborted by the client's verifier land here as errors.
            let Ok(mut tls) = acceptor.accept(stream) else { continue };
            let Some(body) = read_request_body(&mut tls) else { continue };
            sink.lock().unwrap().push(body);
            let reply = "{}";
            let _ = write!(
                tls,
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            );
            let _ = tls.flush();
            let _ = tls.shutdown();
        }
    });

    TestServer { port, bodies }
}

fn read_request_body<S: Read>(stream: &mut S) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else { continue };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = head_end + 4;
        if buf.len() >= body_start + len {
            return Some(String::from_utf8_lossy(&buf[body_start..body_start + len]).into_owned());
        }
    }
}
