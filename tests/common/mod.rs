#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use num_bigint::BigUint;
use ssh_primitives::ec::weierstrass::EllipticCurve;

/// Routes crate logs to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn vector_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("vectors")
        .join(name)
}

pub fn read_vector(name: &str) -> String {
    std::fs::read_to_string(vector_path(name))
        .unwrap_or_else(|err| panic!("cannot read {name}: {err}"))
}

/// One `key = value` block from a CAVP response file, with the most recent
/// `[...]` header it appeared under.
#[derive(Debug, Default, Clone)]
pub struct Record {
    pub section: String,
    fields: HashMap<String, String>,
    flags: Vec<String>,
}

impl Record {
    pub fn get(&self, key: &str) -> &str {
        self.fields
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("record in [{}] has no {key}", self.section))
    }

    pub fn hex(&self, key: &str) -> Vec<u8> {
        hex::decode(self.get(key)).unwrap_or_else(|err| panic!("{key}: {err}"))
    }

    /// Hex integer; CAVP files sometimes drop a leading zero nibble.
    pub fn int(&self, key: &str) -> BigUint {
        let value = self.get(key);
        if value.is_empty() {
            return BigUint::default();
        }
        BigUint::parse_bytes(value.as_bytes(), 16).unwrap_or_else(|| panic!("{key}: bad hex"))
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// `Result = P (...)` / `Result = F (...)`.
    pub fn passes(&self) -> bool {
        self.get("Result").starts_with('P')
    }

    /// The curve named by the section header, e.g. `[P-384,SHA-384]`.
    pub fn curve(&self) -> &'static EllipticCurve {
        let name = match self.section.split(',').next().unwrap_or_default() {
            "P-256" => "nistp256",
            "P-384" => "nistp384",
            "P-521" => "nistp521",
            other => panic!("unexpected curve section {other}"),
        };
        EllipticCurve::find_by_name(name).unwrap()
    }
}

/// Parses the CAVP `.rsp` layout: `#` comments, `[...]` headers, blank-line
/// separated records of `key = value` lines and bare flags such as `FAIL`.
pub fn parse_rsp(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut section = String::new();
    let mut current = Record::default();

    for line in text.lines().map(str::trim) {
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            flush(&mut current, &section, &mut records);
        } else if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            flush(&mut current, &section, &mut records);
            section = header.to_owned();
        } else if let Some((key, value)) = line.split_once('=') {
            current
                .fields
                .insert(key.trim().to_owned(), value.trim().to_owned());
        } else {
            current.flags.push(line.to_owned());
        }
    }
    flush(&mut current, &section, &mut records);
    records
}

fn flush(current: &mut Record, section: &str, records: &mut Vec<Record>) {
    if !current.fields.is_empty() || !current.flags.is_empty() {
        let mut done = std::mem::take(current);
        done.section = section.to_owned();
        records.push(done);
    }
}

/// One line of the Ed25519 `sign.input` file:
/// `secret||public : public : message : signature||message`.
pub struct SignInput {
    pub seed: [u8; 32],
    pub public: [u8; 32],
    pub message: Vec<u8>,
    pub signature: [u8; 64],
}

pub fn parse_sign_input(text: &str) -> Vec<SignInput> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let fields: Vec<Vec<u8>> = line
                .split(':')
                .take(4)
                .map(|f| hex::decode(f).unwrap())
                .collect();
            let message = fields[2].clone();
            SignInput {
                seed: fields[0][..32].try_into().unwrap(),
                public: fields[1][..].try_into().unwrap(),
                signature: fields[3][..64].try_into().unwrap(),
                message,
            }
        })
        .collect()
}

pub fn hex_bytes(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}
