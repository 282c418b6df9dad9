//! Known-answer vectors for the bcrypt derivation

use bcryypt::{compare_sync, hash_sync, HashRecord};

fn hash(password: &[u8], salt: &str) -> String {
    hash_sync(password, salt).expect("salt should be accepted")
}

#[test]
fn test_openwall_vectors() {
    let cases: [(&[u8], &str, &str); 5] = [
        (
            b"U*U",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW",
        ),
        (
            b"U*U*",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.VGOzA784oUp/Z0DY336zx7pLYAy0lwK",
        ),
        (
            b"U*U*U",
            "$2a$05$XXXXXXXXXXXXXXXXXXXXXO",
            "$2a$05$XXXXXXXXXXXXXXXXXXXXXOAcXxm9kjPGEMsLznoKqmqw7tc8WCx4a",
        ),
        (
            b"",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.7uG0VCzI2bS7j6ymqJi9CdcdxiRTWNy",
        ),
        (
            b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
            "$2a$05$abcdefghijklmnopqrstuu",
            "$2a$05$abcdefghijklmnopqrstuu5s2v8.iXieOjg/.AySBTTZIIVFJeBui",
        ),
    ];

    for (password, salt, expected) in cases {
        assert_eq!(hash(password, salt), expected);
        assert!(compare_sync(password, expected));
    }
}

#[test]
fn test_2a_length_wraps_for_long_passwords() {
    // 255 and 256 bytes plus the terminator wrap the one-byte key length to
    // 0 and 1, so only the first password byte is read
    let expected = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.6.O1dLNbjod2uo0DVcW.jHucKbPDdHS";
    let base = "0123456789".repeat(26);
    for len in [255, 256] {
        assert_eq!(hash(base[..len].as_bytes(), "$2a$05$CCCCCCCCCCCCCCCCCCCCC."), expected);
    }
    assert_eq!(
        hash(&[b'0'; 72], "$2a$05$CCCCCCCCCCCCCCCCCCCCC."),
        expected
    );

    // one byte shorter does not wrap and behaves like the 72-byte prefix
    assert_eq!(
        hash(base[..254].as_bytes(), "$2a$05$CCCCCCCCCCCCCCCCCCCCC."),
        "$2a$05$CCCCCCCCCCCCCCCCCCCCC.XxrQqgBi/5Sxuq9soXzDtjIZ7w5pMfK"
    );
}

#[test]
fn test_passwords_past_72_bytes_are_ignored() {
    let base = "0123456789".repeat(26);
    let expected = "$2b$05$CCCCCCCCCCCCCCCCCCCCC.XxrQqgBi/5Sxuq9soXzDtjIZ7w5pMfK";
    for len in [72, 254, 255, 256] {
        assert_eq!(hash(base[..len].as_bytes(), "$2b$05$CCCCCCCCCCCCCCCCCCCCC."), expected);
    }

    let prefix = &base[..72];
    let salt = "$2b$04$......................";
    assert_eq!(hash(prefix.as_bytes(), salt), hash(format!("{prefix}tail").as_bytes(), salt));
    assert_ne!(hash(&base.as_bytes()[..71], salt), hash(prefix.as_bytes(), salt));
}

#[test]
fn test_zero_seed_golden_hash() {
    let salt = bcryypt::gen_salt_sync(bcryypt::Version::V2b, 4, &[0; 16])
        .expect("salt generation should succeed");
    assert_eq!(salt, "$2b$04$......................");
    assert_eq!(
        hash(b"password", &salt),
        "$2b$04$......................LAtw7/ohmmBAhnXqmkuIz83Rl5Qdjhm"
    );
}

#[test]
fn test_stored_digest_must_match_exactly() {
    let stored = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.VGOzA784oUp/Z0DY336zx7pLYAy0lwK";
    assert!(compare_sync(b"U*U*", stored));
    // same decoded bytes, different trailing bits in the last character
    let altered = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.VGOzA784oUp/Z0DY336zx7pLYAy0lwL";
    assert!(!compare_sync(b"U*U*", altered));
}

#[test]
fn test_salt_is_shortened_to_128_bits() {
    assert_eq!(
        hash(b"test", "$2a$10$1234567899123456789012"),
        "$2a$10$123456789912345678901u.OtL1A1eGK5wmvBKUDYKvuVKI7h2XBu"
    );
    assert_eq!(
        hash(b"U*U*", "$2a$05$CCCCCCCCCCCCCCCCCCCCCh"),
        "$2a$05$CCCCCCCCCCCCCCCCCCCCCeUQ7VjYZ2hd4bLYZdhuPpZMUpEUJDw1S"
    );
    for salt in ["$2a$05$CCCCCCCCCCCCCCCCCCCCCM", "$2a$05$CCCCCCCCCCCCCCCCCCCCCA"] {
        assert_eq!(
            hash(b"U*U*", salt),
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.VGOzA784oUp/Z0DY336zx7pLYAy0lwK"
        );
    }
}

#[test]
fn test_version_tags_share_derivation() {
    let reference = hash(b"U*U", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.");
    let digest = &reference[29..];
    for tag in ["2b", "2y"] {
        let salt = format!("${tag}$05$CCCCCCCCCCCCCCCCCCCCC.");
        assert_eq!(hash(b"U*U", &salt), format!("{salt}{digest}"));
    }
}

#[test]
fn test_2y_high_bit_vector() {
    assert_eq!(
        hash(b"\xa3", "$2y$05$/OK.fbVrR/bpIqNJ5ianF."),
        "$2y$05$/OK.fbVrR/bpIqNJ5ianF.Sa7shbm4.OzKpvFnX1pQLmQW96oUlCq"
    );
}

#[test]
fn test_2x_reproduces_sign_extension() {
    // 0xa3 widened through a signed char fills the high bytes with 0xff, so
    // the 2x key stream for "\xa3" is the plain key stream for "\xff\xff\xa3"
    let legacy = hash(b"\xa3", "$2x$05$/OK.fbVrR/bpIqNJ5ianF.");
    let plain = hash(b"\xff\xff\xa3", "$2b$05$/OK.fbVrR/bpIqNJ5ianF.");
    assert_eq!(legacy[29..], plain[29..]);
    assert_eq!(
        legacy,
        "$2x$05$/OK.fbVrR/bpIqNJ5ianF.CE5elHaaO4EbggVDjb8P19RukzXSM3e"
    );

    // ASCII passwords never reach the sign bit
    let ascii_2x = hash(b"U*U", "$2x$05$CCCCCCCCCCCCCCCCCCCCC.");
    let ascii_2a = hash(b"U*U", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.");
    assert_eq!(ascii_2x[29..], ascii_2a[29..]);
}

#[test]
fn test_version_2_omits_terminator() {
    let salt = "$2$05$CCCCCCCCCCCCCCCCCCCCC.";
    let hashed = hash(b"U*U", salt);
    assert_eq!(hashed.len(), 59);
    assert!(hashed.starts_with(salt));
    assert!(compare_sync(b"U*U", &hashed));
    assert_ne!(hashed[28..], hash(b"U*U", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.")[29..]);

    // without a terminator an empty key is a single zero byte
    assert_eq!(
        hash(b"", salt)[28..],
        hash(b"", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.")[29..]
    );

    let record: HashRecord = hashed.parse().expect("record should parse");
    assert_eq!(record.to_string(), hashed);
}
