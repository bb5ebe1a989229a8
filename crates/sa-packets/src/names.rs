//! Deterministic packet-name derivation for the content-only kinds (MID,
//! SMID, TMID) and MPID. Signature-kind names (`H(public_key || signature)`)
//! are computed as a side effect of `create` in [`crate::signature`], since
//! they depend on freshly generated key material rather than just the
//! caller's identifiers.

use sa_crypto::hash;
use sa_proto::PacketName;

/// `MID.name = H(H(username) || H(PIN))`.
pub fn mid_name(username: &str, pin: &str) -> PacketName {
    let h_user = hash::hash(username.as_bytes());
    let h_pin = hash::hash(pin.as_bytes());
    PacketName::from_hash(hash::hash_many(&[&h_user, &h_pin]))
}

/// SMID is named by a distinct, deterministic derivation of the same
/// inputs — here, the hash arguments in swapped order, so the two names
/// can never collide while both remain pure functions of `(username, PIN)`
/// alone.
pub fn smid_name(username: &str, pin: &str) -> PacketName {
    let h_user = hash::hash(username.as_bytes());
    let h_pin = hash::hash(pin.as_bytes());
    PacketName::from_hash(hash::hash_many(&[&h_pin, &h_user]))
}

/// `TMID.name = H(username || PIN || rid)`.
pub fn tmid_name(username: &str, pin: &str, rid: u32) -> PacketName {
    PacketName::from_hash(hash::hash_many(&[
        username.as_bytes(),
        pin.as_bytes(),
        &rid.to_be_bytes(),
    ]))
}

/// `MPID.name = H(public_username)`.
pub fn mpid_name(public_username: &str) -> PacketName {
    PacketName::from_hash(hash::hash(public_username.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_and_smid_names_differ() {
        assert_ne!(mid_name("alice", "1234"), smid_name("alice", "1234"));
    }

    #[test]
    fn names_are_deterministic() {
        assert_eq!(mid_name("alice", "1234"), mid_name("alice", "1234"));
        assert_eq!(tmid_name("alice", "1234", 42), tmid_name("alice", "1234", 42));
    }

    #[test]
    fn tmid_name_depends_on_rid() {
        assert_ne!(tmid_name("alice", "1234", 1), tmid_name("alice", "1234", 2));
    }
}
