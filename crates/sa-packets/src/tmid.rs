//! TMID content: the serialized DataMap, symmetric-encrypted under a
//! password stretched from `(username, PIN, password, rid)`.

use sa_crypto::{kdf, symm};
use sa_proto::DataMap;

use crate::error::PacketError;

/// Encrypt `data` for storage under `TMID.name = H(username||PIN||rid)`.
pub fn create(
    username: &str,
    pin: &str,
    password: &str,
    rid: u32,
    data: &DataMap,
) -> Result<Vec<u8>, PacketError> {
    let key = kdf::tmid_password(username, pin, password, rid)?;
    Ok(symm::encrypt(&data.encode(), &key)?)
}

/// Decrypt and parse-check a TMID ciphertext. Returns `None` — never an
/// error — when the password was wrong: a wrong password must be
/// indistinguishable from "not a DataMap at all" on purpose.
pub fn get_data(
    ciphertext: &[u8],
    username: &str,
    pin: &str,
    password: &str,
    rid: u32,
) -> Result<Option<DataMap>, PacketError> {
    let key = kdf::tmid_password(username, pin, password, rid)?;
    let plaintext = match symm::decrypt(ciphertext, &key) {
        Ok(p) => p,
        Err(_) => return Ok(None),
    };
    Ok(DataMap::decode(&plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dm = DataMap::new(b"serialized datamap".to_vec());
        let ct = create("alice", "1234", "pw", 7, &dm).unwrap();
        let recovered = get_data(&ct, "alice", "1234", "pw", 7).unwrap();
        assert_eq!(recovered, Some(dm));
    }

    #[test]
    fn wrong_password_yields_none_not_error() {
        let dm = DataMap::new(b"serialized datamap".to_vec());
        let ct = create("alice", "1234", "pw", 7, &dm).unwrap();
        let recovered = get_data(&ct, "alice", "1234", "wrong", 7).unwrap();
        assert_eq!(recovered, None);
    }

    #[test]
    fn wrong_rid_yields_none() {
        let dm = DataMap::new(b"serialized datamap".to_vec());
        let ct = create("alice", "1234", "pw", 7, &dm).unwrap();
        let recovered = get_data(&ct, "alice", "1234", "pw", 8).unwrap();
        assert_eq!(recovered, None);
    }
}
