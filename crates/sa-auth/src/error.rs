use thiserror::Error;

/// The engine's closed set of terminal outcomes, narrowed to the codes
/// each flow can actually return to a caller. Outcomes that denote a
/// *successful* terminal state for a given flow (plain success, and a
/// pre-existing user when returned by `get_user_info`) are the `Ok` side
/// of that flow's own return type instead of a variant here — see
/// `DESIGN.md`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no account exists for this username/PIN")]
    UserDoesntExist,

    #[error("an account already exists at this username/PIN")]
    UserExists,

    #[error("password did not decrypt a valid DataMap")]
    PasswordFailure,

    #[error("public username is already taken")]
    PublicUsernameExists,

    #[error("authentication transaction failed: {0}")]
    Authentication(String),

    #[error(transparent)]
    Session(#[from] sa_session::SessionError),

    #[error(transparent)]
    Packet(#[from] sa_packets::PacketError),

    #[error(transparent)]
    Store(#[from] sa_store::StoreError),

    #[error(transparent)]
    Crypto(#[from] sa_crypto::CryptoError),
}
