//! The closed packet-kind enumeration and the fixed signer-kind mapping
//! each identity-key kind is created under.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One packet kind out of the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketKind {
    AnMid,
    AnSmid,
    AnTmid,
    AnMaid,
    AnMpid,
    Mid,
    Smid,
    Tmid,
    Maid,
    Pmid,
    Mpid,
    Msid,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PacketKind::AnMid => "ANMID",
            PacketKind::AnSmid => "ANSMID",
            PacketKind::AnTmid => "ANTMID",
            PacketKind::AnMaid => "ANMAID",
            PacketKind::AnMpid => "ANMPID",
            PacketKind::Mid => "MID",
            PacketKind::Smid => "SMID",
            PacketKind::Tmid => "TMID",
            PacketKind::Maid => "MAID",
            PacketKind::Pmid => "PMID",
            PacketKind::Mpid => "MPID",
            PacketKind::Msid => "MSID",
        })
    }
}

impl PacketKind {
    /// True for the kinds that own an RSA key-pair and a public-key
    /// signature chain (an "identity key record"). MID, SMID and TMID are
    /// plain content packets — an encrypted rid or ciphertext DataMap —
    /// and hold no key material of their own.
    pub fn is_signature_kind(self) -> bool {
        !matches!(self, PacketKind::Mid | PacketKind::Smid | PacketKind::Tmid)
    }

    /// The kind whose private key signs a freshly created packet of this
    /// kind, or `None` if the kind is self-signed (the anonymous signers,
    /// and MSID which is a fresh identity minted per share).
    pub fn signer_kind(self) -> Option<PacketKind> {
        match self {
            PacketKind::Maid => Some(PacketKind::AnMaid),
            PacketKind::Pmid => Some(PacketKind::Maid),
            PacketKind::Mpid => Some(PacketKind::AnMpid),
            PacketKind::AnMid
            | PacketKind::AnSmid
            | PacketKind::AnTmid
            | PacketKind::AnMaid
            | PacketKind::AnMpid
            | PacketKind::Msid => None,
            PacketKind::Mid | PacketKind::Smid | PacketKind::Tmid => None,
        }
    }

    /// The 8 identity-key kinds created, in dependency order, during
    /// account creation. MID and SMID content packets are created
    /// alongside this chain but are not identity-key kinds themselves —
    /// see `DESIGN.md` for why this array has 6 entries rather than 8.
    pub const SYSTEM_SIGNATURE_CHAIN: [PacketKind; 6] = [
        PacketKind::AnMaid,
        PacketKind::Maid,
        PacketKind::Pmid,
        PacketKind::AnMid,
        PacketKind::AnSmid,
        PacketKind::AnTmid,
    ];
}
