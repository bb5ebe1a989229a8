use sa_proto::PacketKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a {0} record already exists in this session")]
    KeyAlreadyExists(PacketKind),
}
