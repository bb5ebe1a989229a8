//! The authentication engine: orchestrates the packet factory
//! (`sa_packets`) and the remote-store adapter (`sa_store`) over a
//! per-client session (`sa_session`), enforcing the packet-graph invariants
//! at every flow boundary.
//!
//! Each public method here is one user-visible authentication flow. Account
//! creation, login, session rotation, identity/password changes, and
//! teardown are all expressed as plain `async fn`s joined with
//! `tokio::join!`/`tokio::try_join!` where two network round-trips can run
//! concurrently, rather than as a callback-threaded state machine blocking
//! on a condition variable.

use std::sync::Arc;

use sa_crypto::{rid as rid_mod, KeyPairPool};
use sa_packets::{mid_smid, names, signature, tmid};
use sa_proto::{DataMap, PacketKind, PacketName, StorePolicy};
use sa_session::SessionStore;
use sa_store::RemoteStore;
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::AuthError;

/// How many times a signature-packet or MSID create/key_unique round may
/// retry on a hashed-name collision before giving up. Collisions on a
/// 64-byte SHA-512 name are not expected in practice; this bounds the loop
/// rather than relying on that.
const MAX_NAME_COLLISION_RETRIES: usize = 8;

/// A freshly minted private-share identity, returned by `create_msid`.
#[derive(Debug, Clone)]
pub struct MsidHandle {
    pub label: String,
    pub msid: PacketName,
}

/// Drives the ten authentication flows over one [`SessionStore`] and one
/// [`RemoteStore`] backend. One `Engine` per logged-in (or logging-in)
/// client — never a process-wide singleton.
pub struct Engine<S: RemoteStore> {
    store: Arc<S>,
    session: Arc<SessionStore>,
    pool: Arc<KeyPairPool>,
}

impl<S: RemoteStore> Engine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let pool = Arc::new(KeyPairPool::new(config.max_crypto_thread_count, config.crypto_key_buffer_count));
        Self { store, session: Arc::new(SessionStore::new()), pool }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn draw_key_pair(&self) -> Result<sa_crypto::KeyPair, AuthError> {
        let pool = self.pool.clone();
        let key_pair = tokio::task::spawn_blocking(move || pool.get())
            .await
            .expect("key-pair pool worker thread panicked");
        Ok(key_pair?)
    }

    // ---------------------------------------------------------------
    // GetUserInfo
    // ---------------------------------------------------------------

    #[instrument(skip(self, pin))]
    pub async fn get_user_info(&self, username: &str, pin: &str) -> Result<(), AuthError> {
        // Committed regardless of outcome; callers must check the returned
        // result before trusting the session.
        self.session.set_identity(username, pin);

        let mid_name = names::mid_name(username, pin);
        let smid_name = names::smid_name(username, pin);

        let (mid_res, smid_res) =
            tokio::join!(self.store.load_packet(&mid_name), self.store.load_packet(&smid_name));

        let mid_rid = mid_res
            .ok()
            .and_then(|values| values.into_iter().next())
            .and_then(|ct| mid_smid::get_data(&ct, username, pin).ok());
        let smid_rid = smid_res
            .ok()
            .and_then(|values| values.into_iter().next())
            .and_then(|ct| mid_smid::get_data(&ct, username, pin).ok());

        if mid_rid.is_none() && smid_rid.is_none() {
            return Err(AuthError::UserDoesntExist);
        }

        if let Some(rid) = mid_rid {
            self.session.set_mid_rid(rid);
        }
        if let Some(rid) = smid_rid {
            self.session.set_smid_rid(rid);
        }

        let mid_tmid_fut = async {
            match mid_rid {
                Some(rid) => self.store.load_packet(&names::tmid_name(username, pin, rid)).await.ok(),
                None => None,
            }
        };
        let smid_tmid_fut = async {
            match smid_rid {
                Some(rid) => self.store.load_packet(&names::tmid_name(username, pin, rid)).await.ok(),
                None => None,
            }
        };
        let (mid_tmid, smid_tmid) = tokio::join!(mid_tmid_fut, smid_tmid_fut);

        let mid_tmid_ct = mid_tmid.and_then(|values| values.into_iter().next());
        let smid_tmid_ct = smid_tmid.and_then(|values| values.into_iter().next());

        if let Some(ct) = &mid_tmid_ct {
            self.session.set_tmid_content(ct.clone());
        }
        if let Some(ct) = &smid_tmid_ct {
            self.session.set_smid_tmid_content(ct.clone());
        }

        if mid_tmid_ct.is_some() || smid_tmid_ct.is_some() {
            info!("user found");
            Ok(())
        } else {
            Err(AuthError::Authentication("MID/SMID rid recovered but no TMID exists at either name".into()))
        }
    }

    // ---------------------------------------------------------------
    // GetUserData
    // ---------------------------------------------------------------

    /// Pure local (no network round-trip): decode the TMID ciphertext
    /// already held in the session using the supplied password.
    pub fn get_user_data(&self, password: &str) -> Result<DataMap, AuthError> {
        let username = self
            .session
            .username()
            .ok_or_else(|| AuthError::Authentication("no active session".into()))?;
        let pin = self.session.pin().ok_or_else(|| AuthError::Authentication("no active session".into()))?;
        let rid = self.session.mid_rid();
        let ciphertext = self.session.tmid_content().ok_or(AuthError::PasswordFailure)?;

        match tmid::get_data(&ciphertext, &username, &pin, password, rid)? {
            Some(dm) => {
                self.session.set_password(password);
                Ok(dm)
            }
            // Indistinguishable from garbage, on purpose.
            None => Err(AuthError::PasswordFailure),
        }
    }

    // ---------------------------------------------------------------
    // CreateUserSysPackets
    // ---------------------------------------------------------------

    #[instrument(skip(self, pin))]
    pub async fn create_user_sys_packets(&self, username: &str, pin: &str) -> Result<(), AuthError> {
        let mid_name = names::mid_name(username, pin);
        let smid_name = names::smid_name(username, pin);

        let (mid_unique, smid_unique) =
            tokio::try_join!(self.store.key_unique(&mid_name), self.store.key_unique(&smid_name))?;
        if !mid_unique || !smid_unique {
            return Err(AuthError::UserExists);
        }

        self.session.set_identity(username, pin);

        let mut current = None;
        loop {
            current = next_signature_step(current);
            let Some(kind) = current else { break };
            self.create_and_store_signature_link(kind).await?;
        }

        // Initial MID and SMID share one freshly sampled rid; the two are
        // only ever allowed to coincide right after account creation.
        let created = mid_smid::create(username, pin, &[])?;
        self.store
            .store_packet(&mid_name, created.enc_rid.clone(), PacketKind::Mid, StorePolicy::DoNothingReturnFailure, None)
            .await?;
        let smid_ct = mid_smid::encrypt_rid(username, pin, created.rid)?;
        self.store
            .store_packet(&smid_name, smid_ct, PacketKind::Smid, StorePolicy::DoNothingReturnFailure, None)
            .await?;

        self.session.set_mid_rid(created.rid);
        self.session.set_smid_rid(created.rid);

        info!("account created");
        Ok(())
    }

    /// One link of the signature-packet chain: draw a key-pair, self-sign
    /// or sign with the signer's private key, regenerate on a hashed-name
    /// collision, store, and commit to the session. Rolls the session
    /// commit back if the store fails.
    async fn create_and_store_signature_link(&self, kind: PacketKind) -> Result<(), AuthError> {
        let signer_private_der = match kind.signer_kind() {
            Some(signer) => {
                let record = self.session.key(signer).ok_or_else(|| {
                    AuthError::Authentication(format!("{signer} must be created before {kind}"))
                })?;
                Some(record.private_key_der.to_vec())
            }
            None => None,
        };

        for _ in 0..MAX_NAME_COLLISION_RETRIES {
            let key_pair = self.draw_key_pair().await?;
            let packet = signature::create(kind, key_pair, signer_private_der.as_deref())?;

            if !self.store.key_unique(&packet.record.id).await? {
                continue;
            }

            self.session.add_key(packet.record.clone())?;
            match self
                .store
                .store_packet(
                    &packet.record.id,
                    packet.serialized_packet,
                    kind,
                    StorePolicy::DoNothingReturnFailure,
                    None,
                )
                .await
            {
                Ok(()) => {
                    info!(%kind, name = %packet.record.id, "signature packet stored");
                    return Ok(());
                }
                Err(err) => {
                    self.session.remove_key(kind);
                    return Err(AuthError::Authentication(format!("failed to store {kind}: {err}")));
                }
            }
        }

        Err(AuthError::Authentication(format!(
            "could not find a unique name for {kind} after {MAX_NAME_COLLISION_RETRIES} attempts"
        )))
    }

    // ---------------------------------------------------------------
    // CreateTmidPacket
    // ---------------------------------------------------------------

    pub async fn create_tmid_packet(
        &self,
        username: &str,
        pin: &str,
        password: &str,
        data: &DataMap,
    ) -> Result<(), AuthError> {
        let rid = self.session.mid_rid();
        let ciphertext = tmid::create(username, pin, password, rid, data)?;
        let name = names::tmid_name(username, pin, rid);

        match self
            .store
            .store_packet(&name, ciphertext.clone(), PacketKind::Tmid, StorePolicy::DoNothingReturnFailure, None)
            .await
        {
            Ok(()) => {
                self.session.set_identity(username, pin);
                self.session.set_password(password);
                self.session.set_tmid_content(ciphertext.clone());
                self.session.set_smid_tmid_content(ciphertext);
                Ok(())
            }
            Err(err) => {
                self.session.set_mid_rid(0);
                self.session.set_smid_rid(0);
                Err(AuthError::Authentication(format!("failed to store TMID: {err}")))
            }
        }
    }

    // ---------------------------------------------------------------
    // SaveSession
    // ---------------------------------------------------------------

    pub async fn save_session(&self, ser_dm: &DataMap) -> Result<(), AuthError> {
        let username = self.require_username()?;
        let pin = self.require_pin()?;
        let password = self
            .session
            .password()
            .ok_or_else(|| AuthError::Authentication("no active session".into()))?;

        let mid_rid = self.session.mid_rid();
        let smid_rid = self.session.smid_rid();

        if mid_rid != smid_rid {
            let smid_name = names::smid_name(&username, &pin);
            let enc_rid = mid_smid::encrypt_rid(&username, &pin, mid_rid)?;
            self.store.store_packet(&smid_name, enc_rid, PacketKind::Smid, StorePolicy::Overwrite, None).await?;

            if let Some(old_smid_tmid) = self.session.smid_tmid_content() {
                let old_smid_tmid_name = names::tmid_name(&username, &pin, smid_rid);
                self.store.delete_packet(&old_smid_tmid_name, vec![old_smid_tmid], PacketKind::Tmid).await?;
            }

            self.session.set_smid_rid(mid_rid);
            if let Some(current_tmid) = self.session.tmid_content() {
                self.session.set_smid_tmid_content(current_tmid);
            }
        }

        let new_rid = rid_mod::sample_rid(&[mid_rid])?;

        let new_ciphertext = tmid::create(&username, &pin, &password, new_rid, ser_dm)?;
        let new_tmid_name = names::tmid_name(&username, &pin, new_rid);
        self.store
            .store_packet(&new_tmid_name, new_ciphertext.clone(), PacketKind::Tmid, StorePolicy::DoNothingReturnFailure, None)
            .await
            .map_err(|err| AuthError::Authentication(format!("failed to store new TMID: {err}")))?;

        self.session.set_tmid_content(new_ciphertext);

        let mid_name = names::mid_name(&username, &pin);
        let new_enc_rid = mid_smid::encrypt_rid(&username, &pin, new_rid)?;
        self.store
            .store_packet(&mid_name, new_enc_rid, PacketKind::Mid, StorePolicy::Overwrite, None)
            .await
            .map_err(|err| AuthError::Authentication(format!("failed to store new MID: {err}")))?;

        self.session.set_mid_rid(new_rid);
        info!("session rotated");
        Ok(())
    }

    // ---------------------------------------------------------------
    // ChangeUsername / ChangePin
    // ---------------------------------------------------------------

    pub async fn change_username(&self, ser_dm: &DataMap, new_username: &str) -> Result<(), AuthError> {
        let pin = self.require_pin()?;
        self.rotate_identity(ser_dm, new_username, &pin).await
    }

    pub async fn change_pin(&self, ser_dm: &DataMap, new_pin: &str) -> Result<(), AuthError> {
        let username = self.require_username()?;
        self.rotate_identity(ser_dm, &username, new_pin).await
    }

    async fn rotate_identity(&self, ser_dm: &DataMap, new_username: &str, new_pin: &str) -> Result<(), AuthError> {
        let old_username = self.require_username()?;
        let old_pin = self.require_pin()?;
        let password = self
            .session
            .password()
            .ok_or_else(|| AuthError::Authentication("no active session".into()))?;
        let old_mid_rid = self.session.mid_rid();
        let old_smid_rid = self.session.smid_rid();
        let snapshot = self.session.snapshot();

        let new_mid_name = names::mid_name(new_username, new_pin);
        let new_smid_name = names::smid_name(new_username, new_pin);

        let (mid_unique, smid_unique) =
            tokio::try_join!(self.store.key_unique(&new_mid_name), self.store.key_unique(&new_smid_name))?;
        if !mid_unique || !smid_unique {
            return Err(AuthError::UserExists);
        }

        let result = self
            .rotate_identity_inner(
                ser_dm,
                &old_username,
                &old_pin,
                new_username,
                new_pin,
                &password,
                old_mid_rid,
                old_smid_rid,
                &new_mid_name,
                &new_smid_name,
            )
            .await;

        if result.is_err() {
            self.session.restore(snapshot);
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn rotate_identity_inner(
        &self,
        ser_dm: &DataMap,
        old_username: &str,
        old_pin: &str,
        new_username: &str,
        new_pin: &str,
        password: &str,
        old_mid_rid: u32,
        old_smid_rid: u32,
        new_mid_name: &PacketName,
        new_smid_name: &PacketName,
    ) -> Result<(), AuthError> {
        let new_mid_rid = rid_mod::sample_rid(&[old_mid_rid])?;
        let new_mid_enc = mid_smid::encrypt_rid(new_username, new_pin, new_mid_rid)?;
        self.store
            .store_packet(new_mid_name, new_mid_enc, PacketKind::Mid, StorePolicy::DoNothingReturnFailure, None)
            .await?;

        let new_smid_rid = rid_mod::sample_rid(&[0, old_mid_rid, old_smid_rid])?;
        let new_smid_enc = mid_smid::encrypt_rid(new_username, new_pin, new_smid_rid)?;
        self.store
            .store_packet(new_smid_name, new_smid_enc, PacketKind::Smid, StorePolicy::DoNothingReturnFailure, None)
            .await?;

        let new_mid_tmid_ct = tmid::create(new_username, new_pin, password, new_mid_rid, ser_dm)?;
        let new_mid_tmid_name = names::tmid_name(new_username, new_pin, new_mid_rid);
        self.store
            .store_packet(&new_mid_tmid_name, new_mid_tmid_ct.clone(), PacketKind::Tmid, StorePolicy::DoNothingReturnFailure, None)
            .await?;

        let old_mid_tmid_ct = self
            .session
            .tmid_content()
            .ok_or_else(|| AuthError::Authentication("missing current TMID content".into()))?;
        let old_dm = tmid::get_data(&old_mid_tmid_ct, old_username, old_pin, password, old_mid_rid)?
            .ok_or(AuthError::PasswordFailure)?;
        let new_smid_tmid_ct = tmid::create(new_username, new_pin, password, new_smid_rid, &old_dm)?;
        let new_smid_tmid_name = names::tmid_name(new_username, new_pin, new_smid_rid);
        self.store
            .store_packet(&new_smid_tmid_name, new_smid_tmid_ct.clone(), PacketKind::Tmid, StorePolicy::DoNothingReturnFailure, None)
            .await?;

        // Deletion witnesses: the old encrypted rid for MID/SMID, the old
        // signed ciphertext for TMIDs.
        let old_mid_name = names::mid_name(old_username, old_pin);
        let old_mid_witness = mid_smid::encrypt_rid(old_username, old_pin, old_mid_rid)?;
        self.store.delete_packet(&old_mid_name, vec![old_mid_witness], PacketKind::Mid).await?;

        let old_smid_name = names::smid_name(old_username, old_pin);
        let old_smid_witness = mid_smid::encrypt_rid(old_username, old_pin, old_smid_rid)?;
        self.store.delete_packet(&old_smid_name, vec![old_smid_witness], PacketKind::Smid).await?;

        let old_mid_tmid_name = names::tmid_name(old_username, old_pin, old_mid_rid);
        self.store.delete_packet(&old_mid_tmid_name, vec![old_mid_tmid_ct], PacketKind::Tmid).await?;

        if old_mid_rid != old_smid_rid {
            if let Some(old_smid_tmid_ct) = self.session.smid_tmid_content() {
                let old_smid_tmid_name = names::tmid_name(old_username, old_pin, old_smid_rid);
                self.store.delete_packet(&old_smid_tmid_name, vec![old_smid_tmid_ct], PacketKind::Tmid).await?;
            }
        }

        self.session.set_identity(new_username, new_pin);
        self.session.set_mid_rid(new_mid_rid);
        self.session.set_smid_rid(new_smid_rid);
        self.session.set_tmid_content(new_mid_tmid_ct);
        self.session.set_smid_tmid_content(new_smid_tmid_ct);

        info!("identity rotated");
        Ok(())
    }

    // ---------------------------------------------------------------
    // ChangePassword
    // ---------------------------------------------------------------

    pub async fn change_password(&self, ser_dm: &DataMap, new_password: &str) -> Result<(), AuthError> {
        let old_password = self.session.password();
        self.session.set_password(new_password);

        match self.save_session(ser_dm).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some(old) = old_password {
                    self.session.set_password(old);
                }
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------
    // CreatePublicName
    // ---------------------------------------------------------------

    pub async fn create_public_name(&self, public_username: &str) -> Result<(), AuthError> {
        let mpid_name = names::mpid_name(public_username);
        if !self.store.key_unique(&mpid_name).await? {
            return Err(AuthError::PublicUsernameExists);
        }

        let anmpid = self.create_self_signed_unique(PacketKind::AnMpid).await?;
        self.store
            .store_packet(&anmpid.record.id, anmpid.serialized_packet.clone(), PacketKind::AnMpid, StorePolicy::DoNothingReturnFailure, None)
            .await
            .map_err(|err| AuthError::Authentication(format!("failed to store ANMPID: {err}")))?;
        self.session.add_key(anmpid.record.clone())?;

        let mpid_key_pair = self.draw_key_pair().await?;
        let mpid_packet = match signature::create(PacketKind::Mpid, mpid_key_pair, Some(&anmpid.record.private_key_der)) {
            Ok(p) => p,
            Err(err) => {
                self.session.remove_key(PacketKind::AnMpid);
                return Err(err.into());
            }
        };

        // MPID's network name is `H(public_username)`, unlike the general
        // signature-packet rule `H(pubkey||sig)` that `signature::create`
        // computed above — override it here.
        match self
            .store
            .store_packet(&mpid_name, mpid_packet.serialized_packet.clone(), PacketKind::Mpid, StorePolicy::DoNothingReturnFailure, None)
            .await
        {
            Ok(()) => {
                let mut record = mpid_packet.record;
                record.id = mpid_name;
                self.session.add_key(record)?;
                info!(public_username, "public name created");
                Ok(())
            }
            Err(err) => {
                self.session.remove_key(PacketKind::AnMpid);
                Err(AuthError::Authentication(format!("failed to store MPID: {err}")))
            }
        }
    }

    /// Draw and self-sign a packet of `kind`, regenerating on a hashed-name
    /// collision. Used for the self-signed kinds created outside the main
    /// system chain (ANMPID, MSID).
    async fn create_self_signed_unique(&self, kind: PacketKind) -> Result<signature::SignaturePacket, AuthError> {
        for _ in 0..MAX_NAME_COLLISION_RETRIES {
            let key_pair = self.draw_key_pair().await?;
            let packet = signature::create(kind, key_pair, None)?;
            if self.store.key_unique(&packet.record.id).await? {
                return Ok(packet);
            }
        }
        Err(AuthError::Authentication(format!(
            "could not find a unique name for {kind} after {MAX_NAME_COLLISION_RETRIES} attempts"
        )))
    }

    // ---------------------------------------------------------------
    // Supplemented: CreateMSIDPacket / share teardown
    // ---------------------------------------------------------------

    pub async fn create_msid(&self, share_label: &str) -> Result<MsidHandle, AuthError> {
        let msid = self.create_self_signed_unique(PacketKind::Msid).await?;
        self.store
            .store_packet(&msid.record.id, msid.serialized_packet.clone(), PacketKind::Msid, StorePolicy::DoNothingReturnFailure, None)
            .await
            .map_err(|err| AuthError::Authentication(format!("failed to store MSID: {err}")))?;

        self.session.add_private_share(share_label, msid.record.id.clone());
        info!(share = share_label, msid = %msid.record.id, "private share created");
        Ok(MsidHandle { label: share_label.to_string(), msid: msid.record.id })
    }

    pub async fn destroy_msid(&self, share_label: &str) -> Result<(), AuthError> {
        if let Some(msid_name) = self.session.remove_private_share(share_label) {
            if let Ok(values) = self.store.load_packet(&msid_name).await {
                self.store.delete_packet(&msid_name, values, PacketKind::Msid).await?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // RemoveMe
    // ---------------------------------------------------------------

    /// Best-effort teardown: delete every identity packet currently held
    /// in the session plus its dependent content packets.
    /// Individual delete failures are logged and skipped rather than
    /// aborting the whole teardown — there is no partial-success code to
    /// report back, and leaving a stray packet behind is strictly better
    /// than leaving the account half-removed.
    pub async fn remove_me(&self) -> Result<(), AuthError> {
        let username = self.session.username();
        let pin = self.session.pin();
        let mid_rid = self.session.mid_rid();
        let smid_rid = self.session.smid_rid();

        let keys = self.session.keys();
        let mut pending_pmid = keys.iter().find(|r| r.kind == PacketKind::Pmid).map(|r| r.id.clone());
        let mut pending_mpid = keys.iter().find(|r| r.kind == PacketKind::Mpid).map(|r| r.id.clone());

        for record in keys {
            if let Err(err) = self.store.delete_packet(&record.id, vec![], record.kind).await {
                warn!(kind = %record.kind, error = %err, "best-effort delete failed");
            }
            self.session.remove_key(record.kind);

            match record.kind {
                PacketKind::AnMid => {
                    if let (Some(u), Some(p)) = (&username, &pin) {
                        self.best_effort_delete_all(&names::mid_name(u, p), PacketKind::Mid).await;
                        if mid_rid != 0 {
                            self.best_effort_delete_all(&names::tmid_name(u, p, mid_rid), PacketKind::Tmid).await;
                        }
                    }
                }
                PacketKind::AnSmid => {
                    if let (Some(u), Some(p)) = (&username, &pin) {
                        self.best_effort_delete_all(&names::smid_name(u, p), PacketKind::Smid).await;
                        if smid_rid != 0 && smid_rid != mid_rid {
                            self.best_effort_delete_all(&names::tmid_name(u, p, smid_rid), PacketKind::Tmid).await;
                        }
                    }
                }
                PacketKind::Maid => {
                    if let Some(pmid_name) = pending_pmid.take() {
                        self.best_effort_delete_all(&pmid_name, PacketKind::Pmid).await;
                    }
                }
                PacketKind::AnMpid => {
                    if let Some(mpid_name) = pending_mpid.take() {
                        self.best_effort_delete_all(&mpid_name, PacketKind::Mpid).await;
                    }
                }
                _ => {}
            }
        }

        self.session.reset();
        info!("account removed");
        Ok(())
    }

    async fn best_effort_delete_all(&self, name: &PacketName, kind: PacketKind) {
        match self.store.load_packet(name).await {
            Ok(values) => {
                if let Err(err) = self.store.delete_packet(name, values, kind).await {
                    warn!(%name, %kind, error = %err, "best-effort delete failed");
                }
            }
            Err(_) => {} // nothing stored there; nothing to delete
        }
    }

    fn require_username(&self) -> Result<String, AuthError> {
        self.session.username().ok_or_else(|| AuthError::Authentication("no active session".into()))
    }

    fn require_pin(&self) -> Result<String, AuthError> {
        self.session.pin().ok_or_else(|| AuthError::Authentication("no active session".into()))
    }
}

/// The fixed dependency order of the system signature-packet chain:
/// `ANMAID -> MAID -> PMID`, `ANMID`, `ANSMID`, `ANTMID`. Reified as an
/// explicit driver function instead of switching on packet kind inside a
/// callback.
fn next_signature_step(current: Option<PacketKind>) -> Option<PacketKind> {
    let chain = PacketKind::SYSTEM_SIGNATURE_CHAIN;
    match current {
        None => Some(chain[0]),
        Some(kind) => {
            let idx = chain.iter().position(|&k| k == kind)?;
            chain.get(idx + 1).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use sa_store::MemoryStore;

    fn test_engine() -> Engine<MemoryStore> {
        Engine::new(Arc::new(MemoryStore::new()), EngineConfig { max_crypto_thread_count: 2, crypto_key_buffer_count: 2 })
    }

    #[tokio::test]
    async fn create_login_cycle_round_trips_datamap() {
        let engine = test_engine();
        let dm = DataMap::new(b"hello world".to_vec());

        engine.create_user_sys_packets("alice", "1234").await.unwrap();
        engine.create_tmid_packet("alice", "1234", "pw", &dm).await.unwrap();

        engine.session().reset();
        engine.get_user_info("alice", "1234").await.unwrap();
        let recovered = engine.get_user_data("pw").unwrap();
        assert_eq!(recovered, dm);
    }

    #[tokio::test]
    async fn wrong_password_yields_password_failure() {
        let engine = test_engine();
        let dm = DataMap::new(b"hello world".to_vec());
        engine.create_user_sys_packets("alice", "1234").await.unwrap();
        engine.create_tmid_packet("alice", "1234", "pw", &dm).await.unwrap();

        engine.session().reset();
        engine.get_user_info("alice", "1234").await.unwrap();
        let err = engine.get_user_data("wrong").unwrap_err();
        assert!(matches!(err, AuthError::PasswordFailure));
    }

    #[tokio::test]
    async fn second_create_on_same_identity_fails_with_user_exists() {
        let engine = test_engine();
        engine.create_user_sys_packets("bob", "0001").await.unwrap();
        let err = engine.create_user_sys_packets("bob", "0001").await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn save_session_rotates_mid_and_preserves_datamap() {
        let engine = test_engine();
        let dm1 = DataMap::new(b"v1".to_vec());
        let dm2 = DataMap::new(b"v2".to_vec());
        engine.create_user_sys_packets("carol", "4242").await.unwrap();
        engine.create_tmid_packet("carol", "4242", "pw", &dm1).await.unwrap();

        let mid_before = engine.session().mid_rid();
        engine.save_session(&dm2).await.unwrap();
        let mid_after = engine.session().mid_rid();
        let smid_after = engine.session().smid_rid();

        assert_eq!(smid_after, mid_before);
        assert_ne!(mid_after, mid_before);

        let recovered = engine.get_user_data("pw").unwrap();
        assert_eq!(recovered, dm2);
    }

    #[tokio::test]
    async fn second_save_session_deletes_the_superseded_smid_tmid_packet() {
        let engine = test_engine();
        let dm1 = DataMap::new(b"v1".to_vec());
        let dm2 = DataMap::new(b"v2".to_vec());
        let dm3 = DataMap::new(b"v3".to_vec());
        engine.create_user_sys_packets("erin", "5150").await.unwrap();
        engine.create_tmid_packet("erin", "5150", "pw", &dm1).await.unwrap();

        let original_rid = engine.session().mid_rid();
        let original_tmid_name = names::tmid_name("erin", "5150", original_rid);
        engine.store.load_packet(&original_tmid_name).await.expect("first TMID packet should exist");

        // First call only rotates MID (mid_rid == smid_rid going in), so the
        // SMID-rotation branch is not exercised yet.
        engine.save_session(&dm2).await.unwrap();
        engine.store.load_packet(&original_tmid_name).await.expect("TMID packet survives the first rotation");

        // Second call has mid_rid != smid_rid, which takes the SMID-rotation
        // branch and must retire the packet the old SMID pointed at.
        engine.save_session(&dm3).await.unwrap();
        let err = engine.store.load_packet(&original_tmid_name).await.unwrap_err();
        assert!(matches!(err, sa_store::StoreError::NotFound));

        let recovered = engine.get_user_data("pw").unwrap();
        assert_eq!(recovered, dm3);
    }

    #[tokio::test]
    async fn change_username_round_trips_and_retires_old_identity() {
        let engine = test_engine();
        let dm = DataMap::new(b"payload".to_vec());
        engine.create_user_sys_packets("dana", "1111").await.unwrap();
        engine.create_tmid_packet("dana", "1111", "pw", &dm).await.unwrap();

        engine.change_username(&dm, "dana2").await.unwrap();

        engine.session().reset();
        engine.get_user_info("dana2", "1111").await.unwrap();
        let recovered = engine.get_user_data("pw").unwrap();
        assert_eq!(recovered, dm);

        engine.session().reset();
        let err = engine.get_user_info("dana", "1111").await.unwrap_err();
        assert!(matches!(err, AuthError::UserDoesntExist));
    }

    #[tokio::test]
    async fn create_public_name_twice_fails_second_time() {
        let engine = test_engine();
        engine.create_user_sys_packets("erin", "9999").await.unwrap();
        engine.create_public_name("erin-public").await.unwrap();
        let err = engine.create_public_name("erin-public").await.unwrap_err();
        assert!(matches!(err, AuthError::PublicUsernameExists));
    }

    #[tokio::test]
    async fn remove_me_retires_the_account() {
        let engine = test_engine();
        let dm = DataMap::new(b"payload".to_vec());
        engine.create_user_sys_packets("frank", "5555").await.unwrap();
        engine.create_tmid_packet("frank", "5555", "pw", &dm).await.unwrap();

        engine.remove_me().await.unwrap();

        engine.session().reset();
        let err = engine.get_user_info("frank", "5555").await.unwrap_err();
        assert!(matches!(err, AuthError::UserDoesntExist));
    }

    #[tokio::test]
    async fn create_and_destroy_msid_round_trips() {
        let engine = test_engine();
        let handle = engine.create_msid("shared-folder").await.unwrap();
        assert_eq!(engine.session().private_share("shared-folder"), Some(handle.msid));
        engine.destroy_msid("shared-folder").await.unwrap();
        assert_eq!(engine.session().private_share("shared-folder"), None);
    }
}
