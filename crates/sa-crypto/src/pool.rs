//! Key-pair pool: pre-generates RSA key-pairs on a bounded worker pool.
//!
//! RSA key generation is the dominant latency in account creation, and
//! every packet-factory `create` for a signature kind needs a fresh pair.
//! Decoupling generation from the request keeps the authentication engine's
//! state machine from stalling on keygen. `get()` blocks the calling thread
//! (it is meant to be called from a `tokio::task::spawn_blocking` context,
//! never directly from an async task).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::CryptoError;
use crate::sign::KeyPair;

/// Pre-generates RSA key-pairs on up to `max_crypto_thread_count` worker
/// threads, keeping at most `crypto_key_buffer_count` ready pairs buffered.
pub struct KeyPairPool {
    rx: Receiver<KeyPair>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl KeyPairPool {
    pub fn new(max_crypto_thread_count: u16, crypto_key_buffer_count: u16) -> Self {
        let buffer = crypto_key_buffer_count.max(1) as usize;
        let threads = max_crypto_thread_count.max(1);
        let (tx, rx): (SyncSender<KeyPair>, Receiver<KeyPair>) = sync_channel(buffer);
        let shutdown = Arc::new(AtomicBool::new(false));

        let workers = (0..threads)
            .map(|n| spawn_worker(n, tx.clone(), shutdown.clone()))
            .collect();

        // Drop our own sender handle; the workers each hold one, and the
        // channel only closes once every worker has exited.
        drop(tx);

        Self { rx, shutdown, workers }
    }

    /// Blocking pop of a ready key-pair. Call this from a blocking context
    /// (`tokio::task::spawn_blocking`), never from an async task directly.
    pub fn get(&self) -> Result<KeyPair, CryptoError> {
        self.rx.recv().map_err(|_| CryptoError::PoolShutDown)
    }
}

impl Drop for KeyPairPool {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // A worker can be parked inside `tx.send()` on a full bounded
        // channel; draining whatever happens to be queued right now only
        // wakes it if the drain runs after the send blocks, which is not
        // guaranteed. Dropping the receiver is: `SyncSender::send` always
        // wakes with a disconnect error once every receiver is gone, so
        // this unsticks every worker regardless of timing before we join.
        let (_, placeholder) = sync_channel::<KeyPair>(1);
        drop(std::mem::replace(&mut self.rx, placeholder));
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn spawn_worker(id: u16, tx: SyncSender<KeyPair>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name(format!("sa-keypair-gen-{id}"))
        .spawn(move || {
            let mut rng = rand::rngs::OsRng;
            while !shutdown.load(Ordering::SeqCst) {
                match KeyPair::generate(&mut rng) {
                    Ok(kp) => {
                        if tx.send(kp).is_err() {
                            break; // receiver dropped
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "key-pair generation failed, retrying");
                    }
                }
            }
        })
        .expect("failed to spawn key-pair generator thread")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_yields_usable_key_pairs() {
        let pool = KeyPairPool::new(2, 2);
        let kp = pool.get().expect("pool should yield a key pair");
        assert!(!kp.public_key_der().is_empty());
    }

    #[test]
    fn pool_shuts_down_cleanly() {
        let pool = KeyPairPool::new(1, 1);
        let _ = pool.get().unwrap();
        drop(pool); // must not hang
    }

    /// Regression test: with more worker threads than buffer slots, the
    /// buffer fills and at least one worker parks inside `tx.send()`.
    /// Dropping the pool here must still not hang.
    #[test]
    fn pool_shuts_down_cleanly_with_more_threads_than_buffer_slots() {
        let pool = KeyPairPool::new(4, 1);
        std::thread::sleep(std::time::Duration::from_millis(50));
        drop(pool); // must not hang
    }
}
