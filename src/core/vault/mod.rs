use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use anyhow::{Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::Mac;
use rusqlite::{Connection, OptionalExtension};
use sha2::Sha256;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

type HmacSha256 = hmac::Hmac<Sha256>;

/// Secret name for the AI provider key behind the inspector.
pub const AI_KEY_NAME: &str = "ai_api_key";

const NONCE_LEN: usize = 12;

/// Encrypted secrets kept next to the job store in `flashfix.db`.
pub struct KeyVault {
    db: Arc<Mutex<Connection>>,
    cipher: Aes256Gcm,
}

/// Machine-bound key: HMAC-SHA256 over host and user name. Stable across
/// restarts, useless when the database file is copied elsewhere.
fn machine_key() -> [u8; 32] {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown-host".to_string());
    let user = whoami::username();

    let mut mac = <HmacSha256 as Mac>::new_from_slice(b"flashfix-vault-v1")
        .expect("HMAC can take key of any size");
    mac.update(host.as_bytes());
    mac.update(b"/");
    mac.update(user.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}

impl KeyVault {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        let key = machine_key();
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        Self { db, cipher }
    }

    pub async fn initialize(&self) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "CREATE TABLE IF NOT EXISTS secrets (
                name TEXT PRIMARY KEY,
                sealed TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(())
    }

    /// base64(nonce || ciphertext)
    fn seal(&self, plaintext: &str) -> Result<String> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| anyhow!("Encryption failed: {}", e))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    fn open(&self, sealed: &str) -> Result<String> {
        let raw = STANDARD
            .decode(sealed)
            .map_err(|e| anyhow!("Base64 decode failed: {}", e))?;
        if raw.len() <= NONCE_LEN {
            return Err(anyhow!("Sealed value too short"));
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| anyhow!("Decryption failed: {}", e))?;
        String::from_utf8(plaintext).map_err(|e| anyhow!("UTF-8 decode failed: {}", e))
    }

    pub async fn set(&self, name: &str, value: &str) -> Result<()> {
        let sealed = self.seal(value)?;
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO secrets (name, sealed) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET sealed = excluded.sealed, updated_at = CURRENT_TIMESTAMP",
            (name, &sealed),
        )?;
        Ok(())
    }

    /// `None` when the secret is absent or was sealed on another machine.
    pub async fn get(&self, name: &str) -> Result<Option<String>> {
        let sealed: Option<String> = {
            let db = self.db.lock().await;
            db.query_row(
                "SELECT sealed FROM secrets WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?
        };
        let Some(sealed) = sealed else {
            return Ok(None);
        };
        match self.open(&sealed) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Secret '{}' cannot be opened on this machine: {}", name, e);
                Ok(None)
            }
        }
    }

    pub async fn remove(&self, name: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.execute("DELETE FROM secrets WHERE name = ?1", [name])?;
        Ok(())
    }

    pub async fn has_selected_key(&self) -> Result<bool> {
        Ok(self
            .get(AI_KEY_NAME)
            .await?
            .is_some_and(|k| !k.trim().is_empty()))
    }

    pub async fn select_key(&self, key: &str) -> Result<()> {
        self.set(AI_KEY_NAME, key.trim()).await?;
        info!("AI provider key selected");
        Ok(())
    }

    pub async fn clear_key(&self) -> Result<()> {
        self.remove(AI_KEY_NAME).await?;
        info!("AI provider key cleared");
        Ok(())
    }
}
