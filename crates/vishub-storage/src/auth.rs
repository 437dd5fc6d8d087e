use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// 生成一个 32 字节的加密安全随机 token（用作回滚令牌等不透明标识）
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 32] = rng.gen();
    general_purpose::STANDARD.encode(token_bytes)
}

/// 使用 bcrypt 对密码进行哈希
pub fn hash_password(password: &str) -> Result<String> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    Ok(hash)
}

/// 验证密码是否匹配哈希值
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// CMS 凭据加密器，使用 AES-256-GCM。
/// 项目的 cms_credentials 永远不落盘明文。
pub struct CredentialEncryptor {
    key_bytes: Vec<u8>,
}

impl CredentialEncryptor {
    /// 从密钥文件加载或自动生成
    pub fn load_or_create(data_dir: &Path) -> Result<Self> {
        let key_path = data_dir.join("cms.key");
        let key_bytes = if key_path.exists() {
            std::fs::read(&key_path)?
        } else {
            let rng = SystemRandom::new();
            let mut key = vec![0u8; 32];
            rng.fill(&mut key)
                .map_err(|_| anyhow::anyhow!("Failed to generate encryption key"))?;
            std::fs::write(&key_path, &key)?;
            // Restrict file permissions to owner-only (0600) on Unix
            #[cfg(unix)]
            {
                let perms = std::fs::Permissions::from_mode(0o600);
                std::fs::set_permissions(&key_path, perms)?;
            }
            tracing::info!(path = %key_path.display(), "Generated new credential encryption key");
            key
        };

        if key_bytes.len() != 32 {
            anyhow::bail!(
                "Invalid credential encryption key length: expected 32 bytes, got {}",
                key_bytes.len()
            );
        }

        Ok(Self { key_bytes })
    }

    /// 加密凭据，返回 base64 编码的 nonce + ciphertext
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key_bytes)
            .map_err(|_| anyhow::anyhow!("Invalid encryption key"))?;
        let key = LessSafeKey::new(unbound_key);

        let rng = SystemRandom::new();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut nonce_bytes)
            .map_err(|_| anyhow::anyhow!("Failed to generate nonce"))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| anyhow::anyhow!("Encryption failed"))?;

        // nonce (12 bytes) + ciphertext + tag
        let mut result = nonce_bytes.to_vec();
        result.extend_from_slice(&in_out);
        Ok(general_purpose::STANDARD.encode(&result))
    }

    /// 解密 base64 编码的 nonce + ciphertext，返回原始凭据
    pub fn decrypt(&self, encrypted: &str) -> Result<String> {
        let data = general_purpose::STANDARD.decode(encrypted)?;
        if data.len() < NONCE_LEN + aead::AES_256_GCM.tag_len() {
            anyhow::bail!("Encrypted data too short");
        }

        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key_bytes)
            .map_err(|_| anyhow::anyhow!("Invalid encryption key"))?;
        let key = LessSafeKey::new(unbound_key);

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| anyhow::anyhow!("Invalid nonce"))?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| anyhow::anyhow!("Decryption failed"))?;

        Ok(String::from_utf8(plaintext.to_vec())?)
    }
}
