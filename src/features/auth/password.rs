use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _, password_hash::SaltString,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand_core::OsRng;
use sha2::Sha256;

use crate::config::{PasswordAlgorithm, PasswordConfig};
use crate::error::AppError;

const PBKDF2_SALT_LEN: usize = 16;
const PBKDF2_OUTPUT_LEN: usize = 32;

/// 密码哈希器。
///
/// 算法由配置决定：默认 Argon2id（PHC 字符串，自带参数与盐），
/// 可选 PBKDF2-HMAC-SHA256。校验时按存储哈希自身的格式分派，
/// 因此切换配置后旧用户仍可正常登录。
pub struct PasswordHasher {
    config: PasswordConfig,
}

impl PasswordHasher {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    /// 生成带盐哈希，输出自描述格式字符串
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        match self.config.algorithm {
            PasswordAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
                Ok(hash.to_string())
            }
            PasswordAlgorithm::Pbkdf2 => {
                let iterations = self.config.pbkdf2_iterations.max(1);
                let mut salt = [0u8; PBKDF2_SALT_LEN];
                rand::thread_rng().fill_bytes(&mut salt);
                let mut out = [0u8; PBKDF2_OUTPUT_LEN];
                pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut out);
                Ok(format!(
                    "$pbkdf2-sha256$i={iterations}${}${}",
                    hex::encode(salt),
                    hex::encode(out)
                ))
            }
        }
    }

    /// 校验密码；格式无法识别或参数损坏时视为不匹配
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        if stored.starts_with("$pbkdf2-sha256$") {
            return verify_pbkdf2(password, stored);
        }
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

fn verify_pbkdf2(password: &str, stored: &str) -> bool {
    // 格式：$pbkdf2-sha256$i=<iterations>$<salt_hex>$<hash_hex>
    let mut parts = stored.trim_start_matches('$').split('$');
    let (Some(_algo), Some(iter_part), Some(salt_hex), Some(hash_hex)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Some(iterations) = iter_part
        .strip_prefix("i=")
        .and_then(|v| v.parse::<u32>().ok())
    else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    if expected.len() != PBKDF2_OUTPUT_LEN || iterations == 0 {
        return false;
    }

    let mut out = [0u8; PBKDF2_OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut out);

    // 常数时间比较，避免逐字节短路
    let mut diff = 0u8;
    for (a, b) in out.iter().zip(expected.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::PasswordHasher;
    use crate::config::{PasswordAlgorithm, PasswordConfig};

    fn hasher(algorithm: PasswordAlgorithm) -> PasswordHasher {
        PasswordHasher::new(PasswordConfig {
            algorithm,
            // 测试用低迭代数，避免拖慢用例
            pbkdf2_iterations: 1000,
        })
    }

    #[test]
    fn argon2_hash_and_verify_round_trip() {
        let h = hasher(PasswordAlgorithm::Argon2);
        let hash = h.hash("password").unwrap();
        assert_ne!(hash, "password");
        assert!(hash.starts_with("$argon2"));
        assert!(h.verify("password", &hash));
        assert!(!h.verify("wrong", &hash));
    }

    #[test]
    fn pbkdf2_hash_and_verify_round_trip() {
        let h = hasher(PasswordAlgorithm::Pbkdf2);
        let hash = h.hash("password").unwrap();
        assert!(hash.starts_with("$pbkdf2-sha256$i=1000$"));
        assert!(h.verify("password", &hash));
        assert!(!h.verify("wrong", &hash));
    }

    #[test]
    fn verify_dispatches_on_stored_format() {
        // 配置为 pbkdf2，但旧的 argon2 哈希仍可校验通过
        let argon = hasher(PasswordAlgorithm::Argon2);
        let pbkdf2 = hasher(PasswordAlgorithm::Pbkdf2);
        let hash = argon.hash("password").unwrap();
        assert!(pbkdf2.verify("password", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        let h = hasher(PasswordAlgorithm::Argon2);
        assert!(!h.verify("password", "not-a-hash"));
        assert!(!h.verify("password", "$pbkdf2-sha256$i=abc$zz$zz"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let h = hasher(PasswordAlgorithm::Pbkdf2);
        let a = h.hash("password").unwrap();
        let b = h.hash("password").unwrap();
        assert_ne!(a, b);
    }
}
