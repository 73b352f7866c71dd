use cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::config::SessionConfig;

/// 会话 Cookie 的签名、构造与解析。
///
/// Cookie 值为 `"{session_id}.{hex(hmac_sha256(secret, session_id))}"`：
/// 签名校验失败的 Cookie 直接视为不存在，不会触发数据库查询。
/// 会话本身存在 SQLite 中，Cookie 只携带不透明的会话 ID。
pub struct CookieSigner {
    cookie_name: String,
    secret: Vec<u8>,
    ttl_secs: u64,
    secure: bool,
}

impl CookieSigner {
    pub fn new(config: &SessionConfig) -> Self {
        let secret = if config.secret.trim().is_empty() {
            // 未配置密钥时随机生成：重启后既有会话全部失效
            tracing::warn!("session.secret 未配置，使用随机密钥（重启后所有会话失效）");
            let mut bytes = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            bytes
        } else {
            config.secret.as_bytes().to_vec()
        };
        Self {
            cookie_name: config.cookie_name.clone(),
            secret,
            ttl_secs: config.ttl_secs,
            secure: config.secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn signature(&self, session_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC key");
        mac.update(session_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// 对会话 ID 签名，生成 Cookie 值
    pub fn sign(&self, session_id: &str) -> String {
        format!("{session_id}.{}", self.signature(session_id))
    }

    /// 校验 Cookie 值并取出会话 ID；签名不符返回 None
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (session_id, sig) = cookie_value.rsplit_once('.')?;
        if session_id.is_empty() {
            return None;
        }
        let expected = self.signature(session_id);

        // 常数时间比较，防止签名逐字节试探
        if sig.len() != expected.len() {
            return None;
        }
        let mut diff = 0u8;
        for (a, b) in sig.bytes().zip(expected.bytes()) {
            diff |= a ^ b;
        }
        (diff == 0).then(|| session_id.to_string())
    }

    /// 从请求的 Cookie 头解析出已验签的会话 ID
    pub fn session_id_from_cookie_header(&self, header: &str) -> Option<String> {
        for cookie in Cookie::split_parse(header.to_string()) {
            let Ok(cookie) = cookie else { continue };
            if cookie.name() == self.cookie_name {
                return self.verify(cookie.value());
            }
        }
        None
    }

    /// 构造登录/注册时下发的 Set-Cookie 头值
    pub fn build_cookie(&self, session_id: &str) -> String {
        let cookie = Cookie::build((self.cookie_name.clone(), self.sign(session_id)))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.ttl_secs as i64))
            .build();
        cookie.to_string()
    }

    /// 构造登出时清除会话的 Set-Cookie 头值（Max-Age=0）
    pub fn build_removal_cookie(&self) -> String {
        let cookie = Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::ZERO)
            .build();
        cookie.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::CookieSigner;
    use crate::config::SessionConfig;

    fn signer() -> CookieSigner {
        CookieSigner::new(&SessionConfig {
            cookie_name: "qr_session".to_string(),
            secret: "test-secret".to_string(),
            ttl_secs: 3600,
            secure: false,
        })
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let s = signer();
        let value = s.sign("session-123");
        assert_eq!(s.verify(&value).as_deref(), Some("session-123"));
    }

    #[test]
    fn verify_rejects_tampered_value() {
        let s = signer();
        let mut value = s.sign("session-123");
        value.replace_range(0..7, "hacked!");
        assert!(s.verify(&value).is_none());
        assert!(s.verify("no-dot-at-all").is_none());
        assert!(s.verify(".only-signature").is_none());
    }

    #[test]
    fn verify_rejects_other_secret() {
        let s = signer();
        let other = CookieSigner::new(&SessionConfig {
            secret: "another-secret".to_string(),
            ..SessionConfig::default()
        });
        let value = other.sign("session-123");
        assert!(s.verify(&value).is_none());
    }

    #[test]
    fn cookie_header_parsing_picks_session_cookie() {
        let s = signer();
        let header = format!("theme=dark; qr_session={}; lang=en", s.sign("sid"));
        assert_eq!(s.session_id_from_cookie_header(&header).as_deref(), Some("sid"));
        assert!(s.session_id_from_cookie_header("theme=dark").is_none());
    }

    #[test]
    fn built_cookie_carries_attributes() {
        let s = signer();
        let value = s.build_cookie("sid");
        assert!(value.contains("qr_session="));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Path=/"));

        let removal = s.build_removal_cookie();
        assert!(removal.contains("Max-Age=0"));
    }

    #[test]
    fn empty_secret_falls_back_to_random_key() {
        let a = CookieSigner::new(&SessionConfig::default());
        let b = CookieSigner::new(&SessionConfig::default());
        // 两个随机密钥互不承认对方的签名
        let value = a.sign("sid");
        assert!(b.verify(&value).is_none());
        assert!(a.verify(&value).is_some());
    }
}
