use std::sync::Arc;

use crate::features::auth::password::PasswordHasher;
use crate::features::auth::session::CookieSigner;
use crate::features::auth::storage::UserStorage;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 用户与会话存储（SQLite）
    pub storage: Arc<UserStorage>,
    /// 会话 Cookie 的签名与构造器
    pub signer: Arc<CookieSigner>,
    /// 密码哈希器（算法由配置决定）
    pub hasher: Arc<PasswordHasher>,
}
