//! 接続・リクエストに付随する認証済みユーザー ID の解決

use super::{error::ValueObjectError, value_object::UserId};

/// 認証情報から検証済みのユーザー ID を解決する
///
/// * `Ok(Some(id))` - 認証済み
/// * `Ok(None)` - 認証情報なし（匿名）
/// * `Err(_)` - 認証情報はあるが不正
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, credential: Option<&str>) -> Result<Option<UserId>, ValueObjectError>;
}
