//! 上流の認証プロキシを信頼する IdentityResolver
//!
//! 認証プロキシが `x-user-id` ヘッダー（または `user_id` クエリ）に
//! 検証済みのユーザー ID を設定している前提で、その値を読むだけです。

use crate::domain::{IdentityResolver, UserId, ValueObjectError};

/// 認証済みユーザー ID を運ぶヘッダー名
pub const USER_ID_HEADER: &str = "x-user-id";

/// 認証済みユーザー ID を運ぶクエリパラメーター名
pub const USER_ID_QUERY: &str = "user_id";

/// 上流で検証済みの ID をそのまま信頼する実装
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedIdentityResolver;

impl IdentityResolver for TrustedIdentityResolver {
    fn resolve(&self, credential: Option<&str>) -> Result<Option<UserId>, ValueObjectError> {
        match credential.map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}
