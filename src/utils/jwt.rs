use crate::config::{AppConfig, JwtConfig};
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,           // Subject (user ID)
    pub role: String,          // 用户角色
    pub token_type: TokenType, // token类型
    pub exp: usize,            // Expiration time (时间戳)
    pub iat: usize,            // Issued at (签发时间)
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, jsonwebtoken::errors::Error> {
        self.sub
            .parse::<i64>()
            .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidToken.into())
    }
}

// Token 响应结构体
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    fn config() -> &'static JwtConfig {
        &AppConfig::get().jwt
    }

    // 生成 Access Token
    pub fn generate_access_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = Self::config();
        Self::generate_token_with_expiry(
            config,
            user_id,
            role,
            TokenType::Access,
            chrono::Duration::minutes(config.access_token_expiry),
        )
    }

    // 生成 Refresh Token
    pub fn generate_refresh_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = Self::config();
        Self::generate_token_with_expiry(
            config,
            user_id,
            role,
            TokenType::Refresh,
            chrono::Duration::days(config.refresh_token_expiry),
        )
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token_with_expiry(
        config: &JwtConfig,
        user_id: i64,
        role: &str,
        token_type: TokenType,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type,
            exp: expiration.timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
        };

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key)
    }

    // 生成完整的 Token 对（access + refresh）
    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let access_token = Self::generate_access_token(user_id, role)?;
        let refresh_token = Self::generate_refresh_token(user_id, role)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    // 验证 token 签名、有效期与类型
    pub fn verify_token_type(
        config: &JwtConfig,
        token: &str,
        expected_type: TokenType,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let claims = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)?;

        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(Self::config(), token, TokenType::Access)
    }

    // 验证 Refresh Token
    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(Self::config(), token, TokenType::Refresh)
    }

    // 使用 Refresh Token 生成新的 Access Token
    pub fn refresh_access_token(
        refresh_token: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        Self::generate_access_token(claims.user_id()?, &claims.role)
    }

    /// 创建 Refresh Token Cookie
    pub fn create_refresh_token_cookie(refresh_token: &str) -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(REFRESH_TOKEN_COOKIE, refresh_token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::days(
                config.jwt.refresh_token_expiry,
            ))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production()) // 生产环境下使用 HTTPS
            .finish()
    }

    /// 从请求中提取 Refresh Token
    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_string(),
            access_token_expiry: 15,
            refresh_token_expiry: 1,
        }
    }

    #[test]
    fn test_token_roundtrip_keeps_identity() {
        let config = test_config();
        let token = JwtUtils::generate_token_with_expiry(
            &config,
            7,
            "teacher",
            TokenType::Access,
            chrono::Duration::minutes(5),
        )
        .unwrap();

        let claims = JwtUtils::verify_token_type(&config, &token, TokenType::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.role, "teacher");
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let config = test_config();
        let token = JwtUtils::generate_token_with_expiry(
            &config,
            7,
            "student",
            TokenType::Refresh,
            chrono::Duration::days(1),
        )
        .unwrap();

        assert!(JwtUtils::verify_token_type(&config, &token, TokenType::Access).is_err());
        assert!(JwtUtils::verify_token_type(&config, &token, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = test_config();
        let token = JwtUtils::generate_token_with_expiry(
            &config,
            7,
            "student",
            TokenType::Access,
            chrono::Duration::minutes(-10),
        )
        .unwrap();

        assert!(JwtUtils::verify_token_type(&config, &token, TokenType::Access).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = test_config();
        let token = JwtUtils::generate_token_with_expiry(
            &config,
            7,
            "student",
            TokenType::Access,
            chrono::Duration::minutes(5),
        )
        .unwrap();

        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        };
        assert!(JwtUtils::verify_token_type(&other, &token, TokenType::Access).is_err());
    }
}
