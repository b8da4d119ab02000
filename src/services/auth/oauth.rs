/*!
 * 第三方登录（Facebook / Google）
 *
 * 1. `GET /auth/{provider}` 生成随机 state 写入对象缓存，302 跳转到授权页
 * 2. `GET /auth/{provider}/callback` 校验并消费 state，用 code 换取 access token 后拉取用户资料
 * 3. 按资料找到或创建本地账号，签发令牌后跳回前端 `/login/{provider}`
 */

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header, web};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use tracing::{info, warn};

use super::{AuthService, client_link};
use crate::cache::{CacheResult, ObjectCache};
use crate::config::{AppConfig, OAuthClientConfig};
use crate::errors::{GradebookError, Result};
use crate::models::{
    auth::{
        entities::{OAuthProfile, OAuthProvider},
        requests::OAuthCallbackQuery,
        responses::OAuthTokens,
    },
    users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    },
};
use crate::storage::Storage;

const FACEBOOK_AUTHORIZE_URL: &str = "https://www.facebook.com/v18.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v18.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/v18.0/me";
const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_PROFILE_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const STATE_LENGTH: usize = 32;

fn client_config(provider: OAuthProvider) -> Result<&'static OAuthClientConfig> {
    let oauth = &AppConfig::get().oauth;
    let client = match provider {
        OAuthProvider::Facebook => &oauth.facebook,
        OAuthProvider::Google => &oauth.google,
    };
    if client.is_configured() {
        Ok(client)
    } else {
        Err(GradebookError::bad_request(format!(
            "{provider} login is not configured"
        )))
    }
}

fn state_key(state: &str) -> String {
    format!("oauth_state:{state}")
}

pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// 授权页地址
pub fn authorize_url(
    provider: OAuthProvider,
    client: &OAuthClientConfig,
    state: &str,
) -> Result<String> {
    let url = match provider {
        OAuthProvider::Facebook => reqwest::Url::parse_with_params(
            FACEBOOK_AUTHORIZE_URL,
            &[
                ("client_id", client.client_id.as_str()),
                ("redirect_uri", client.callback_url.as_str()),
                ("state", state),
                ("scope", "email,public_profile"),
                ("response_type", "code"),
            ],
        ),
        OAuthProvider::Google => reqwest::Url::parse_with_params(
            GOOGLE_AUTHORIZE_URL,
            &[
                ("client_id", client.client_id.as_str()),
                ("redirect_uri", client.callback_url.as_str()),
                ("state", state),
                ("scope", "openid email profile"),
                ("response_type", "code"),
            ],
        ),
    };
    url.map(|u| u.to_string())
        .map_err(|e| GradebookError::configuration(format!("Invalid authorize url: {e}")))
}

fn cache_from_request(request: &HttpRequest) -> Result<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| GradebookError::configuration("Object cache not found in app data"))
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub async fn handle_redirect(
    _service: &AuthService,
    request: &HttpRequest,
    provider: OAuthProvider,
) -> ActixResult<HttpResponse> {
    let client = client_config(provider)?;
    let cache = cache_from_request(request)?;

    let state = generate_state();
    cache
        .insert_raw(
            state_key(&state),
            provider.to_string(),
            AppConfig::get().oauth.state_ttl,
        )
        .await;

    Ok(redirect(&authorize_url(provider, client, &state)?))
}

/// 校验并消费 state，只能使用一次
pub async fn consume_state(
    cache: &Arc<dyn ObjectCache>,
    provider: OAuthProvider,
    state: &str,
) -> Result<()> {
    let key = state_key(state);
    match cache.get_raw(&key).await {
        CacheResult::Found(value) if value == provider.to_string() => {
            cache.remove(&key).await;
            Ok(())
        }
        _ => Err(GradebookError::bad_request("Invalid OAuth state")),
    }
}

pub async fn handle_callback(
    service: &AuthService,
    request: &HttpRequest,
    provider: OAuthProvider,
    query: OAuthCallbackQuery,
) -> ActixResult<HttpResponse> {
    if let Some(error) = query.error {
        warn!("{} login was rejected: {}", provider, error);
        return Err(GradebookError::authentication(format!("{provider} login failed")).into());
    }
    let (Some(code), Some(state)) = (query.code, query.state) else {
        return Err(GradebookError::bad_request("Missing code or state").into());
    };

    let client = client_config(provider)?;
    let cache = cache_from_request(request)?;
    consume_state(&cache, provider, &state).await?;

    let profile = fetch_profile(provider, client, &code).await?;
    let storage = service.get_storage(request)?;
    let tokens = oauth_login(&storage, provider, profile).await?;

    let location = client_link(
        &format!("/login/{provider}"),
        &[
            ("access_token", tokens.access_token),
            ("refresh_token", tokens.refresh_token),
            ("user_id", tokens.user_id.to_string()),
        ],
    )?;
    Ok(redirect(&location))
}

#[derive(Debug, Deserialize)]
struct ProviderToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct FacebookProfile {
    id: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<FacebookPicture>,
}

#[derive(Debug, Deserialize)]
struct GoogleProfile {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

/// 用授权码换取 access token 并拉取用户资料
async fn fetch_profile(
    provider: OAuthProvider,
    client: &OAuthClientConfig,
    code: &str,
) -> Result<OAuthProfile> {
    let http = reqwest::Client::new();

    match provider {
        OAuthProvider::Facebook => {
            let token: ProviderToken = http
                .get(FACEBOOK_TOKEN_URL)
                .query(&[
                    ("client_id", client.client_id.as_str()),
                    ("client_secret", client.client_secret.as_str()),
                    ("redirect_uri", client.callback_url.as_str()),
                    ("code", code),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let profile: FacebookProfile = http
                .get(FACEBOOK_PROFILE_URL)
                .query(&[
                    ("fields", "id,name,email,picture.type(large)"),
                    ("access_token", token.access_token.as_str()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            Ok(OAuthProfile {
                fullname: profile.name.unwrap_or_else(|| "Facebook user".to_string()),
                provider_id: profile.id,
                email: profile.email,
                img_url: profile.picture.map(|p| p.data.url),
            })
        }
        OAuthProvider::Google => {
            let token: ProviderToken = http
                .post(GOOGLE_TOKEN_URL)
                .form(&[
                    ("code", code),
                    ("client_id", client.client_id.as_str()),
                    ("client_secret", client.client_secret.as_str()),
                    ("redirect_uri", client.callback_url.as_str()),
                    ("grant_type", "authorization_code"),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let profile: GoogleProfile = http
                .get(GOOGLE_PROFILE_URL)
                .bearer_auth(&token.access_token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            Ok(OAuthProfile {
                fullname: profile.name.unwrap_or_else(|| "Google user".to_string()),
                provider_id: profile.sub,
                email: profile.email,
                img_url: profile.picture,
            })
        }
    }
}

/// 查找第三方资料对应的本地账号
///
/// 先按第三方 ID 查找，再按邮箱查找（邮箱相同的本地账号会被绑定）。
pub async fn check_is_existed_account(
    storage: &Arc<dyn Storage>,
    provider: OAuthProvider,
    profile: &OAuthProfile,
) -> Result<Option<User>> {
    if let Some(user) = storage
        .get_user_by_provider_id(provider, &profile.provider_id)
        .await?
    {
        return Ok(Some(user));
    }
    match &profile.email {
        Some(email) => storage.get_user_by_email(email).await,
        None => Ok(None),
    }
}

/// 第三方登录：绑定已有账号或创建新账号，返回令牌
pub async fn oauth_login(
    storage: &Arc<dyn Storage>,
    provider: OAuthProvider,
    profile: OAuthProfile,
) -> Result<OAuthTokens> {
    let user = match check_is_existed_account(storage, provider, &profile).await? {
        Some(user) => {
            let linked = match provider {
                OAuthProvider::Facebook => user.facebook_id.as_deref(),
                OAuthProvider::Google => user.google_id.as_deref(),
            };
            if linked == Some(profile.provider_id.as_str()) {
                user
            } else {
                storage
                    .link_oauth_account(user.id, provider, &profile.provider_id, profile.img_url)
                    .await?
                    .ok_or_else(|| GradebookError::not_found("User not found"))?
            }
        }
        None => {
            let email = profile
                .email
                .filter(|email| !email.trim().is_empty())
                .ok_or_else(|| {
                    GradebookError::bad_request(format!(
                        "Your {provider} account does not share an email address"
                    ))
                })?;
            let (facebook_id, google_id) = match provider {
                OAuthProvider::Facebook => (Some(profile.provider_id), None),
                OAuthProvider::Google => (None, Some(profile.provider_id)),
            };
            let user = storage
                .create_user(CreateUserRequest {
                    email,
                    fullname: profile.fullname,
                    password_hash: None,
                    img_url: profile.img_url,
                    facebook_id,
                    google_id,
                    role: UserRole::User,
                    is_verified: true,
                })
                .await?;
            info!("Created user {} from {} login", user.id, provider);
            user
        }
    };

    let tokens = user.generate_token_pair()?;
    Ok(OAuthTokens {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user_id: user.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::services::testing::{create_user, memory_storage};

    fn profile(provider_id: &str, email: Option<&str>) -> OAuthProfile {
        OAuthProfile {
            provider_id: provider_id.to_string(),
            email: email.map(str::to_string),
            fullname: "Oauth Person".to_string(),
            img_url: Some("https://cdn/avatar.png".to_string()),
        }
    }

    #[actix_web::test]
    async fn test_new_account_is_created_and_reused() {
        let storage = memory_storage().await;

        let first = oauth_login(
            &storage,
            OAuthProvider::Facebook,
            profile("fb-1", Some("fb@x.com")),
        )
        .await
        .unwrap();
        let user = storage.get_user_by_id(first.user_id).await.unwrap().unwrap();
        assert!(user.is_verified);
        assert!(user.password_hash.is_none());
        assert_eq!(user.facebook_id.as_deref(), Some("fb-1"));

        // 第二次登录，即使邮箱没有返回也能找到同一账号
        let second = oauth_login(&storage, OAuthProvider::Facebook, profile("fb-1", None))
            .await
            .unwrap();
        assert_eq!(second.user_id, first.user_id);
    }

    #[actix_web::test]
    async fn test_google_links_existing_email_account() {
        let storage = memory_storage().await;
        let user_id = create_user(&storage, "g@x.com").await;

        let tokens = oauth_login(
            &storage,
            OAuthProvider::Google,
            profile("google-sub-9", Some("g@x.com")),
        )
        .await
        .unwrap();
        assert_eq!(tokens.user_id, user_id);

        let user = storage.get_user_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.google_id.as_deref(), Some("google-sub-9"));
        // 已有头像不被覆盖
        assert_eq!(user.img_url.as_deref(), Some("https://img/g@x.com"));
    }

    #[actix_web::test]
    async fn test_new_account_without_email_fails() {
        let storage = memory_storage().await;
        let err = oauth_login(&storage, OAuthProvider::Facebook, profile("fb-2", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");
    }

    #[actix_web::test]
    async fn test_state_is_single_use_and_provider_bound() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new().unwrap());
        let state = generate_state();
        assert_eq!(state.len(), STATE_LENGTH);
        cache
            .insert_raw(state_key(&state), OAuthProvider::Google.to_string(), 60)
            .await;

        assert!(
            consume_state(&cache, OAuthProvider::Facebook, &state)
                .await
                .is_err()
        );
        consume_state(&cache, OAuthProvider::Google, &state)
            .await
            .unwrap();
        assert!(
            consume_state(&cache, OAuthProvider::Google, &state)
                .await
                .is_err()
        );
    }

    #[test]
    fn test_authorize_url_carries_state() {
        let client = OAuthClientConfig {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "http://localhost:8080/auth/google/callback".to_string(),
        };
        let url = authorize_url(OAuthProvider::Google, &client, "abc123").unwrap();
        assert!(url.starts_with(GOOGLE_AUTHORIZE_URL));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("client_id=cid"));
        assert!(!url.contains("secret"));
    }
}
