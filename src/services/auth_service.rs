use crate::config::AdminConfig;
use crate::entities::{UserRole, UserStatus, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::load_user;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: CreateUserRequest) -> AppResult<AuthResponse> {
        // 验证输入参数
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;

        // 检查邮箱是否已注册
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let user = self
            .insert_user(
                name,
                email,
                request.phone_number,
                &request.password,
                UserRole::User,
            )
            .await?;

        log::info!("Registered user {} ({})", user.id, user.email);
        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        // 验证密码
        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }
        if user.status != UserStatus::Active {
            return Err(AppError::AuthError("Account is inactive".to_string()));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = load_user(&self.pool, claims.user_id()?)
            .await
            .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;
        if user.status != UserStatus::Active {
            return Err(AppError::AuthError("Account is inactive".to_string()));
        }

        // 刷新时只换发 access token，角色以库中为准
        let access_token = self.jwt_service.generate_access_token(user.id, user.role)?;
        Ok(AuthResponse {
            user: user.into(),
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// 启动时确保配置中的管理员账号存在；返回是否新建
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<bool> {
        let email = normalize_email(&admin.email);
        validate_email(&email)?;

        if let Some(existing) = self.find_by_email(&email).await? {
            if !existing.is_admin() {
                log::warn!("Configured admin email {email} belongs to a non-admin account");
            }
            return Ok(false);
        }

        validate_password(&admin.password)?;
        let user = self
            .insert_user(
                admin.name.clone(),
                email,
                None,
                &admin.password,
                UserRole::Admin,
            )
            .await?;
        log::info!("Created admin account {} ({})", user.id, user.email);
        Ok(true)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(
        &self,
        name: String,
        email: String,
        phone_number: Option<String>,
        password: &str,
        role: UserRole,
    ) -> AppResult<users::Model> {
        let now = Utc::now();
        let phone_number = phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let user = users::ActiveModel {
            name: Set(name),
            email: Set(email),
            phone_number: Set(phone_number),
            password_hash: Set(hash_password(password)?),
            role: Set(role),
            status: Set(UserStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, user.role)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, user.role)?;
        Ok(AuthResponse {
            user: user.into(),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::services::test_helpers::{TEST_PASSWORD, seed_user};
    use crate::services::user_service::UserService;

    fn service(pool: &DatabaseConnection) -> AuthService {
        AuthService::new(pool.clone(), JwtService::new("auth-test", 3600, 86400))
    }

    fn register_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Jane".into(),
            email: email.into(),
            phone_number: Some("+254700000001".into()),
            password: "password123".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_duplicate_conflicts() {
        let pool = create_test_pool().await;
        let auth = service(&pool);

        let resp = auth
            .register(register_request("Jane@MNet.com"))
            .await
            .unwrap();
        assert_eq!(resp.user.email, "jane@mnet.com");
        assert_eq!(resp.user.role, UserRole::User);
        assert_eq!(resp.user.status, UserStatus::Active);

        let err = auth
            .register(register_request("jane@mnet.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let pool = create_test_pool().await;
        let auth = service(&pool);

        let err = auth.register(register_request("not-an-email")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mut weak = register_request("weak@mnet.com");
        weak.password = "short".into();
        let err = auth.register(weak).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let auth = service(&pool);

        let err = auth
            .login(LoginRequest {
                email: "jane@mnet.com".into(),
                password: "wrong-pass1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));

        let resp = auth
            .login(LoginRequest {
                email: "jane@mnet.com".into(),
                password: TEST_PASSWORD.into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.id, user.id);

        let refreshed = auth.refresh_token(&resp.refresh_token).await.unwrap();
        assert_eq!(refreshed.user.id, user.id);

        // access token 不能用来刷新
        assert!(auth.refresh_token(&resp.access_token).await.is_err());
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_login() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        UserService::new(pool.clone())
            .set_status(admin.id, user.id, UserStatus::Inactive)
            .await
            .unwrap();

        let err = service(&pool)
            .login(LoginRequest {
                email: "jane@mnet.com".into(),
                password: TEST_PASSWORD.into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let pool = create_test_pool().await;
        let auth = service(&pool);
        let admin = AdminConfig {
            email: "admin@mnet.com".into(),
            password: "Admin12345".into(),
            name: "Admin".into(),
        };

        assert!(auth.ensure_admin(&admin).await.unwrap());
        assert!(!auth.ensure_admin(&admin).await.unwrap());

        let resp = auth
            .login(LoginRequest {
                email: admin.email.clone(),
                password: admin.password.clone(),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.role, UserRole::Admin);
    }
}
