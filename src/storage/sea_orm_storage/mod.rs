//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod class_users;
mod classes;
mod grades;
mod notifications;
mod reviews;
#[cfg(test)]
pub(crate) mod testing;
mod users;

use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| GradebookError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradebookError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 测试用的内存数据库
    ///
    /// 内存库随连接销毁，所以连接池固定为一个永不回收的连接。
    #[cfg(test)]
    pub(crate) async fn connect_in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| GradebookError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("SQLite 连接失败: {e}")))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Migrator::up(&db, None)
            .await
            .map_err(|e| GradebookError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GradebookError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 插入时的唯一约束冲突转换为 Conflict，其余为数据库错误
pub(crate) fn map_insert_err(err: DbErr, conflict_message: &str, context: &str) -> GradebookError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => GradebookError::conflict(conflict_message),
        _ => GradebookError::database_operation(format!("{context}: {err}")),
    }
}

// Storage trait 实现
use crate::models::{
    auth::entities::OAuthProvider,
    class_users::{entities::ClassUser, requests::NewClassUser},
    classes::{
        entities::Class,
        requests::CreateClassRequest,
        responses::{ClassMember, UserClassItem},
    },
    grades::{
        entities::{GradeComposition, StudentComposition},
        requests::CreateGradeCompositionRequest,
    },
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
    reviews::{
        entities::{Comment, Review},
        requests::CreateReviewRequest,
        responses::{CommentResponse, FinalizeResponse, ReviewListItem},
    },
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_provider_id(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>> {
        self.get_user_by_provider_id_impl(provider, provider_id)
            .await
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.update_user_password_impl(id, password_hash).await
    }

    async fn mark_user_verified(&self, id: i64) -> Result<bool> {
        self.mark_user_verified_impl(id).await
    }

    async fn link_oauth_account(
        &self,
        id: i64,
        provider: OAuthProvider,
        provider_id: &str,
        img_url: Option<String>,
    ) -> Result<Option<User>> {
        self.link_oauth_account_impl(id, provider, provider_id, img_url)
            .await
    }

    // 班级模块
    async fn create_class(&self, owner_id: i64, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(owner_id, class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn list_user_classes(&self, user_id: i64) -> Result<Vec<UserClassItem>> {
        self.list_user_classes_impl(user_id).await
    }

    // 班级成员模块
    async fn add_class_user(&self, member: NewClassUser) -> Result<ClassUser> {
        self.add_class_user_impl(member).await
    }

    async fn get_class_user(&self, user_id: i64, class_id: i64) -> Result<Option<ClassUser>> {
        self.get_class_user_impl(user_id, class_id).await
    }

    async fn get_class_user_by_student_id(
        &self,
        class_id: i64,
        student_id: &str,
    ) -> Result<Option<ClassUser>> {
        self.get_class_user_by_student_id_impl(class_id, student_id)
            .await
    }

    async fn list_class_members(&self, class_id: i64) -> Result<Vec<ClassMember>> {
        self.list_class_members_impl(class_id).await
    }

    async fn list_class_teacher_ids(&self, class_id: i64) -> Result<Vec<i64>> {
        self.list_class_teacher_ids_impl(class_id).await
    }

    // 成绩模块
    async fn create_grade_composition(
        &self,
        class_id: i64,
        req: CreateGradeCompositionRequest,
    ) -> Result<GradeComposition> {
        self.create_grade_composition_impl(class_id, req).await
    }

    async fn get_grade_composition(&self, grade_id: i64) -> Result<Option<GradeComposition>> {
        self.get_grade_composition_impl(grade_id).await
    }

    async fn list_grade_compositions(&self, class_id: i64) -> Result<Vec<GradeComposition>> {
        self.list_grade_compositions_impl(class_id).await
    }

    async fn upsert_student_grade(
        &self,
        class_id: i64,
        grade_id: i64,
        student_id: &str,
        grade: f64,
    ) -> Result<StudentComposition> {
        self.upsert_student_grade_impl(class_id, grade_id, student_id, grade)
            .await
    }

    async fn get_student_composition(
        &self,
        grade_id: i64,
        student_id: &str,
    ) -> Result<Option<StudentComposition>> {
        self.get_student_composition_impl(grade_id, student_id)
            .await
    }

    async fn list_student_compositions(
        &self,
        class_id: i64,
        student_id: &str,
    ) -> Result<Vec<StudentComposition>> {
        self.list_student_compositions_impl(class_id, student_id)
            .await
    }

    async fn finalize_grade(
        &self,
        class_id: i64,
        grade_id: i64,
        student_id: &str,
        final_grade: f64,
    ) -> Result<Option<FinalizeResponse>> {
        self.finalize_grade_impl(class_id, grade_id, student_id, final_grade)
            .await
    }

    // 复查模块
    async fn create_review(
        &self,
        student_composition: &StudentComposition,
        req: CreateReviewRequest,
    ) -> Result<Review> {
        self.create_review_impl(student_composition, req).await
    }

    async fn is_existed_review(&self, student_composition_id: i64) -> Result<bool> {
        self.is_existed_review_impl(student_composition_id).await
    }

    async fn get_review_by_id(&self, review_id: i64) -> Result<Option<Review>> {
        self.get_review_by_id_impl(review_id).await
    }

    async fn get_review_by_student_composition(
        &self,
        student_composition_id: i64,
    ) -> Result<Option<Review>> {
        self.get_review_by_student_composition_impl(student_composition_id)
            .await
    }

    async fn list_reviews(
        &self,
        class_id: i64,
        grade_id: Option<i64>,
    ) -> Result<Vec<ReviewListItem>> {
        self.list_reviews_impl(class_id, grade_id).await
    }

    async fn get_student_composition_by_id(&self, id: i64) -> Result<Option<StudentComposition>> {
        self.get_student_composition_by_id_impl(id).await
    }

    async fn create_comment(
        &self,
        review_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<Comment> {
        self.create_comment_impl(review_id, user_id, content).await
    }

    async fn list_comments(&self, review_id: i64) -> Result<Vec<CommentResponse>> {
        self.list_comments_impl(review_id).await
    }

    // 通知模块
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification> {
        self.create_notification_impl(req).await
    }

    async fn list_notifications(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_impl(user_id, query).await
    }

    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>> {
        self.get_notification_by_id_impl(id).await
    }

    async fn mark_notification_read(&self, id: i64) -> Result<bool> {
        self.mark_notification_read_impl(id).await
    }
}
