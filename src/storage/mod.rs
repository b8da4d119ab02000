use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过第三方账号 ID 获取用户信息
    async fn get_user_by_provider_id(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>>;
    // 更新密码哈希
    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool>;
    // 标记邮箱已验证
    async fn mark_user_verified(&self, id: i64) -> Result<bool>;
    // 绑定第三方账号，头像为空时顺带补上
    async fn link_oauth_account(
        &self,
        id: i64,
        provider: OAuthProvider,
        provider_id: &str,
        img_url: Option<String>,
    ) -> Result<Option<User>>;

    /// 班级管理方法
    // 创建班级，同时把创建者登记为教师
    async fn create_class(&self, owner_id: i64, class: CreateClassRequest) -> Result<Class>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 列出用户所在的班级
    async fn list_user_classes(&self, user_id: i64) -> Result<Vec<UserClassItem>>;

    /// 班级成员方法
    // 添加成员，重复添加返回 Conflict
    async fn add_class_user(&self, member: NewClassUser) -> Result<ClassUser>;
    // 获取用户在班级中的成员关系
    async fn get_class_user(&self, user_id: i64, class_id: i64) -> Result<Option<ClassUser>>;
    // 通过学号获取成员关系
    async fn get_class_user_by_student_id(
        &self,
        class_id: i64,
        student_id: &str,
    ) -> Result<Option<ClassUser>>;
    // 列出班级成员及用户资料
    async fn list_class_members(&self, class_id: i64) -> Result<Vec<ClassMember>>;
    // 列出班级所有教师的用户ID
    async fn list_class_teacher_ids(&self, class_id: i64) -> Result<Vec<i64>>;

    /// 成绩方法
    async fn create_grade_composition(
        &self,
        class_id: i64,
        req: CreateGradeCompositionRequest,
    ) -> Result<GradeComposition>;
    async fn get_grade_composition(&self, grade_id: i64) -> Result<Option<GradeComposition>>;
    // 按 position、id 排序
    async fn list_grade_compositions(&self, class_id: i64) -> Result<Vec<GradeComposition>>;
    // 登记或修改学生成绩
    async fn upsert_student_grade(
        &self,
        class_id: i64,
        grade_id: i64,
        student_id: &str,
        grade: f64,
    ) -> Result<StudentComposition>;
    async fn get_student_composition(
        &self,
        grade_id: i64,
        student_id: &str,
    ) -> Result<Option<StudentComposition>>;
    async fn list_student_compositions(
        &self,
        class_id: i64,
        student_id: &str,
    ) -> Result<Vec<StudentComposition>>;
    // 确定最终成绩：更新 (class, grade, student) 对应的成绩，并确定待处理的复查
    // 没有匹配的成绩时返回 None，且不做任何修改
    async fn finalize_grade(
        &self,
        class_id: i64,
        grade_id: i64,
        student_id: &str,
        final_grade: f64,
    ) -> Result<Option<FinalizeResponse>>;

    /// 复查方法
    // 在事务中检查并创建复查，已存在返回 Conflict
    async fn create_review(
        &self,
        student_composition: &StudentComposition,
        req: CreateReviewRequest,
    ) -> Result<Review>;
    async fn is_existed_review(&self, student_composition_id: i64) -> Result<bool>;
    async fn get_review_by_id(&self, review_id: i64) -> Result<Option<Review>>;
    async fn get_review_by_student_composition(
        &self,
        student_composition_id: i64,
    ) -> Result<Option<Review>>;
    // 列出班级的复查，可按成绩组成过滤
    async fn list_reviews(
        &self,
        class_id: i64,
        grade_id: Option<i64>,
    ) -> Result<Vec<ReviewListItem>>;
    // 获取复查对应的学生成绩
    async fn get_student_composition_by_id(&self, id: i64) -> Result<Option<StudentComposition>>;
    async fn create_comment(&self, review_id: i64, user_id: i64, content: &str)
    -> Result<Comment>;
    // 按 id 升序
    async fn list_comments(&self, review_id: i64) -> Result<Vec<CommentResponse>>;

    /// 通知方法
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification>;
    async fn list_notifications(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse>;
    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>>;
    async fn mark_notification_read(&self, id: i64) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
