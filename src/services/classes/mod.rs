pub mod create;
pub mod invite;
pub mod members;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::classes::requests::{
    AddUserToClassRequest, CreateClassRequest, InviteRequest, VerifyInviteRequest,
};
use crate::storage::Storage;

pub struct ClassService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create_class(self, request, class_data).await
    }

    // 教师向班级添加成员
    pub async fn add_user_to_class(
        &self,
        request: &HttpRequest,
        body: AddUserToClassRequest,
    ) -> ActixResult<HttpResponse> {
        members::handle_add_user_to_class(self, request, body).await
    }

    pub async fn list_class_users(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        members::handle_list_class_users(self, request, class_id).await
    }

    // 当前用户所在的班级
    pub async fn list_user_classes(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        members::handle_list_user_classes(self, request).await
    }

    pub async fn get_class_role(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        members::handle_get_class_role(self, request, class_id).await
    }

    // 生成邀请链接
    pub async fn get_invite_link(
        &self,
        request: &HttpRequest,
        body: InviteRequest,
    ) -> ActixResult<HttpResponse> {
        invite::handle_get_invite_link(self, request, body).await
    }

    // 通过邀请链接加入班级
    pub async fn verify_invite(
        &self,
        request: &HttpRequest,
        body: VerifyInviteRequest,
    ) -> ActixResult<HttpResponse> {
        invite::handle_verify_invite(self, request, body).await
    }
}
