/*!
 * 基于班级角色的访问控制中间件
 *
 * 此中间件必须在 RequireJWT 中间件之后使用，用于验证用户是否具有特定班级角色权限。
 * 班级 ID 优先从路径参数 `{class_id}` 读取，其次是查询参数 `class_id` / `classId`。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::{RequireClassRole, RequireJWT};
 * use crate::models::class_users::entities::ClassUserRole;
 *
 * web::resource("/review/list")
 *     .wrap(RequireClassRole::new(&ClassUserRole::Teacher))
 *     .wrap(RequireJWT)
 *     .route(web::get().to(list_reviews));
 *
 * // 学生或教师均可
 * .wrap(RequireClassRole::new_any(ClassUserRole::all_roles()))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};

use crate::{
    errors::{GradebookError, Result},
    models::{
        class_users::entities::{ClassUser, ClassUserRole},
        users::entities::{User, UserRole},
    },
    storage::Storage,
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireClassRole {
    required_roles: Vec<ClassUserRole>,
    require_all: bool, // true表示需要所有班级角色，false表示任一班级角色即可
}

impl RequireClassRole {
    /// 创建需要特定班级角色的中间件
    pub fn new(role: &ClassUserRole) -> Self {
        Self {
            required_roles: vec![role.clone()],
            require_all: true,
        }
    }

    /// 创建需要任一班级角色的中间件
    pub fn new_any(roles: &[&ClassUserRole]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| (*r).clone()).collect(),
            require_all: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireClassRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireClassRoleMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireClassRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
            require_all: self.require_all,
        }))
    }
}

pub struct RequireClassRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<ClassUserRole>,
    require_all: bool,
}

impl<S, B> Service<ServiceRequest> for RequireClassRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required_roles = self.required_roles.clone();
        let require_all = self.require_all;

        Box::pin(async move {
            // 1. 校验用户信息
            let user = req.extensions().get::<User>().cloned();
            let Some(user) = user else {
                return Ok(req.into_response(
                    create_error_response(GradebookError::authentication(
                        "Authentication required",
                    ))
                    .map_into_right_body(),
                ));
            };

            // 2. 校验 class_id
            let Some(class_id) = extract_class_id(&req) else {
                return Ok(req.into_response(
                    create_error_response(GradebookError::bad_request(
                        "Missing or invalid class_id",
                    ))
                    .map_into_right_body(),
                ));
            };

            // 3. 查询用户在班级中的成员关系
            let class_user = match find_class_user(&req, user.id, class_id).await {
                Ok(class_user) => class_user,
                Err(err) => {
                    return Ok(req.into_response(create_error_response(err).map_into_right_body()));
                }
            };

            // 4. 管理员直接放行
            if user.role == UserRole::Admin {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let Some(class_user) = class_user else {
                return Ok(req.into_response(
                    create_error_response(GradebookError::authorization(
                        "No permission for this class",
                    ))
                    .map_into_right_body(),
                ));
            };

            // 5. 判断是否拥有所需角色
            let has_permission = if require_all {
                required_roles.iter().all(|role| &class_user.role == role)
            } else {
                required_roles.iter().any(|role| &class_user.role == role)
            };

            if has_permission {
                tracing::debug!(
                    "Class user {} has permission in class {}",
                    class_user.user_id,
                    class_id
                );
                let res = srv.call(req).await?.map_into_left_body();
                Ok(res)
            } else {
                Ok(req.into_response(
                    create_error_response(GradebookError::authorization(
                        "Access denied for this class role",
                    ))
                    .map_into_right_body(),
                ))
            }
        })
    }
}

fn extract_class_id(req: &ServiceRequest) -> Option<i64> {
    if let Some(raw) = req.match_info().get("class_id") {
        return raw.parse::<i64>().ok();
    }
    let query = web::Query::<std::collections::HashMap<String, String>>::from_query(
        req.query_string(),
    )
    .ok()?;
    query
        .get("class_id")
        .or_else(|| query.get("classId"))
        .and_then(|s| s.parse::<i64>().ok())
}

async fn find_class_user(
    req: &ServiceRequest,
    user_id: i64,
    class_id: i64,
) -> Result<Option<ClassUser>> {
    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| GradebookError::configuration("Storage not found in app data"))?;

    storage.get_class_user(user_id, class_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_class_id_from_query() {
        let req = TestRequest::default()
            .uri("/review/list?class_id=12&grade_id=3")
            .to_srv_request();
        assert_eq!(extract_class_id(&req), Some(12));

        let req = TestRequest::default()
            .uri("/review/list?classId=7")
            .to_srv_request();
        assert_eq!(extract_class_id(&req), Some(7));

        let req = TestRequest::default()
            .uri("/review/list?class_id=abc")
            .to_srv_request();
        assert_eq!(extract_class_id(&req), None);

        let req = TestRequest::default().uri("/review/list").to_srv_request();
        assert_eq!(extract_class_id(&req), None);
    }
}
