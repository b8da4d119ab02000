pub mod list;
pub mod send;
pub mod ws;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::notifications::requests::NotificationListQuery;
use crate::storage::Storage;

pub use send::{create_notification_for_one_student, notify_users};

pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
}

impl NotificationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_notifications(
        &self,
        request: &HttpRequest,
        query: NotificationListQuery,
    ) -> ActixResult<HttpResponse> {
        list::handle_list(self, request, query).await
    }

    pub async fn mark_as_read(
        &self,
        request: &HttpRequest,
        notification_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::handle_mark_as_read(self, request, notification_id).await
    }

    // WebSocket 握手
    pub async fn connect(
        &self,
        request: &HttpRequest,
        body: web::Payload,
        token: Option<String>,
    ) -> ActixResult<HttpResponse> {
        ws::handle_connect(self, request, body, token).await
    }
}
