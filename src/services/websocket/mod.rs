/*!
 * WebSocket 实时通知
 *
 * 客户端连接 `ws://host/notification/ws?token=<access_token>`，
 * 服务端把新通知推送到该用户的所有在线连接。
 *
 * ## 消息格式
 *
 * ### 服务端推送
 * ```json
 * {
 *     "type": "notification",
 *     "payload": {
 *         "id": 12,
 *         "classId": 3,
 *         "notificationType": "review_comment",
 *         "content": "Ann commented on your grade review",
 *         "contentUrl": "/review?class_id=3&grade_id=5&review_id=8",
 *         "createdAt": "2026-01-24T12:00:00Z"
 *     }
 * }
 * ```
 *
 * ### 心跳
 * ```json
 * {"type": "ping"}
 * {"type": "pong"}
 * ```
 */

use actix_ws::Message;
use dashmap::DashMap;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::models::notifications::entities::Notification;

/// 全局连接管理器
static CONNECTION_MANAGER: Lazy<ConnectionManager> = Lazy::new(ConnectionManager::new);

const CHANNEL_CAPACITY: usize = 100;
const HEARTBEAT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

/// WebSocket 消息类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Notification { payload: NotificationPayload },
    Ping,
    Pong,
    Connected { user_id: i64 },
    Error { message: String },
}

/// 通知载荷
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: i64,
    pub class_id: Option<i64>,
    pub notification_type: String,
    pub content: String,
    pub content_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Notification> for NotificationPayload {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            class_id: n.class_id,
            notification_type: n.notification_type.to_string(),
            content: n.content,
            content_url: n.content_url,
            created_at: n.created_at,
        }
    }
}

/// 连接管理器：用户 ID -> 广播发送器，同一用户的多个连接共享一个频道
pub struct ConnectionManager {
    connections: DashMap<i64, broadcast::Sender<WsMessage>>,
}

impl ConnectionManager {
    fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn get() -> &'static Self {
        &CONNECTION_MANAGER
    }

    /// 注册用户连接
    pub fn register(&self, user_id: i64) -> broadcast::Receiver<WsMessage> {
        let entry = self.connections.entry(user_id).or_insert_with(|| {
            let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
            tx
        });
        entry.subscribe()
    }

    /// 移除用户连接，仍有其他连接时保留频道
    pub fn unregister(&self, user_id: i64) {
        self.connections
            .remove_if(&user_id, |_, sender| sender.receiver_count() == 0);
    }

    /// 向指定用户发送消息，用户不在线时返回 false
    pub fn send_to_user(&self, user_id: i64, message: WsMessage) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|sender| sender.send(message).is_ok())
    }

    /// 推送通知给用户
    pub fn push_notification(&self, user_id: i64, notification: Notification) -> bool {
        let message = WsMessage::Notification {
            payload: NotificationPayload::from(notification),
        };
        self.send_to_user(user_id, message)
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|s| s.receiver_count() > 0)
    }
}

/// WebSocket 服务
pub struct WebSocketService;

impl WebSocketService {
    /// 处理一个已经完成握手的连接，直到任一端关闭
    pub async fn handle_connection(
        user_id: i64,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) {
        info!("WebSocket connected for user: {}", user_id);

        let mut rx = ConnectionManager::get().register(user_id);

        if let Ok(json) = serde_json::to_string(&WsMessage::Connected { user_id }) {
            let _ = session.text(json).await;
        }

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            tokio::select! {
                // 客户端消息
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Ok(ws_msg) = serde_json::from_str::<WsMessage>(&text) {
                                match ws_msg {
                                    WsMessage::Ping => {
                                        let pong = serde_json::to_string(&WsMessage::Pong)
                                            .unwrap_or_else(|_| r#"{"type":"pong"}"#.to_string());
                                        if session.text(pong).await.is_err() {
                                            break;
                                        }
                                    }
                                    _ => {
                                        debug!("Received message from user {}: {:?}", user_id, ws_msg);
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if session.pong(&data).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("WebSocket closed for user: {}", user_id);
                            break;
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket error for user {}: {:?}", user_id, e);
                            break;
                        }
                        _ => {}
                    }
                }

                // 服务端推送
                msg = rx.recv() => {
                    match msg {
                        Ok(ws_msg) => {
                            if let Ok(json) = serde_json::to_string(&ws_msg)
                                && session.text(json).await.is_err() {
                                    break;
                                }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket for user {} lagged by {} messages", user_id, n);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            break;
                        }
                    }
                }

                _ = heartbeat.tick() => {
                    if session.ping(b"").await.is_err() {
                        break;
                    }
                }
            }
        }

        drop(rx);
        ConnectionManager::get().unregister(user_id);
        let _ = session.close(None).await;
        info!("WebSocket disconnected for user: {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::NotificationType;

    fn notification(user_id: i64) -> Notification {
        Notification {
            id: 1,
            user_id,
            class_id: Some(2),
            notification_type: NotificationType::ReviewComment,
            content: "New comment".to_string(),
            content_url: Some("/review?class_id=2&grade_id=3&review_id=4".to_string()),
            is_read: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_push_reaches_every_connection_of_user() {
        let manager = ConnectionManager::new();
        let mut first = manager.register(41);
        let mut second = manager.register(41);
        assert!(manager.is_online(41));

        assert!(manager.push_notification(41, notification(41)));
        for rx in [&mut first, &mut second] {
            match rx.recv().await.unwrap() {
                WsMessage::Notification { payload } => {
                    assert_eq!(payload.notification_type, "review_comment");
                    assert_eq!(payload.class_id, Some(2));
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }

    #[test]
    fn test_offline_user_and_cleanup() {
        let manager = ConnectionManager::new();
        assert!(!manager.push_notification(42, notification(42)));

        let rx = manager.register(42);
        manager.unregister(42);
        assert!(manager.is_online(42));

        drop(rx);
        manager.unregister(42);
        assert!(!manager.is_online(42));
        assert!(manager.connections.is_empty());
    }

    #[test]
    fn test_message_wire_format() {
        let json = serde_json::to_string(&WsMessage::Connected { user_id: 5 }).unwrap();
        assert_eq!(json, r#"{"type":"connected","user_id":5}"#);
        assert_eq!(
            serde_json::from_str::<WsMessage>(r#"{"type":"ping"}"#).unwrap(),
            WsMessage::Ping
        );
    }
}
