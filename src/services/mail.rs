//! 邮件发送
//!
//! 业务代码只依赖 `Mailer`；默认实现 `LogMailer` 把邮件写进日志，
//! 部署时可以在 app_data 中换成真正的投递实现。

use actix_web::{HttpRequest, web};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<()>;
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        info!(
            "Mail from {} to {}: {}",
            AppConfig::get().mail.from,
            message.to,
            message.subject
        );
        debug!("Mail body: {}", message.body);
        Ok(())
    }
}

/// 从 app_data 中获取 Mailer，未注册时退回到日志实现
pub fn mailer_from_request(request: &HttpRequest) -> Arc<dyn Mailer> {
    request
        .app_data::<web::Data<Arc<dyn Mailer>>>()
        .map(|data| data.get_ref().clone())
        .unwrap_or_else(|| Arc::new(LogMailer))
}

pub fn verification_mail(to: &str, fullname: &str, link: &str) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        subject: "Verify your email".to_string(),
        body: format!("Hi {fullname},\n\nPlease verify your email address by opening:\n{link}\n"),
    }
}

pub fn reset_password_mail(to: &str, fullname: &str, link: &str) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        body: format!(
            "Hi {fullname},\n\nUse the link below to choose a new password:\n{link}\n\nIf you did not request this, ignore this email.\n"
        ),
    }
}

/// 记录已发送邮件，测试中用来取出链接里的令牌
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingMailer {
    pub(crate) sent: std::sync::Mutex<Vec<MailMessage>>,
}

#[cfg(test)]
impl RecordingMailer {
    pub(crate) fn last(&self) -> Option<MailMessage> {
        self.sent.lock().ok()?.last().cloned()
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

/// 从链接中取出查询参数
#[cfg(test)]
pub(crate) fn query_param(link: &str, name: &str) -> Option<String> {
    let query = link.split_once('?')?.1;
    let query = query.split_whitespace().next()?;
    web::Query::<std::collections::HashMap<String, String>>::from_query(query)
        .ok()?
        .get(name)
        .cloned()
}
