//! 配置管理
//!
//! 加载顺序：`config.toml` → `config.{APP_ENV}.toml` → `GRADEBOOK_*` 环境变量（层级用 `__` 分隔） → 常用环境变量。

#[path = "impl.rs"]
mod loader;
mod structs;

pub use structs::*;
