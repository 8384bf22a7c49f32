// ==========================================
// 学生转社分发系统 - 日志初始化
// ==========================================
// 职责: 安装 tracing 订阅者（文本 / JSON 两种格式）
// 输出: stderr，stdout 留给命令行摘要
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "CLUB_TRANSFER_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// 每行一笔 JSON，便于批次执行后留存
    Json,
}

impl LogFormat {
    /// 解析格式名称（不分大小写），无法识别时回到文本格式
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 过滤器（默认 info），例如 RUST_LOG=club_transfer::engine=debug
/// - CLUB_TRANSFER_LOG_FORMAT: text | json
///
/// # 示例
/// ```no_run
/// use club_transfer::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

/// 以指定格式初始化；重复调用时保留先前的订阅者
pub fn init_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
}

/// 测试用：debug 级别，输出交给测试框架捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
