//! ロギング初期化ユーティリティ

use tracing_subscriber::EnvFilter;

/// トレーシングサブスクライバを初期化
///
/// `RUST_LOG`が設定されていればそれを優先し、未設定時は
/// `default_filter`を使用する。既に初期化済みの場合は何もしない
/// （テストから繰り返し呼んでも安全）。
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
