//! エラー型定義
//!
//! GatewayError, GatewayResult等の共通エラー型

use thiserror::Error;

/// ゲートウェイ共通エラー
#[derive(Debug, Error)]
pub enum GatewayError {
    /// ファクトリの解決に失敗
    #[error("factory resolution failed for type '{connector_type}': {message}")]
    FactoryResolution {
        /// コネクタタイプID
        connector_type: String,
        /// 失敗理由
        message: String,
    },

    /// コネクタの生成に失敗
    #[error("connector creation failed for endpoint '{endpoint}': {message}")]
    ConnectorCreation {
        /// 対象エンドポイント名
        endpoint: String,
        /// 失敗理由
        message: String,
    },

    /// コネクタの起動に失敗（デプロイ全体を中断する致命的エラー）
    #[error("connector start failed for endpoint '{endpoint}': {message}")]
    ConnectorStart {
        /// 対象エンドポイント名
        endpoint: String,
        /// 失敗理由
        message: String,
    },

    /// コネクタのライフサイクル操作に失敗
    #[error("connector lifecycle error: {0}")]
    ConnectorLifecycle(String),

    /// JSONシリアライゼーションエラー
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// ゲートウェイ共通Result型
pub type GatewayResult<T> = Result<T, GatewayError>;
