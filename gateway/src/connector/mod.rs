//! エンドポイントコネクタ抽象
//!
//! バックエンドとの実際のI/Oを担うコネクタのトレイトと、
//! コネクタが宣言する能力（API種別・接続モード）の定義。
//! 具象コネクタ実装はプラグインとして外部から提供される。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use apigw_common::error::GatewayResult;

/// コネクタがサポートするAPI種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    /// 同期プロキシ型API
    Proxy,
    /// メッセージ型API（Pub/Sub）
    Message,
}

impl ApiType {
    /// ApiTypeを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for ApiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// コネクタがサポートする接続モード
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorMode {
    /// 単発の接続（リクエスト転送）
    Connect,
    /// メッセージ発行
    Publish,
    /// メッセージ購読
    Subscribe,
    /// リクエスト/レスポンス
    RequestResponse,
}

impl ConnectorMode {
    /// ConnectorModeを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Publish => "publish",
            Self::Subscribe => "subscribe",
            Self::RequestResponse => "request_response",
        }
    }
}

impl std::fmt::Display for ConnectorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// デプロイメントコンテキスト
///
/// デプロイ環境の情報をファクトリへそのまま受け渡すための
/// 不透明な属性バッグ。本コアは内容を解釈しない。
#[derive(Debug, Clone, Default)]
pub struct DeploymentContext {
    attributes: HashMap<String, String>,
}

impl DeploymentContext {
    /// 空のデプロイメントコンテキストを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 属性を追加
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// 属性を取得
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// エンドポイントコネクタ
///
/// バックエンドと通信する実体。生成後はマネージャがライフサイクル
/// （start/pre_stop/stop）を管理する。能力宣言は静的で、選択パスから
/// ブロックせずに参照できなければならない。
pub trait EndpointConnector: Send + Sync {
    /// サポートするAPI種別
    fn supported_api(&self) -> ApiType;

    /// サポートする接続モードの集合
    fn supported_modes(&self) -> HashSet<ConnectorMode>;

    /// バックエンドの接続先アドレス（テンプレート変数の描画にのみ使用）
    fn address(&self) -> Option<String> {
        None
    }

    /// コネクタを起動する
    ///
    /// 起動失敗はマネージャのブート全体を中断する致命的エラーとして
    /// 伝播される。
    fn start(&self) -> GatewayResult<()>;

    /// 停止前処理（インフライトリクエストのドレイン等）
    fn pre_stop(&self) -> GatewayResult<()> {
        Ok(())
    }

    /// コネクタを停止し資源を解放する
    fn stop(&self) -> GatewayResult<()>;
}

/// コネクタファクトリ
///
/// 設定文字列からコネクタを生成する。`Ok(None)`は「このコネクタを
/// 生成できない」ことを表し、エラーと同様に回復可能な生成失敗として
/// 扱われる（対象エンドポイントはDOWNのまま残る）。
pub trait ConnectorFactory: Send + Sync {
    /// デプロイメントコンテキストと設定からコネクタを生成
    fn create_connector(
        &self,
        deployment: &DeploymentContext,
        configuration: Option<&str>,
        shared_configuration: Option<&str>,
    ) -> GatewayResult<Option<Arc<dyn EndpointConnector>>>;
}
