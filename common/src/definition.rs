//! API/エンドポイント定義モデル
//!
//! デプロイ時に一度だけ読み込まれる宣言的な定義レコード。
//! マネージャ構築後は不変であり、ゲートウェイは参照のみ行う。

use serde::{Deserialize, Serialize};

/// API定義
///
/// エンドポイントグループの順序付きコレクションを保持する。
/// 宣言順はラウンドロビンや「グループ先頭エンドポイント」の
/// セマンティクスに影響するため意味を持つ。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    /// API識別子
    #[serde(default)]
    pub id: String,
    /// API名
    #[serde(default)]
    pub name: String,
    /// エンドポイントグループ一覧（宣言順）
    #[serde(default)]
    pub endpoint_groups: Vec<EndpointGroup>,
}

impl Api {
    /// 新しいAPI定義を作成
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint_groups: Vec::new(),
        }
    }

    /// エンドポイントグループを追加
    pub fn with_group(mut self, group: EndpointGroup) -> Self {
        self.endpoint_groups.push(group);
        self
    }
}

/// エンドポイントグループ定義
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointGroup {
    /// グループ名
    pub name: String,
    /// コネクタタイプID
    #[serde(rename = "type")]
    pub group_type: String,
    /// グループ共有設定（メンバーが継承できる設定ペイロード）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_configuration: Option<String>,
    /// メンバーエンドポイント一覧（宣言順）
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl EndpointGroup {
    /// 新しいグループ定義を作成
    pub fn new(name: impl Into<String>, group_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_type: group_type.into(),
            shared_configuration: None,
            endpoints: Vec::new(),
        }
    }

    /// グループ共有設定を設定
    pub fn with_shared_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.shared_configuration = Some(configuration.into());
        self
    }

    /// メンバーエンドポイントを追加
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }
}

/// エンドポイント定義
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// エンドポイント名
    pub name: String,
    /// コネクタタイプID
    #[serde(rename = "type")]
    pub endpoint_type: String,
    /// エンドポイント固有の設定ペイロード
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    /// 共有設定のオーバーライド（inherit_configuration=falseの場合に使用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_configuration_override: Option<String>,
    /// グループ共有設定を継承するか
    #[serde(default)]
    pub inherit_configuration: bool,
}

impl Endpoint {
    /// 新しいエンドポイント定義を作成
    pub fn new(name: impl Into<String>, endpoint_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint_type: endpoint_type.into(),
            configuration: None,
            shared_configuration_override: None,
            inherit_configuration: false,
        }
    }

    /// エンドポイント固有設定を設定
    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    /// 共有設定オーバーライドを設定
    pub fn with_shared_configuration_override(mut self, configuration: impl Into<String>) -> Self {
        self.shared_configuration_override = Some(configuration.into());
        self
    }

    /// グループ共有設定の継承を有効化
    pub fn with_inherit_configuration(mut self, inherit: bool) -> Self {
        self.inherit_configuration = inherit;
        self
    }
}
