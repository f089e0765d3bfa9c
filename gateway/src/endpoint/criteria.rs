//! エンドポイント選択条件
//!
//! next()に渡すフィルタ。ターゲット名・API種別・接続モードで
//! 候補を絞り込む。

use std::collections::HashSet;

use crate::connector::{ApiType, ConnectorMode};
use crate::endpoint::managed::{EndpointStatus, ManagedEndpoint};

/// エンドポイント選択条件
///
/// すべてのフィールドは省略可能で、デフォルトは無条件
/// （稼働中の全エンドポイントが候補）。
#[derive(Debug, Clone, Default)]
pub struct EndpointCriteria {
    default_target: Option<String>,
    api_type: Option<ApiType>,
    modes: Option<HashSet<ConnectorMode>>,
}

impl EndpointCriteria {
    /// 無条件の選択条件を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ターゲット名を設定（エンドポイント名優先、次にグループ名で照合）
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    /// 要求するAPI種別を設定（コネクタの宣言と等価比較）
    pub fn with_api_type(mut self, api_type: ApiType) -> Self {
        self.api_type = Some(api_type);
        self
    }

    /// 要求する接続モード集合を設定（コネクタの宣言が上位集合なら適合）
    pub fn with_modes(mut self, modes: HashSet<ConnectorMode>) -> Self {
        self.modes = Some(modes);
        self
    }

    /// ターゲット名を取得
    pub fn default_target(&self) -> Option<&str> {
        self.default_target.as_deref()
    }

    /// エンドポイントが条件に適合するか判定
    ///
    /// 稼働状態がUpでコネクタを保持し、API種別・接続モードの
    /// 要求を満たす場合にのみtrue。ターゲット名はここでは判定しない
    /// （候補集合の構築時に解決される）。
    pub fn matches(&self, endpoint: &ManagedEndpoint) -> bool {
        if endpoint.status() != EndpointStatus::Up {
            return false;
        }

        let connector = match endpoint.connector() {
            Some(connector) => connector,
            None => return false,
        };

        if let Some(api_type) = self.api_type {
            if connector.supported_api() != api_type {
                return false;
            }
        }

        if let Some(modes) = &self.modes {
            if !modes.is_subset(&connector.supported_modes()) {
                return false;
            }
        }

        true
    }
}
