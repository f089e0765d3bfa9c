//! コネクタプラグインレジストリ
//!
//! コネクタタイプIDからファクトリを解決するリゾルバと、
//! そのインメモリ実装。具象コネクタ実装は起動時に自身の
//! ファクトリを登録する。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use apigw_common::error::GatewayResult;

use crate::connector::ConnectorFactory;

/// コネクタファクトリリゾルバ
///
/// エンドポイント定義のコネクタタイプIDをファクトリに解決する。
/// `Ok(None)`は未登録タイプを表す。実装がエラーを返した場合も
/// マネージャは未登録と同じ方針で処理する（該当エンドポイントを
/// スキップしてブートを継続）。
pub trait ConnectorFactoryResolver: Send + Sync {
    /// タイプIDからファクトリを解決
    fn factory_by_id(&self, connector_type: &str) -> GatewayResult<Option<Arc<dyn ConnectorFactory>>>;
}

/// インメモリのコネクタプラグインレジストリ
///
/// タイプIDをキーにファクトリを保持する。ハンドルはクローン可能で、
/// 全クローンが同一のレジストリを共有する。
#[derive(Clone, Default)]
pub struct ConnectorPluginRegistry {
    factories: Arc<RwLock<HashMap<String, Arc<dyn ConnectorFactory>>>>,
}

impl ConnectorPluginRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ファクトリを登録（同一タイプIDは上書き）
    pub fn register(&self, connector_type: impl Into<String>, factory: Arc<dyn ConnectorFactory>) {
        self.factories.write().insert(connector_type.into(), factory);
    }

    /// 登録済みタイプIDの一覧を取得
    pub fn factory_type_ids(&self) -> Vec<String> {
        self.factories.read().keys().cloned().collect()
    }
}

impl ConnectorFactoryResolver for ConnectorPluginRegistry {
    fn factory_by_id(&self, connector_type: &str) -> GatewayResult<Option<Arc<dyn ConnectorFactory>>> {
        Ok(self.factories.read().get(connector_type).cloned())
    }
}

impl std::fmt::Debug for ConnectorPluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorPluginRegistry")
            .field("factories", &self.factory_type_ids())
            .finish()
    }
}
