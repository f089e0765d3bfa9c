//! エンドポイントマネージャ
//!
//! API定義からコネクタを構築してレジストリを形成し、リクエスト毎の
//! 選択（next）・管理操作（enable/disable/remove）・ライフサイクル
//! （start/pre_stop/stop）・テンプレートスナップショットを提供する。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use apigw_common::definition::{Api, Endpoint, EndpointGroup};
use apigw_common::error::{GatewayError, GatewayResult};

use crate::connector::{DeploymentContext, EndpointConnector};
use crate::endpoint::criteria::EndpointCriteria;
use crate::endpoint::managed::{EndpointStatus, ManagedEndpoint, ManagedEndpointGroup};
use crate::plugin::ConnectorFactoryResolver;
use crate::template::{TemplateContext, TemplateVariableProvider, ENDPOINTS_VARIABLE};

/// マネージャが保持するレジストリ本体
///
/// グループ列と名前インデックスを単一のロックで守り、インデックスと
/// メンバーシップが乖離した状態を観測させない。
#[derive(Default)]
struct Registry {
    /// 管理対象グループ（宣言順）
    groups: Vec<Arc<ManagedEndpointGroup>>,
    /// エンドポイント名インデックス
    endpoints_by_name: HashMap<String, Arc<ManagedEndpoint>>,
    /// グループ名インデックス
    groups_by_name: HashMap<String, Arc<ManagedEndpointGroup>>,
}

/// エンドポイントマネージャ
///
/// レジストリはstart()で一度だけ構築され、再デプロイ時は新しい
/// マネージャが作り直される。定義は構築後に変更されない。
pub struct EndpointManager {
    api: Api,
    resolver: Arc<dyn ConnectorFactoryResolver>,
    deployment: DeploymentContext,
    registry: RwLock<Registry>,
    /// グローバルラウンドロビンのカーソル
    ///
    /// 単調増加カウンタを選択時点の適格エンドポイント数で割った剰余を
    /// 使う。適格集合は呼び出し毎に再計算される。
    cursor: AtomicUsize,
}

impl EndpointManager {
    /// 新しいエンドポイントマネージャを作成（レジストリは空）
    pub fn new(
        api: Api,
        resolver: Arc<dyn ConnectorFactoryResolver>,
        deployment: DeploymentContext,
    ) -> Self {
        Self {
            api,
            resolver,
            deployment,
            registry: RwLock::new(Registry::default()),
            cursor: AtomicUsize::new(0),
        }
    }

    /// 定義を走査してコネクタを構築・起動し、レジストリを形成する
    ///
    /// ファクトリ解決やコネクタ生成の失敗は該当エンドポイントを
    /// DOWNのまま登録してブートを継続する。コネクタのstart失敗のみ
    /// 致命的エラーとして伝播し、ブート全体を中断する。
    ///
    /// 一度だけ呼ぶこと。next()や管理操作と並行して呼んではならない。
    pub fn start(&self) -> GatewayResult<()> {
        for group_def in &self.api.endpoint_groups {
            let group = Arc::new(ManagedEndpointGroup::new(group_def.clone()));
            {
                let mut registry = self.registry.write();
                registry.groups.push(group.clone());
                registry
                    .groups_by_name
                    .insert(group_def.name.clone(), group.clone());
            }

            for endpoint_def in &group_def.endpoints {
                self.create_and_start_endpoint(&group, group_def, endpoint_def)?;
            }
        }

        let registry = self.registry.read();
        info!(
            groups = registry.groups.len(),
            endpoints = registry.endpoints_by_name.len(),
            "Endpoint manager started"
        );
        Ok(())
    }

    /// 1エンドポイント分のコネクタ構築・起動・登録
    fn create_and_start_endpoint(
        &self,
        group: &Arc<ManagedEndpointGroup>,
        group_def: &EndpointGroup,
        endpoint_def: &Endpoint,
    ) -> GatewayResult<()> {
        let connector = self.build_connector(group_def, endpoint_def);
        let managed = Arc::new(ManagedEndpoint::new(
            endpoint_def.clone(),
            Arc::downgrade(group),
            connector.clone(),
        ));

        if let Some(connector) = connector {
            connector.start().map_err(|e| {
                error!(
                    endpoint = %endpoint_def.name,
                    error = %e,
                    "Connector start failed, aborting endpoint manager boot"
                );
                GatewayError::ConnectorStart {
                    endpoint: endpoint_def.name.clone(),
                    message: e.to_string(),
                }
            })?;
            managed.set_status(EndpointStatus::Up);
        }

        // メンバー追加とインデックス登録は同一write区間で行い、
        // 片方だけ登録された状態を観測させない
        let mut registry = self.registry.write();
        group.push_member(managed.clone());
        registry
            .endpoints_by_name
            .insert(endpoint_def.name.clone(), managed);

        debug!(
            endpoint = %endpoint_def.name,
            group = %group_def.name,
            "Endpoint registered"
        );
        Ok(())
    }

    /// 有効な共有設定を解決してコネクタを生成する
    ///
    /// 失敗はすべて回復可能として扱い、Noneを返す（該当エンドポイントは
    /// コネクタ無し・DOWNで登録される）。
    fn build_connector(
        &self,
        group_def: &EndpointGroup,
        endpoint_def: &Endpoint,
    ) -> Option<Arc<dyn EndpointConnector>> {
        // 共有設定の解決はエンドポイント毎に独立して行う
        let shared_configuration = if endpoint_def.inherit_configuration {
            group_def.shared_configuration.as_deref()
        } else {
            endpoint_def.shared_configuration_override.as_deref()
        };

        let factory = match self.resolver.factory_by_id(&endpoint_def.endpoint_type) {
            Ok(Some(factory)) => factory,
            Ok(None) => {
                warn!(
                    endpoint = %endpoint_def.name,
                    connector_type = %endpoint_def.endpoint_type,
                    "No connector factory found, endpoint stays down"
                );
                return None;
            }
            Err(e) => {
                warn!(
                    endpoint = %endpoint_def.name,
                    connector_type = %endpoint_def.endpoint_type,
                    error = %e,
                    "Factory resolution failed, endpoint stays down"
                );
                return None;
            }
        };

        match factory.create_connector(
            &self.deployment,
            endpoint_def.configuration.as_deref(),
            shared_configuration,
        ) {
            Ok(Some(connector)) => Some(connector),
            Ok(None) => {
                warn!(
                    endpoint = %endpoint_def.name,
                    "Factory returned no connector, endpoint stays down"
                );
                None
            }
            Err(e) => {
                warn!(
                    endpoint = %endpoint_def.name,
                    error = %e,
                    "Connector creation failed, endpoint stays down"
                );
                None
            }
        }
    }

    /// 無条件で次の稼働中エンドポイントを選択する（グローバルラウンドロビン）
    pub fn next(&self) -> Option<Arc<ManagedEndpoint>> {
        self.next_matching(&EndpointCriteria::default())
    }

    /// 条件に適合する次のエンドポイントを選択する
    ///
    /// ターゲット名が既知のエンドポイントならそれが唯一の候補、既知の
    /// グループなら宣言順の先頭適格メンバー、いずれにも該当しなければ
    /// None。ターゲット未指定時は適格エンドポイント全体に対する
    /// ラウンドロビン。選択はエラーを返さない（不在がただ一つの負の
    /// シグナル）。
    pub fn next_matching(&self, criteria: &EndpointCriteria) -> Option<Arc<ManagedEndpoint>> {
        let registry = self.registry.read();

        if let Some(target) = criteria.default_target() {
            // エンドポイント名を優先して照合し、次にグループ名を照合する
            if let Some(endpoint) = registry.endpoints_by_name.get(target) {
                return criteria.matches(endpoint).then(|| endpoint.clone());
            }
            if let Some(group) = registry.groups_by_name.get(target) {
                return group.members().into_iter().find(|e| criteria.matches(e));
            }
            return None;
        }

        let eligible: Vec<Arc<ManagedEndpoint>> = registry
            .groups
            .iter()
            .flat_map(|g| g.members())
            .filter(|e| criteria.matches(e))
            .collect();
        if eligible.is_empty() {
            return None;
        }

        // カーソルは選択成功時のみ進める。適格集合は毎回再計算されるため
        // 不適格なエンドポイントが順番を消費することはない。
        let index = self.cursor.fetch_add(1, Ordering::SeqCst) % eligible.len();
        Some(eligible[index].clone())
    }

    /// エンドポイントを選択対象に戻す
    ///
    /// コネクタを保持しない場合は何もしない（実質DOWNのまま）。冪等。
    pub fn enable(&self, endpoint: &ManagedEndpoint) {
        if endpoint.connector().is_some() {
            endpoint.set_status(EndpointStatus::Up);
            debug!(endpoint = %endpoint.name(), "Endpoint enabled");
        }
    }

    /// エンドポイントを選択対象から外す（コネクタは保持したまま）。冪等。
    pub fn disable(&self, endpoint: &ManagedEndpoint) {
        endpoint.set_status(EndpointStatus::Down);
        debug!(endpoint = %endpoint.name(), "Endpoint disabled");
    }

    /// エンドポイントをレジストリから除去する
    ///
    /// 所属グループのメンバー列と名前インデックスから取り除く。
    /// コネクタの停止は行わない（所有側の責務）。未知の名前は
    /// 何もしない。
    pub fn remove_endpoint(&self, name: &str) {
        let mut registry = self.registry.write();
        if let Some(endpoint) = registry.endpoints_by_name.remove(name) {
            // インデックスとメンバー列は同一write区間で更新し、
            // 片方だけ除去された状態を観測させない
            if let Some(group) = endpoint.group() {
                group.remove_member(name);
            }
            drop(registry);
            info!(endpoint = %name, "Endpoint removed from registry");
        }
    }

    /// 全コネクタに停止前処理を通知する
    ///
    /// 個々の失敗はログに残して無視し、残りのコネクタへの通知を
    /// 継続する。
    pub fn pre_stop(&self) {
        for endpoint in self.endpoints() {
            if let Some(connector) = endpoint.connector() {
                if let Err(e) = connector.pre_stop() {
                    warn!(
                        endpoint = %endpoint.name(),
                        error = %e,
                        "Connector pre-stop failed, continuing with remaining connectors"
                    );
                }
            }
        }
    }

    /// 全コネクタを停止しレジストリを破棄する
    ///
    /// 個々の停止失敗はログに残して無視する。停止後のレジストリは
    /// 空になり、next()はNone、スナップショットは空になる。
    pub fn stop(&self) {
        for endpoint in self.endpoints() {
            if let Some(connector) = endpoint.connector() {
                if let Err(e) = connector.stop() {
                    warn!(
                        endpoint = %endpoint.name(),
                        error = %e,
                        "Connector stop failed, continuing with remaining connectors"
                    );
                }
            }
            endpoint.set_status(EndpointStatus::Down);
        }

        let mut registry = self.registry.write();
        *registry = Registry::default();
        info!("Endpoint manager stopped");
    }

    /// 全エンドポイントのスナップショットを宣言順で取得
    pub fn endpoints(&self) -> Vec<Arc<ManagedEndpoint>> {
        self.registry
            .read()
            .groups
            .iter()
            .flat_map(|g| g.members())
            .collect()
    }

    /// 全グループのスナップショットを宣言順で取得
    pub fn groups(&self) -> Vec<Arc<ManagedEndpointGroup>> {
        self.registry.read().groups.clone()
    }
}

impl TemplateVariableProvider for EndpointManager {
    /// 登録済みグループ/エンドポイントの`"<名前>:<アドレスまたは空>"`
    /// マッピングを変数`endpoints`として書き出す。レジストリが空でも
    /// 空のマッピングを必ず書き出す。
    fn provide(&self, ctx: &mut dyn TemplateContext) {
        let registry = self.registry.read();
        let mut variables = serde_json::Map::new();

        for group in &registry.groups {
            variables.insert(
                group.name().to_string(),
                Value::String(format!("{}:", group.name())),
            );
            for endpoint in group.members() {
                let target = endpoint
                    .connector()
                    .and_then(|c| c.address())
                    .unwrap_or_default();
                variables.insert(
                    endpoint.name().to_string(),
                    Value::String(format!("{}:{}", endpoint.name(), target)),
                );
            }
        }

        ctx.set_variable(ENDPOINTS_VARIABLE, Value::Object(variables));
    }
}

impl std::fmt::Debug for EndpointManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("EndpointManager")
            .field("api", &self.api.id)
            .field("groups", &registry.groups.len())
            .field("endpoints", &registry.endpoints_by_name.len())
            .finish()
    }
}
