//! 統合テスト支援モック
//!
//! スクリプト可能なモックファクトリと呼び出し記録付きモックコネクタ

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use apigw_common::definition::{Api, Endpoint, EndpointGroup};
use apigw_common::error::{GatewayError, GatewayResult};
use apigw_gateway::connector::{
    ApiType, ConnectorFactory, ConnectorMode, DeploymentContext, EndpointConnector,
};
use apigw_gateway::plugin::ConnectorFactoryResolver;

/// テストで使用するコネクタタイプID
pub const ENDPOINT_TYPE: &str = "test";
/// エンドポイント固有設定
pub const ENDPOINT_CONFIG: &str = "{ \"config\": \"something\" }";
/// グループ共有設定
pub const GROUP_SHARED_CONFIG: &str = "{ \"groupSharedConfig\": \"something in the shared config\" }";
/// エンドポイント側の共有設定オーバーライド
pub const SHARED_CONFIG_OVERRIDE: &str =
    "{ \"overriddenSharedConfig\": \"something overridden for the endpoint\" }";

/// 呼び出し回数を記録するモックコネクタ
pub struct MockConnector {
    api: ApiType,
    modes: HashSet<ConnectorMode>,
    address: Option<String>,
    starts: AtomicUsize,
    pre_stops: AtomicUsize,
    stops: AtomicUsize,
    fail_start: bool,
    fail_pre_stop: bool,
    fail_stop: bool,
}

impl MockConnector {
    /// デフォルトのモックコネクタを作成（Message型、Publish+Subscribe）
    pub fn new() -> Self {
        Self {
            api: ApiType::Message,
            modes: HashSet::from([ConnectorMode::Publish, ConnectorMode::Subscribe]),
            address: None,
            starts: AtomicUsize::new(0),
            pre_stops: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            fail_start: false,
            fail_pre_stop: false,
            fail_stop: false,
        }
    }

    /// サポートAPI種別を設定
    pub fn with_api(mut self, api: ApiType) -> Self {
        self.api = api;
        self
    }

    /// サポートモード集合を設定
    pub fn with_modes(mut self, modes: HashSet<ConnectorMode>) -> Self {
        self.modes = modes;
        self
    }

    /// 接続先アドレスを設定
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// start()を失敗させる
    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// pre_stop()を失敗させる
    pub fn with_failing_pre_stop(mut self) -> Self {
        self.fail_pre_stop = true;
        self
    }

    /// stop()を失敗させる
    pub fn with_failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// start()の呼び出し回数
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// pre_stop()の呼び出し回数
    pub fn pre_stop_count(&self) -> usize {
        self.pre_stops.load(Ordering::SeqCst)
    }

    /// stop()の呼び出し回数
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointConnector for MockConnector {
    fn supported_api(&self) -> ApiType {
        self.api
    }

    fn supported_modes(&self) -> HashSet<ConnectorMode> {
        self.modes.clone()
    }

    fn address(&self) -> Option<String> {
        self.address.clone()
    }

    fn start(&self) -> GatewayResult<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(GatewayError::ConnectorLifecycle("mock start failure".to_string()));
        }
        Ok(())
    }

    fn pre_stop(&self) -> GatewayResult<()> {
        self.pre_stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_pre_stop {
            return Err(GatewayError::ConnectorLifecycle("mock pre-stop failure".to_string()));
        }
        Ok(())
    }

    fn stop(&self) -> GatewayResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(GatewayError::ConnectorLifecycle("mock stop failure".to_string()));
        }
        Ok(())
    }
}

enum FactoryBehavior {
    /// キューからコネクタを払い出す（空になったら最後の1つを使い回す）
    Supply,
    /// 常にOk(None)を返す
    ReturnNone,
    /// 常にエラーを返す
    Fail,
}

/// 生成呼び出しを記録するモックファクトリ
pub struct MockFactory {
    behavior: FactoryBehavior,
    queue: Mutex<VecDeque<Arc<MockConnector>>>,
    fallback: Mutex<Option<Arc<MockConnector>>>,
    calls: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl MockFactory {
    /// 指定したコネクタを順番に払い出すファクトリを作成
    pub fn supplying(connectors: Vec<Arc<MockConnector>>) -> Arc<Self> {
        Arc::new(Self {
            behavior: FactoryBehavior::Supply,
            queue: Mutex::new(connectors.into()),
            fallback: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 常に同一のコネクタを払い出すファクトリを作成
    pub fn always(connector: Arc<MockConnector>) -> Arc<Self> {
        Arc::new(Self {
            behavior: FactoryBehavior::Supply,
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Some(connector)),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 常にOk(None)を返すファクトリを作成
    pub fn returning_none() -> Arc<Self> {
        Arc::new(Self {
            behavior: FactoryBehavior::ReturnNone,
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 常にエラーを返すファクトリを作成
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            behavior: FactoryBehavior::Fail,
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 記録された生成呼び出し（設定、共有設定）の一覧
    pub fn calls(&self) -> Vec<(Option<String>, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    /// 生成呼び出しの総数
    pub fn create_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 指定した共有設定で呼ばれた回数
    pub fn calls_with_shared(&self, shared: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, s)| s.as_deref() == Some(shared))
            .count()
    }
}

impl ConnectorFactory for MockFactory {
    fn create_connector(
        &self,
        _deployment: &DeploymentContext,
        configuration: Option<&str>,
        shared_configuration: Option<&str>,
    ) -> GatewayResult<Option<Arc<dyn EndpointConnector>>> {
        self.calls.lock().unwrap().push((
            configuration.map(str::to_string),
            shared_configuration.map(str::to_string),
        ));

        match self.behavior {
            FactoryBehavior::Fail => Err(GatewayError::ConnectorCreation {
                endpoint: "mock".to_string(),
                message: "mock creation failure".to_string(),
            }),
            FactoryBehavior::ReturnNone => Ok(None),
            FactoryBehavior::Supply => {
                let next = self.queue.lock().unwrap().pop_front();
                let connector = match next {
                    Some(connector) => {
                        *self.fallback.lock().unwrap() = Some(connector.clone());
                        connector
                    }
                    None => match self.fallback.lock().unwrap().clone() {
                        Some(connector) => connector,
                        None => Arc::new(MockConnector::new()),
                    },
                };
                Ok(Some(connector))
            }
        }
    }
}

/// 常に解決エラーを返すリゾルバ
pub struct FailingResolver;

impl ConnectorFactoryResolver for FailingResolver {
    fn factory_by_id(
        &self,
        connector_type: &str,
    ) -> GatewayResult<Option<Arc<dyn ConnectorFactory>>> {
        Err(GatewayError::FactoryResolution {
            connector_type: connector_type.to_string(),
            message: "mock resolver failure".to_string(),
        })
    }
}

/// 解決回数を記録するリゾルバラッパー
pub struct CountingResolver {
    inner: Arc<dyn ConnectorFactoryResolver>,
    count: AtomicUsize,
}

impl CountingResolver {
    /// リゾルバをラップして作成
    pub fn wrap(inner: Arc<dyn ConnectorFactoryResolver>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            count: AtomicUsize::new(0),
        })
    }

    /// 解決試行の回数
    pub fn resolution_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ConnectorFactoryResolver for CountingResolver {
    fn factory_by_id(
        &self,
        connector_type: &str,
    ) -> GatewayResult<Option<Arc<dyn ConnectorFactory>>> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.factory_by_id(connector_type)
    }
}

/// 2グループ×2エンドポイント（全員グループ設定を継承）のAPIを構築
///
/// group1: ep1, ep2 / group2: ep3, ep4
pub fn build_api() -> Api {
    build_api_with(|name| {
        Endpoint::new(name, ENDPOINT_TYPE)
            .with_configuration(ENDPOINT_CONFIG)
            .with_inherit_configuration(true)
    })
}

/// 2グループ×2エンドポイント（全員オーバーライドを保持）のAPIを構築
pub fn build_api_with_override() -> Api {
    build_api_with(|name| {
        Endpoint::new(name, ENDPOINT_TYPE)
            .with_configuration(ENDPOINT_CONFIG)
            .with_shared_configuration_override(SHARED_CONFIG_OVERRIDE)
    })
}

/// エンドポイント生成クロージャを差し替え可能なAPIビルダー
pub fn build_api_with(endpoint_fn: impl Fn(&str) -> Endpoint) -> Api {
    Api::new("api-1", "my-api")
        .with_group(
            EndpointGroup::new("group1", ENDPOINT_TYPE)
                .with_shared_configuration(GROUP_SHARED_CONFIG)
                .with_endpoint(endpoint_fn("ep1"))
                .with_endpoint(endpoint_fn("ep2")),
        )
        .with_group(
            EndpointGroup::new("group2", ENDPOINT_TYPE)
                .with_shared_configuration(GROUP_SHARED_CONFIG)
                .with_endpoint(endpoint_fn("ep3"))
                .with_endpoint(endpoint_fn("ep4")),
        )
}
