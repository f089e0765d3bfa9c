//! 管理対象エンドポイント/グループ
//!
//! 宣言的な定義に稼働状態とレジストリ所属を付与したランタイムラッパー。

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use apigw_common::definition::{Endpoint, EndpointGroup};

use crate::connector::EndpointConnector;

/// エンドポイントの稼働状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndpointStatus {
    /// 停止中（初期状態、コネクタ未生成または無効化済み）
    #[default]
    Down,
    /// 稼働中（コネクタ起動済みで選択対象）
    Up,
}

impl EndpointStatus {
    /// EndpointStatusを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }

    fn from_u8(value: u8) -> Self {
        if value == 1 {
            Self::Up
        } else {
            Self::Down
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Down => 0,
            Self::Up => 1,
        }
    }
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 管理対象エンドポイント
///
/// 定義・コネクタ実体・稼働状態・所属グループへの非所有参照を束ねる。
/// 不変条件: 状態がUpのエンドポイントは必ずコネクタを保持する。
/// 逆は要求されない（無効化されたエンドポイントはコネクタを保持したまま
/// 選択対象から外れる）。
pub struct ManagedEndpoint {
    definition: Endpoint,
    group: Weak<ManagedEndpointGroup>,
    connector: Option<Arc<dyn EndpointConnector>>,
    status: AtomicU8,
}

impl ManagedEndpoint {
    /// 新しい管理対象エンドポイントを作成（初期状態はDown）
    pub(crate) fn new(
        definition: Endpoint,
        group: Weak<ManagedEndpointGroup>,
        connector: Option<Arc<dyn EndpointConnector>>,
    ) -> Self {
        Self {
            definition,
            group,
            connector,
            status: AtomicU8::new(EndpointStatus::Down.as_u8()),
        }
    }

    /// エンドポイント定義への参照を取得
    pub fn definition(&self) -> &Endpoint {
        &self.definition
    }

    /// エンドポイント名を取得
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// コネクタ実体を取得（生成に失敗したエンドポイントはNone）
    pub fn connector(&self) -> Option<&Arc<dyn EndpointConnector>> {
        self.connector.as_ref()
    }

    /// 所属グループを取得
    ///
    /// グループがレジストリから破棄された後はNoneになる。
    pub fn group(&self) -> Option<Arc<ManagedEndpointGroup>> {
        self.group.upgrade()
    }

    /// 現在の稼働状態を取得
    pub fn status(&self) -> EndpointStatus {
        EndpointStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// 稼働状態を設定
    pub(crate) fn set_status(&self, status: EndpointStatus) {
        self.status.store(status.as_u8(), Ordering::SeqCst);
    }
}

impl std::fmt::Debug for ManagedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedEndpoint")
            .field("name", &self.definition.name)
            .field("status", &self.status())
            .field("has_connector", &self.connector.is_some())
            .finish()
    }
}

/// 管理対象エンドポイントグループ
///
/// グループ定義と宣言順のメンバー列を保持する。グループがメンバーを
/// 所有し、メンバーからの逆参照はWeakによる純粋にナビゲーショナルな
/// 非所有参照とする。
pub struct ManagedEndpointGroup {
    definition: EndpointGroup,
    members: RwLock<Vec<Arc<ManagedEndpoint>>>,
}

impl ManagedEndpointGroup {
    /// 新しい管理対象グループを作成（メンバーは空）
    pub(crate) fn new(definition: EndpointGroup) -> Self {
        Self {
            definition,
            members: RwLock::new(Vec::new()),
        }
    }

    /// グループ定義への参照を取得
    pub fn definition(&self) -> &EndpointGroup {
        &self.definition
    }

    /// グループ名を取得
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// メンバーのスナップショットを宣言順で取得
    pub fn members(&self) -> Vec<Arc<ManagedEndpoint>> {
        self.members.read().clone()
    }

    /// メンバーを末尾に追加
    pub(crate) fn push_member(&self, endpoint: Arc<ManagedEndpoint>) {
        self.members.write().push(endpoint);
    }

    /// 名前でメンバーを除去
    pub(crate) fn remove_member(&self, name: &str) -> bool {
        let mut members = self.members.write();
        let before = members.len();
        members.retain(|e| e.name() != name);
        members.len() != before
    }
}

impl std::fmt::Debug for ManagedEndpointGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedEndpointGroup")
            .field("name", &self.definition.name)
            .field("members", &self.members.read().len())
            .finish()
    }
}
