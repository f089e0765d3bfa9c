//! エンドポイント管理
//!
//! 定義からのコネクタ構築、レジストリ保持、リクエスト毎の選択、
//! ライフサイクルオーケストレーションを担う。

mod criteria;
mod managed;
mod manager;

pub use criteria::EndpointCriteria;
pub use managed::{EndpointStatus, ManagedEndpoint, ManagedEndpointGroup};
pub use manager::EndpointManager;
