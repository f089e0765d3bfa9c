//! APIゲートウェイ エンドポイント管理コア
//!
//! 宣言的な定義からバックエンドコネクタを構築し、リクエスト毎に
//! 稼働中・能力適合のコネクタを選択するレジストリを提供する。

#![warn(missing_docs)]

/// エンドポイントコネクタ抽象（能力宣言とライフサイクル）
pub mod connector;

/// エンドポイント管理（レジストリ、選択、ライフサイクル）
pub mod endpoint;

/// ロギング初期化ユーティリティ
pub mod logging;

/// コネクタプラグインレジストリ
pub mod plugin;

/// テンプレート変数供給
pub mod template;
