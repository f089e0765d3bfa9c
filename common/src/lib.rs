//! APIゲートウェイ共通ライブラリ
//!
//! 定義モデルとエラー型

#![warn(missing_docs)]

/// API/エンドポイント定義モデル
pub mod definition;

/// エラー型定義
pub mod error;
