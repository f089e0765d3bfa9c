//! テンプレート変数供給
//!
//! コアが保持する情報をテンプレートエンジン等の外部シンクへ
//! スナップショットとして書き出すためのシーム。

use std::collections::HashMap;

use serde_json::Value;

/// エンドポイントスナップショットの変数名
pub const ENDPOINTS_VARIABLE: &str = "endpoints";

/// テンプレートコンテキスト（変数の受け皿）
///
/// 実体はテンプレートエンジン側が提供する。本コアは名前付き変数を
/// 書き込むだけで、内容の解釈や描画タイミングには関与しない。
pub trait TemplateContext {
    /// 変数を設定する（同名変数は上書き）
    fn set_variable(&mut self, name: &str, value: Value);
}

/// テンプレート変数プロバイダ
///
/// 保持する情報をテンプレートコンテキストへ書き出すコンポーネント。
pub trait TemplateVariableProvider {
    /// 現在のスナップショットをコンテキストへ書き出す
    fn provide(&self, ctx: &mut dyn TemplateContext);
}

/// マップ実装のテンプレートコンテキスト
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateContext {
    variables: HashMap<String, Value>,
}

impl InMemoryTemplateContext {
    /// 空のコンテキストを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 変数を取得
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// 全変数への参照を取得
    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }
}

impl TemplateContext for InMemoryTemplateContext {
    fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }
}
