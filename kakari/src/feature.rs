//! 素性テンプレートと素性ベクトルのモジュール。
//!
//! このモジュールは、宣言的な素性テンプレートから分類決定ごとの
//! スパースな素性ベクトルを生成する機能を提供します。
//!
//! # 概要
//!
//! - テンプレート定義ファイルの読み込みと再シリアライズ
//! - フィールド解決コールバックを介した素性の抽出
//! - 集合値テンプレートの直積展開

mod extractor;
mod template;
mod vector;

pub use crate::feature::extractor::{append_template, feature_vector, FieldResolver};
pub use crate::feature::template::{FeatureTemplate, FeatureToken, TemplateSet};
pub use crate::feature::vector::{Feature, FeatureVector};

/// 素性値の連結に使用される区切り文字列。
///
/// 列形式コーパスの空欄列と同じ `"_"` を使用します。
pub const BLANK_COLUMN: &str = "_";
