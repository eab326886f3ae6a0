//! # kakari
//!
//! kakariは、統計的なタガー・パーザ族の共通コアの実装です。
//!
//! ## 概要
//!
//! このライブラリは、依存構造の上で動作する統計NLPコンポーネントが共有する
//! ライフサイクルと素性抽出機構を提供します。宣言的な素性テンプレートから
//! 決定点ごとのスパースな素性ベクトルを生成し、テンプレートと学習済み
//! モデルを1つのアーカイブに永続化します。
//!
//! ## 主な機能
//!
//! - **素性テンプレート展開**: 単一値の連結と集合値の直積展開
//! - **モードライフサイクル**: 語彙収集・学習・解析・ブートストラップ・
//!   開発評価の5モードをモードごとのハンドル型で表現
//! - **モデル永続化**: zipアーカイブへの順序付きエントリの読み書き
//! - **精度カウント**: 正解構造に対するLAS/UAS/LAの累計
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::io::Cursor;
//!
//! use kakari::component::{Decoder, Trainer};
//! use kakari::feature::TemplateSet;
//! use kakari::graph::{DepGraph, GraphResolver};
//! use kakari::lexicon::Lexicon;
//!
//! let set = TemplateSet::from_reader("SINGLE wp i.f i.p\nSINGLE p1 i+1.p\n".as_bytes())?;
//!
//! let corpus = "the\t_\tDT\t2\tdet\ndog\tdog\tNN\t0\troot\n";
//! let graphs = DepGraph::from_reader(corpus.as_bytes())?;
//!
//! let mut trainer = Trainer::new(vec![set], Lexicon::new());
//! for graph in &graphs {
//!     let arcs = graph.gold_arcs()?;
//!     for (i, arc) in arcs.iter().enumerate() {
//!         let resolver = GraphResolver::new(graph, i + 1);
//!         trainer.append_instance(0, &arc.label, &resolver);
//!     }
//! }
//! let models = trainer.train(10)?;
//!
//! let mut buf = Cursor::new(vec![]);
//! trainer.save(&mut buf, &models)?;
//! let decoder = Decoder::read(Cursor::new(buf.into_inner()), 1)?;
//!
//! let resolver = GraphResolver::new(&graphs[0], 1);
//! assert_eq!(Some("det"), decoder.classify(0, &resolver));
//! # Ok(())
//! # }
//! ```

/// 精度カウント
pub mod accuracy;

/// モデルアーカイブの読み書き
pub mod archive;

/// モードライフサイクルとコンポーネントハンドル
pub mod component;

/// エラー型の定義
pub mod errors;

/// 素性テンプレートと素性ベクトル
pub mod feature;

/// 依存構造とフィールド解決
pub mod graph;

/// 語彙
pub mod lexicon;

/// 線形モデルと学習空間
pub mod model;

/// 内部ユーティリティ
mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use accuracy::{count_arcs, AccuracyCounts, GoldArc};
pub use component::{Bootstrapper, Collector, Decoder, Evaluator, Trainer};
pub use feature::{FeatureVector, FieldResolver, TemplateSet};
pub use graph::{DepGraph, DependencyTree};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
