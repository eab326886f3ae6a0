//! 精度カウントのモジュール。
//!
//! このモジュールは、解析済みの依存構造を正解の主辞・ラベルと比較し、
//! 4種類の累計カウントを蓄積する機能を提供します。

use crate::graph::DependencyTree;

/// 1トークン分の正解 (主辞位置, 依存ラベル) のペア。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoldArc {
    /// 正解の主辞位置。
    pub head: usize,

    /// 正解の依存ラベル。
    pub label: String,
}

impl GoldArc {
    /// 新しい正解ペアを作成します。
    ///
    /// # 引数
    ///
    /// * `head` - 正解の主辞位置
    /// * `label` - 正解の依存ラベル
    pub fn new<S>(head: usize, label: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            head,
            label: label.into(),
        }
    }
}

/// 精度の累計カウント。
///
/// 呼び出し側が確保して所有し、複数の構造にわたって参照で渡します。
/// カウント処理は加算のみを行い、リセットは呼び出し側の責任です。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccuracyCounts {
    /// 付与対象の総数。
    pub total: u64,

    /// 主辞とラベルの両方が正解と一致した数。
    pub labeled: u64,

    /// 主辞が正解と一致した数。
    pub unlabeled: u64,

    /// 主辞の正誤と独立に、ラベルが正解と一致した数。
    pub label: u64,
}

impl AccuracyCounts {
    /// 空のカウントを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// ラベル付き正解率 (LAS) を返します。
    pub fn las(&self) -> f64 {
        self.labeled as f64 / self.total as f64
    }

    /// ラベルなし正解率 (UAS) を返します。
    pub fn uas(&self) -> f64 {
        self.unlabeled as f64 / self.total as f64
    }

    /// ラベル正解率 (LA) を返します。
    pub fn la(&self) -> f64 {
        self.label as f64 / self.total as f64
    }
}

/// 構造の主辞・ラベルの付与を正解と比較し、カウントに加算します。
///
/// 構造のサイズを T とすると、位置0は暗黙のルートであり、位置 `1..T` が
/// 実トークンです。`gold` は実トークンに対応する長さ `T-1` の列で、
/// `gold[i-1]` が位置 `i` の正解です。
///
/// 1回の呼び出しで `total` に `T-1` が加算され、各位置について:
///
/// - 主辞が一致すれば `unlabeled` に1、さらにラベルも一致すれば
///   `labeled` に1
/// - 主辞の正誤と独立に、ラベルが一致すれば `label` に1
///
/// が加算されます。
///
/// # 引数
///
/// * `tree` - 解析済みの依存構造
/// * `gold` - 正解の列
/// * `counts` - 加算先のカウント
///
/// # パニック
///
/// `gold` の長さが `tree.len() - 1` と一致しない場合にパニックします。
pub fn count_arcs<T>(tree: &T, gold: &[GoldArc], counts: &mut AccuracyCounts)
where
    T: DependencyTree + ?Sized,
{
    assert_eq!(gold.len() + 1, tree.len());

    counts.total += gold.len() as u64;

    for (i, arc) in gold.iter().enumerate() {
        let pos = i + 1;

        if tree.has_head(pos, arc.head) {
            counts.unlabeled += 1;

            if tree.has_label(pos, &arc.label) {
                counts.labeled += 1;
            }
        }

        if tree.has_label(pos, &arc.label) {
            counts.label += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::{DepGraph, DepNode};

    fn graph(arcs: &[(usize, &str)]) -> DepGraph {
        let mut graph = DepGraph::new();
        for (i, (head, label)) in arcs.iter().enumerate() {
            let mut node = DepNode::new(format!("w{}", i + 1), format!("P{}", i + 1));
            node.head = Some(*head);
            node.deprel = Some(label.to_string());
            graph.push(node);
        }
        graph
    }

    fn gold(arcs: &[(usize, &str)]) -> Vec<GoldArc> {
        arcs.iter().map(|(h, l)| GoldArc::new(*h, *l)).collect()
    }

    #[test]
    fn test_all_correct() {
        let tree = graph(&[(0, "root"), (1, "obj"), (2, "det")]);
        let mut counts = AccuracyCounts::new();
        count_arcs(&tree, &gold(&[(0, "root"), (1, "obj"), (2, "det")]), &mut counts);

        assert_eq!(
            AccuracyCounts {
                total: 3,
                labeled: 3,
                unlabeled: 3,
                label: 3,
            },
            counts
        );
    }

    #[test]
    fn test_one_label_flipped() {
        let tree = graph(&[(0, "root"), (1, "nmod"), (2, "det")]);
        let mut counts = AccuracyCounts::new();
        count_arcs(&tree, &gold(&[(0, "root"), (1, "obj"), (2, "det")]), &mut counts);

        // One label mismatch with a correct head loses exactly one labeled
        // and one label count.
        assert_eq!(
            AccuracyCounts {
                total: 3,
                labeled: 2,
                unlabeled: 3,
                label: 2,
            },
            counts
        );
    }

    #[test]
    fn test_head_flipped_label_correct() {
        let tree = graph(&[(0, "root"), (3, "obj"), (2, "det")]);
        let mut counts = AccuracyCounts::new();
        count_arcs(&tree, &gold(&[(0, "root"), (1, "obj"), (2, "det")]), &mut counts);

        assert_eq!(
            AccuracyCounts {
                total: 3,
                labeled: 2,
                unlabeled: 2,
                label: 3,
            },
            counts
        );
    }

    #[test]
    fn test_accumulates_across_calls() {
        let tree = graph(&[(0, "root")]);
        let mut counts = AccuracyCounts::new();
        count_arcs(&tree, &gold(&[(0, "root")]), &mut counts);
        count_arcs(&tree, &gold(&[(0, "punct")]), &mut counts);

        assert_eq!(2, counts.total);
        assert_eq!(1, counts.labeled);
        assert_eq!(2, counts.unlabeled);
        assert_eq!(1, counts.label);
    }

    #[test]
    fn test_rates() {
        let counts = AccuracyCounts {
            total: 4,
            labeled: 2,
            unlabeled: 3,
            label: 2,
        };
        assert_eq!(0.5, counts.las());
        assert_eq!(0.75, counts.uas());
        assert_eq!(0.5, counts.la());
    }
}
