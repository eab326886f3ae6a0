//! 語彙のモジュール。
//!
//! このモジュールは、LEXICAモードでコーパスから収集される語彙を
//! 保持するデータ構造を提供します。

use hashbrown::HashMap;

/// 文字列キーの出現回数を数える語彙。
///
/// 収集後に頻度の低いキーを刈り込み、学習・解析時の参照に使用します。
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    counts: HashMap<String, u32>,
}

impl Lexicon {
    /// 空の語彙を作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// キーの出現を1回分記録します。
    ///
    /// # 引数
    ///
    /// * `key` - 記録するキー
    pub fn add<S>(&mut self, key: S)
    where
        S: Into<String>,
    {
        *self.counts.entry(key.into()).or_insert(0) += 1;
    }

    /// キーの出現回数を返します。
    pub fn count(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// キーが語彙に含まれるかどうかを返します。
    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    /// 出現回数が閾値未満のキーを取り除きます。
    ///
    /// # 引数
    ///
    /// * `min_count` - 残すキーの最小出現回数
    pub fn prune(&mut self, min_count: u32) {
        self.counts.retain(|_, count| *count >= min_count);
    }

    /// キーの数を返します。
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// 語彙が空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let mut lexicon = Lexicon::new();
        lexicon.add("dog");
        lexicon.add("dog");
        lexicon.add("cat");

        assert_eq!(2, lexicon.count("dog"));
        assert_eq!(1, lexicon.count("cat"));
        assert_eq!(0, lexicon.count("bird"));
        assert!(lexicon.contains("cat"));
        assert!(!lexicon.contains("bird"));
    }

    #[test]
    fn test_prune() {
        let mut lexicon = Lexicon::new();
        lexicon.add("dog");
        lexicon.add("dog");
        lexicon.add("cat");
        lexicon.prune(2);

        assert_eq!(1, lexicon.len());
        assert!(lexicon.contains("dog"));
        assert!(!lexicon.contains("cat"));
    }
}
