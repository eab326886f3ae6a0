//! 素性ベクトルのモジュール。

/// (種別, 値) の文字列ペアで表される1つの素性。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    /// 素性の種別タグ。
    pub ftype: String,

    /// 素性の値。
    pub value: String,
}

impl Feature {
    /// 新しい素性を作成します。
    ///
    /// # 引数
    ///
    /// * `ftype` - 素性の種別タグ
    /// * `value` - 素性の値
    pub fn new<S, T>(ftype: S, value: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            ftype: ftype.into(),
            value: value.into(),
        }
    }
}

/// 1つの分類決定に対する素性の順序付き多重集合。
///
/// 重複を許し、挿入順を保持します。1回の抽出パスの間に追記のみで
/// 変更され、以降は読み取り専用として扱われます。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureVector {
    features: Vec<Feature>,
}

impl FeatureVector {
    /// 空の素性ベクトルを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 素性を末尾に追加します。
    ///
    /// # 引数
    ///
    /// * `ftype` - 素性の種別タグ
    /// * `value` - 素性の値
    pub fn push<S, T>(&mut self, ftype: S, value: T)
    where
        S: Into<String>,
        T: Into<String>,
    {
        self.features.push(Feature::new(ftype, value));
    }

    /// 素性の数を返します。
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// 素性ベクトルが空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// 素性のスライスを返します。
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// 素性のイテレータを返します。
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }
}

impl<'a> IntoIterator for &'a FeatureVector {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order_and_duplicates() {
        let mut vector = FeatureVector::new();
        vector.push("p0", "NN");
        vector.push("p1", "VB");
        vector.push("p0", "NN");

        assert_eq!(3, vector.len());
        assert_eq!(
            &[
                Feature::new("p0", "NN"),
                Feature::new("p1", "VB"),
                Feature::new("p0", "NN"),
            ],
            vector.features()
        );
    }

    #[test]
    fn test_empty() {
        let vector = FeatureVector::new();
        assert!(vector.is_empty());
        assert_eq!(0, vector.len());
    }
}
