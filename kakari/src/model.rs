//! 統計モデルのモジュール。
//!
//! このモジュールは、素性ベクトルからラベルを予測する線形モデルと、
//! 学習インスタンスを蓄積する学習空間を提供します。
//!
//! モデルの学習には平均化パーセプトロンを使用します。学習空間は
//! インスタンスの追記のみを行い、学習の実行は[`TrainSpace::train`]で
//! 明示的に開始します。

use std::io::{Read, Write};

use bincode::{Decode, Encode};
use hashbrown::HashMap;

use crate::errors::{KakariError, Result};
use crate::feature::FeatureVector;

/// モデルブロブのシリアライズ表現。
///
/// 重みのエントリは決定的な順序で格納されます。
#[derive(Encode, Decode)]
struct LinearModelData {
    labels: Vec<String>,
    weights: Vec<(String, String, Vec<f32>)>,
}

/// 学習済みの線形モデル。
///
/// 素性 (種別, 値) ごとにラベル数分の重みを保持し、素性ベクトルに対して
/// 重みの総和が最大となるラベルを返します。
pub struct LinearModel {
    labels: Vec<String>,
    weights: HashMap<(String, String), Vec<f32>>,
}

impl LinearModel {
    /// ラベルのスライスを返します。
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// 素性ベクトルを分類します。
    ///
    /// # 引数
    ///
    /// * `vector` - 分類する素性ベクトル
    ///
    /// # 戻り値
    ///
    /// スコアが最大のラベル。同点の場合はラベル順で先のものが選ばれます。
    /// ラベル集合が空の場合は `None`
    pub fn classify(&self, vector: &FeatureVector) -> Option<&str> {
        if self.labels.is_empty() {
            return None;
        }
        let scores = self.score(vector);
        let mut best = 0;
        for (i, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = i;
            }
        }
        Some(&self.labels[best])
    }

    /// ラベルごとのスコアを計算します。
    ///
    /// # 引数
    ///
    /// * `vector` - 素性ベクトル
    ///
    /// # 戻り値
    ///
    /// [`LinearModel::labels`]と同じ順序のスコアの列
    pub fn score(&self, vector: &FeatureVector) -> Vec<f32> {
        let mut scores = vec![0.0; self.labels.len()];
        for feature in vector {
            if let Some(ws) = self
                .weights
                .get(&(feature.ftype.clone(), feature.value.clone()))
            {
                for (score, w) in scores.iter_mut().zip(ws) {
                    *score += w;
                }
            }
        }
        scores
    }

    /// モデルをシンクに書き込みます。
    ///
    /// 重みのエントリはソートされ、同じモデルからは常に同一のバイト列が
    /// 生成されます。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # エラー
    ///
    /// 書き込みまたはエンコードに失敗した場合、[`KakariError`]が返されます。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut weights: Vec<_> = self
            .weights
            .iter()
            .map(|((ftype, value), ws)| (ftype.clone(), value.clone(), ws.clone()))
            .collect();
        weights.sort_unstable_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        let data = LinearModelData {
            labels: self.labels.clone(),
            weights,
        };
        bincode::encode_into_std_write(&data, &mut wtr, bincode::config::standard())?;
        Ok(())
    }

    /// ソースからモデルを読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 読み取り元
    ///
    /// # 戻り値
    ///
    /// 読み込まれたモデル
    ///
    /// # エラー
    ///
    /// 読み取りまたはデコードに失敗した場合、[`KakariError`]が返されます。
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let data: LinearModelData =
            bincode::decode_from_std_read(&mut rdr, bincode::config::standard())?;
        let mut weights = HashMap::with_capacity(data.weights.len());
        for (ftype, value, ws) in data.weights {
            weights.insert((ftype, value), ws);
        }
        Ok(Self {
            labels: data.labels,
            weights,
        })
    }
}

/// 学習インスタンスを蓄積する学習空間。
///
/// (ラベル, 素性ベクトル) のペアを追記のみで蓄積します。
#[derive(Default)]
pub struct TrainSpace {
    instances: Vec<(String, FeatureVector)>,
}

impl TrainSpace {
    /// 空の学習空間を作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 学習インスタンスを追加します。
    ///
    /// # 引数
    ///
    /// * `label` - 正解ラベル
    /// * `vector` - 素性ベクトル
    pub fn append_instance<S>(&mut self, label: S, vector: FeatureVector)
    where
        S: Into<String>,
    {
        self.instances.push((label.into(), vector));
    }

    /// インスタンスの数を返します。
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 学習空間が空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// 蓄積されたインスタンスから線形モデルを学習します。
    ///
    /// 平均化パーセプトロンを使用します。インスタンスは追加順に
    /// 処理され、学習は決定的です。
    ///
    /// # 引数
    ///
    /// * `max_iter` - 学習の反復回数
    ///
    /// # 戻り値
    ///
    /// 学習済みの線形モデル
    ///
    /// # エラー
    ///
    /// インスタンスが1つもない場合、または `max_iter` が0の場合、
    /// [`KakariError`]が返されます。
    pub fn train(&self, max_iter: u64) -> Result<LinearModel> {
        if self.instances.is_empty() {
            return Err(KakariError::invalid_state(
                "The train space has no instances",
                "nothing to train on",
            ));
        }
        if max_iter == 0 {
            return Err(KakariError::invalid_argument(
                "max_iter",
                "max_iter must be positive.",
            ));
        }

        let mut labels: Vec<String> = self.instances.iter().map(|(l, _)| l.clone()).collect();
        labels.sort_unstable();
        labels.dedup();
        let label_ids: HashMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        let mut weights: HashMap<(String, String), Vec<f32>> = HashMap::new();
        let mut totals: HashMap<(String, String), Vec<f64>> = HashMap::new();
        let mut step = 1u64;

        for _ in 0..max_iter {
            for (label, vector) in &self.instances {
                let gold = label_ids[label.as_str()];
                let predicted = Self::predict(&labels, &weights, vector);
                if predicted != gold {
                    for feature in vector {
                        let key = (feature.ftype.clone(), feature.value.clone());
                        let ws = weights
                            .entry(key.clone())
                            .or_insert_with(|| vec![0.0; labels.len()]);
                        ws[gold] += 1.0;
                        ws[predicted] -= 1.0;
                        let ts = totals.entry(key).or_insert_with(|| vec![0.0; labels.len()]);
                        ts[gold] += step as f64;
                        ts[predicted] -= step as f64;
                    }
                }
                step += 1;
            }
        }

        // Averaging: w_avg = w - accumulated / steps.
        let steps = (step - 1) as f64;
        let mut averaged = HashMap::with_capacity(weights.len());
        for (key, ws) in weights {
            let ts = &totals[&key];
            let avg: Vec<f32> = ws
                .iter()
                .zip(ts)
                .map(|(w, t)| (f64::from(*w) - t / steps) as f32)
                .collect();
            averaged.insert(key, avg);
        }

        drop(label_ids);
        Ok(LinearModel {
            labels,
            weights: averaged,
        })
    }

    fn predict(
        labels: &[String],
        weights: &HashMap<(String, String), Vec<f32>>,
        vector: &FeatureVector,
    ) -> usize {
        let mut scores = vec![0.0f32; labels.len()];
        for feature in vector {
            if let Some(ws) = weights.get(&(feature.ftype.clone(), feature.value.clone())) {
                for (score, w) in scores.iter_mut().zip(ws) {
                    *score += w;
                }
            }
        }
        let mut best = 0;
        for (i, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = i;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, &str)]) -> FeatureVector {
        let mut v = FeatureVector::new();
        for (t, x) in pairs {
            v.push(*t, *x);
        }
        v
    }

    fn noun_verb_space() -> TrainSpace {
        let mut space = TrainSpace::new();
        space.append_instance("NOUN", vector(&[("w", "dog"), ("s", "g")]));
        space.append_instance("VERB", vector(&[("w", "runs"), ("s", "s")]));
        space.append_instance("NOUN", vector(&[("w", "cat"), ("s", "t")]));
        space.append_instance("VERB", vector(&[("w", "eats"), ("s", "s")]));
        space
    }

    #[test]
    fn test_train_separable() {
        let model = noun_verb_space().train(10).unwrap();

        assert_eq!(&["NOUN", "VERB"], model.labels());
        assert_eq!(Some("NOUN"), model.classify(&vector(&[("w", "dog")])));
        assert_eq!(Some("VERB"), model.classify(&vector(&[("s", "s")])));
    }

    #[test]
    fn test_train_empty_space() {
        assert!(TrainSpace::new().train(10).is_err());
    }

    #[test]
    fn test_train_zero_iter() {
        assert!(noun_verb_space().train(0).is_err());
    }

    #[test]
    fn test_classify_unknown_features_is_deterministic() {
        let model = noun_verb_space().train(10).unwrap();

        // All scores are zero; the first label wins.
        assert_eq!(Some("NOUN"), model.classify(&vector(&[("w", "zzz")])));
    }

    #[test]
    fn test_write_read_roundtrip() {
        let model = noun_verb_space().train(10).unwrap();
        let mut blob = vec![];
        model.write(&mut blob).unwrap();

        let restored = LinearModel::read(blob.as_slice()).unwrap();
        assert_eq!(model.labels(), restored.labels());
        let probe = vector(&[("w", "dog"), ("s", "g")]);
        assert_eq!(model.score(&probe), restored.score(&probe));
    }

    #[test]
    fn test_write_is_deterministic() {
        let model = noun_verb_space().train(10).unwrap();
        let mut first = vec![];
        let mut second = vec![];
        model.write(&mut first).unwrap();
        model.write(&mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_append_instance() {
        let mut space = TrainSpace::new();
        assert!(space.is_empty());
        space.append_instance("X", vector(&[("a", "b")]));
        assert_eq!(1, space.len());
    }
}
