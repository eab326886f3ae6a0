//! コンポーネントのライフサイクルモジュール。
//!
//! このモジュールは、統計タガー・パーザ族が共有する5つの動作モードを
//! 提供します。モードは構築時に一度だけ決まり、以後変化しません。
//!
//! | モード | ハンドル | 保持する配列 |
//! |---|---|---|
//! | 語彙収集 | [`Collector`] | テンプレート集合 |
//! | 学習 | [`Trainer`] | テンプレート集合、学習空間、語彙 |
//! | 解析 | [`Decoder`] | テンプレート集合、モデル (アーカイブから復元) |
//! | ブートストラップ | [`Bootstrapper`] | テンプレート集合、学習空間、モデル、語彙 |
//! | 開発評価 | [`Evaluator`] | テンプレート集合、モデル、語彙 |
//!
//! モードごとに別の型を使うことで、不正な操作 (モデルなしでの分類や、
//! 解析モードでのインスタンス追加など) は実行時検査ではなく型レベルで
//! 表現不能になります。
//!
//! コンポーネントは「ジョイント」であり、N個の独立したサブモデルを
//! 並行して扱います。同時に保持される配列は常に同じ長さ・同じ順序です。

use std::io::{Read, Seek, Write};

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::errors::{KakariError, Result};
use crate::feature::{feature_vector, FeatureVector, FieldResolver, TemplateSet};
use crate::lexicon::Lexicon;
use crate::model::{LinearModel, TrainSpace};

/// テンプレート集合エントリの名前のベース。
pub const ENTRY_TEMPLATE: &str = "template-";

/// モデルエントリの名前のベース。
pub const ENTRY_MODEL: &str = "model-";

/// テンプレート集合とモデルをアーカイブに保存します。
///
/// テンプレート集合 `i` はエントリ `"template-<i>"` に、モデル `i` は
/// エントリ `"model-<i>"` に、この順で書き込まれます。読み戻しは
/// [`load`]が書き込み順に行います。
///
/// # 引数
///
/// * `wtr` - 書き込み先
/// * `template_sets` - テンプレート集合の列
/// * `models` - 学習済みモデルの列
///
/// # エラー
///
/// 2つの列の長さが一致しない場合、または書き込みに失敗した場合、
/// [`KakariError`]が返されます。失敗した場合のアーカイブは無効です。
pub fn save<W>(wtr: W, template_sets: &[TemplateSet], models: &[LinearModel]) -> Result<()>
where
    W: Write + Seek,
{
    if template_sets.len() != models.len() {
        return Err(KakariError::invalid_argument(
            "models",
            format!(
                "The number of models ({}) must equal the number of template sets ({}).",
                models.len(),
                template_sets.len()
            ),
        ));
    }

    let mut writer = ArchiveWriter::new(wtr);

    let template_blobs: Vec<_> = template_sets
        .iter()
        .map(|set| set.to_string().into_bytes())
        .collect();
    writer.write_entries(ENTRY_TEMPLATE, &template_blobs)?;

    let mut model_blobs = Vec::with_capacity(models.len());
    for model in models {
        let mut blob = vec![];
        model.write(&mut blob)?;
        model_blobs.push(blob);
    }
    writer.write_entries(ENTRY_MODEL, &model_blobs)?;

    writer.finish()?;
    Ok(())
}

/// アーカイブからテンプレート集合とモデルを復元します。
///
/// エントリは書き込み順に消費されます。サブモデル数が書き込まれた数と
/// 一致しない場合はエラーとなります。
///
/// # 引数
///
/// * `rdr` - 読み取り元
/// * `num_sub_models` - 期待するサブモデル数
///
/// # 戻り値
///
/// (テンプレート集合の列, モデルの列) のタプル
///
/// # エラー
///
/// エントリの不足・超過、または内容の復元に失敗した場合、
/// [`KakariError`]が返されます。失敗した場合、コンポーネントは
/// 解析可能な状態ではありません。
pub fn load<R>(rdr: R, num_sub_models: usize) -> Result<(Vec<TemplateSet>, Vec<LinearModel>)>
where
    R: Read,
{
    let mut reader = ArchiveReader::new(rdr);

    let mut template_sets = Vec::with_capacity(num_sub_models);
    for blob in reader.read_entries(num_sub_models)? {
        template_sets.push(TemplateSet::from_reader(blob.as_slice())?);
    }

    let mut models = Vec::with_capacity(num_sub_models);
    for blob in reader.read_entries(num_sub_models)? {
        models.push(LinearModel::read(blob.as_slice())?);
    }

    reader.finish()?;
    Ok((template_sets, models))
}

/// 語彙収集モードのハンドル。
///
/// テンプレート集合のみを保持します。コーパスを走査して語彙を構築する
/// 段階で使用します。
pub struct Collector {
    template_sets: Vec<TemplateSet>,
}

impl Collector {
    /// 新しい語彙収集ハンドルを作成します。
    ///
    /// # 引数
    ///
    /// * `template_sets` - サブモデルごとのテンプレート集合
    pub fn new(template_sets: Vec<TemplateSet>) -> Self {
        Self { template_sets }
    }

    /// サブモデル数を返します。
    pub fn num_sub_models(&self) -> usize {
        self.template_sets.len()
    }

    /// テンプレート集合のスライスを返します。
    pub fn template_sets(&self) -> &[TemplateSet] {
        &self.template_sets
    }
}

/// 学習モードのハンドル。
///
/// テンプレート集合、学習空間、語彙を保持します。学習空間への
/// インスタンス追加はこのハンドルと[`Bootstrapper`]でのみ可能です。
pub struct Trainer {
    template_sets: Vec<TemplateSet>,
    spaces: Vec<TrainSpace>,
    lexicon: Lexicon,
}

impl Trainer {
    /// 新しい学習ハンドルを作成します。
    ///
    /// サブモデルごとに空の学習空間が1つずつ確保されます。
    ///
    /// # 引数
    ///
    /// * `template_sets` - サブモデルごとのテンプレート集合
    /// * `lexicon` - 収集済みの語彙
    pub fn new(template_sets: Vec<TemplateSet>, lexicon: Lexicon) -> Self {
        let spaces = template_sets.iter().map(|_| TrainSpace::new()).collect();
        Self {
            template_sets,
            spaces,
            lexicon,
        }
    }

    /// サブモデル数を返します。
    pub fn num_sub_models(&self) -> usize {
        self.template_sets.len()
    }

    /// テンプレート集合のスライスを返します。
    pub fn template_sets(&self) -> &[TemplateSet] {
        &self.template_sets
    }

    /// 語彙を返します。
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// 学習空間のスライスを返します。
    pub fn spaces(&self) -> &[TrainSpace] {
        &self.spaces
    }

    /// サブモデルのテンプレートで素性ベクトルを抽出します。
    ///
    /// # 引数
    ///
    /// * `sub` - サブモデルの添字
    /// * `resolver` - フィールド解決コールバック
    pub fn feature_vector<R>(&self, sub: usize, resolver: &R) -> FeatureVector
    where
        R: FieldResolver + ?Sized,
    {
        feature_vector(&self.template_sets[sub], resolver)
    }

    /// 素性を抽出し、学習インスタンスとして追加します。
    ///
    /// # 引数
    ///
    /// * `sub` - サブモデルの添字
    /// * `label` - 正解ラベル
    /// * `resolver` - フィールド解決コールバック
    pub fn append_instance<R>(&mut self, sub: usize, label: &str, resolver: &R)
    where
        R: FieldResolver + ?Sized,
    {
        let vector = feature_vector(&self.template_sets[sub], resolver);
        self.spaces[sub].append_instance(label, vector);
    }

    /// すべてのサブモデルを学習します。
    ///
    /// # 引数
    ///
    /// * `max_iter` - 学習の反復回数
    ///
    /// # 戻り値
    ///
    /// サブモデルごとの学習済みモデルの列
    ///
    /// # エラー
    ///
    /// いずれかの学習空間が空の場合、[`KakariError`]が返されます。
    pub fn train(&self, max_iter: u64) -> Result<Vec<LinearModel>> {
        self.spaces.iter().map(|space| space.train(max_iter)).collect()
    }

    /// 学習済みモデルとともにアーカイブへ保存します。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    /// * `models` - [`Trainer::train`]で得たモデルの列
    ///
    /// # エラー
    ///
    /// モデル数がサブモデル数と一致しない場合、または書き込みに
    /// 失敗した場合、[`KakariError`]が返されます。
    pub fn save<W>(&self, wtr: W, models: &[LinearModel]) -> Result<()>
    where
        W: Write + Seek,
    {
        save(wtr, &self.template_sets, models)
    }
}

/// 解析モードのハンドル。
///
/// アーカイブから復元したテンプレート集合とモデルを保持します。
/// 学習空間は存在しないため、インスタンスの追加は型レベルで不可能です。
pub struct Decoder {
    template_sets: Vec<TemplateSet>,
    models: Vec<LinearModel>,
}

impl Decoder {
    /// アーカイブから解析ハンドルを復元します。
    ///
    /// # 引数
    ///
    /// * `rdr` - アーカイブの読み取り元
    /// * `num_sub_models` - 期待するサブモデル数
    ///
    /// # エラー
    ///
    /// アーカイブの読み取りに失敗した場合、[`KakariError`]が返されます。
    /// このときコンポーネントは解析可能な状態ではありません。
    pub fn read<R>(rdr: R, num_sub_models: usize) -> Result<Self>
    where
        R: Read,
    {
        let (template_sets, models) = load(rdr, num_sub_models)?;
        Ok(Self {
            template_sets,
            models,
        })
    }

    /// サブモデル数を返します。
    pub fn num_sub_models(&self) -> usize {
        self.models.len()
    }

    /// テンプレート集合のスライスを返します。
    pub fn template_sets(&self) -> &[TemplateSet] {
        &self.template_sets
    }

    /// モデルのスライスを返します。
    pub fn models(&self) -> &[LinearModel] {
        &self.models
    }

    /// サブモデルのテンプレートで素性ベクトルを抽出します。
    ///
    /// # 引数
    ///
    /// * `sub` - サブモデルの添字
    /// * `resolver` - フィールド解決コールバック
    pub fn feature_vector<R>(&self, sub: usize, resolver: &R) -> FeatureVector
    where
        R: FieldResolver + ?Sized,
    {
        feature_vector(&self.template_sets[sub], resolver)
    }

    /// 素性を抽出し、サブモデルで分類します。
    ///
    /// # 引数
    ///
    /// * `sub` - サブモデルの添字
    /// * `resolver` - フィールド解決コールバック
    ///
    /// # 戻り値
    ///
    /// 予測されたラベル
    pub fn classify<R>(&self, sub: usize, resolver: &R) -> Option<&str>
    where
        R: FieldResolver + ?Sized,
    {
        let vector = feature_vector(&self.template_sets[sub], resolver);
        self.models[sub].classify(&vector)
    }
}

/// ブートストラップモードのハンドル。
///
/// 現在のモデルで解析しつつ、訂正インスタンスを学習空間に追加します。
pub struct Bootstrapper {
    template_sets: Vec<TemplateSet>,
    spaces: Vec<TrainSpace>,
    models: Vec<LinearModel>,
    lexicon: Lexicon,
}

impl Bootstrapper {
    /// 新しいブートストラップハンドルを作成します。
    ///
    /// # 引数
    ///
    /// * `template_sets` - サブモデルごとのテンプレート集合
    /// * `models` - 前段の学習済みモデルの列
    /// * `lexicon` - 収集済みの語彙
    ///
    /// # エラー
    ///
    /// モデル数がテンプレート集合数と一致しない場合、
    /// [`KakariError`]が返されます。
    pub fn new(
        template_sets: Vec<TemplateSet>,
        models: Vec<LinearModel>,
        lexicon: Lexicon,
    ) -> Result<Self> {
        if template_sets.len() != models.len() {
            return Err(KakariError::invalid_argument(
                "models",
                format!(
                    "The number of models ({}) must equal the number of template sets ({}).",
                    models.len(),
                    template_sets.len()
                ),
            ));
        }
        let spaces = template_sets.iter().map(|_| TrainSpace::new()).collect();
        Ok(Self {
            template_sets,
            spaces,
            models,
            lexicon,
        })
    }

    /// サブモデル数を返します。
    pub fn num_sub_models(&self) -> usize {
        self.models.len()
    }

    /// 語彙を返します。
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// 学習空間のスライスを返します。
    pub fn spaces(&self) -> &[TrainSpace] {
        &self.spaces
    }

    /// 素性を抽出し、サブモデルで分類します。
    ///
    /// # 引数
    ///
    /// * `sub` - サブモデルの添字
    /// * `resolver` - フィールド解決コールバック
    pub fn classify<R>(&self, sub: usize, resolver: &R) -> Option<&str>
    where
        R: FieldResolver + ?Sized,
    {
        let vector = feature_vector(&self.template_sets[sub], resolver);
        self.models[sub].classify(&vector)
    }

    /// 素性を抽出し、訂正インスタンスとして追加します。
    ///
    /// # 引数
    ///
    /// * `sub` - サブモデルの添字
    /// * `label` - 正解ラベル
    /// * `resolver` - フィールド解決コールバック
    pub fn append_instance<R>(&mut self, sub: usize, label: &str, resolver: &R)
    where
        R: FieldResolver + ?Sized,
    {
        let vector = feature_vector(&self.template_sets[sub], resolver);
        self.spaces[sub].append_instance(label, vector);
    }

    /// 蓄積された訂正インスタンスからすべてのサブモデルを学習し直します。
    ///
    /// # 引数
    ///
    /// * `max_iter` - 学習の反復回数
    ///
    /// # エラー
    ///
    /// いずれかの学習空間が空の場合、[`KakariError`]が返されます。
    pub fn train(&self, max_iter: u64) -> Result<Vec<LinearModel>> {
        self.spaces.iter().map(|space| space.train(max_iter)).collect()
    }
}

/// 開発評価モードのハンドル。
///
/// 学習済みモデルで解析した結果を正解と比較する段階で使用します。
/// 比較自体は[`count_arcs`](crate::accuracy::count_arcs)が行います。
pub struct Evaluator {
    template_sets: Vec<TemplateSet>,
    models: Vec<LinearModel>,
    lexicon: Lexicon,
}

impl Evaluator {
    /// 新しい開発評価ハンドルを作成します。
    ///
    /// # 引数
    ///
    /// * `template_sets` - サブモデルごとのテンプレート集合
    /// * `models` - 学習済みモデルの列
    /// * `lexicon` - 収集済みの語彙
    ///
    /// # エラー
    ///
    /// モデル数がテンプレート集合数と一致しない場合、
    /// [`KakariError`]が返されます。
    pub fn new(
        template_sets: Vec<TemplateSet>,
        models: Vec<LinearModel>,
        lexicon: Lexicon,
    ) -> Result<Self> {
        if template_sets.len() != models.len() {
            return Err(KakariError::invalid_argument(
                "models",
                format!(
                    "The number of models ({}) must equal the number of template sets ({}).",
                    models.len(),
                    template_sets.len()
                ),
            ));
        }
        Ok(Self {
            template_sets,
            models,
            lexicon,
        })
    }

    /// サブモデル数を返します。
    pub fn num_sub_models(&self) -> usize {
        self.models.len()
    }

    /// 語彙を返します。
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// 素性を抽出し、サブモデルで分類します。
    ///
    /// # 引数
    ///
    /// * `sub` - サブモデルの添字
    /// * `resolver` - フィールド解決コールバック
    pub fn classify<R>(&self, sub: usize, resolver: &R) -> Option<&str>
    where
        R: FieldResolver + ?Sized,
    {
        let vector = feature_vector(&self.template_sets[sub], resolver);
        self.models[sub].classify(&vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use crate::feature::FeatureToken;
    use hashbrown::HashMap;

    use crate::utils::hashmap;

    struct MapResolver {
        ones: HashMap<&'static str, &'static str>,
    }

    impl FieldResolver for MapResolver {
        fn field(&self, token: &FeatureToken) -> Option<String> {
            self.ones.get(token.descriptor()).map(|v| v.to_string())
        }

        fn fields(&self, token: &FeatureToken) -> Option<Vec<String>> {
            self.field(token).map(|v| vec![v])
        }
    }

    fn template_sets() -> Vec<TemplateSet> {
        vec![
            TemplateSet::from_reader(b"SINGLE w a\n".as_slice()).unwrap(),
            TemplateSet::from_reader(b"SINGLE p b\n".as_slice()).unwrap(),
        ]
    }

    #[test]
    fn test_collector_holds_templates_only() {
        let collector = Collector::new(template_sets());
        assert_eq!(2, collector.num_sub_models());
        assert_eq!(1, collector.template_sets()[0].len());
    }

    #[test]
    fn test_trainer_appends_per_sub_model() {
        let mut trainer = Trainer::new(template_sets(), Lexicon::new());
        let resolver = MapResolver {
            ones: hashmap!["a" => "dog", "b" => "NN"],
        };
        trainer.append_instance(0, "NOUN", &resolver);
        trainer.append_instance(1, "LEFT", &resolver);
        trainer.append_instance(1, "RIGHT", &resolver);

        assert_eq!(1, trainer.spaces()[0].len());
        assert_eq!(2, trainer.spaces()[1].len());
    }

    #[test]
    fn test_save_rejects_length_mismatch() {
        let trainer = Trainer::new(template_sets(), Lexicon::new());
        let result = trainer.save(Cursor::new(vec![]), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut trainer = Trainer::new(template_sets(), Lexicon::new());
        let dog = MapResolver {
            ones: hashmap!["a" => "dog", "b" => "NN"],
        };
        let runs = MapResolver {
            ones: hashmap!["a" => "runs", "b" => "VBZ"],
        };
        trainer.append_instance(0, "NOUN", &dog);
        trainer.append_instance(0, "VERB", &runs);
        trainer.append_instance(1, "L", &dog);
        trainer.append_instance(1, "R", &runs);

        let models = trainer.train(10).unwrap();
        let mut buf = Cursor::new(vec![]);
        trainer.save(&mut buf, &models).unwrap();

        let decoder = Decoder::read(Cursor::new(buf.into_inner()), 2).unwrap();
        assert_eq!(2, decoder.num_sub_models());
        assert_eq!(trainer.template_sets(), decoder.template_sets());
        assert_eq!(Some("NOUN"), decoder.classify(0, &dog));
        assert_eq!(Some("VERB"), decoder.classify(0, &runs));
        assert_eq!(Some("L"), decoder.classify(1, &dog));
    }

    #[test]
    fn test_load_wrong_sub_model_count() {
        let mut trainer = Trainer::new(template_sets(), Lexicon::new());
        let dog = MapResolver {
            ones: hashmap!["a" => "dog", "b" => "NN"],
        };
        let runs = MapResolver {
            ones: hashmap!["a" => "runs", "b" => "VBZ"],
        };
        for (label0, label1, resolver) in [("NOUN", "L", &dog), ("VERB", "R", &runs)] {
            trainer.append_instance(0, label0, resolver);
            trainer.append_instance(1, label1, resolver);
        }
        let models = trainer.train(10).unwrap();
        let mut buf = Cursor::new(vec![]);
        trainer.save(&mut buf, &models).unwrap();
        let bytes = buf.into_inner();

        // Fewer than written fails at finish; more than written fails early.
        assert!(Decoder::read(Cursor::new(bytes.clone()), 1).is_err());
        assert!(Decoder::read(Cursor::new(bytes), 3).is_err());
    }

    #[test]
    fn test_bootstrapper_length_mismatch() {
        let result = Bootstrapper::new(template_sets(), vec![], Lexicon::new());
        assert!(result.is_err());
    }
}
