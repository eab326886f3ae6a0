//! 素性抽出エンジンのモジュール。
//!
//! このモジュールは、素性テンプレートとフィールド解決コールバックから
//! 素性ベクトルを生成する抽出アルゴリズムを提供します。
//!
//! # 概要
//!
//! - 単一値テンプレート: 各トークンのフィールド値を順に連結し、1つの素性を生成
//! - 集合値テンプレート: 各トークンの候補値列の直積を展開し、組み合わせごとに素性を生成
//! - いずれのパスでも、フィールドが欠損していればテンプレート全体を黙ってスキップ

use crate::feature::template::{FeatureTemplate, FeatureToken, TemplateSet};
use crate::feature::vector::FeatureVector;
use crate::feature::BLANK_COLUMN;

/// フィールド解決のケーパビリティ。
///
/// 素性トークンを具体的なフィールド値に解決します。木やノードの内部表現は
/// 具体的なタガー・パーザ側が提供し、抽出エンジン自体はそれらを関知しません。
///
/// 欠損フィールドは `None` で表現します。これはエラーではなく、
/// 該当テンプレートのスキップを意味します。
pub trait FieldResolver {
    /// 素性トークンを1つのフィールド値に解決します。
    ///
    /// # 引数
    ///
    /// * `token` - 素性トークン
    ///
    /// # 戻り値
    ///
    /// フィールド値。欠損している場合は `None`
    fn field(&self, token: &FeatureToken) -> Option<String>;

    /// 素性トークンを順序付きのフィールド値列に解決します。
    ///
    /// # 引数
    ///
    /// * `token` - 素性トークン
    ///
    /// # 戻り値
    ///
    /// フィールド値の列。欠損している場合は `None`。
    /// 空の列は有効な値であり、直積が空になるため素性は生成されません。
    fn fields(&self, token: &FeatureToken) -> Option<Vec<String>>;
}

/// テンプレート集合から素性ベクトルを生成します。
///
/// 集合内の各テンプレートを順に展開し、1つの素性ベクトルに追記します。
/// 同じ構造と同じテンプレートに対しては常に同一のベクトルが生成されます。
///
/// # 引数
///
/// * `set` - テンプレート集合
/// * `resolver` - フィールド解決コールバック
///
/// # 戻り値
///
/// 生成された素性ベクトル
pub fn feature_vector<R>(set: &TemplateSet, resolver: &R) -> FeatureVector
where
    R: FieldResolver + ?Sized,
{
    let mut vector = FeatureVector::new();
    for template in set.templates() {
        append_template(&mut vector, template, resolver);
    }
    vector
}

/// 1つのテンプレートを展開し、素性ベクトルに追記します。
///
/// 単一値テンプレートは高々1つ、集合値テンプレートは0個以上の素性を
/// 生成します。いずれかのトークンのフィールドが欠損している場合、
/// テンプレート全体が黙ってスキップされます。部分的なキーは下流の
/// 素性種別が許容できないため、全か無かの方針を取ります。
///
/// # 引数
///
/// * `vector` - 追記先の素性ベクトル
/// * `template` - 展開するテンプレート
/// * `resolver` - フィールド解決コールバック
pub fn append_template<R>(vector: &mut FeatureVector, template: &FeatureTemplate, resolver: &R)
where
    R: FieldResolver + ?Sized,
{
    if template.is_set_valued() {
        let mut candidates = Vec::with_capacity(template.tokens().len());
        for token in template.tokens() {
            match resolver.fields(token) {
                Some(values) => candidates.push(values),
                None => return,
            }
        }
        let mut chosen = Vec::with_capacity(candidates.len());
        for_each_combination(&candidates, &mut chosen, &mut |selection| {
            vector.push(template.ftype(), selection.join(BLANK_COLUMN));
        });
    } else {
        let mut parts = Vec::with_capacity(template.tokens().len());
        for token in template.tokens() {
            match resolver.field(token) {
                Some(value) => parts.push(value),
                None => return,
            }
        }
        vector.push(template.ftype(), parts.join(BLANK_COLUMN));
    }
}

/// 候補値列の直積を列挙します。
///
/// トークンごとに1つの候補値を選び、全深度に達した時点でのみ選択列を
/// 通知します。列挙順は自然な入れ子順です。つまりトークン0の候補が
/// 最も外側のループになります。いずれかの候補列が空の場合、直積は
/// 空となり一度も通知されません。
fn for_each_combination<'a, F>(candidates: &'a [Vec<String>], chosen: &mut Vec<&'a str>, emit: &mut F)
where
    F: FnMut(&[&'a str]),
{
    if chosen.len() == candidates.len() {
        emit(chosen);
        return;
    }
    for value in &candidates[chosen.len()] {
        chosen.push(value);
        for_each_combination(candidates, chosen, emit);
        chosen.pop();
    }
}
