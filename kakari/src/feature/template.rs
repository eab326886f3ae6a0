//! 素性テンプレート定義のモジュール。
//!
//! このモジュールは、テンプレート定義ファイルの解析と再シリアライズを提供します。
//!
//! テンプレート定義ファイルは1行につき1テンプレートを記述します:
//!
//! ```text
//! # コメント行と空行は無視されます
//! SINGLE <type> <token> [<token>...]
//! SET    <type> <token> [<token>...]
//! ```
//!
//! `SINGLE` は単一値テンプレート、`SET` は集合値テンプレートを表します。

use std::fmt;
use std::io::{BufRead, BufReader, Read};

use crate::errors::{KakariError, Result};

/// 素性トークン。
///
/// どの相対位置のどのフィールドを取得するかを識別する不透明な記述子です。
/// 解釈は[`FieldResolver`](crate::feature::FieldResolver)の実装に委ねられます。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureToken {
    descriptor: String,
}

impl FeatureToken {
    /// 新しい素性トークンを作成します。
    ///
    /// # 引数
    ///
    /// * `descriptor` - フィールド記述子
    pub fn new<S>(descriptor: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            descriptor: descriptor.into(),
        }
    }

    /// フィールド記述子の文字列を返します。
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

impl fmt::Display for FeatureToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

/// 素性テンプレート。
///
/// 順序付きの素性トークン列、種別タグ、集合値フラグを保持します。
/// 読み込み後は不変です。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureTemplate {
    ftype: String,
    tokens: Vec<FeatureToken>,
    set_valued: bool,
}

impl FeatureTemplate {
    /// 新しい素性テンプレートを作成します。
    ///
    /// # 引数
    ///
    /// * `ftype` - 素性の種別タグ
    /// * `tokens` - 素性トークンの列
    /// * `set_valued` - 集合値テンプレートかどうか
    ///
    /// # エラー
    ///
    /// 種別タグが空の場合、またはトークンが1つもない場合、
    /// [`KakariError`]が返されます。
    pub fn new<S>(ftype: S, tokens: Vec<FeatureToken>, set_valued: bool) -> Result<Self>
    where
        S: Into<String>,
    {
        let ftype = ftype.into();
        if ftype.is_empty() {
            return Err(KakariError::invalid_argument(
                "ftype",
                "A feature type tag must not be empty.",
            ));
        }
        if tokens.is_empty() {
            return Err(KakariError::invalid_argument(
                "tokens",
                "A feature template must have at least one token.",
            ));
        }
        Ok(Self {
            ftype,
            tokens,
            set_valued,
        })
    }

    /// 素性の種別タグを返します。
    pub fn ftype(&self) -> &str {
        &self.ftype
    }

    /// 素性トークンのスライスを返します。
    pub fn tokens(&self) -> &[FeatureToken] {
        &self.tokens
    }

    /// 集合値テンプレートかどうかを返します。
    pub fn is_set_valued(&self) -> bool {
        self.set_valued
    }
}

impl fmt::Display for FeatureTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let keyword = if self.set_valued { "SET" } else { "SINGLE" };
        write!(f, "{} {}", keyword, self.ftype)?;
        for token in &self.tokens {
            write!(f, " {token}")?;
        }
        Ok(())
    }
}

/// 1つのサブモデルに属する素性テンプレートの順序付き集合。
///
/// アーカイブには[`fmt::Display`]によるテキスト形式で格納され、
/// [`TemplateSet::from_reader`]で読み戻されます。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateSet {
    templates: Vec<FeatureTemplate>,
}

impl TemplateSet {
    /// テンプレートのリストからテンプレート集合を作成します。
    ///
    /// # 引数
    ///
    /// * `templates` - 素性テンプレートのリスト
    pub fn new(templates: Vec<FeatureTemplate>) -> Self {
        Self { templates }
    }

    /// リーダーからテンプレート集合を読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - テンプレート定義のリーダー
    ///
    /// # 戻り値
    ///
    /// 読み込まれたテンプレート集合
    ///
    /// # エラー
    ///
    /// 定義の形式が不正な場合、[`KakariError`]が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut templates = vec![];

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut spl = line.split_ascii_whitespace();
            let keyword = spl.next();
            let ftype = spl.next();
            let tokens: Vec<_> = spl.map(FeatureToken::new).collect();

            let set_valued = match keyword {
                Some("SINGLE") => false,
                Some("SET") => true,
                _ => {
                    return Err(KakariError::invalid_format(
                        "templates",
                        format!("A template line must start with SINGLE or SET: {line}"),
                    ))
                }
            };
            let ftype = ftype.ok_or_else(|| {
                KakariError::invalid_format(
                    "templates",
                    format!("A template line must have a type tag: {line}"),
                )
            })?;
            if tokens.is_empty() {
                return Err(KakariError::invalid_format(
                    "templates",
                    format!("A template line must have at least one token: {line}"),
                ));
            }
            templates.push(FeatureTemplate::new(ftype, tokens, set_valued)?);
        }

        Ok(Self { templates })
    }

    /// テンプレートのスライスを返します。
    pub fn templates(&self) -> &[FeatureTemplate] {
        &self.templates
    }

    /// テンプレートの数を返します。
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// テンプレート集合が空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl fmt::Display for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for template in &self.templates {
            writeln!(f, "{template}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader() {
        let definition = "
            # unigram features
            SINGLE p0 i.p
            SINGLE p01 i.p i+1.p

            # children features
            SET cp c.p
        ";
        let set = TemplateSet::from_reader(definition.as_bytes()).unwrap();

        assert_eq!(3, set.len());
        assert_eq!("p0", set.templates()[0].ftype());
        assert!(!set.templates()[0].is_set_valued());
        assert_eq!(
            &[FeatureToken::new("i.p"), FeatureToken::new("i+1.p")],
            set.templates()[1].tokens()
        );
        assert!(set.templates()[2].is_set_valued());
    }

    #[test]
    fn test_roundtrip() {
        let definition = "SINGLE p0 i.p\nSINGLE fp i.f h.p\nSET cd c.d\n";
        let set = TemplateSet::from_reader(definition.as_bytes()).unwrap();
        let reparsed = TemplateSet::from_reader(set.to_string().as_bytes()).unwrap();

        assert_eq!(set, reparsed);
        assert_eq!(definition, set.to_string());
    }

    #[test]
    fn test_invalid_keyword() {
        let result = TemplateSet::from_reader(b"PAIR p0 i.p".as_slice());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_tokens() {
        let result = TemplateSet::from_reader(b"SINGLE p0".as_slice());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_type() {
        let result = FeatureTemplate::new("", vec![FeatureToken::new("i.p")], false);
        assert!(result.is_err());
    }
}
