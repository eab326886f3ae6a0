//! 依存構造のモジュール。
//!
//! このモジュールは、コアが消費する木ケーパビリティ[`DependencyTree`]と、
//! その具体実装である[`DepGraph`]、および列形式コーパスの読み書きを
//! 提供します。
//!
//! 列形式は1トークンにつき1行で、タブ区切りの
//! `FORM LEMMA POS HEAD DEPREL` の5列からなります。欠損列は `_` で表し、
//! 文は空行で区切ります。

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::LazyLock;

use regex::Regex;

use crate::accuracy::GoldArc;
use crate::errors::{KakariError, Result};
use crate::feature::{FeatureToken, FieldResolver};

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(i([+-][0-9]+)?|h|c)\.([fmpd])$").unwrap());

/// ルートノードの表層形およびPOSタグ。
const ROOT_FORM: &str = "<root>";

/// 依存構造のケーパビリティ。
///
/// 位置0は暗黙のルートであり、位置 `1..len` が実トークンです。
pub trait DependencyTree {
    /// ルートを含む構造のサイズを返します。
    fn len(&self) -> usize;

    /// 構造が空かどうかを返します。
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 位置 `index` のトークンの主辞位置を返します。
    fn head(&self, index: usize) -> Option<usize>;

    /// 位置 `index` のトークンの依存ラベルを返します。
    fn label(&self, index: usize) -> Option<&str>;

    /// 位置 `index` のトークンの主辞が `head` かどうかを返します。
    fn has_head(&self, index: usize, head: usize) -> bool {
        self.head(index) == Some(head)
    }

    /// 位置 `index` のトークンのラベルが `label` かどうかを返します。
    fn has_label(&self, index: usize, label: &str) -> bool {
        self.label(index) == Some(label)
    }
}

/// 依存構造の1ノード。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepNode {
    /// 表層形。
    pub form: String,

    /// 見出し語。
    pub lemma: Option<String>,

    /// POSタグ。
    pub pos: String,

    /// 主辞位置。
    pub head: Option<usize>,

    /// 依存ラベル。
    pub deprel: Option<String>,
}

impl DepNode {
    /// 新しいノードを作成します。
    ///
    /// # 引数
    ///
    /// * `form` - 表層形
    /// * `pos` - POSタグ
    pub fn new<S, T>(form: S, pos: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            form: form.into(),
            lemma: None,
            pos: pos.into(),
            head: None,
            deprel: None,
        }
    }
}

/// 依存構造の具体実装。
///
/// 位置0のルートノードは構築時に自動的に追加されます。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepGraph {
    nodes: Vec<DepNode>,
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DepGraph {
    /// ルートのみからなる構造を作成します。
    pub fn new() -> Self {
        Self {
            nodes: vec![DepNode::new(ROOT_FORM, ROOT_FORM)],
        }
    }

    /// ノードを末尾に追加します。
    pub fn push(&mut self, node: DepNode) {
        self.nodes.push(node);
    }

    /// 位置 `index` のノードを返します。
    pub fn node(&self, index: usize) -> &DepNode {
        &self.nodes[index]
    }

    /// 位置 `index` のトークンに主辞とラベルを割り当てます。
    ///
    /// 解析結果を構造へ書き戻すために使用します。
    ///
    /// # 引数
    ///
    /// * `index` - 対象のトークン位置
    /// * `head` - 主辞位置
    /// * `deprel` - 依存ラベル
    ///
    /// # エラー
    ///
    /// `index` がルートまたは範囲外の場合、`head` が範囲外の場合、
    /// [`KakariError`]が返されます。
    pub fn set_arc<S>(&mut self, index: usize, head: usize, deprel: S) -> Result<()>
    where
        S: Into<String>,
    {
        if index == 0 || index >= self.nodes.len() {
            return Err(KakariError::invalid_argument(
                "index",
                format!("Position {index} is not a token of this graph."),
            ));
        }
        if head >= self.nodes.len() {
            return Err(KakariError::invalid_argument(
                "head",
                format!("Position {head} is out of range."),
            ));
        }
        self.nodes[index].head = Some(head);
        self.nodes[index].deprel = Some(deprel.into());
        Ok(())
    }

    /// 位置 `index` を主辞とするトークン位置を昇順で返します。
    pub fn children(&self, index: usize) -> Vec<usize> {
        (1..self.nodes.len())
            .filter(|&i| self.nodes[i].head == Some(index))
            .collect()
    }

    /// 実トークンの正解列を返します。
    ///
    /// # エラー
    ///
    /// 主辞またはラベルが欠けているトークンがある場合、
    /// [`KakariError`]が返されます。
    pub fn gold_arcs(&self) -> Result<Vec<GoldArc>> {
        let mut arcs = Vec::with_capacity(self.nodes.len() - 1);
        for (i, node) in self.nodes.iter().enumerate().skip(1) {
            match (node.head, &node.deprel) {
                (Some(head), Some(deprel)) => arcs.push(GoldArc::new(head, deprel.clone())),
                _ => {
                    return Err(KakariError::invalid_state(
                        "The graph is not fully annotated",
                        format!("position {i} has no head or label"),
                    ))
                }
            }
        }
        Ok(arcs)
    }

    /// リーダーから列形式の構造の列を読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - コーパスのリーダー
    ///
    /// # エラー
    ///
    /// 列数が不正な場合、または主辞位置が整数として解釈できない場合、
    /// [`KakariError`]が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Vec<Self>>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut graphs = vec![];
        let mut graph = Self::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end();

            if line.is_empty() {
                if graph.len() > 1 {
                    graphs.push(graph);
                    graph = Self::new();
                }
                continue;
            }

            let cols: Vec<_> = line.split('\t').collect();
            if cols.len() != 5 {
                return Err(KakariError::invalid_format(
                    "corpus",
                    format!("A token line must have 5 columns: {line}"),
                ));
            }
            let mut node = DepNode::new(cols[0], cols[2]);
            if cols[1] != "_" {
                node.lemma = Some(cols[1].to_string());
            }
            if cols[3] != "_" {
                node.head = Some(cols[3].parse()?);
            }
            if cols[4] != "_" {
                node.deprel = Some(cols[4].to_string());
            }
            graph.push(node);
        }
        if graph.len() > 1 {
            graphs.push(graph);
        }

        Ok(graphs)
    }

    /// 構造を列形式で書き出します。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合、I/Oエラーが返されます。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        for node in self.nodes.iter().skip(1) {
            writeln!(
                wtr,
                "{}\t{}\t{}\t{}\t{}",
                node.form,
                node.lemma.as_deref().unwrap_or("_"),
                node.pos,
                node.head.map_or_else(|| "_".to_string(), |h| h.to_string()),
                node.deprel.as_deref().unwrap_or("_"),
            )?;
        }
        writeln!(wtr)?;
        Ok(())
    }
}

impl DependencyTree for DepGraph {
    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn head(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|n| n.head)
    }

    fn label(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).and_then(|n| n.deprel.as_deref())
    }
}

/// [`DepGraph`]上の注目位置に対するフィールド解決器。
///
/// 記述子は `<source>.<field>` の形式です。`source` は `i` (注目位置)、
/// `i-1`/`i+1` などの相対位置、`h` (注目位置の主辞)、`c` (注目位置の
/// 子の列、集合値のみ) のいずれかで、`field` は `f` (表層形)、
/// `m` (見出し語)、`p` (POSタグ)、`d` (依存ラベル) のいずれかです。
///
/// 範囲外の位置、未割り当ての主辞、欠損フィールドはすべて「欠損」として
/// `None` に解決されます。
pub struct GraphResolver<'a> {
    graph: &'a DepGraph,
    focus: usize,
}

impl<'a> GraphResolver<'a> {
    /// 新しい解決器を作成します。
    ///
    /// # 引数
    ///
    /// * `graph` - 対象の構造
    /// * `focus` - 注目位置
    pub fn new(graph: &'a DepGraph, focus: usize) -> Self {
        Self { graph, focus }
    }

    fn value_of(&self, index: usize, field: &str) -> Option<String> {
        let node = self.graph.nodes.get(index)?;
        match field {
            "f" => Some(node.form.clone()),
            "m" => node.lemma.clone(),
            "p" => Some(node.pos.clone()),
            "d" => node.deprel.clone(),
            _ => None,
        }
    }
}

impl FieldResolver for GraphResolver<'_> {
    fn field(&self, token: &FeatureToken) -> Option<String> {
        let caps = TOKEN_PATTERN.captures(token.descriptor())?;
        let source = caps.get(1).map(|m| m.as_str())?;
        let field = caps.get(3).map(|m| m.as_str())?;

        if source == "h" {
            let head = self.graph.nodes.get(self.focus)?.head?;
            return self.value_of(head, field);
        }
        if source == "c" {
            // A set-valued source has no single value.
            return None;
        }
        let offset = caps
            .get(2)
            .map_or(Ok(0), |m| m.as_str().parse::<isize>())
            .ok()?;
        let index = self.focus as isize + offset;
        if index < 0 {
            return None;
        }
        self.value_of(index as usize, field)
    }

    fn fields(&self, token: &FeatureToken) -> Option<Vec<String>> {
        let caps = TOKEN_PATTERN.captures(token.descriptor())?;
        let source = caps.get(1).map(|m| m.as_str())?;
        let field = caps.get(3).map(|m| m.as_str())?;

        if source == "c" {
            let mut values = vec![];
            for child in self.graph.children(self.focus) {
                values.push(self.value_of(child, field)?);
            }
            return Some(values);
        }
        self.field(token).map(|value| vec![value])
    }
}
