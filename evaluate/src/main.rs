//! 解析結果の精度を評価するユーティリティ
//!
//! このバイナリは、システム出力の依存構造を正解コーパスと比較し、
//! ラベル付き正解率（LAS）、ラベルなし正解率（UAS）、ラベル正解率（LA）を
//! 計算します。

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use kakari::accuracy::{count_arcs, AccuracyCounts};
use kakari::graph::{DepGraph, DependencyTree};

use clap::Parser;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "evaluate", about = "Evaluate the parsing accuracy")]
struct Args {
    /// Gold corpus.
    #[clap(short = 'g', long)]
    gold_in: PathBuf,

    /// System output in the same column format.
    #[clap(short = 's', long)]
    system_in: PathBuf,
}

/// メイン関数
///
/// 正解コーパスとシステム出力を読み込み、文ごとに付与を比較して
/// 累計カウントからLAS・UAS・LAを計算します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Loading the corpora...");
    let gold_graphs = DepGraph::from_reader(File::open(args.gold_in)?)?;
    let system_graphs = DepGraph::from_reader(File::open(args.system_in)?)?;

    if gold_graphs.len() != system_graphs.len() {
        return Err(format!(
            "The number of sentences mismatches: gold={}, system={}",
            gold_graphs.len(),
            system_graphs.len()
        )
        .into());
    }

    eprintln!("Counting...");
    let mut counts = AccuracyCounts::new();
    for (gold, system) in gold_graphs.iter().zip(&system_graphs) {
        if gold.len() != system.len() {
            return Err(format!(
                "A sentence length mismatches: gold={}, system={}",
                gold.len(),
                system.len()
            )
            .into());
        }
        let arcs = gold.gold_arcs()?;
        count_arcs(system, &arcs, &mut counts);
    }

    let las = counts.las();
    let uas = counts.uas();
    let la = counts.la();
    println!("LAS = {las}");
    println!("UAS = {uas}");
    println!("LA = {la}");

    Ok(())
}
