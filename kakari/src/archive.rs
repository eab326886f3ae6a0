//! モデルアーカイブのモジュール。
//!
//! このモジュールは、1つのアーカイブ内に名前付きエントリの列として
//! テンプレートとモデルのブロブを読み書きする機能を提供します。
//!
//! # 順序契約
//!
//! エントリは書き込まれた順にのみ読み戻せます。読み取り側はエントリ名に
//! よるランダムアクセスを行わず、ストリームの先頭から順に消費します。
//! この契約は意図的なものであり、名前ベースの検索に「修正」しては
//! なりません。エントリ名と添字の順序が乖離した場合に挙動が変わるため
//! です。順不同の読み取りは現在の契約ではサポートされません。
//!
//! エントリの内容はこの層にとって不透明であり、フレーミングと順序のみを
//! 保証します。内容の(デ)シリアライズは各ブロブ側のコーデックに委ねられます。

use std::io::{Read, Seek, Write};

use zip::read::read_zipfile_from_stream;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::errors::{KakariError, Result};

/// モデルアーカイブの書き込み器。
///
/// 各ブロブを `"<base><index>"` という名前のエントリとして順に書き込み
/// ます。1つのエントリは完全に書き終えてから次のエントリを開きます。
/// エントリが互いに跨ることはありません。
pub struct ArchiveWriter<W>
where
    W: Write + Seek,
{
    zip: ZipWriter<W>,
}

impl<W> ArchiveWriter<W>
where
    W: Write + Seek,
{
    /// 新しい書き込み器を作成します。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    pub fn new(wtr: W) -> Self {
        Self {
            zip: ZipWriter::new(wtr),
        }
    }

    /// ブロブの列を連番付きエントリとして書き込みます。
    ///
    /// ブロブ `i` はエントリ `"<base><i>"` に格納されます。
    ///
    /// # 引数
    ///
    /// * `base` - エントリ名のベース
    /// * `blobs` - 書き込むブロブの列
    ///
    /// # エラー
    ///
    /// いずれかのエントリの書き込みに失敗した場合、[`KakariError`]が
    /// 返され、アーカイブ全体が無効となります。部分的なアーカイブを
    /// 有効なモデルとして扱ってはなりません。
    pub fn write_entries<B>(&mut self, base: &str, blobs: &[B]) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        for (i, blob) in blobs.iter().enumerate() {
            self.zip.start_file(format!("{base}{i}"), FileOptions::default())?;
            self.zip.write_all(blob.as_ref())?;
        }
        Ok(())
    }

    /// アーカイブを完了し、書き込み先を返します。
    ///
    /// # エラー
    ///
    /// アーカイブの終端処理に失敗した場合、[`KakariError`]が返されます。
    pub fn finish(mut self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

/// モデルアーカイブの読み取り器。
///
/// 単一パスの逐次ストリームプロトコルです。各呼び出しは書き込み順で
/// 次のエントリを消費します。途中からの再開や巻き戻しはできません。
pub struct ArchiveReader<R>
where
    R: Read,
{
    rdr: R,
}

impl<R> ArchiveReader<R>
where
    R: Read,
{
    /// 新しい読み取り器を作成します。
    ///
    /// # 引数
    ///
    /// * `rdr` - 読み取り元
    pub fn new(rdr: R) -> Self {
        Self { rdr }
    }

    /// 次のエントリを読み取ります。
    ///
    /// # 戻り値
    ///
    /// エントリ名と内容のペア
    ///
    /// # エラー
    ///
    /// ストリームが尽きている場合、または読み取りに失敗した場合、
    /// [`KakariError`]が返されます。期待した数のエントリを読み切る前に
    /// 尽きたアーカイブは無効です。
    pub fn read_entry(&mut self) -> Result<(String, Vec<u8>)> {
        match read_zipfile_from_stream(&mut self.rdr)? {
            Some(mut entry) => {
                let name = entry.name().to_string();
                let mut blob = vec![];
                entry.read_to_end(&mut blob)?;
                Ok((name, blob))
            }
            None => Err(KakariError::invalid_state(
                "The archive ended before all expected entries were read",
                "missing entries",
            )),
        }
    }

    /// 指定した数のエントリを順に読み取ります。
    ///
    /// # 引数
    ///
    /// * `count` - 読み取るエントリ数
    ///
    /// # 戻り値
    ///
    /// 読み取られたブロブの列。エントリ名は読み取り時には使用されません。
    ///
    /// # エラー
    ///
    /// エントリが不足している場合、または読み取りに失敗した場合、
    /// [`KakariError`]が返されます。
    pub fn read_entries(&mut self, count: usize) -> Result<Vec<Vec<u8>>> {
        let mut blobs = Vec::with_capacity(count);
        for _ in 0..count {
            let (_, blob) = self.read_entry()?;
            blobs.push(blob);
        }
        Ok(blobs)
    }

    /// 読み取りを完了します。
    ///
    /// # エラー
    ///
    /// 未消費のエントリが残っている場合、[`KakariError`]が返されます。
    /// 黙った切り詰めは行いません。
    pub fn finish(mut self) -> Result<()> {
        if read_zipfile_from_stream(&mut self.rdr)?.is_some() {
            return Err(KakariError::invalid_state(
                "The archive has more entries than expected",
                "unconsumed entries",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    fn build_archive(bases: &[(&str, &[&[u8]])]) -> Vec<u8> {
        let mut writer = ArchiveWriter::new(Cursor::new(vec![]));
        for (base, blobs) in bases {
            writer.write_entries(base, blobs).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_roundtrip_in_written_order() {
        let bytes = build_archive(&[
            ("template-", &[b"SINGLE p i.p\n".as_slice(), b"SET s c.p\n"]),
            ("model-", &[b"\x01\x02".as_slice(), b"\x03"]),
        ]);

        let mut reader = ArchiveReader::new(bytes.as_slice());
        assert_eq!(
            ("template-0".to_string(), b"SINGLE p i.p\n".to_vec()),
            reader.read_entry().unwrap()
        );
        assert_eq!(
            ("template-1".to_string(), b"SET s c.p\n".to_vec()),
            reader.read_entry().unwrap()
        );
        assert_eq!(
            ("model-0".to_string(), b"\x01\x02".to_vec()),
            reader.read_entry().unwrap()
        );
        assert_eq!(
            ("model-1".to_string(), b"\x03".to_vec()),
            reader.read_entry().unwrap()
        );
        reader.finish().unwrap();
    }

    #[test]
    fn test_reading_more_than_written_fails() {
        let bytes = build_archive(&[("model-", &[b"x".as_slice()])]);

        let mut reader = ArchiveReader::new(bytes.as_slice());
        reader.read_entry().unwrap();
        assert!(reader.read_entry().is_err());
    }

    #[test]
    fn test_reading_fewer_than_written_fails_at_finish() {
        let bytes = build_archive(&[("model-", &[b"x".as_slice(), b"y"])]);

        let mut reader = ArchiveReader::new(bytes.as_slice());
        reader.read_entry().unwrap();
        assert!(reader.finish().is_err());
    }

    #[test]
    fn test_empty_blob_entry() {
        let bytes = build_archive(&[("model-", &[b"".as_slice()])]);

        let mut reader = ArchiveReader::new(bytes.as_slice());
        assert_eq!(("model-0".to_string(), vec![]), reader.read_entry().unwrap());
        reader.finish().unwrap();
    }
}
