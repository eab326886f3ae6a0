//! エラー型の定義
//!
//! このモジュールは、kakariライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};

/// kakari専用のResult型
///
/// エラー型としてデフォルトで[`KakariError`]を使用します。
pub type Result<T, E = KakariError> = std::result::Result<T, E>;

/// kakariのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 各バリアントは特定のエラー条件に対応しています。
#[derive(Debug, thiserror::Error)]
pub enum KakariError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 整数パースエラー
    ///
    /// [`ParseIntError`](std::num::ParseIntError)のエラーバリアント。
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    ///
    /// [`std::str::Utf8Error`]のエラーバリアント。
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// アーカイブエラー
    ///
    /// [`ZipError`](zip::result::ZipError)のエラーバリアント。
    /// モデルアーカイブのエントリの読み書きに失敗した場合に発生します。
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// モデルのシリアライゼーションエラー
    ///
    /// [`EncodeError`](bincode::error::EncodeError)のエラーバリアント。
    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),

    /// モデルのデシリアライゼーションエラー
    ///
    /// [`DecodeError`](bincode::error::DecodeError)のエラーバリアント。
    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),
}

impl KakariError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}
