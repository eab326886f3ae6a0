//! 内部ユーティリティのモジュール。

#[cfg(test)]
/// HashMapリテラルを簡潔に記述するためのマクロ
///
/// # 例
///
/// ```ignore
/// let map = hashmap! {
///     "key1" => "value1",
///     "key2" => "value2",
/// };
/// ```
///
/// # 注意
///
/// このマクロはテスト時のみ利用可能です。
macro_rules! hashmap {
    ( $($k:expr => $v:expr,)* ) => {
        {
            #[allow(unused_mut)]
            let mut h = hashbrown::HashMap::new();
            $(
                h.insert($k, $v);
            )*
            h
        }
    };
    ( $($k:expr => $v:expr),* ) => {
        hashmap![$( $k => $v, )*]
    };
}

#[cfg(test)]
pub(crate) use hashmap;
