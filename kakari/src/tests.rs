//! kakariのテストモジュール群
//!
//! 複数のモジュールにまたがるパイプラインの動作を検証するテストを含みます。
