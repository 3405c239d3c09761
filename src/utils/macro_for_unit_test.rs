/// 错误断言宏：验证`Result`为 Err，且错误匹配给定模式（可带 if 条件）
///
/// # 示例
/// ```ignore
/// assert_err!(result, GraphError::DuplicateParameter(id) if *id == w_id);
/// assert_err!(result, GraphError::HookFailed { message, .. } if message == "更新失败");
/// assert_err!(result, TrainError::Io(_));
/// ```
#[macro_export]
macro_rules! assert_err {
    ($expr:expr, $($pattern:tt)+) => {
        match &$expr {
            Err(e) => assert!(
                matches!(e, $($pattern)+),
                "错误不匹配：预期 `{}`，实际得到 `{:?}`",
                stringify!($($pattern)+),
                e
            ),
            Ok(v) => panic!("预期 Err 匹配 `{}`，实际得到 Ok({:?})", stringify!($($pattern)+), v),
        }
    };
}
