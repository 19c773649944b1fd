use std::fmt::Debug;

pub trait ResultExt<T, E> {
  fn log(self) -> Option<T>;
}
impl<T, E> ResultExt<T, E> for Result<T, E>
where
  E: Debug,
{
  /// Logs the error and carries on without the value.
  #[inline]
  fn log(self) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        error!("{:?}", e);
        None
      }
    }
  }
}

#[test]
fn test_log_keeps_ok() {
  let ok: Result<u8, String> = Ok(3);
  let err: Result<u8, String> = Err("nope".into());
  assert_eq!(ok.log(), Some(3));
  assert_eq!(err.log(), None);
}
